// The document collaborator: the only place stylesheets are physically inserted or removed
use std::fmt;

use super::config::InsertOptions;
use crate::error::HostError;

pub trait StyleHost: fmt::Debug + Send + Sync {
    /// Insert a `<style>` element with `id` in its `options.mark` attribute, or update the
    /// text and attributes of the element already carrying that id.
    fn insert_or_update_style(&self, css: &str, id: &str, options: &InsertOptions) -> Result<(), HostError>;

    /// Remove the element carrying `id` in its `mark` attribute, if any
    fn remove_style(&self, id: &str, mark: &str);

    /// Text of an existing element, used to reuse server-rendered stylesheets
    fn style_text(&self, id: &str, mark: &str) -> Option<String>;

    /// Apply `css` to a detached element with class `class_name` and report the computed
    /// value of `property`
    fn computed_value_of(&self, css: &str, class_name: &str, property: &str) -> Result<String, HostError>;
}
