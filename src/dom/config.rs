// Options for inserting `<style>` elements

/// Where a new `<style>` element goes inside its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// After every existing element
    #[default]
    Append,
    /// Before every existing element
    Prepend,
    /// After the last prepended/queued element of equal or lower priority, so repeated
    /// inserts stay grouped in insertion order at the front of the container
    Queue,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertOptions {
    /// Attribute that carries the element id, used to find it again
    pub mark: String,
    pub placement: Placement,
    /// Container name; the document head when unset
    pub attach_to: Option<String>,
    /// Queue ordering; higher priorities go later
    pub priority: i32,
    /// CSP nonce
    pub nonce: Option<String>,
    /// Extra attributes set on the element
    pub attributes: Vec<(String, String)>,
}

impl InsertOptions {
    pub fn new(mark: &str) -> Self {
        Self {
            mark: mark.to_string(),
            ..Self::default()
        }
    }

    pub fn container(&self) -> &str {
        self.attach_to.as_deref().unwrap_or(super::DEFAULT_CONTAINER)
    }
}
