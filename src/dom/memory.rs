// In-memory document for server rendering and tests
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::config::{InsertOptions, Placement};
use super::host::StyleHost;
use crate::error::HostError;

/// A `<style>` element held by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq)]
pub struct StyleElement {
    pub id: String,
    pub mark: String,
    pub css: String,
    pub container: String,
    pub placement: Placement,
    pub priority: i32,
    pub nonce: Option<String>,
    pub attributes: Vec<(String, String)>,
}

impl StyleElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps `<style>` elements in document order
#[derive(Debug, Default)]
pub struct MemoryHost {
    elements: Mutex<Vec<StyleElement>>,
    layer_support: bool,
    failing_layer_check: bool,
    insert_calls: AtomicUsize,
    layer_checks: AtomicUsize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer_support(mut self, supported: bool) -> Self {
        self.layer_support = supported;
        self
    }

    /// Make the `@layer` check report an error
    pub fn with_failing_layer_check(mut self) -> Self {
        self.failing_layer_check = true;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StyleElement>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of all elements in document order
    pub fn elements(&self) -> Vec<StyleElement> {
        self.lock().clone()
    }

    pub fn element(&self, id: &str) -> Option<StyleElement> {
        self.lock().iter().find(|e| e.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `insert_or_update_style` calls, updates included
    pub fn insert_count(&self) -> usize {
        self.insert_calls.load(Ordering::Relaxed)
    }

    pub fn layer_check_count(&self) -> usize {
        self.layer_checks.load(Ordering::Relaxed)
    }
}

/// Index at which a new element goes, following the placement rules
fn insert_position(elements: &[StyleElement], container: &str, placement: Placement, priority: i32) -> usize {
    let first_in_container = elements
        .iter()
        .position(|e| e.container == container)
        .unwrap_or(elements.len());

    match placement {
        Placement::Append => elements
            .iter()
            .rposition(|e| e.container == container)
            .map_or(elements.len(), |i| i + 1),
        Placement::Prepend => first_in_container,
        Placement::Queue => elements
            .iter()
            .rposition(|e| {
                e.container == container
                    && matches!(e.placement, Placement::Prepend | Placement::Queue)
                    && priority >= e.priority
            })
            .map_or(first_in_container, |i| i + 1),
    }
}

impl StyleHost for MemoryHost {
    fn insert_or_update_style(&self, css: &str, id: &str, options: &InsertOptions) -> Result<(), HostError> {
        if id.is_empty() {
            return Err(HostError("style id must not be empty".to_string()));
        }
        self.insert_calls.fetch_add(1, Ordering::Relaxed);

        let container = options.container().to_string();
        let mut elements = self.lock();

        if let Some(existing) = elements
            .iter_mut()
            .find(|e| e.id == id && e.mark == options.mark && e.container == container)
        {
            existing.css = css.to_string();
            existing.nonce = options.nonce.clone();
            for (name, value) in &options.attributes {
                match existing.attributes.iter_mut().find(|(n, _)| n == name) {
                    Some(slot) => slot.1 = value.clone(),
                    None => existing.attributes.push((name.clone(), value.clone())),
                }
            }
            return Ok(());
        }

        let index = insert_position(&elements, &container, options.placement, options.priority);
        elements.insert(
            index,
            StyleElement {
                id: id.to_string(),
                mark: options.mark.clone(),
                css: css.to_string(),
                container,
                placement: options.placement,
                priority: options.priority,
                nonce: options.nonce.clone(),
                attributes: options.attributes.clone(),
            },
        );
        Ok(())
    }

    fn remove_style(&self, id: &str, mark: &str) {
        self.lock().retain(|e| !(e.id == id && e.mark == mark));
    }

    fn style_text(&self, id: &str, mark: &str) -> Option<String> {
        self.lock()
            .iter()
            .find(|e| e.id == id && e.mark == mark)
            .map(|e| e.css.clone())
    }

    fn computed_value_of(&self, css: &str, _class_name: &str, property: &str) -> Result<String, HostError> {
        self.layer_checks.fetch_add(1, Ordering::Relaxed);
        if self.failing_layer_check {
            return Err(HostError("check element could not be attached".to_string()));
        }
        if !self.layer_support && css.trim_start().starts_with("@layer") {
            return Ok("auto".to_string());
        }
        // Report the first `property: value` the check rule forces
        let needle = format!("{}:", property);
        let value = css
            .split_once(needle.as_str())
            .map(|(_, rest)| rest.split(['!', ';', '}']).next().unwrap_or("").trim().to_string())
            .unwrap_or_else(|| "auto".to_string());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(priority: i32) -> InsertOptions {
        InsertOptions {
            placement: Placement::Queue,
            priority,
            ..InsertOptions::new("data-css-hash")
        }
    }

    fn ids(host: &MemoryHost) -> Vec<String> {
        host.elements().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn inserts_are_idempotent_by_id() {
        let host = MemoryHost::new();
        let options = InsertOptions::new("data-css-hash");
        host.insert_or_update_style("a{}", "x", &options).unwrap();
        host.insert_or_update_style("b{}", "x", &options).unwrap();

        assert_eq!(host.len(), 1);
        assert_eq!(host.style_text("x", "data-css-hash").as_deref(), Some("b{}"));
        assert_eq!(host.insert_count(), 2);
    }

    #[test]
    fn queue_keeps_insertion_order_ahead_of_appended() {
        let host = MemoryHost::new();
        host.insert_or_update_style("", "user", &InsertOptions::new("m")).unwrap();
        host.insert_or_update_style("", "q1", &queued(0)).unwrap();
        host.insert_or_update_style("", "q2", &queued(0)).unwrap();
        host.insert_or_update_style("", "late", &queued(1)).unwrap();
        host.insert_or_update_style("", "q3", &queued(0)).unwrap();

        assert_eq!(ids(&host), ["q1", "q2", "q3", "late", "user"]);
    }

    #[test]
    fn remove_by_id_and_mark() {
        let host = MemoryHost::new();
        host.insert_or_update_style("", "x", &InsertOptions::new("m")).unwrap();
        host.remove_style("x", "other");
        assert_eq!(host.len(), 1);
        host.remove_style("x", "m");
        assert!(host.is_empty());
    }

    #[test]
    fn computed_value_reads_forced_width() {
        let host = MemoryHost::new().with_layer_support(true);
        let width = host
            .computed_value_of("@layer p { .p { width: 93px !important; } }", "p", "width")
            .unwrap();
        assert_eq!(width, "93px");
    }
}
