//! Named attributes attached to a render node at construction time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Namespace of the attributes interpreted by the layout core.
pub const CORE_NAMESPACE: &str = "core";

pub const ANCHOR: &str = "anchor";
pub const HREF_TARGET: &str = "href-target";
pub const ELEMENT_TYPE: &str = "element-type";

/// An immutable-by-convention `(namespace, name) -> value` map.
///
/// Nodes share these behind an `Arc`, so a map is never changed after it was attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    namespaces: HashMap<String, HashMap<String, String>>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, namespace: &str, name: &str, value: &str) -> Self {
        self.set(namespace, name, value);
        self
    }

    pub fn set(&mut self, namespace: &str, name: &str, value: &str) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<&str> {
        self.namespaces
            .get(namespace)
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    pub fn anchor(&self) -> Option<&str> {
        self.get(CORE_NAMESPACE, ANCHOR)
    }

    pub fn href_target(&self) -> Option<&str> {
        self.get(CORE_NAMESPACE, HREF_TARGET)
    }

    pub fn element_type(&self) -> Option<&str> {
        self.get(CORE_NAMESPACE, ELEMENT_TYPE)
    }

    /// Anchors and hyperlink targets must survive even on otherwise empty boxes.
    pub fn has_extra_content(&self) -> bool {
        self.anchor().is_some() || self.href_target().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_content_detection() {
        let plain = AttributeMap::new().with(CORE_NAMESPACE, ELEMENT_TYPE, "label");
        assert!(!plain.has_extra_content());
        assert_eq!(plain.element_type(), Some("label"));

        let linked = AttributeMap::new().with(CORE_NAMESPACE, HREF_TARGET, "https://example.com");
        assert!(linked.has_extra_content());

        let foreign = AttributeMap::new().with("html", ANCHOR, "x");
        assert!(!foreign.has_extra_content());
    }

    #[test]
    fn test_from_json() -> Result<(), serde_json::Error> {
        let attrs: AttributeMap = serde_json::from_str(r#"{ "core": { "anchor": "top" } }"#)?;
        assert_eq!(attrs.anchor(), Some("top"));
        assert!(!attrs.is_empty());
        Ok(())
    }
}
