//! Defines the resolved style sheet attached to every render node.
//!
//! Style resolution itself happens elsewhere; the layout core only needs typed lookups on an
//! already-resolved key/value store.

use crate::keys::{StyleKey, ValueKind};
use crate::parsers::{StyleParseError, parse_length};
use folio_types::{RenderLength, to_internal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Length(RenderLength),
}

impl StyleValue {
    /// Coerces a raw value into the representation `key` expects.
    fn normalize(key: StyleKey, raw: StyleValue) -> Result<StyleValue, StyleParseError> {
        let invalid = |raw: &StyleValue| StyleParseError::InvalidValue {
            property: key.as_str().to_string(),
            value: format!("{:?}", raw),
        };
        match (key.value_kind(), raw) {
            (ValueKind::Bool, StyleValue::Bool(b)) => Ok(StyleValue::Bool(b)),
            (ValueKind::Bool, StyleValue::Text(s)) => match s.trim() {
                "true" => Ok(StyleValue::Bool(true)),
                "false" => Ok(StyleValue::Bool(false)),
                _ => Err(invalid(&StyleValue::Text(s))),
            },
            (ValueKind::Length, StyleValue::Length(l)) => Ok(StyleValue::Length(l)),
            (ValueKind::Length, StyleValue::Number(n)) => {
                Ok(StyleValue::Length(RenderLength::fixed(to_internal(n))))
            }
            (ValueKind::Length, StyleValue::Text(s)) => {
                parse_length(key.as_str(), &s).map(StyleValue::Length)
            }
            (ValueKind::Text, StyleValue::Text(s)) => Ok(StyleValue::Text(s)),
            (_, other) => Err(invalid(&other)),
        }
    }
}

/// A resolved, read-only style sheet.
///
/// Lookups of inherited keys fall back to the parent sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "HashMap<StyleKey, StyleValue>",
    into = "HashMap<StyleKey, StyleValue>"
)]
pub struct StyleSheet {
    values: HashMap<StyleKey, StyleValue>,
    parent: Option<Arc<StyleSheet>>,
}

impl TryFrom<HashMap<StyleKey, StyleValue>> for StyleSheet {
    type Error = StyleParseError;

    fn try_from(raw: HashMap<StyleKey, StyleValue>) -> Result<Self, Self::Error> {
        let mut sheet = StyleSheet::new();
        for (key, value) in raw {
            sheet.set(key, value)?;
        }
        Ok(sheet)
    }
}

/// Serializes the effective values: inherited keys the sheet does not set itself are taken
/// from the nearest ancestor that does, so the parent link can be dropped.
impl From<StyleSheet> for HashMap<StyleKey, StyleValue> {
    fn from(sheet: StyleSheet) -> Self {
        let mut values = sheet.values;
        let mut ancestor = sheet.parent;
        while let Some(parent) = ancestor {
            for (key, value) in parent.values.iter().filter(|(key, _)| key.is_inherited()) {
                values.entry(*key).or_insert_with(|| value.clone());
            }
            ancestor = parent.parent.clone();
        }
        values
    }
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sheet inheriting from `parent`.
    pub fn inheriting(parent: Arc<StyleSheet>) -> Self {
        Self {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub fn parent(&self) -> Option<&Arc<StyleSheet>> {
        self.parent.as_ref()
    }

    pub fn set(&mut self, key: StyleKey, value: StyleValue) -> Result<(), StyleParseError> {
        let value = StyleValue::normalize(key, value)?;
        self.values.insert(key, value);
        Ok(())
    }

    pub fn with_bool(mut self, key: StyleKey, value: bool) -> Self {
        self.values.insert(key, StyleValue::Bool(value));
        self
    }

    pub fn with_length(mut self, key: StyleKey, value: RenderLength) -> Self {
        self.values.insert(key, StyleValue::Length(value));
        self
    }

    pub fn with_text(mut self, key: StyleKey, value: &str) -> Self {
        self.values.insert(key, StyleValue::Text(value.to_string()));
        self
    }

    pub fn get(&self, key: StyleKey) -> Option<&StyleValue> {
        match self.values.get(&key) {
            Some(value) => Some(value),
            None if key.is_inherited() => self.parent.as_ref().and_then(|p| p.get(key)),
            None => None,
        }
    }

    pub fn get_bool(&self, key: StyleKey) -> bool {
        match self.get(key) {
            Some(StyleValue::Bool(b)) => *b,
            _ => matches!(key, StyleKey::Visible),
        }
    }

    /// Length lookup. Unset sizes and fixed positions are `auto`, everything else is zero.
    pub fn get_length(&self, key: StyleKey) -> RenderLength {
        match self.get(key) {
            Some(StyleValue::Length(l)) => *l,
            _ => match key {
                StyleKey::Width
                | StyleKey::Height
                | StyleKey::MaxWidth
                | StyleKey::MaxHeight
                | StyleKey::FixedPosition => RenderLength::AUTO,
                _ => RenderLength::EMPTY,
            },
        }
    }

    pub fn get_text(&self, key: StyleKey) -> Option<&str> {
        match self.get(key) {
            Some(StyleValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
