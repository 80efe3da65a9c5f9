pub mod attributes;
pub mod keys;
pub mod parsers;
pub mod stylesheet;

pub use attributes::AttributeMap;
pub use keys::{StyleKey, ValueKind};
pub use parsers::StyleParseError;
pub use stylesheet::{StyleSheet, StyleValue};
