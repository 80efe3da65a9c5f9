//! Style-property identifiers understood by the layout core.

use serde::{Deserialize, Serialize};

/// The value type a [`StyleKey`] expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Length,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKey {
    /// Layout strategy name ("block", "inline", "row", "canvas", "table", ...).
    Layout,
    Visible,
    BreakBefore,
    BreakAfter,
    AvoidPageBreakInside,
    OverflowX,
    OverflowY,
    /// Offset below the page header where the content is pinned, `auto` if it flows.
    FixedPosition,

    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,

    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,

    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,

    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
}

impl StyleKey {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            StyleKey::Layout => ValueKind::Text,
            StyleKey::Visible
            | StyleKey::BreakBefore
            | StyleKey::BreakAfter
            | StyleKey::AvoidPageBreakInside
            | StyleKey::OverflowX
            | StyleKey::OverflowY => ValueKind::Bool,
            _ => ValueKind::Length,
        }
    }

    /// Inherited keys fall back to the parent sheet when unset.
    pub fn is_inherited(&self) -> bool {
        matches!(self, StyleKey::Visible)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKey::Layout => "layout",
            StyleKey::Visible => "visible",
            StyleKey::BreakBefore => "break-before",
            StyleKey::BreakAfter => "break-after",
            StyleKey::AvoidPageBreakInside => "avoid-page-break-inside",
            StyleKey::OverflowX => "overflow-x",
            StyleKey::OverflowY => "overflow-y",
            StyleKey::FixedPosition => "fixed-position",
            StyleKey::Width => "width",
            StyleKey::Height => "height",
            StyleKey::MinWidth => "min-width",
            StyleKey::MinHeight => "min-height",
            StyleKey::MaxWidth => "max-width",
            StyleKey::MaxHeight => "max-height",
            StyleKey::PaddingTop => "padding-top",
            StyleKey::PaddingRight => "padding-right",
            StyleKey::PaddingBottom => "padding-bottom",
            StyleKey::PaddingLeft => "padding-left",
            StyleKey::BorderTopWidth => "border-top-width",
            StyleKey::BorderRightWidth => "border-right-width",
            StyleKey::BorderBottomWidth => "border-bottom-width",
            StyleKey::BorderLeftWidth => "border-left-width",
            StyleKey::MarginTop => "margin-top",
            StyleKey::MarginRight => "margin-right",
            StyleKey::MarginBottom => "margin-bottom",
            StyleKey::MarginLeft => "margin-left",
        }
    }
}
