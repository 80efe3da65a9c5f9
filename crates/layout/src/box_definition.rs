//! Padding, border and margin allocation of a box.

use folio_style::{StyleKey, StyleSheet};
use folio_types::{Axis, RenderLength};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub top: RenderLength,
    pub right: RenderLength,
    pub bottom: RenderLength,
    pub left: RenderLength,
}

impl Edges {
    fn from_style(style: &StyleSheet, keys: [StyleKey; 4]) -> Self {
        Self {
            top: style.get_length(keys[0]),
            right: style.get_length(keys[1]),
            bottom: style.get_length(keys[2]),
            left: style.get_length(keys[3]),
        }
    }

    /// Sum of left and right, resolved against the containing block width.
    pub fn horizontal(&self, parent_width: i64) -> i64 {
        self.left.resolve(parent_width) + self.right.resolve(parent_width)
    }

    /// Sum of top and bottom. Percentages resolve against the width, as in CSS.
    pub fn vertical(&self, parent_width: i64) -> i64 {
        self.top.resolve(parent_width) + self.bottom.resolve(parent_width)
    }

    pub fn is_empty(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|edge| edge.is_auto() || edge.value() == 0)
    }

    /// Splits along `axis`: the first half keeps the leading edge, the second the trailing one.
    fn split(&self, axis: Axis) -> (Edges, Edges) {
        let mut first = *self;
        let mut second = *self;
        match axis {
            Axis::Horizontal => {
                first.right = RenderLength::EMPTY;
                second.left = RenderLength::EMPTY;
            }
            Axis::Vertical => {
                first.bottom = RenderLength::EMPTY;
                second.top = RenderLength::EMPTY;
            }
        }
        (first, second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxDefinition {
    pub margins: Edges,
    pub borders: Edges,
    pub paddings: Edges,
    pub preferred_width: RenderLength,
    pub preferred_height: RenderLength,
    pub min_width: RenderLength,
    pub min_height: RenderLength,
    pub max_width: RenderLength,
    pub max_height: RenderLength,
}

impl Default for BoxDefinition {
    fn default() -> Self {
        Self {
            margins: Edges::default(),
            borders: Edges::default(),
            paddings: Edges::default(),
            preferred_width: RenderLength::AUTO,
            preferred_height: RenderLength::AUTO,
            min_width: RenderLength::EMPTY,
            min_height: RenderLength::EMPTY,
            max_width: RenderLength::AUTO,
            max_height: RenderLength::AUTO,
        }
    }
}

impl BoxDefinition {
    pub fn from_style(style: &StyleSheet) -> Self {
        Self {
            margins: Edges::from_style(
                style,
                [
                    StyleKey::MarginTop,
                    StyleKey::MarginRight,
                    StyleKey::MarginBottom,
                    StyleKey::MarginLeft,
                ],
            ),
            borders: Edges::from_style(
                style,
                [
                    StyleKey::BorderTopWidth,
                    StyleKey::BorderRightWidth,
                    StyleKey::BorderBottomWidth,
                    StyleKey::BorderLeftWidth,
                ],
            ),
            paddings: Edges::from_style(
                style,
                [
                    StyleKey::PaddingTop,
                    StyleKey::PaddingRight,
                    StyleKey::PaddingBottom,
                    StyleKey::PaddingLeft,
                ],
            ),
            preferred_width: style.get_length(StyleKey::Width),
            preferred_height: style.get_length(StyleKey::Height),
            min_width: style.get_length(StyleKey::MinWidth),
            min_height: style.get_length(StyleKey::MinHeight),
            max_width: style.get_length(StyleKey::MaxWidth),
            max_height: style.get_length(StyleKey::MaxHeight),
        }
    }

    /// Horizontal space taken by borders and paddings.
    pub fn horizontal_insets(&self, parent_width: i64) -> i64 {
        self.borders.horizontal(parent_width) + self.paddings.horizontal(parent_width)
    }

    /// Vertical space taken by borders and paddings.
    pub fn vertical_insets(&self, parent_width: i64) -> i64 {
        self.borders.vertical(parent_width) + self.paddings.vertical(parent_width)
    }

    /// True if the box draws nothing on its own.
    pub fn is_empty(&self) -> bool {
        self.borders.is_empty() && self.paddings.is_empty()
    }

    /// Divides the edge allocation between two halves of a box broken along `axis`.
    /// Size constraints are copied to both halves.
    pub fn split(&self, axis: Axis) -> (BoxDefinition, BoxDefinition) {
        let (first_margins, second_margins) = self.margins.split(axis);
        let (first_borders, second_borders) = self.borders.split(axis);
        let (first_paddings, second_paddings) = self.paddings.split(axis);
        (
            BoxDefinition {
                margins: first_margins,
                borders: first_borders,
                paddings: first_paddings,
                ..*self
            },
            BoxDefinition {
                margins: second_margins,
                borders: second_borders,
                paddings: second_paddings,
                ..*self
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded() -> BoxDefinition {
        let style = StyleSheet::new()
            .with_length(StyleKey::PaddingLeft, RenderLength::points(4.0))
            .with_length(StyleKey::PaddingRight, RenderLength::points(6.0))
            .with_length(StyleKey::PaddingTop, RenderLength::percent(10.0))
            .with_length(StyleKey::BorderLeftWidth, RenderLength::points(1.0));
        BoxDefinition::from_style(&style)
    }

    #[test]
    fn test_insets() {
        let def = padded();
        assert_eq!(def.horizontal_insets(100_000), 11_000);
        assert_eq!(def.vertical_insets(100_000), 10_000);
        assert!(!def.is_empty());
        assert!(BoxDefinition::default().is_empty());
    }

    #[test]
    fn test_horizontal_split_keeps_outer_edges() {
        let (first, second) = padded().split(Axis::Horizontal);
        assert_eq!(first.paddings.left, RenderLength::points(4.0));
        assert_eq!(first.paddings.right, RenderLength::EMPTY);
        assert_eq!(second.paddings.left, RenderLength::EMPTY);
        assert_eq!(second.paddings.right, RenderLength::points(6.0));
        assert_eq!(second.borders.left, RenderLength::EMPTY);
        assert_eq!(first.paddings.top, second.paddings.top);
    }

    #[test]
    fn test_vertical_split() {
        let (first, second) = padded().split(Axis::Vertical);
        assert_eq!(first.paddings.top, RenderLength::percent(10.0));
        assert_eq!(second.paddings.top, RenderLength::EMPTY);
        assert_eq!(first.paddings.left, second.paddings.left);
    }
}
