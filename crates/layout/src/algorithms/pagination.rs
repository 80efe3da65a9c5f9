//! Page-break tests for the nodes of a logical page.

use crate::tree::{NodeId, RenderTree};
use crate::LayoutError;
use folio_style::StyleKey;

impl RenderTree {
    /// Whether `id` is a table box or sits somewhere below one.
    pub fn is_inside_table(&self, id: NodeId) -> Result<bool, LayoutError> {
        if self.node(id)?.kind().is_table_family() {
            return Ok(true);
        }
        for ancestor in self.ancestors(id) {
            if self.node(ancestor)?.kind().is_table_family() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether the committed extent of `id`, moved down by `shift`, straddles a break of `page`.
    pub fn is_node_crossing_pagebreak(&self, page: NodeId, id: NodeId, shift: i64) -> Result<bool, LayoutError> {
        let node = self.node(id)?;
        let breaks = self.page_breaks(page)?;
        Ok(breaks.is_crossing_pagebreak(node.y(), node.height(), shift))
    }

    /// Flow position of `id` when it is pinned `fixed_position` below the header of its page.
    ///
    /// Tables paginate their own rows, so nodes inside a table get `None`.
    pub fn resolve_fixed_position(
        &self,
        page: NodeId,
        id: NodeId,
        fixed_position: i64,
    ) -> Result<Option<i64>, LayoutError> {
        if self.is_inside_table(id)? {
            return Ok(None);
        }
        let node = self.node(id)?;
        let breaks = self.page_breaks(page)?;
        Ok(Some(breaks.compute_fixed_position_in_flow(node.y(), fixed_position)))
    }

    /// Like [`resolve_fixed_position`](Self::resolve_fixed_position), with the offset taken
    /// from the node's style. Percentages resolve against the page height.
    pub fn resolve_styled_fixed_position(&self, page: NodeId, id: NodeId) -> Result<Option<i64>, LayoutError> {
        let fixed = self.node(id)?.style().get_length(StyleKey::FixedPosition);
        if fixed.is_auto() {
            return Ok(None);
        }
        let page_height = self.logical_page(page)?.page_height();
        self.resolve_fixed_position(page, id, fixed.resolve(page_height))
    }

    /// Crossing test that honours a fixed position. Inside tables the plain test applies.
    pub fn is_node_crossing_pagebreak_with_fixed_position(
        &self,
        page: NodeId,
        id: NodeId,
        fixed_position: i64,
    ) -> Result<bool, LayoutError> {
        match self.resolve_fixed_position(page, id, fixed_position)? {
            Some(position) => {
                let height = self.node(id)?.height();
                Ok(self.page_breaks(page)?.is_crossing_pagebreak(position, height, 0))
            }
            None => self.is_node_crossing_pagebreak(page, id, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use crate::{LayoutError, NodeId, NodeKind, RenderTree};
    use folio_style::{StyleKey, StyleSheet};
    use folio_types::{Orientation, PageDefinition, PageFormat, PageMargins, PageSize, RenderLength};
    use std::sync::Arc;

    fn paged_tree() -> Result<(RenderTree, NodeId, NodeId), LayoutError> {
        let mut tree = RenderTree::new();
        let format = PageFormat::new(PageSize::Letter, Orientation::Portrait, PageMargins::default());
        let style = tree.default_style();
        let page = tree.create_logical_page(PageDefinition::single(format)?, style)?;
        let breaks = tree.page_breaks_mut(page)?;
        breaks.add_major_break(800, 50)?;
        breaks.add_major_break(1600, 50)?;
        let content = tree.content_area(page)?;
        Ok((tree, page, content))
    }

    #[test]
    fn test_node_crossing() -> TestResult {
        let (mut tree, page, content) = paged_tree()?;
        let band = block(&mut tree)?;
        tree.add_child(content, band)?;
        tree.set_y(band, 700)?;
        tree.set_height(band, 200)?;
        assert!(tree.is_node_crossing_pagebreak(page, band, 0)?);
        assert!(!tree.is_node_crossing_pagebreak(page, band, 100)?);

        tree.set_height(band, 0)?;
        assert!(!tree.is_node_crossing_pagebreak(page, band, 0)?);
        Ok(())
    }

    #[test]
    fn test_fixed_position_outside_tables() -> TestResult {
        let (mut tree, page, content) = paged_tree()?;
        let band = block(&mut tree)?;
        tree.add_child(content, band)?;
        tree.set_y(band, 810)?;
        tree.set_height(band, 700)?;
        assert_eq!(tree.resolve_fixed_position(page, band, 100)?, Some(950));
        assert!(tree.is_node_crossing_pagebreak_with_fixed_position(page, band, 100)?);
        assert!(!tree.is_node_crossing_pagebreak_with_fixed_position(page, band, 0)?);
        Ok(())
    }

    #[test]
    fn test_fixed_position_never_applies_in_tables() -> TestResult {
        let (mut tree, page, content) = paged_tree()?;
        let table = boxed(&mut tree, NodeKind::Table)?;
        let row = boxed(&mut tree, NodeKind::TableRow)?;
        let cell = boxed(&mut tree, NodeKind::TableCell)?;
        tree.add_child(content, table)?;
        tree.add_child(table, row)?;
        tree.add_child(row, cell)?;
        tree.set_y(cell, 810)?;
        tree.set_height(cell, 700)?;

        assert!(tree.is_inside_table(cell)?);
        assert!(!tree.is_inside_table(content)?);
        assert_eq!(tree.resolve_fixed_position(page, cell, 100)?, None);
        assert!(!tree.is_node_crossing_pagebreak_with_fixed_position(page, cell, 100)?);
        Ok(())
    }

    #[test]
    fn test_styled_fixed_position() -> TestResult {
        let (mut tree, page, content) = paged_tree()?;
        let style = Arc::new(StyleSheet::new().with_length(StyleKey::FixedPosition, RenderLength::fixed(100)));
        let pinned = tree.create_box(NodeKind::Block, style)?;
        let floating = block(&mut tree)?;
        tree.add_child(content, pinned)?;
        tree.add_child(content, floating)?;
        tree.set_y(pinned, 810)?;
        assert_eq!(tree.resolve_styled_fixed_position(page, pinned)?, Some(950));
        assert_eq!(tree.resolve_styled_fixed_position(page, floating)?, None);
        Ok(())
    }
}
