//! Per-node state: geometry, cache validation state and change tracking.

use super::{CacheState, LeafContent, NodeId, RenderNode, RenderTree};
use crate::LayoutError;
use folio_style::StyleKey;
use folio_types::StrictBounds;

fn non_negative(property: &'static str, value: i64) -> Result<i64, LayoutError> {
    if value < 0 {
        return Err(LayoutError::NegativeDimension { property, value });
    }
    Ok(value)
}

impl RenderTree {
    /// Mutable access for node-local edits; frozen nodes are rejected.
    pub(crate) fn unfrozen_mut(&mut self, id: NodeId) -> Result<&mut RenderNode, LayoutError> {
        let node = self.node_mut(id)?;
        if node.frozen {
            return Err(LayoutError::Frozen(id));
        }
        Ok(node)
    }

    // --- Committed geometry ---

    pub fn set_x(&mut self, id: NodeId, x: i64) -> Result<(), LayoutError> {
        self.unfrozen_mut(id)?.bounds.x = x;
        Ok(())
    }

    pub fn set_y(&mut self, id: NodeId, y: i64) -> Result<(), LayoutError> {
        self.unfrozen_mut(id)?.bounds.y = y;
        Ok(())
    }

    pub fn set_width(&mut self, id: NodeId, width: i64) -> Result<(), LayoutError> {
        let width = non_negative("width", width)?;
        self.unfrozen_mut(id)?.bounds.width = width;
        Ok(())
    }

    pub fn set_height(&mut self, id: NodeId, height: i64) -> Result<(), LayoutError> {
        let height = non_negative("height", height)?;
        self.unfrozen_mut(id)?.bounds.height = height;
        Ok(())
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: StrictBounds) -> Result<(), LayoutError> {
        non_negative("width", bounds.width)?;
        non_negative("height", bounds.height)?;
        self.unfrozen_mut(id)?.bounds = bounds;
        Ok(())
    }

    // --- Speculative geometry ---

    pub fn set_cached_x(&mut self, id: NodeId, x: i64) -> Result<(), LayoutError> {
        self.unfrozen_mut(id)?.cached.x = x;
        Ok(())
    }

    pub fn set_cached_y(&mut self, id: NodeId, y: i64) -> Result<(), LayoutError> {
        self.unfrozen_mut(id)?.cached.y = y;
        Ok(())
    }

    pub fn set_cached_width(&mut self, id: NodeId, width: i64) -> Result<(), LayoutError> {
        let width = non_negative("cached width", width)?;
        self.unfrozen_mut(id)?.cached.width = width;
        Ok(())
    }

    pub fn set_cached_height(&mut self, id: NodeId, height: i64) -> Result<(), LayoutError> {
        let height = non_negative("cached height", height)?;
        self.unfrozen_mut(id)?.cached.height = height;
        Ok(())
    }

    pub fn set_cached_bounds(&mut self, id: NodeId, bounds: StrictBounds) -> Result<(), LayoutError> {
        non_negative("cached width", bounds.width)?;
        non_negative("cached height", bounds.height)?;
        self.unfrozen_mut(id)?.cached = bounds;
        Ok(())
    }

    /// Commits the cached geometry and widens the owner's overflow area to cover this node.
    pub fn apply(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let node = self.unfrozen_mut(id)?;
        node.bounds = node.cached;
        node.overflow_area_width = node.overflow_area_width.max(node.bounds.width);
        node.overflow_area_height = node.overflow_area_height.max(node.bounds.height);
        let bounds = node.bounds;

        let Some(parent) = node.parent() else {
            return Ok(());
        };
        let owner = self.node_mut(parent)?;
        let right = bounds.x2() - owner.bounds.x;
        let bottom = bounds.y2() - owner.bounds.y;
        owner.overflow_area_width = owner.overflow_area_width.max(right);
        owner.overflow_area_height = owner.overflow_area_height.max(bottom);
        Ok(())
    }

    // --- Layout hints ---

    pub fn set_minimum_chunk_width(&mut self, id: NodeId, width: i64) -> Result<(), LayoutError> {
        let width = non_negative("minimum chunk width", width)?;
        self.unfrozen_mut(id)?.minimum_chunk_width = width;
        Ok(())
    }

    pub fn set_maximum_box_width(&mut self, id: NodeId, width: i64) -> Result<(), LayoutError> {
        let width = non_negative("maximum box width", width)?;
        self.unfrozen_mut(id)?.maximum_box_width = width;
        Ok(())
    }

    // --- Change tracking ---

    /// Bumps the change tracker of `id` and of every owner up to the root.
    pub fn update_change_tracker(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node_mut(node_id)?;
            node.change_tracker += 1;
            current = node.parent();
        }
        Ok(())
    }

    /// Raises the cache state of `id`. Clean owners are raised to `Dirty`, walking up until an
    /// owner that was already dirty absorbs the change.
    pub fn mark_cache_dirty(&mut self, id: NodeId, deep: bool) -> Result<(), LayoutError> {
        self.unfrozen_mut(id)?;
        let state = if deep {
            CacheState::DeepDirty
        } else {
            CacheState::Dirty
        };
        self.raise_cache_state(id, state)
    }

    pub(crate) fn raise_cache_state(&mut self, id: NodeId, state: CacheState) -> Result<(), LayoutError> {
        let node = self.node_mut(id)?;
        if node.cache_state < state {
            node.cache_state = state;
        }
        let mut owner = node.parent();
        while let Some(owner_id) = owner {
            let node = self.node_mut(owner_id)?;
            if node.cache_state != CacheState::Clean {
                break;
            }
            node.cache_state = CacheState::Dirty;
            owner = node.parent();
        }
        Ok(())
    }

    pub fn mark_cache_clean(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.unfrozen_mut(id)?.cache_state = CacheState::Clean;
        Ok(())
    }

    /// Records a content change of `id`: bumps the change trackers and dirties the cache.
    pub(crate) fn touch(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.update_change_tracker(id)?;
        self.raise_cache_state(id, CacheState::Dirty)
    }

    // --- Visibility ---

    pub fn is_visible(&self, id: NodeId) -> Result<bool, LayoutError> {
        Ok(self.node(id)?.style.get_bool(StyleKey::Visible))
    }

    /// Tests whether the node paints into `area`. With overflow enabled on an axis the node's
    /// overflow area counts instead of its own extent.
    pub fn is_node_visible_in(
        &self,
        id: NodeId,
        area: &StrictBounds,
        overflow_x: bool,
        overflow_y: bool,
    ) -> Result<bool, LayoutError> {
        let node = self.node(id)?;
        if !node.style.get_bool(StyleKey::Visible) {
            return Ok(false);
        }
        let width = if overflow_x {
            node.bounds.width.max(node.overflow_area_width)
        } else {
            node.bounds.width
        };
        let height = if overflow_y {
            node.bounds.height.max(node.overflow_area_height)
        } else {
            node.bounds.height
        };
        Ok(overlaps(node.bounds.x, width, area.x, area.x2())
            && overlaps(node.bounds.y, height, area.y, area.y2()))
    }

    /// Whether layout may drop the node without changing the output.
    pub fn is_discardable(&self, id: NodeId) -> Result<bool, LayoutError> {
        let node = self.node(id)?;
        if node.attributes.has_extra_content() {
            return Ok(false);
        }
        Ok(match node.leaf() {
            Some(LeafContent::Spacer) => true,
            Some(LeafContent::Text(text)) => text.is_empty(),
            Some(LeafContent::Replaced { .. }) => false,
            None => match node.as_box() {
                Some(b) => {
                    node.kind.own_content_refs() == 0
                        && !matches!(
                            node.kind,
                            crate::NodeKind::LogicalPage | crate::NodeKind::PageArea(_)
                        )
                        && b.is_empty()
                        && b.definition.is_empty()
                }
                None => false,
            },
        })
    }
}

/// One-dimensional overlap of `[start, start + len)` with `[lo, hi)`. Zero-length spans count
/// when they start inside the range.
fn overlaps(start: i64, len: i64, lo: i64, hi: i64) -> bool {
    if len == 0 {
        return start >= lo && start < hi;
    }
    start < hi && start + len > lo
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use crate::{CacheState, LayoutError, NodeKind, RenderTree};
    use folio_style::{AttributeMap, StyleKey, StyleSheet};
    use folio_types::{RenderLength, StrictBounds};
    use std::sync::Arc;

    #[test]
    fn test_clean_parent_above_dirty_child_is_raised() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let leaf = block(&mut tree)?;
        tree.add_child(root, leaf)?;
        tree.mark_cache_clean(root)?;
        assert_eq!(tree.node(leaf)?.cache_state(), CacheState::DeepDirty);

        tree.mark_cache_dirty(leaf, true)?;
        assert_eq!(tree.node(leaf)?.cache_state(), CacheState::DeepDirty);
        assert_eq!(tree.node(root)?.cache_state(), CacheState::Dirty);
        Ok(())
    }

    #[test]
    fn test_dirty_owner_absorbs_the_raise() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let mid = block(&mut tree)?;
        let leaf = block(&mut tree)?;
        tree.add_child(root, mid)?;
        tree.add_child(mid, leaf)?;
        tree.mark_cache_clean(root)?;
        tree.mark_cache_clean(leaf)?;

        // mid is still dirty from creation, so root is never reached
        tree.mark_cache_dirty(leaf, false)?;
        assert_eq!(tree.node(leaf)?.cache_state(), CacheState::Dirty);
        assert_eq!(tree.node(root)?.cache_state(), CacheState::Clean);
        Ok(())
    }

    #[test]
    fn test_visibility_in_area() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let child = block(&mut tree)?;
        tree.add_child(root, child)?;
        tree.set_bounds(root, StrictBounds::new(0, 0, 100, 100))?;
        tree.set_cached_bounds(child, StrictBounds::new(0, 150, 50, 50))?;
        tree.apply(child)?;
        assert_eq!(tree.node(root)?.overflow_area_height(), 200);

        let below = StrictBounds::new(0, 120, 100, 100);
        assert!(!tree.is_node_visible_in(root, &below, false, false)?);
        assert!(!tree.is_node_visible_in(root, &below, true, false)?);
        assert!(tree.is_node_visible_in(root, &below, false, true)?);
        assert!(tree.is_node_visible_in(child, &below, false, false)?);

        // touching edges do not overlap
        let adjacent = StrictBounds::new(100, 0, 10, 10);
        assert!(!tree.is_node_visible_in(root, &adjacent, false, false)?);

        let hidden_style = Arc::new(StyleSheet::new().with_bool(StyleKey::Visible, false));
        let hidden = tree.create_box(NodeKind::Block, hidden_style)?;
        tree.set_bounds(hidden, StrictBounds::new(0, 0, 100, 100))?;
        assert!(!tree.is_visible(hidden)?);
        assert!(!tree.is_node_visible_in(hidden, &StrictBounds::new(0, 0, 10, 10), false, false)?);
        Ok(())
    }

    #[test]
    fn test_zero_length_spans_count_when_inside() -> TestResult {
        let mut tree = RenderTree::new();
        let marker = block(&mut tree)?;
        tree.set_bounds(marker, StrictBounds::new(20, 30, 0, 0))?;

        assert!(tree.is_node_visible_in(marker, &StrictBounds::new(0, 0, 50, 50), false, false)?);
        assert!(tree.is_node_visible_in(marker, &StrictBounds::new(20, 30, 5, 5), false, false)?);
        assert!(!tree.is_node_visible_in(marker, &StrictBounds::new(0, 0, 20, 30), false, false)?);
        Ok(())
    }

    #[test]
    fn test_discardable_nodes() -> TestResult {
        let mut tree = RenderTree::new();
        let spacer = tree.create_spacer(10)?;
        assert!(tree.is_discardable(spacer)?);
        let empty_text = text(&mut tree, "");
        assert!(tree.is_discardable(empty_text)?);
        let word = text(&mut tree, "word");
        assert!(!tree.is_discardable(word)?);
        let image = tree.create_replaced(10, 10, tree.default_style())?;
        assert!(!tree.is_discardable(image)?);

        let empty = block(&mut tree)?;
        assert!(tree.is_discardable(empty)?);

        let anchored = tree.create_box_with_attributes(
            NodeKind::Block,
            tree.default_style(),
            Arc::new(AttributeMap::new().with("core", "anchor", "chapter-1")),
        )?;
        assert!(!tree.is_discardable(anchored)?);
        let linked = tree.create_box_with_attributes(
            NodeKind::Block,
            tree.default_style(),
            Arc::new(AttributeMap::new().with("core", "href-target", "#chapter-1")),
        )?;
        assert!(!tree.is_discardable(linked)?);

        let padded_style = Arc::new(
            StyleSheet::new().with_length(StyleKey::PaddingTop, RenderLength::fixed(2_000)),
        );
        let padded = tree.create_box(NodeKind::Block, padded_style)?;
        assert!(!tree.is_discardable(padded)?);

        let holder = boxed(&mut tree, NodeKind::ContentHolder)?;
        assert!(!tree.is_discardable(holder)?);

        let parent = block(&mut tree)?;
        tree.add_child(parent, spacer)?;
        assert!(!tree.is_discardable(parent)?);
        Ok(())
    }

    #[test]
    fn test_create_box_from_style_picks_layout() -> TestResult {
        let mut tree = RenderTree::new();
        let row_style = Arc::new(StyleSheet::new().with_text(StyleKey::Layout, "Row"));
        let row = tree.create_box_from_style(row_style)?;
        assert_eq!(tree.node(row)?.kind(), NodeKind::Row);

        let table_style = Arc::new(StyleSheet::new().with_text(StyleKey::Layout, " table-cell "));
        let cell = tree.create_box_from_style(table_style)?;
        assert_eq!(tree.node(cell)?.kind(), NodeKind::TableCell);

        let unknown_style = Arc::new(StyleSheet::new().with_text(StyleKey::Layout, "grid"));
        let fallback = tree.create_box_from_style(unknown_style)?;
        assert_eq!(tree.node(fallback)?.kind(), NodeKind::Auto);

        let plain = tree.create_box_from_style(tree.default_style())?;
        assert_eq!(tree.node(plain)?.kind(), NodeKind::Auto);
        assert!(tree.render_box(plain)?.is_open());

        assert!(matches!(
            tree.create_box(NodeKind::Text, tree.default_style()),
            Err(LayoutError::NotABoxKind(_))
        ));
        Ok(())
    }
}
