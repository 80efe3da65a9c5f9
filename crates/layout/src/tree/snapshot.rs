//! Derive, freeze and the mark/commit/rollback protocol used for speculative pagination.

use super::{Attachment, BoxSnapshot, CacheState, NodeId, RenderBox, RenderTree};
use crate::page::LogicalPageData;
use crate::LayoutError;

impl RenderTree {
    /// Produces a disconnected copy of `id` with the same instance id.
    ///
    /// A shallow derive yields a childless copy with counters reset to the single-node
    /// baseline. A deep derive copies the whole subtree and rebuilds the counters through the
    /// regular linking path. Logical pages always take deep copies of their page areas and
    /// saved snapshots along.
    pub fn derive(&mut self, id: NodeId, deep: bool) -> Result<NodeId, LayoutError> {
        let copy = self.derive_subtree(id, deep)?;
        if deep && self.config().debug.paranoid_checks {
            self.validate_counters(copy)?;
        }
        log::debug!("Derived {} from {} (deep: {})", copy, id, deep);
        Ok(copy)
    }

    /// Like [`derive`](Self::derive), but the copy is frozen before it is returned.
    pub fn derive_frozen(&mut self, id: NodeId, deep: bool) -> Result<NodeId, LayoutError> {
        let copy = self.derive(id, deep)?;
        self.freeze(copy)?;
        Ok(copy)
    }

    fn derive_subtree(&mut self, id: NodeId, deep: bool) -> Result<NodeId, LayoutError> {
        let record = self.node(id)?.derive_record();
        let copy = self.alloc(record);

        if deep {
            let children: Vec<NodeId> = self.children(id).collect();
            let mut prev = None;
            for child in children {
                let child_copy = self.derive_subtree(child, true)?;
                self.link_between(copy, prev, None, child_copy, false)?;
                // the copy keeps the original's place relative to commit snapshots
                self.node_mut(child_copy)?.linked_at = self.node(child)?.linked_at;
                prev = Some(child_copy);
            }
        }

        let page = self
            .node(id)?
            .as_box()
            .and_then(RenderBox::logical_page)
            .cloned();
        if let Some(page) = page {
            let areas = page
                .areas
                .try_map(|area| self.derive_page_area(area, copy, false))?;
            let saved = match page.saved {
                Some(saved) => Some(saved.try_map(|area| self.derive_page_area(area, copy, true))?),
                None => None,
            };
            self.box_mut(copy)?.page = Some(Box::new(LogicalPageData {
                areas,
                saved,
                ..page
            }));
        }
        Ok(copy)
    }

    /// Deep-copies a page area and hands it to the logical page `owner`.
    pub(crate) fn derive_page_area(
        &mut self,
        area: NodeId,
        owner: NodeId,
        frozen: bool,
    ) -> Result<NodeId, LayoutError> {
        let copy = self.derive_subtree(area, true)?;
        self.node_mut(copy)?.attachment = Attachment::PageArea(owner);
        if frozen {
            self.freeze(copy)?;
        }
        Ok(copy)
    }

    /// Makes `id` and everything below it, page areas included, permanently read-only.
    pub fn freeze(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            // subtrees of frozen nodes are frozen already
            if node.frozen {
                continue;
            }
            if let Some(b) = node.as_box() {
                if let Some(page) = b.logical_page() {
                    stack.extend(page.owned_nodes());
                }
                stack.extend(self.children(current));
            }
            self.node_mut(current)?.frozen = true;
        }
        log::trace!("Froze {}", id);
        Ok(())
    }

    // --- Mark / commit / rollback ---

    fn unfrozen_box_mut(&mut self, id: NodeId) -> Result<&mut RenderBox, LayoutError> {
        self.unfrozen_mut(id)?
            .as_box_mut()
            .ok_or(LayoutError::NotABox(id))
    }

    /// Records the current open, reference and pin state as the marked snapshot.
    pub fn mark_box_seen(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let structure_mark = self.link_clock;
        let b = self.unfrozen_box_mut(id)?;
        b.marked = BoxSnapshot {
            open: b.open,
            seen: true,
            content_refs: b.content_ref_count,
            pinned: b.pinned,
            structure_mark,
        };
        Ok(())
    }

    /// Promotes the marked snapshot to the applied baseline that rollbacks return to.
    pub fn commit(&mut self, id: NodeId) -> Result<(), LayoutError> {
        let b = self.unfrozen_box_mut(id)?;
        b.applied = b.marked;
        Ok(())
    }

    /// Returns `id` to its applied baseline and dirties its cache.
    ///
    /// Everything linked into the subtree after the last commit is detached, which brings the
    /// content reference count back to the committed value. The open flag and pin are restored
    /// from the snapshot. Returns the detached nodes; they stay alive until discarded. A box
    /// that was never committed keeps its children.
    pub fn rollback(&mut self, id: NodeId, deep_dirty: bool) -> Result<Vec<NodeId>, LayoutError> {
        let applied = self.unfrozen_box_mut(id)?.applied;
        let speculative = if applied.seen {
            self.linked_since(id, applied.structure_mark)?
        } else {
            Vec::new()
        };
        for node in &speculative {
            let attachment = self.node(*node)?.attachment;
            if let Attachment::Child(parent) = attachment {
                self.ensure_unfrozen(parent)?;
                self.unlink(parent, *node)?;
            }
        }

        let b = self.unfrozen_box_mut(id)?;
        b.open = applied.open;
        b.pinned = applied.pinned;
        b.marked = applied;
        if b.content_ref_count != applied.content_refs {
            // removed content is owned by the caller and cannot be re-attached
            log::debug!(
                "Rollback of {} ends with {} content references, {} were applied",
                id,
                b.content_ref_count,
                applied.content_refs
            );
        }
        let state = if deep_dirty {
            CacheState::DeepDirty
        } else {
            CacheState::Dirty
        };
        self.update_change_tracker(id)?;
        self.raise_cache_state(id, state)?;
        log::debug!(
            "Rolled back {} (deep dirty: {}, detached {})",
            id,
            deep_dirty,
            speculative.len()
        );
        Ok(speculative)
    }

    /// Topmost nodes below `id` that were linked after `mark`.
    fn linked_since(&self, id: NodeId, mark: u64) -> Result<Vec<NodeId>, LayoutError> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            if node.linked_at > mark {
                found.push(current);
            } else if node.is_box() {
                stack.extend(self.children(current));
            }
        }
        Ok(found)
    }

    pub fn is_committed(&self, id: NodeId) -> Result<bool, LayoutError> {
        Ok(self.render_box(id)?.is_committed())
    }

    /// Pins the box to the flow position where it was first placed on a page.
    ///
    /// Returns `false` if the box was pinned before; the first position wins.
    pub fn pin(&mut self, id: NodeId, position: i64) -> Result<bool, LayoutError> {
        let b = self.unfrozen_box_mut(id)?;
        if b.pinned.is_some() {
            return Ok(false);
        }
        b.pinned = Some(position);
        Ok(true)
    }

    fn boxes_below(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|d| self.node(*d).map(|n| n.is_box()).unwrap_or(false))
            .collect()
    }

    pub fn mark_seen_deep(&mut self, id: NodeId) -> Result<(), LayoutError> {
        for b in self.boxes_below(id) {
            self.mark_box_seen(b)?;
        }
        Ok(())
    }

    pub fn commit_deep(&mut self, id: NodeId) -> Result<(), LayoutError> {
        for b in self.boxes_below(id) {
            self.commit(b)?;
        }
        Ok(())
    }

    /// Rolls back `id` first, then every box that is still below it.
    pub fn rollback_deep(&mut self, id: NodeId, deep_dirty: bool) -> Result<Vec<NodeId>, LayoutError> {
        let mut detached = self.rollback(id, deep_dirty)?;
        for b in self.boxes_below(id).into_iter().skip(1) {
            detached.extend(self.rollback(b, deep_dirty)?);
        }
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use crate::{CacheState, LayoutConfig, LayoutError, NodeKind, RenderTree};

    #[test]
    fn test_deep_derive_leaves_original_untouched() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let a = block(&mut tree)?;
        let para = boxed(&mut tree, NodeKind::Paragraph)?;
        let run = text(&mut tree, "hello");
        tree.add_child(root, a)?;
        tree.add_child(root, para)?;
        tree.add_child(para, run)?;
        tree.set_height(root, 300)?;

        let copy = tree.derive(root, true)?;
        assert_eq!(tree.node(copy)?.parent(), None);
        assert_eq!(tree.node(copy)?.instance_id(), tree.node(root)?.instance_id());
        assert_eq!(tree.render_box(copy)?.descendant_count(), 4);
        assert_eq!(tree.node(copy)?.height(), 300);

        let copied: Vec<_> = tree.children(copy).collect();
        assert_eq!(copied.len(), 2);
        assert!(!copied.contains(&a));

        let extra = block(&mut tree)?;
        tree.add_child(copy, extra)?;
        tree.set_height(copy, 10)?;
        let copied_run = tree.children(copied[1]).next().ok_or("missing child")?;
        tree.remove(copied[1], copied_run)?;

        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, para]);
        assert_eq!(tree.render_box(root)?.descendant_count(), 4);
        assert_eq!(tree.node(root)?.height(), 300);
        assert_eq!(tree.children(para).collect::<Vec<_>>(), vec![run]);
        Ok(())
    }

    #[test]
    fn test_shallow_derive_resets_counters() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let holder = boxed(&mut tree, NodeKind::ContentHolder)?;
        tree.add_child(root, holder)?;

        let copy = tree.derive(root, false)?;
        let b = tree.render_box(copy)?;
        assert!(b.is_empty());
        assert_eq!(b.descendant_count(), 1);
        assert_eq!(b.content_ref_count(), 0);
        assert_eq!(b.table_ref_count(), 0);
        Ok(())
    }

    #[test]
    fn test_derive_frozen_rejects_mutation() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let child = block(&mut tree)?;
        tree.add_child(root, child)?;

        let frozen = tree.derive_frozen(root, true)?;
        assert!(tree.node(frozen)?.is_frozen());
        let frozen_child = tree.children(frozen).next().ok_or("missing child")?;
        assert!(tree.node(frozen_child)?.is_frozen());
        assert!(!tree.node(root)?.is_frozen());
        assert!(matches!(tree.set_height(frozen_child, 5), Err(LayoutError::Frozen(_))));
        assert!(matches!(tree.mark_box_seen(frozen), Err(LayoutError::Frozen(_))));
        assert!(matches!(tree.close(frozen), Err(LayoutError::Frozen(_))));

        // deriving from a frozen copy yields a mutable one again
        let thawed = tree.derive(frozen, true)?;
        tree.set_height(thawed, 5)?;
        Ok(())
    }

    #[test]
    fn test_rollback_restores_committed_state() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        tree.mark_box_seen(root)?;
        tree.commit(root)?;
        let committed = tree.render_box(root)?.applied_state();

        tree.mark_box_seen(root)?;
        tree.close(root)?;
        assert!(tree.pin(root, 1200)?);
        tree.mark_box_seen(root)?;
        assert!(!tree.render_box(root)?.is_open_flag());

        tree.rollback(root, false)?;
        let b = tree.render_box(root)?;
        assert!(b.is_open_flag());
        assert_eq!(b.pinned(), None);
        assert_eq!(b.marked_state(), committed);
        assert_eq!(tree.node(root)?.cache_state(), CacheState::DeepDirty);
        Ok(())
    }

    #[test]
    fn test_rollback_restores_content_references() -> TestResult {
        init_logger();
        let mut tree = RenderTree::with_config(LayoutConfig::paranoid());
        let root = block(&mut tree)?;
        let kept = block(&mut tree)?;
        tree.add_child(root, kept)?;
        tree.mark_box_seen(root)?;
        tree.commit(root)?;
        let committed = tree.render_box(root)?.applied_state();

        tree.mark_box_seen(root)?;
        let holder = boxed(&mut tree, NodeKind::ContentHolder)?;
        let nested = boxed(&mut tree, NodeKind::ContentHolder)?;
        tree.add_child(root, holder)?;
        tree.add_child(kept, nested)?;
        assert_eq!(tree.render_box(root)?.content_ref_count(), 2);
        assert!(tree.render_box(root)?.is_open());

        let detached = tree.rollback(root, false)?;
        assert_eq!(detached.len(), 2);
        assert!(detached.contains(&holder) && detached.contains(&nested));
        let b = tree.render_box(root)?;
        assert_eq!(b.content_ref_count(), committed.content_refs);
        assert_eq!(b.descendant_count(), 2);
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![kept]);
        assert!(tree.render_box(kept)?.is_empty());
        assert_eq!(tree.node(holder)?.parent(), None);
        tree.validate_counters(root)?;
        Ok(())
    }

    #[test]
    fn test_rollback_keeps_committed_and_derived_children() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let holder = boxed(&mut tree, NodeKind::ContentHolder)?;
        tree.add_child(root, holder)?;

        // never committed: nothing to return to
        assert!(tree.rollback(root, false)?.is_empty());
        assert_eq!(tree.render_box(root)?.content_ref_count(), 1);

        tree.mark_box_seen(root)?;
        tree.commit(root)?;
        let copy = tree.derive(root, true)?;
        assert!(tree.rollback(copy, false)?.is_empty());
        assert_eq!(tree.render_box(copy)?.content_ref_count(), 1);
        assert_eq!(tree.render_box(copy)?.descendant_count(), 2);
        Ok(())
    }

    #[test]
    fn test_rollback_marks_cache_dirty() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let child = block(&mut tree)?;
        tree.add_child(root, child)?;
        tree.mark_cache_clean(root)?;
        tree.mark_cache_clean(child)?;

        tree.rollback(child, false)?;
        assert_eq!(tree.node(child)?.cache_state(), CacheState::Dirty);
        assert_eq!(tree.node(root)?.cache_state(), CacheState::Dirty);

        tree.mark_cache_clean(root)?;
        tree.mark_cache_clean(child)?;
        tree.rollback(child, true)?;
        assert_eq!(tree.node(child)?.cache_state(), CacheState::DeepDirty);
        assert_eq!(tree.node(root)?.cache_state(), CacheState::Dirty);
        Ok(())
    }

    #[test]
    fn test_committed_requires_closed_seen_and_resolved() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let holder = boxed(&mut tree, NodeKind::ContentHolder)?;
        tree.add_child(root, holder)?;
        tree.close(root)?;
        tree.mark_box_seen(root)?;
        tree.commit(root)?;
        assert!(!tree.is_committed(root)?);

        tree.remove(root, holder)?;
        tree.mark_box_seen(root)?;
        tree.commit(root)?;
        assert!(tree.is_committed(root)?);
        Ok(())
    }

    #[test]
    fn test_pin_keeps_first_position() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        assert!(tree.pin(root, 400)?);
        assert!(!tree.pin(root, 800)?);
        assert_eq!(tree.render_box(root)?.pinned(), Some(400));
        Ok(())
    }

    #[test]
    fn test_deep_protocol_covers_every_box() -> TestResult {
        let mut tree = RenderTree::new();
        let root = block(&mut tree)?;
        let child = block(&mut tree)?;
        let para = boxed(&mut tree, NodeKind::Paragraph)?;
        let run = text(&mut tree, "abc");
        tree.add_child(root, child)?;
        tree.add_child(child, para)?;
        tree.add_child(para, run)?;

        tree.close(para)?;
        tree.mark_seen_deep(root)?;
        tree.commit_deep(root)?;
        for id in [root, child, para] {
            assert!(tree.render_box(id)?.applied_state().seen);
        }
        assert!(tree.is_committed(para)?);
        assert!(!tree.is_committed(root)?);

        tree.pin(child, 50)?;
        tree.rollback_deep(root, false)?;
        assert_eq!(tree.render_box(child)?.pinned(), None);
        Ok(())
    }
}
