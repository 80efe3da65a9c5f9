//! Structural edits on boxes and the incremental counters they maintain.

use super::{Attachment, NodeId, RenderTree};
use crate::node_kind::ExtendPolicy;
use crate::LayoutError;
use folio_types::Axis;

/// Counter contribution of one subtree to its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counts {
    descendants: usize,
    content_refs: usize,
    table_refs: usize,
}

impl RenderTree {
    fn counts_of(&self, id: NodeId) -> Result<Counts, LayoutError> {
        let node = self.node(id)?;
        Ok(Counts {
            descendants: node.descendant_count(),
            content_refs: node.content_refs_contribution(),
            table_refs: node.table_refs_contribution(),
        })
    }

    /// Adds `counts` to `start` and every box above it in the child chain.
    fn propagate_added(&mut self, start: NodeId, counts: Counts) -> Result<(), LayoutError> {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.node_mut(id)?;
            current = match node.attachment {
                Attachment::Child(parent) => Some(parent),
                _ => None,
            };
            let b = node.as_box_mut().ok_or(LayoutError::NotABox(id))?;
            b.descendant_count += counts.descendants;
            b.content_ref_count += counts.content_refs;
            b.table_ref_count += counts.table_refs;
        }
        Ok(())
    }

    /// Subtracts `counts` from `start` and every box above it in the child chain.
    fn propagate_removed(&mut self, start: NodeId, counts: Counts) -> Result<(), LayoutError> {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.node_mut(id)?;
            current = match node.attachment {
                Attachment::Child(parent) => Some(parent),
                _ => None,
            };
            let b = node.as_box_mut().ok_or(LayoutError::NotABox(id))?;
            let descendants = b.descendant_count.checked_sub(counts.descendants);
            b.descendant_count = match descendants {
                Some(value) if value >= 1 => value,
                _ => {
                    return Err(LayoutError::CounterUnderflow {
                        node: id,
                        counter: "descendant count",
                    });
                }
            };
            b.content_ref_count = b.content_ref_count.checked_sub(counts.content_refs).ok_or(
                LayoutError::CounterUnderflow {
                    node: id,
                    counter: "content reference count",
                },
            )?;
            b.table_ref_count = b.table_ref_count.checked_sub(counts.table_refs).ok_or(
                LayoutError::CounterUnderflow {
                    node: id,
                    counter: "table reference count",
                },
            )?;
        }
        Ok(())
    }

    /// Fails unless `child` sits in the child chain of `parent`.
    fn ensure_child_of(&self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        if self.node(child)?.attachment != Attachment::Child(parent) {
            return Err(LayoutError::NotAChild { parent, child });
        }
        Ok(())
    }

    /// Fails unless `child` is detached and linking it below `parent` keeps the graph a tree.
    fn ensure_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.render_box(parent)?;
        if self.node(child)?.attachment != Attachment::Detached {
            return Err(LayoutError::AlreadyAttached(child));
        }
        if child == parent || self.ancestors(parent).any(|id| id == child) {
            return Err(LayoutError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Preconditions of every content-adding edit.
    fn ensure_accepts_content(&self, parent: NodeId, child: NodeId, check_nesting: bool) -> Result<(), LayoutError> {
        self.ensure_attachable(parent, child)?;
        if !self.render_box(parent)?.open {
            return Err(LayoutError::BoxClosed(parent));
        }
        if check_nesting && self.config().debug.paranoid_checks {
            let parent_kind = self.node(parent)?.kind;
            let child_kind = self.node(child)?.kind;
            if parent_kind.requires_block_children() && child_kind.is_inline_level() {
                return Err(LayoutError::InvalidNesting {
                    parent: parent_kind.as_str(),
                    child: child_kind.as_str(),
                });
            }
        }
        Ok(())
    }

    /// Links `child` between `prev` and `next` in the chain of `parent` and updates every
    /// derived value. The single insertion path for all edits and for deep derive.
    pub(crate) fn link_between(
        &mut self,
        parent: NodeId,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        child: NodeId,
        touch: bool,
    ) -> Result<(), LayoutError> {
        self.link_clock += 1;
        let clock = self.link_clock;
        {
            let node = self.node_mut(child)?;
            node.prev = prev;
            node.next = next;
            node.attachment = Attachment::Child(parent);
            node.linked_at = clock;
        }
        match prev {
            Some(p) => self.node_mut(p)?.next = Some(child),
            None => self.box_mut(parent)?.first_child = Some(child),
        }
        match next {
            Some(n) => self.node_mut(n)?.prev = Some(child),
            None => self.box_mut(parent)?.last_child = Some(child),
        }
        if self.node(parent)?.frozen {
            self.freeze(child)?;
        }
        let counts = self.counts_of(child)?;
        self.propagate_added(parent, counts)?;
        if touch {
            self.touch(parent)?;
        }
        Ok(())
    }

    pub(super) fn unlink(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        let counts = self.counts_of(child)?;
        let (prev, next) = {
            let node = self.node_mut(child)?;
            let links = (node.prev, node.next);
            node.prev = None;
            node.next = None;
            node.attachment = Attachment::Detached;
            links
        };
        match prev {
            Some(p) => self.node_mut(p)?.next = next,
            None => self.box_mut(parent)?.first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n)?.prev = prev,
            None => self.box_mut(parent)?.last_child = prev,
        }
        self.propagate_removed(parent, counts)?;
        self.touch(parent)
    }

    fn after_structural_edit(&self, parent: NodeId) -> Result<(), LayoutError> {
        if self.config().debug.paranoid_checks {
            self.validate_counters(parent)?;
        }
        Ok(())
    }

    pub(super) fn ensure_unfrozen(&self, id: NodeId) -> Result<(), LayoutError> {
        if self.node(id)?.frozen {
            return Err(LayoutError::Frozen(id));
        }
        Ok(())
    }

    // --- Public edits ---

    /// Appends `child` to the open box `parent`.
    ///
    /// Children of frozen boxes are frozen on insertion.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.ensure_accepts_content(parent, child, true)?;
        let last = self.render_box(parent)?.last_child;
        self.link_between(parent, last, None, child, true)?;
        self.after_structural_edit(parent)
    }

    /// Appends a layout-generated node. Skips the block/inline nesting check.
    pub fn add_generated_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.ensure_accepts_content(parent, child, false)?;
        let last = self.render_box(parent)?.last_child;
        self.link_between(parent, last, None, child, true)?;
        self.after_structural_edit(parent)
    }

    pub fn insert_first(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.ensure_accepts_content(parent, child, true)?;
        let first = self.render_box(parent)?.first_child;
        self.link_between(parent, None, first, child, true)?;
        self.after_structural_edit(parent)
    }

    pub fn insert_after(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.ensure_child_of(parent, anchor)?;
        self.ensure_accepts_content(parent, child, true)?;
        let next = self.node(anchor)?.next;
        self.link_between(parent, Some(anchor), next, child, true)?;
        self.after_structural_edit(parent)
    }

    pub fn insert_before(&mut self, parent: NodeId, anchor: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.ensure_child_of(parent, anchor)?;
        self.ensure_accepts_content(parent, child, true)?;
        let prev = self.node(anchor)?.prev;
        self.link_between(parent, prev, Some(anchor), child, true)?;
        self.after_structural_edit(parent)
    }

    /// Splices `new` into the position of `old`. Replacing a node with itself is a no-op.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<(), LayoutError> {
        self.replace_childs(parent, old, &[new])
    }

    /// Splices `replacements`, in order, into the position of `old`.
    pub fn replace_childs(&mut self, parent: NodeId, old: NodeId, replacements: &[NodeId]) -> Result<(), LayoutError> {
        self.ensure_child_of(parent, old)?;
        if replacements == [old] {
            return Ok(());
        }
        self.ensure_unfrozen(parent)?;
        for (i, replacement) in replacements.iter().enumerate() {
            self.ensure_attachable(parent, *replacement)?;
            if replacements[..i].contains(replacement) {
                return Err(LayoutError::AlreadyAttached(*replacement));
            }
        }

        let (mut prev, next) = {
            let node = self.node(old)?;
            (node.prev, node.next)
        };
        self.unlink(parent, old)?;
        for replacement in replacements {
            self.link_between(parent, prev, next, *replacement, true)?;
            prev = Some(*replacement);
        }
        self.after_structural_edit(parent)
    }

    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<(), LayoutError> {
        self.ensure_child_of(parent, child)?;
        self.ensure_unfrozen(parent)?;
        self.unlink(parent, child)?;
        self.after_structural_edit(parent)
    }

    /// Detaches every child of `parent`. The children stay alive and can be re-attached.
    pub fn clear(&mut self, parent: NodeId) -> Result<Vec<NodeId>, LayoutError> {
        self.ensure_unfrozen(parent)?;
        let children: Vec<NodeId> = self.children(parent).collect();
        for child in &children {
            self.unlink(parent, *child)?;
        }
        self.after_structural_edit(parent)?;
        Ok(children)
    }

    /// Closes the box for further content. One-way; closing twice is an error.
    pub fn close(&mut self, id: NodeId) -> Result<(), LayoutError> {
        self.ensure_unfrozen(id)?;
        let b = self.box_mut(id)?;
        if !b.open {
            return Err(LayoutError::DoubleClose(id));
        }
        b.open = false;
        self.update_change_tracker(id)
    }

    /// Breaks the box in two along `axis`. Returns the empty second half, detached; the
    /// caller inserts it where the continuation belongs.
    pub fn split(&mut self, id: NodeId, axis: Axis) -> Result<NodeId, LayoutError> {
        self.ensure_unfrozen(id)?;
        let (first, second) = self.render_box(id)?.definition.split(axis);
        let sibling = self.derive(id, false)?;
        self.box_mut(id)?.definition = first;
        self.box_mut(sibling)?.definition = second;
        self.touch(id)?;
        Ok(sibling)
    }

    /// Grows `id` because its child `child` grew by `offset`, then lets the growth ripple up.
    ///
    /// Block-policy boxes add the full offset; row-policy boxes only grow until they contain
    /// the child's bottom edge. Returns the growth applied to `id` itself.
    pub fn extend_height(&mut self, id: NodeId, child: NodeId, offset: i64) -> Result<i64, LayoutError> {
        if offset < 0 {
            return Err(LayoutError::NegativeExtension(offset));
        }
        let mut target = id;
        let mut source = child;
        let mut offset = offset;
        let mut first_delta = None;
        loop {
            self.ensure_child_of(target, source)?;
            let delta = {
                let node = self.node(target)?;
                self.render_box(target)?;
                match node.kind.extend_policy() {
                    ExtendPolicy::Block => offset,
                    ExtendPolicy::Row => {
                        let child_node = self.node(source)?;
                        let child_bottom = child_node.bounds.y2();
                        (child_bottom - node.bounds.y2()).max(0).min(offset)
                    }
                }
            };
            first_delta.get_or_insert(delta);
            if delta == 0 {
                break;
            }
            let node = self.unfrozen_mut(target)?;
            node.bounds.height += delta;
            node.overflow_area_height = node.overflow_area_height.max(node.bounds.height);
            match node.attachment {
                Attachment::Child(parent) => {
                    source = target;
                    target = parent;
                    offset = delta;
                }
                _ => break,
            }
        }
        Ok(first_delta.unwrap_or(0))
    }

    // --- Paranoid validation ---

    /// Recounts the subtree of `id` and compares every box's counters with the recount.
    /// Boxes above `id` in the child chain are checked against their direct children.
    pub fn validate_counters(&self, id: NodeId) -> Result<(), LayoutError> {
        self.validate_subtree(id)?;
        let mut current = id;
        while let Attachment::Child(parent) = self.node(current)?.attachment {
            let mut actual = Counts {
                descendants: 1,
                content_refs: 0,
                table_refs: 0,
            };
            for child in self.children(parent) {
                let counts = self.counts_of(child)?;
                actual.descendants += counts.descendants;
                actual.content_refs += counts.content_refs;
                actual.table_refs += counts.table_refs;
            }
            self.check_counts(parent, actual)?;
            current = parent;
        }
        Ok(())
    }

    /// Returns the contribution of `id` to its owner, recomputed from scratch.
    fn validate_subtree(&self, id: NodeId) -> Result<Counts, LayoutError> {
        let node = self.node(id)?;
        if node.as_box().is_none() {
            return Ok(Counts {
                descendants: 1,
                content_refs: node.kind.own_content_refs(),
                table_refs: node.kind.own_table_refs(),
            });
        }
        let mut actual = Counts {
            descendants: 1,
            content_refs: 0,
            table_refs: 0,
        };
        for child in self.children(id) {
            let counts = self.validate_subtree(child)?;
            actual.descendants += counts.descendants;
            actual.content_refs += counts.content_refs;
            actual.table_refs += counts.table_refs;
        }
        self.check_counts(id, actual)?;
        Ok(Counts {
            descendants: actual.descendants,
            content_refs: actual.content_refs + node.kind.own_content_refs(),
            table_refs: actual.table_refs + node.kind.own_table_refs(),
        })
    }

    fn check_counts(&self, id: NodeId, actual: Counts) -> Result<(), LayoutError> {
        let b = self.render_box(id)?;
        let recorded = Counts {
            descendants: b.descendant_count,
            content_refs: b.content_ref_count,
            table_refs: b.table_ref_count,
        };
        if recorded != actual {
            log::warn!(
                "Counter drift on {}: recorded {:?}, actual {:?}",
                id,
                recorded,
                actual
            );
            return Err(LayoutError::CounterDrift {
                node: id,
                recorded: recorded.descendants,
                actual: actual.descendants,
            });
        }
        Ok(())
    }
}
