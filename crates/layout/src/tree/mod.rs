//! The render-node arena.
//!
//! Nodes live in generational slots and refer to each other through [`NodeId`] handles, so the
//! parent/child/sibling relations are plain fields instead of owning pointers. All mutation goes
//! through [`RenderTree`] because nearly every edit has to propagate counters, change trackers
//! or cache state to the ancestors.

mod box_ops;
mod node;
mod node_ops;
mod snapshot;

pub use node::{
    Attachment, BoxSnapshot, CacheState, LeafContent, NodeId, RenderBox, RenderNode,
};

pub(crate) use node::NodeContent;

use crate::box_definition::BoxDefinition;
use crate::config::LayoutConfig;
use crate::node_kind::NodeKind;
use crate::LayoutError;
use folio_style::{AttributeMap, StyleSheet};
use folio_types::{InstanceId, InstanceIdGenerator};
use std::sync::Arc;

pub struct RenderTree {
    nodes: Vec<Option<RenderNode>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    /// Incremented on every link; orders insertions against commit snapshots.
    link_clock: u64,
    ids: InstanceIdGenerator,
    config: LayoutConfig,
    default_style: Arc<StyleSheet>,
    empty_attributes: Arc<AttributeMap>,
}

impl std::fmt::Debug for RenderTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTree")
            .field("nodes_total", &self.nodes.len())
            .field("nodes_alive", &self.len())
            .field("free_list", &self.free_list.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RenderTree {
    fn default() -> Self {
        Self::with_config(LayoutConfig::default())
    }
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            link_clock: 0,
            ids: InstanceIdGenerator::new(),
            config,
            default_style: Arc::new(StyleSheet::default()),
            empty_attributes: Arc::new(AttributeMap::default()),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn default_style(&self) -> Arc<StyleSheet> {
        Arc::clone(&self.default_style)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    // --- Construction ---

    pub fn create_text(&mut self, text: &str, style: Arc<StyleSheet>) -> NodeId {
        self.create_leaf(NodeKind::Text, LeafContent::Text(text.into()), style)
    }

    pub fn create_spacer(&mut self, width: i64) -> Result<NodeId, LayoutError> {
        if width < 0 {
            return Err(LayoutError::NegativeDimension {
                property: "width",
                value: width,
            });
        }
        let style = self.default_style();
        let id = self.create_leaf(NodeKind::Spacer, LeafContent::Spacer, style);
        let node = self.node_mut(id)?;
        node.bounds.width = width;
        node.cached.width = width;
        Ok(id)
    }

    pub fn create_replaced(
        &mut self,
        intrinsic_width: i64,
        intrinsic_height: i64,
        style: Arc<StyleSheet>,
    ) -> Result<NodeId, LayoutError> {
        if intrinsic_width < 0 || intrinsic_height < 0 {
            return Err(LayoutError::NegativeDimension {
                property: "intrinsic size",
                value: intrinsic_width.min(intrinsic_height),
            });
        }
        Ok(self.create_leaf(
            NodeKind::Replaced,
            LeafContent::Replaced {
                intrinsic_width,
                intrinsic_height,
            },
            style,
        ))
    }

    fn create_leaf(&mut self, kind: NodeKind, leaf: LeafContent, style: Arc<StyleSheet>) -> NodeId {
        let instance_id = self.ids.next_id();
        let attributes = Arc::clone(&self.empty_attributes);
        self.alloc(RenderNode::new(
            kind,
            instance_id,
            style,
            attributes,
            NodeContent::Leaf(leaf),
        ))
    }

    pub fn create_box(&mut self, kind: NodeKind, style: Arc<StyleSheet>) -> Result<NodeId, LayoutError> {
        let attributes = Arc::clone(&self.empty_attributes);
        self.create_box_with_attributes(kind, style, attributes)
    }

    /// Creates an open, childless box. The box definition is taken from `style`.
    pub fn create_box_with_attributes(
        &mut self,
        kind: NodeKind,
        style: Arc<StyleSheet>,
        attributes: Arc<AttributeMap>,
    ) -> Result<NodeId, LayoutError> {
        if !kind.is_box() {
            return Err(LayoutError::NotABoxKind(kind.as_str()));
        }
        let definition = BoxDefinition::from_style(&style);
        let instance_id = self.ids.next_id();
        Ok(self.alloc(RenderNode::new(
            kind,
            instance_id,
            style,
            attributes,
            NodeContent::Composite(Box::new(RenderBox::new(definition))),
        )))
    }

    /// Creates a box whose kind is chosen by the style sheet's `layout` key,
    /// falling back to `Auto`.
    pub fn create_box_from_style(&mut self, style: Arc<StyleSheet>) -> Result<NodeId, LayoutError> {
        let kind = style
            .get_text(folio_style::StyleKey::Layout)
            .and_then(NodeKind::from_layout)
            .unwrap_or(NodeKind::Auto);
        self.create_box(kind, style)
    }

    // --- Slot management ---

    pub(crate) fn alloc(&mut self, node: RenderNode) -> NodeId {
        if let Some(index) = self.free_list.pop() {
            self.nodes[index] = Some(node);
            NodeId {
                index: index as u32,
                generation: self.generations[index],
            }
        } else {
            let index = self.nodes.len();
            self.nodes.push(Some(node));
            self.generations.push(0);
            NodeId {
                index: index as u32,
                generation: 0,
            }
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&RenderNode, LayoutError> {
        let index = id.index as usize;
        match (self.nodes.get(index), self.generations.get(index)) {
            (Some(Some(node)), Some(generation)) if *generation == id.generation => Ok(node),
            _ => Err(LayoutError::InvalidNode(id)),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut RenderNode, LayoutError> {
        let index = id.index as usize;
        match (self.nodes.get_mut(index), self.generations.get(index)) {
            (Some(Some(node)), Some(generation)) if *generation == id.generation => Ok(node),
            _ => Err(LayoutError::InvalidNode(id)),
        }
    }

    pub fn render_box(&self, id: NodeId) -> Result<&RenderBox, LayoutError> {
        self.node(id)?.as_box().ok_or(LayoutError::NotABox(id))
    }

    pub(crate) fn box_mut(&mut self, id: NodeId) -> Result<&mut RenderBox, LayoutError> {
        self.node_mut(id)?.as_box_mut().ok_or(LayoutError::NotABox(id))
    }

    /// Releases the slots of a detached subtree, page areas and saved snapshots included.
    ///
    /// Handles into the subtree become stale and fail with [`LayoutError::InvalidNode`].
    pub fn discard(&mut self, id: NodeId) -> Result<(), LayoutError> {
        if self.node(id)?.attachment != Attachment::Detached {
            return Err(LayoutError::StillAttached(id));
        }
        let mut stack = vec![id];
        let mut released = 0usize;
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            if let Some(b) = node.as_box() {
                stack.extend(self.children(current));
                if let Some(page) = b.logical_page() {
                    stack.extend(page.owned_nodes());
                }
            }
            let index = current.index as usize;
            self.nodes[index] = None;
            self.generations[index] = self.generations[index].wrapping_add(1);
            self.free_list.push(index);
            released += 1;
        }
        log::trace!("Discarded subtree {} ({} nodes)", id, released);
        Ok(())
    }

    // --- Traversal ---

    /// Iterates the child chain of `id`. Empty for leaves and stale handles.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self
            .node(id)
            .ok()
            .and_then(RenderNode::as_box)
            .and_then(RenderBox::first_child);
        Children { tree: self, next }
    }

    /// Iterates the owners of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        let next = self.node(id).ok().and_then(RenderNode::parent);
        Ancestors { tree: self, next }
    }

    /// Pre-order walk of the subtree rooted at `id` (root included, page areas excluded).
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Descendants { tree: self, stack }
    }

    /// Finds the node with the given stable identity inside the subtree rooted at `root`.
    pub fn find_by_instance_id(&self, root: NodeId, instance_id: InstanceId) -> Option<NodeId> {
        self.descendants(root).find(|id| {
            self.node(*id)
                .map(|node| node.instance_id == instance_id)
                .unwrap_or(false)
        })
    }

    /// Counts the subtree of `id` by walking it.
    pub fn count_descendants(&self, id: NodeId) -> usize {
        self.descendants(id).count()
    }
}

pub struct Children<'a> {
    tree: &'a RenderTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).ok().and_then(|n| n.next);
        Some(current)
    }
}

pub struct Ancestors<'a> {
    tree: &'a RenderTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).ok().and_then(RenderNode::parent);
        Some(current)
    }
}

pub struct Descendants<'a> {
    tree: &'a RenderTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.tree.children(current));
        // keep document order: first child on top of the stack
        self.stack[start..].reverse();
        Some(current)
    }
}
