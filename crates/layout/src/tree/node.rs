//! Node records stored in the [`RenderTree`](super::RenderTree) arena.

use crate::box_definition::BoxDefinition;
use crate::node_kind::NodeKind;
use crate::page::LogicalPageData;
use folio_style::{AttributeMap, StyleSheet};
use folio_types::{InstanceId, StrictBounds};
use std::fmt;
use std::sync::Arc;

/// Generational handle of a node in a [`RenderTree`](super::RenderTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Validation state of a node's cached layout results.
///
/// Ordered as a lattice: `Clean < Dirty < DeepDirty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum CacheState {
    #[default]
    Clean,
    Dirty,
    DeepDirty,
}

/// How a node is held by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attachment {
    #[default]
    Detached,
    /// A member of the owner's child chain.
    Child(NodeId),
    /// One of the fixed sub-areas of a logical page. Not part of the child chain and not
    /// counted in the page's descendant counters.
    PageArea(NodeId),
}

impl Attachment {
    pub fn owner(&self) -> Option<NodeId> {
        match self {
            Attachment::Detached => None,
            Attachment::Child(owner) | Attachment::PageArea(owner) => Some(*owner),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafContent {
    Text(Arc<str>),
    Spacer,
    Replaced {
        intrinsic_width: i64,
        intrinsic_height: i64,
    },
}

/// The open/seen/reference/pin state captured by `mark_box_seen` and promoted by `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSnapshot {
    pub open: bool,
    pub seen: bool,
    pub content_refs: usize,
    pub pinned: Option<i64>,
    /// Link clock of the tree when the snapshot was taken. Nodes linked later are
    /// speculative content.
    pub structure_mark: u64,
}

impl Default for BoxSnapshot {
    fn default() -> Self {
        Self {
            open: true,
            seen: false,
            content_refs: 0,
            pinned: None,
            structure_mark: 0,
        }
    }
}

/// Composite state of a box node.
#[derive(Debug, Clone)]
pub struct RenderBox {
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) descendant_count: usize,
    pub(crate) content_ref_count: usize,
    pub(crate) table_ref_count: usize,
    pub(crate) open: bool,
    pub(crate) pinned: Option<i64>,
    pub(crate) marked: BoxSnapshot,
    pub(crate) applied: BoxSnapshot,
    pub(crate) definition: BoxDefinition,
    pub(crate) page: Option<Box<LogicalPageData>>,
}

impl RenderBox {
    pub(crate) fn new(definition: BoxDefinition) -> Self {
        Self {
            first_child: None,
            last_child: None,
            descendant_count: 1,
            content_ref_count: 0,
            table_ref_count: 0,
            open: true,
            pinned: None,
            marked: BoxSnapshot::default(),
            applied: BoxSnapshot::default(),
            definition,
            page: None,
        }
    }

    /// The record of a freshly derived, childless copy.
    ///
    /// Every field is listed: adding a field to `RenderBox` must decide here whether derive
    /// copies or resets it.
    pub(crate) fn derive_empty(&self) -> Self {
        Self {
            first_child: None,
            last_child: None,
            descendant_count: 1,
            content_ref_count: 0,
            table_ref_count: 0,
            open: self.open,
            pinned: self.pinned,
            marked: self.marked,
            applied: self.applied,
            definition: self.definition,
            // rebuilt by the tree, the page areas need fresh handles
            page: None,
        }
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    /// Number of nodes in this subtree, the box itself included.
    pub fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    pub fn content_ref_count(&self) -> usize {
        self.content_ref_count
    }

    pub fn table_ref_count(&self) -> usize {
        self.table_ref_count
    }

    /// Logically open: not yet closed, or waiting on unresolved content holders.
    pub fn is_open(&self) -> bool {
        self.open || self.content_ref_count > 0
    }

    /// The raw open flag, ignoring pending content references.
    pub fn is_open_flag(&self) -> bool {
        self.open
    }

    pub fn pinned(&self) -> Option<i64> {
        self.pinned
    }

    pub fn marked_state(&self) -> BoxSnapshot {
        self.marked
    }

    pub fn applied_state(&self) -> BoxSnapshot {
        self.applied
    }

    /// Nothing left that a rollback would have to undo.
    pub fn is_committed(&self) -> bool {
        !self.applied.open && self.applied.seen && self.applied.content_refs == 0
    }

    pub fn definition(&self) -> &BoxDefinition {
        &self.definition
    }

    pub fn logical_page(&self) -> Option<&LogicalPageData> {
        self.page.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.first_child.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeContent {
    Leaf(LeafContent),
    Composite(Box<RenderBox>),
}

/// One positioned, sizeable unit of the layout tree.
#[derive(Debug, Clone)]
pub struct RenderNode {
    pub(crate) kind: NodeKind,
    pub(crate) instance_id: InstanceId,
    pub(crate) style: Arc<StyleSheet>,
    pub(crate) attributes: Arc<AttributeMap>,
    pub(crate) attachment: Attachment,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) linked_at: u64,
    pub(crate) bounds: StrictBounds,
    pub(crate) cached: StrictBounds,
    pub(crate) overflow_area_width: i64,
    pub(crate) overflow_area_height: i64,
    pub(crate) change_tracker: u64,
    pub(crate) cache_state: CacheState,
    pub(crate) frozen: bool,
    pub(crate) minimum_chunk_width: i64,
    pub(crate) maximum_box_width: i64,
    pub(crate) content: NodeContent,
}

impl RenderNode {
    pub(crate) fn new(
        kind: NodeKind,
        instance_id: InstanceId,
        style: Arc<StyleSheet>,
        attributes: Arc<AttributeMap>,
        content: NodeContent,
    ) -> Self {
        Self {
            kind,
            instance_id,
            style,
            attributes,
            attachment: Attachment::Detached,
            prev: None,
            next: None,
            linked_at: 0,
            bounds: StrictBounds::default(),
            cached: StrictBounds::default(),
            overflow_area_width: 0,
            overflow_area_height: 0,
            change_tracker: 0,
            cache_state: CacheState::DeepDirty,
            frozen: false,
            minimum_chunk_width: 0,
            maximum_box_width: 0,
            content,
        }
    }

    /// The record of a disconnected copy, children excluded.
    ///
    /// Like [`RenderBox::derive_empty`], every field is spelled out so that a new field cannot
    /// silently inherit the wrong derive behaviour.
    pub(crate) fn derive_record(&self) -> Self {
        Self {
            kind: self.kind,
            instance_id: self.instance_id,
            style: Arc::clone(&self.style),
            attributes: Arc::clone(&self.attributes),
            attachment: Attachment::Detached,
            prev: None,
            next: None,
            linked_at: self.linked_at,
            bounds: self.bounds,
            cached: self.cached,
            overflow_area_width: self.overflow_area_width,
            overflow_area_height: self.overflow_area_height,
            change_tracker: self.change_tracker,
            cache_state: self.cache_state,
            frozen: false,
            minimum_chunk_width: self.minimum_chunk_width,
            maximum_box_width: self.maximum_box_width,
            content: match &self.content {
                NodeContent::Leaf(leaf) => NodeContent::Leaf(leaf.clone()),
                NodeContent::Composite(b) => NodeContent::Composite(Box::new(b.derive_empty())),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn style(&self) -> &Arc<StyleSheet> {
        &self.style
    }

    pub fn attributes(&self) -> &Arc<AttributeMap> {
        &self.attributes
    }

    pub fn attachment(&self) -> Attachment {
        self.attachment
    }

    /// Owning box: the parent for regular children, the logical page for page areas.
    pub fn parent(&self) -> Option<NodeId> {
        self.attachment.owner()
    }

    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next
    }

    pub fn x(&self) -> i64 {
        self.bounds.x
    }

    pub fn y(&self) -> i64 {
        self.bounds.y
    }

    pub fn width(&self) -> i64 {
        self.bounds.width
    }

    pub fn height(&self) -> i64 {
        self.bounds.height
    }

    pub fn bounds(&self) -> StrictBounds {
        self.bounds
    }

    pub fn cached_x(&self) -> i64 {
        self.cached.x
    }

    pub fn cached_y(&self) -> i64 {
        self.cached.y
    }

    pub fn cached_width(&self) -> i64 {
        self.cached.width
    }

    pub fn cached_height(&self) -> i64 {
        self.cached.height
    }

    pub fn cached_bounds(&self) -> StrictBounds {
        self.cached
    }

    pub fn overflow_area_width(&self) -> i64 {
        self.overflow_area_width
    }

    pub fn overflow_area_height(&self) -> i64 {
        self.overflow_area_height
    }

    pub fn change_tracker(&self) -> u64 {
        self.change_tracker
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache_state
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn minimum_chunk_width(&self) -> i64 {
        self.minimum_chunk_width
    }

    pub fn maximum_box_width(&self) -> i64 {
        self.maximum_box_width
    }

    pub fn leaf(&self) -> Option<&LeafContent> {
        match &self.content {
            NodeContent::Leaf(leaf) => Some(leaf),
            NodeContent::Composite(_) => None,
        }
    }

    pub fn as_box(&self) -> Option<&RenderBox> {
        match &self.content {
            NodeContent::Composite(b) => Some(b),
            NodeContent::Leaf(_) => None,
        }
    }

    pub(crate) fn as_box_mut(&mut self) -> Option<&mut RenderBox> {
        match &mut self.content {
            NodeContent::Composite(b) => Some(b),
            NodeContent::Leaf(_) => None,
        }
    }

    pub fn is_box(&self) -> bool {
        self.as_box().is_some()
    }

    /// Size of this subtree, 1 for leaves.
    pub fn descendant_count(&self) -> usize {
        self.as_box().map_or(1, |b| b.descendant_count)
    }

    /// What this node adds to its ancestors' content reference count.
    pub(crate) fn content_refs_contribution(&self) -> usize {
        self.kind.own_content_refs() + self.as_box().map_or(0, |b| b.content_ref_count)
    }

    /// What this node adds to its ancestors' table reference count.
    pub(crate) fn table_refs_contribution(&self) -> usize {
        self.kind.own_table_refs() + self.as_box().map_or(0, |b| b.table_ref_count)
    }
}
