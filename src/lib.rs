//! # folio
//!
//! The incremental, paginating layout core of a report renderer.
//!
//! Content is appended to a [`RenderTree`] of render boxes, layout commits geometry node by
//! node, and the page-break index of each logical page records where pages end. Speculative
//! pagination is expressed through `derive`, `mark_box_seen`, `commit` and `rollback`, so a
//! processor can try a page break and cheaply return to the last committed state. Finished
//! pages go to an [`OutputProcessor`].
//!
//! The building blocks live in their own crates and are re-exported here:
//! [`folio_types`] (geometry and page formats), [`folio_style`] (style sheets and attributes)
//! and [`folio_layout`] (the render tree and pagination structures).

pub mod error;
pub mod output;
pub mod setup;

pub use error::FolioError;
pub use output::{OutputProcessor, PageCollector, PageSummary};
pub use setup::PageSetup;

pub use folio_layout as layout;
pub use folio_style as style;
pub use folio_types as types;

pub use folio_layout::{
    CacheState, DebugOptions, LayoutConfig, LayoutError, NodeId, NodeKind, PageAreaKind,
    PageBreakPositionList, RenderTree,
};
pub use folio_style::{AttributeMap, StyleKey, StyleSheet};
pub use folio_types::{PageDefinition, PageFormat, RenderLength};
