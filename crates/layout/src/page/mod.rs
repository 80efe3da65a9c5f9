//! Logical pages: the root boxes of pagination, their fixed page areas and sheet grid.

mod grid;
mod logical;

pub use grid::{PageGrid, PhysicalPageBox};
pub use logical::{LogicalPageData, PageAreas};
