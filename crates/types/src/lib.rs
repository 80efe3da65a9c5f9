use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Page size must be positive, got {0:.2} x {1:.2}.")]
    InvalidPageSize(f32, f32),
    #[error("Page margins must not be negative.")]
    NegativeMargin,
    #[error("Page margins leave no imageable area.")]
    EmptyImageableArea,
    #[error("Page offset must not be negative, got ({0:.2}, {1:.2}).")]
    NegativeOffset(f32, f32),
    #[error("A page definition needs at least one physical page.")]
    NoPages,
}

pub mod geometry;
pub mod ids;
pub mod page;

pub use geometry::{Axis, INTERNAL_FACTOR, RenderLength, StrictBounds, to_external, to_internal};
pub use ids::{InstanceId, InstanceIdGenerator};
pub use page::{Orientation, PageDefinition, PageFormat, PageMargins, PagePlacement, PageSize};
