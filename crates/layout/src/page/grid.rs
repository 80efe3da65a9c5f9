//! Physical sheet tiling of a logical page.

use folio_types::{PageDefinition, StrictBounds};
use std::cell::OnceCell;
use std::sync::Arc;

/// One physical sheet of a logical page, in micro-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalPageBox {
    pub width: i64,
    pub height: i64,
    /// Printable area relative to the sheet's top-left corner.
    pub imageable_area: StrictBounds,
    /// Offset of the sheet inside the logical page.
    pub global_x: i64,
    pub global_y: i64,
}

impl PhysicalPageBox {
    /// The printable area in logical-page coordinates.
    pub fn global_imageable_area(&self) -> StrictBounds {
        StrictBounds::new(
            self.global_x + self.imageable_area.x,
            self.global_y + self.imageable_area.y,
            self.imageable_area.width,
            self.imageable_area.height,
        )
    }
}

#[derive(Debug)]
struct GridCell {
    placement: usize,
    page: OnceCell<PhysicalPageBox>,
}

/// Maps `(row, column)` cells to the physical sheets of a page definition.
///
/// Columns and rows are the spans between the distinct x and y edges of all sheets. A sheet
/// occupies the cell at its origin, so overlapping or sparse tilings produce empty cells
/// instead of failing.
#[derive(Debug)]
pub struct PageGrid {
    definition: Arc<PageDefinition>,
    column_edges: Vec<i64>,
    row_edges: Vec<i64>,
    cells: Vec<Option<GridCell>>,
}

/// Sorted, distinct edges; `n` edges delimit `n - 1` spans.
fn distinct_edges(edges: impl Iterator<Item = (i64, i64)>) -> Vec<i64> {
    let mut values: Vec<i64> = edges.flat_map(|(start, end)| [start, end]).collect();
    values.sort_unstable();
    values.dedup();
    values
}

impl PageGrid {
    pub fn new(definition: Arc<PageDefinition>) -> Self {
        let column_edges = distinct_edges(definition.pages().iter().map(|p| {
            let b = p.bounds();
            (b.x, b.x2())
        }));
        let row_edges = distinct_edges(definition.pages().iter().map(|p| {
            let b = p.bounds();
            (b.y, b.y2())
        }));
        let columns = column_edges.len().saturating_sub(1);
        let rows = row_edges.len().saturating_sub(1);

        let mut cells: Vec<Option<GridCell>> = Vec::new();
        cells.resize_with(columns * rows, || None);
        for (placement, page) in definition.pages().iter().enumerate() {
            let bounds = page.bounds();
            let (Ok(row), Ok(column)) = (
                row_edges.binary_search(&bounds.y),
                column_edges.binary_search(&bounds.x),
            ) else {
                continue;
            };
            let Some(cell) = cells.get_mut(row * columns + column) else {
                continue;
            };
            if cell.is_some() {
                log::warn!(
                    "Sheet {} starts at the same origin as an earlier sheet and is ignored",
                    placement
                );
                continue;
            }
            *cell = Some(GridCell {
                placement,
                page: OnceCell::new(),
            });
        }

        Self {
            definition,
            column_edges,
            row_edges,
            cells,
        }
    }

    pub fn definition(&self) -> &Arc<PageDefinition> {
        &self.definition
    }

    pub fn row_count(&self) -> usize {
        self.row_edges.len().saturating_sub(1)
    }

    pub fn column_count(&self) -> usize {
        self.column_edges.len().saturating_sub(1)
    }

    /// Start and end of `column` in logical-page coordinates.
    pub fn column_span(&self, column: usize) -> Option<(i64, i64)> {
        Some((*self.column_edges.get(column)?, *self.column_edges.get(column + 1)?))
    }

    /// Start and end of `row` in logical-page coordinates.
    pub fn row_span(&self, row: usize) -> Option<(i64, i64)> {
        Some((*self.row_edges.get(row)?, *self.row_edges.get(row + 1)?))
    }

    /// Number of cells backed by a sheet.
    pub fn physical_page_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// The sheet at `(row, column)`, or `None` for an empty or out-of-range cell.
    pub fn page(&self, row: usize, column: usize) -> Option<&PhysicalPageBox> {
        if row >= self.row_count() || column >= self.column_count() {
            return None;
        }
        let cell = self.cells[row * self.column_count() + column].as_ref()?;
        let placement = self.definition.page(cell.placement)?;
        Some(cell.page.get_or_init(|| {
            let bounds = placement.bounds();
            PhysicalPageBox {
                width: bounds.width,
                height: bounds.height,
                imageable_area: placement.format.imageable_area(),
                global_x: bounds.x,
                global_y: bounds.y,
            }
        }))
    }

    /// All sheets in row-major order.
    pub fn pages(&self) -> impl Iterator<Item = &PhysicalPageBox> + '_ {
        (0..self.row_count())
            .flat_map(move |row| (0..self.column_count()).map(move |column| (row, column)))
            .filter_map(|(row, column)| self.page(row, column))
    }

    /// Widest sheet in `column`; zero for empty columns.
    pub fn max_width(&self, column: usize) -> i64 {
        (0..self.row_count())
            .filter_map(|row| self.page(row, column))
            .map(|p| p.width)
            .max()
            .unwrap_or(0)
    }

    /// Tallest sheet in `row`; zero for empty rows.
    pub fn max_height(&self, row: usize) -> i64 {
        (0..self.column_count())
            .filter_map(|column| self.page(row, column))
            .map(|p| p.height)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::{Orientation, PageFormat, PageMargins, PagePlacement, PageSize};

    fn letter() -> PageFormat {
        PageFormat::new(PageSize::Letter, Orientation::Portrait, PageMargins::all(36.0))
    }

    #[test]
    fn test_single_sheet() {
        let grid = PageGrid::new(Arc::new(PageDefinition::single(letter()).unwrap()));
        assert_eq!((grid.row_count(), grid.column_count()), (1, 1));
        let page = grid.page(0, 0).unwrap();
        assert_eq!(page.width, 612_000);
        assert_eq!(page.height, 792_000);
        assert_eq!(page.imageable_area, StrictBounds::new(36_000, 36_000, 540_000, 720_000));
        assert!(grid.page(0, 1).is_none());
    }

    #[test]
    fn test_tiled_grid() {
        let grid = PageGrid::new(Arc::new(PageDefinition::tiled(letter(), 2, 3).unwrap()));
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.physical_page_count(), 6);
        assert_eq!(grid.pages().count(), 6);

        let page = grid.page(1, 2).unwrap();
        assert_eq!(page.global_x, 2 * 612_000);
        assert_eq!(page.global_y, 792_000);
        assert_eq!(page.global_imageable_area().x, 2 * 612_000 + 36_000);
        assert_eq!(grid.max_width(2), 612_000);
        assert_eq!(grid.max_height(1), 792_000);
    }

    #[test]
    fn test_sparse_tiling_leaves_empty_cells() {
        let definition = PageDefinition::new(vec![
            PagePlacement {
                format: letter(),
                x: 0.0,
                y: 0.0,
            },
            PagePlacement {
                format: letter(),
                x: 1000.0,
                y: 1000.0,
            },
            PagePlacement {
                format: letter(),
                x: 0.0,
                y: 0.0,
            },
        ])
        .unwrap();
        let grid = PageGrid::new(Arc::new(definition));
        // edges 0, 612, 1000 and 1612 (792 and 1792 vertically)
        assert_eq!((grid.row_count(), grid.column_count()), (3, 3));
        assert_eq!(grid.physical_page_count(), 2);
        assert_eq!(grid.column_span(1), Some((612_000, 1_000_000)));
        assert_eq!(grid.row_span(2), Some((1_000_000, 1_792_000)));
        assert!(grid.page(1, 1).is_none());
        assert!(grid.page(0, 2).is_none());
        assert_eq!(grid.page(2, 2).unwrap().global_x, 1_000_000);
        assert_eq!(grid.max_width(0), 612_000);
        assert_eq!(grid.max_width(1), 0);
    }

    #[test]
    fn test_overlapping_sheets_split_at_every_edge() {
        let definition = PageDefinition::new(vec![
            PagePlacement {
                format: letter(),
                x: 0.0,
                y: 0.0,
            },
            PagePlacement {
                format: letter(),
                x: 306.0,
                y: 0.0,
            },
        ])
        .unwrap();
        let grid = PageGrid::new(Arc::new(definition));
        assert_eq!((grid.row_count(), grid.column_count()), (1, 3));
        assert_eq!(grid.column_span(0), Some((0, 306_000)));
        assert_eq!(grid.column_span(2), Some((612_000, 918_000)));
        assert_eq!(grid.column_span(3), None);
        assert_eq!(grid.page(0, 1).unwrap().global_x, 306_000);
        assert!(grid.page(0, 2).is_none());
        assert_eq!(grid.physical_page_count(), 2);
    }
}
