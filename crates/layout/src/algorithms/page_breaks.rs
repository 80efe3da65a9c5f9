//! The page-break position index of one logical page.
//!
//! Positions are flow coordinates in micro-points. Minor breaks are every page boundary,
//! including the boundaries between the physical sheets of one logical page. Master breaks are
//! the subsequence that separates logical pages; each carries the header height reserved on
//! the page it starts.

use crate::config::BreakListTuning;
use crate::LayoutError;
use std::cell::Cell;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct BreakBackend {
    break_positions: Vec<i64>,
    master_breaks: Vec<i64>,
    page_header_sizes: Vec<i64>,
}

impl BreakBackend {
    fn seeded(capacity: usize) -> Self {
        let mut break_positions = Vec::with_capacity(capacity);
        let mut master_breaks = Vec::with_capacity(capacity);
        let mut page_header_sizes = Vec::with_capacity(capacity);
        break_positions.push(0);
        master_breaks.push(0);
        page_header_sizes.push(0);
        Self {
            break_positions,
            master_breaks,
            page_header_sizes,
        }
    }
}

/// Grows `values` by half its capacity, never by more than `max_step` entries at once.
fn reserve_for_push(values: &mut Vec<i64>, max_step: usize) {
    if values.len() < values.capacity() {
        return;
    }
    let step = (values.capacity() / 2).clamp(1, max_step.max(1));
    values.reserve_exact(step);
}

/// Which side of `position` a search partitions on.
#[derive(Debug, Clone, Copy)]
enum Bound {
    /// First index whose value is `>= position`.
    Lower,
    /// First index whose value is `> position`.
    Upper,
}

impl Bound {
    fn before(self, value: i64, position: i64) -> bool {
        match self {
            Bound::Lower => value < position,
            Bound::Upper => value <= position,
        }
    }
}

/// Average spacing of the entries, assuming a uniform distribution. Zero when the array holds
/// nothing beyond the origin.
fn scale_factor(values: &[i64]) -> i64 {
    match values.last() {
        Some(&last) if last > 0 => last / values.len() as i64,
        _ => 0,
    }
}

/// Partition point of `values` for `position`, searched near the index the scale factor
/// predicts and over the full array if the prediction misses.
fn search(values: &[i64], position: i64, bound: Bound, slack: usize, hint: &Cell<usize>) -> usize {
    let len = values.len();
    let is_result = |index: usize| {
        (index == 0 || bound.before(values[index - 1], position))
            && (index == len || !bound.before(values[index], position))
    };

    // forward pagination asks for the same or the following entry again and again
    let cached = hint.get();
    for candidate in [cached, cached + 1] {
        if candidate <= len && is_result(candidate) {
            log::trace!("Break search for {} hit the cursor cache at {}", position, candidate);
            hint.set(candidate);
            return candidate;
        }
    }

    let scale = scale_factor(values);
    let result = if scale > 0 && position >= 0 {
        let estimate = usize::try_from(position / scale).unwrap_or(len).min(len);
        let lo = estimate.saturating_sub(slack);
        let hi = (estimate + slack + 1).min(len);
        let lo_ok = lo == 0 || bound.before(values[lo - 1], position);
        let hi_ok = hi == len || !bound.before(values[hi], position);
        if lo_ok && hi_ok {
            lo + values[lo..hi].partition_point(|v| bound.before(*v, position))
        } else {
            values.partition_point(|v| bound.before(*v, position))
        }
    } else {
        values.partition_point(|v| bound.before(*v, position))
    };
    hint.set(result);
    result
}

/// A cursor over a copy-on-write set of break arrays.
///
/// Cloning is cheap and shares the arrays; the first mutation through either clone forks them,
/// so siblings never observe each other's inserts.
#[derive(Debug, Clone)]
pub struct PageBreakPositionList {
    backend: Arc<BreakBackend>,
    tuning: BreakListTuning,
    next_found: Cell<usize>,
    prev_found: Cell<usize>,
    next_master_found: Cell<usize>,
    prev_master_found: Cell<usize>,
}

impl Default for PageBreakPositionList {
    fn default() -> Self {
        Self::new(BreakListTuning::default())
    }
}

impl PageBreakPositionList {
    /// A list holding only the implicit first page start at position 0.
    pub fn new(tuning: BreakListTuning) -> Self {
        Self {
            backend: Arc::new(BreakBackend::seeded(tuning.initial_capacity)),
            tuning,
            next_found: Cell::new(0),
            prev_found: Cell::new(0),
            next_master_found: Cell::new(0),
            prev_master_found: Cell::new(0),
        }
    }

    fn reset_cursors(&self) {
        self.next_found.set(0);
        self.prev_found.set(0);
        self.next_master_found.set(0);
        self.prev_master_found.set(0);
    }

    /// Replaces this list's breaks and cursor state with those of `source`.
    pub fn copy_from(&mut self, source: &PageBreakPositionList) {
        self.clone_from(source);
    }

    /// Drops every break except the implicit origin. Other lists sharing the arrays keep them.
    pub fn clear(&mut self) {
        self.backend = Arc::new(BreakBackend::seeded(self.tuning.initial_capacity));
        self.reset_cursors();
    }

    pub fn shares_backend_with(&self, other: &PageBreakPositionList) -> bool {
        Arc::ptr_eq(&self.backend, &other.backend)
    }

    fn last_minor(&self) -> i64 {
        self.backend.break_positions.last().copied().unwrap_or(0)
    }

    /// Records a page boundary. Ties with the last break are absorbed.
    pub fn add_minor_break(&mut self, position: i64) -> Result<(), LayoutError> {
        let last = self.last_minor();
        if position < last {
            return Err(LayoutError::NonMonotonicBreak { position, last });
        }
        if position == last {
            return Ok(());
        }
        let max_step = self.tuning.max_growth_step;
        let backend = Arc::make_mut(&mut self.backend);
        reserve_for_push(&mut backend.break_positions, max_step);
        backend.break_positions.push(position);
        log::trace!("Added minor break at {}", position);
        Ok(())
    }

    /// Records the start of a new logical page, reserving `header_size` for its header.
    ///
    /// The position also becomes a minor break. A tie with the last master break is absorbed
    /// and the new header size is ignored.
    pub fn add_major_break(&mut self, position: i64, header_size: i64) -> Result<(), LayoutError> {
        let last = self.last_minor();
        if position < last {
            return Err(LayoutError::NonMonotonicBreak { position, last });
        }
        if position > last {
            self.add_minor_break(position)?;
        }
        let last_master = self.last_master_break();
        if position == last_master {
            return Ok(());
        }
        let max_step = self.tuning.max_growth_step;
        let backend = Arc::make_mut(&mut self.backend);
        reserve_for_push(&mut backend.master_breaks, max_step);
        reserve_for_push(&mut backend.page_header_sizes, max_step);
        backend.master_breaks.push(position);
        backend.page_header_sizes.push(header_size);
        log::trace!("Added master break at {} (header {})", position, header_size);
        Ok(())
    }

    // --- Queries ---

    pub fn minor_break_count(&self) -> usize {
        self.backend.break_positions.len()
    }

    pub fn master_break_count(&self) -> usize {
        self.backend.master_breaks.len()
    }

    pub fn break_positions(&self) -> &[i64] {
        &self.backend.break_positions
    }

    pub fn master_breaks(&self) -> &[i64] {
        &self.backend.master_breaks
    }

    pub fn page_header_sizes(&self) -> &[i64] {
        &self.backend.page_header_sizes
    }

    pub fn last_break(&self) -> i64 {
        self.last_minor()
    }

    pub fn last_master_break(&self) -> i64 {
        self.backend.master_breaks.last().copied().unwrap_or(0)
    }

    pub fn page_header_size_at(&self, page_index: usize) -> Option<i64> {
        self.backend.page_header_sizes.get(page_index).copied()
    }

    fn slack(&self) -> usize {
        self.tuning.search_slack
    }

    /// Smallest break `>= position`, clamped to the last break.
    pub fn find_next_break_position(&self, position: i64) -> i64 {
        let values = &self.backend.break_positions;
        let index = search(values, position, Bound::Lower, self.slack(), &self.next_found);
        values[index.min(values.len() - 1)]
    }

    /// Largest break `<= position`, clamped to the first break.
    pub fn find_previous_break_position(&self, position: i64) -> i64 {
        let values = &self.backend.break_positions;
        let index = search(values, position, Bound::Upper, self.slack(), &self.prev_found);
        values[index.saturating_sub(1)]
    }

    /// Smallest master break `>= position`, clamped to the last master break.
    pub fn find_next_major_break_position(&self, position: i64) -> i64 {
        let values = &self.backend.master_breaks;
        let index = search(values, position, Bound::Lower, self.slack(), &self.next_master_found);
        values[index.min(values.len() - 1)]
    }

    /// Largest master break `<= position`, clamped to the first master break.
    pub fn find_previous_major_break_position(&self, position: i64) -> i64 {
        let values = &self.backend.master_breaks;
        let index = search(values, position, Bound::Upper, self.slack(), &self.prev_master_found);
        values[index.saturating_sub(1)]
    }

    /// Index of the logical page containing `position`. Positions before the origin belong to
    /// the first page.
    pub fn find_page_index(&self, position: i64) -> usize {
        let values = &self.backend.master_breaks;
        search(values, position, Bound::Upper, self.slack(), &self.prev_master_found)
            .saturating_sub(1)
    }

    pub fn is_page_start(&self, position: i64) -> bool {
        self.backend.master_breaks.binary_search(&position).is_ok()
    }

    fn master_index_of(&self, position: i64) -> Result<usize, LayoutError> {
        self.backend
            .master_breaks
            .binary_search(&position)
            .map_err(|_| LayoutError::NotAPageBoundary(position))
    }

    /// Start of the page that ends at the master break `page_end`. The first page ends where
    /// it starts, at 0.
    pub fn find_page_start_for_page_end(&self, page_end: i64) -> Result<i64, LayoutError> {
        let index = self.master_index_of(page_end)?;
        if index == 0 {
            return Ok(0);
        }
        Ok(self.backend.master_breaks[index - 1])
    }

    /// End of the page that starts at the master break `page_start`.
    pub fn find_page_end_for_page_start(&self, page_start: i64) -> Result<i64, LayoutError> {
        let index = self.master_index_of(page_start)?;
        self.backend
            .master_breaks
            .get(index + 1)
            .copied()
            .ok_or(LayoutError::OpenPage(page_start))
    }

    /// Whether a box spanning `[box_y + shift, box_y + shift + box_height]` has a break strictly
    /// inside it. Zero-height boxes never cross.
    pub fn is_crossing_pagebreak(&self, box_y: i64, box_height: i64, shift: i64) -> bool {
        if box_height == 0 {
            return false;
        }
        let start = box_y.saturating_add(shift);
        let end = start.saturating_add(box_height);
        let values = &self.backend.break_positions;
        let index = search(values, start, Bound::Upper, self.slack(), &self.prev_found);
        index < values.len() && values[index] < end
    }

    /// Flow position of content placed `fixed_position` below the header of the page that
    /// contains `box_y`. Never earlier than `box_y`.
    pub fn compute_fixed_position_in_flow(&self, box_y: i64, fixed_position: i64) -> i64 {
        let page = self.find_page_index(box_y);
        let page_start = self.backend.master_breaks[page];
        let header = self.backend.page_header_sizes[page];
        page_start
            .saturating_add(header)
            .saturating_add(fixed_position)
            .max(box_y)
    }

    /// Crossing test for a box pinned `fixed_position` below the header of its page.
    pub fn is_crossing_pagebreak_with_fixed_position(
        &self,
        box_y: i64,
        box_height: i64,
        fixed_position: i64,
    ) -> bool {
        let position = self.compute_fixed_position_in_flow(box_y, fixed_position);
        self.is_crossing_pagebreak(position, box_height, 0)
    }
}
