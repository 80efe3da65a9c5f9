//! Micro-unit geometry primitives shared by the style and layout crates.
//!
//! All layout arithmetic is done on integers. One point is [`INTERNAL_FACTOR`] micro-points,
//! which keeps the page-break arithmetic exact and makes positions hashable and totally ordered.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of micro-points per point.
pub const INTERNAL_FACTOR: i64 = 1000;

/// Converts a length in points into micro-points, rounding to the nearest unit.
pub fn to_internal(points: f64) -> i64 {
    (points * INTERNAL_FACTOR as f64).round() as i64
}

/// Converts a micro-point length back into points.
pub fn to_external(micro: i64) -> f64 {
    micro as f64 / INTERNAL_FACTOR as f64
}

/// One of the two layout directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn other(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A resolved length: a fixed micro-point value, a percentage, or `auto`.
///
/// Percentages are stored in micro-percent, so `RenderLength::percent(50.0)` keeps the value
/// `50_000`. The type is immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderLength {
    value: i64,
    is_percentage: bool,
}

impl RenderLength {
    /// Sentinel for `auto`. Never produced by arithmetic.
    pub const AUTO: RenderLength = RenderLength {
        value: i64::MIN,
        is_percentage: false,
    };

    pub const EMPTY: RenderLength = RenderLength {
        value: 0,
        is_percentage: false,
    };

    pub fn new(value: i64, is_percentage: bool) -> Self {
        Self {
            value,
            is_percentage,
        }
    }

    /// A fixed length given in micro-points.
    pub fn fixed(value: i64) -> Self {
        Self::new(value, false)
    }

    /// A fixed length given in points.
    pub fn points(points: f64) -> Self {
        Self::new(to_internal(points), false)
    }

    /// A percentage of the parent length, e.g. `percent(25.0)` for 25%.
    pub fn percent(percent: f64) -> Self {
        Self::new(to_internal(percent), true)
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_percentage(&self) -> bool {
        self.is_percentage
    }

    pub fn is_auto(&self) -> bool {
        *self == Self::AUTO
    }

    /// Resolves against `parent`, mapping `auto` to zero.
    pub fn resolve(&self, parent: i64) -> i64 {
        self.resolve_or(parent, 0)
    }

    /// Resolves against `parent`, mapping `auto` to `auto_value`.
    pub fn resolve_or(&self, parent: i64, auto_value: i64) -> i64 {
        if self.is_auto() {
            return auto_value;
        }
        if self.is_percentage {
            let scaled = parent as i128 * self.value as i128;
            let divisor = 100 * INTERNAL_FACTOR as i128;
            // round half away from zero
            let rounded = if scaled >= 0 {
                (scaled + divisor / 2) / divisor
            } else {
                (scaled - divisor / 2) / divisor
            };
            return rounded as i64;
        }
        self.value
    }
}

impl Default for RenderLength {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for RenderLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_auto() {
            write!(f, "auto")
        } else if self.is_percentage {
            write!(f, "{}%", to_external(self.value))
        } else {
            write!(f, "{}pt", to_external(self.value))
        }
    }
}

/// An axis-aligned rectangle in micro-points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrictBounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl StrictBounds {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x2(&self) -> i64 {
        self.x + self.width
    }

    pub fn y2(&self) -> i64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && x < self.x2() && y >= self.y && y < self.y2()
    }

    /// True if both rectangles share an area. Touching edges do not intersect.
    pub fn intersects(&self, other: &StrictBounds) -> bool {
        self.x < other.x2() && other.x < self.x2() && self.y < other.y2() && other.y < self.y2()
    }

    pub fn union(&self, other: &StrictBounds) -> StrictBounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        StrictBounds {
            x,
            y,
            width: self.x2().max(other.x2()) - x,
            height: self.y2().max(other.y2()) - y,
        }
    }
}
