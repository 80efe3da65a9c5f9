//! Page-format descriptors consumed when a logical page builds its page grid.

use crate::GeometryError;
use crate::geometry::{StrictBounds, to_internal};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeMap};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    Custom { width: f32, height: f32 },
}

impl Eq for PageSize {}

impl Hash for PageSize {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            PageSize::A4 => 0u8.hash(state),
            PageSize::Letter => 1u8.hash(state),
            PageSize::Legal => 2u8.hash(state),
            PageSize::Custom { width, height } => {
                3u8.hash(state);
                width.to_bits().hash(state);
                height.to_bits().hash(state);
            }
        }
    }
}

impl Serialize for PageSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PageSize::A4 => serializer.serialize_str("A4"),
            PageSize::Letter => serializer.serialize_str("Letter"),
            PageSize::Legal => serializer.serialize_str("Legal"),
            PageSize::Custom { width, height } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("width", width)?;
                map.serialize_entry("height", height)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for PageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum PageSizeDef {
            Str(String),
            Map { width: f32, height: f32 },
        }

        match PageSizeDef::deserialize(deserializer)? {
            PageSizeDef::Str(s) => Self::parse(&s).map_err(de::Error::custom),
            PageSizeDef::Map { width, height } => Ok(PageSize::Custom { width, height }),
        }
    }
}

impl PageSize {
    /// Portrait dimensions in points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }

    fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            _ => Err(format!("Unknown page size: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Non-printable margins of a sheet, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageMargins {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
}

impl PageMargins {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// The geometry of one physical sheet: size, orientation and imageable area.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFormat {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub margins: PageMargins,
}

impl PageFormat {
    pub fn new(size: PageSize, orientation: Orientation, margins: PageMargins) -> Self {
        Self {
            size,
            orientation,
            margins,
        }
    }

    /// Oriented sheet width in micro-points.
    pub fn width(&self) -> i64 {
        to_internal(self.oriented_pt().0 as f64)
    }

    /// Oriented sheet height in micro-points.
    pub fn height(&self) -> i64 {
        to_internal(self.oriented_pt().1 as f64)
    }

    /// The printable area relative to the sheet's top-left corner, in micro-points.
    pub fn imageable_area(&self) -> StrictBounds {
        let x = to_internal(self.margins.left as f64);
        let y = to_internal(self.margins.top as f64);
        let width = self.width() - x - to_internal(self.margins.right as f64);
        let height = self.height() - y - to_internal(self.margins.bottom as f64);
        StrictBounds::new(x, y, width, height)
    }

    /// Rejects non-positive sheets and margins that swallow the whole sheet.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let (w, h) = self.oriented_pt();
        if !(w > 0.0 && h > 0.0) {
            return Err(GeometryError::InvalidPageSize(w, h));
        }
        let m = &self.margins;
        if m.top < 0.0 || m.right < 0.0 || m.bottom < 0.0 || m.left < 0.0 {
            return Err(GeometryError::NegativeMargin);
        }
        let area = self.imageable_area();
        if area.width <= 0 || area.height <= 0 {
            return Err(GeometryError::EmptyImageableArea);
        }
        Ok(())
    }

    fn oriented_pt(&self) -> (f32, f32) {
        let (w, h) = self.size.dimensions_pt();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// A physical sheet placed at an offset (in points) inside the logical page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PagePlacement {
    pub format: PageFormat,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl PagePlacement {
    /// The sheet's rectangle in logical-page micro-points.
    pub fn bounds(&self) -> StrictBounds {
        StrictBounds::new(
            to_internal(self.x as f64),
            to_internal(self.y as f64),
            self.format.width(),
            self.format.height(),
        )
    }
}

/// Describes how one logical page is tiled onto physical sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPageDefinition")]
pub struct PageDefinition {
    pages: Vec<PagePlacement>,
}

#[derive(Deserialize)]
struct RawPageDefinition {
    pages: Vec<PagePlacement>,
}

impl TryFrom<RawPageDefinition> for PageDefinition {
    type Error = GeometryError;

    fn try_from(raw: RawPageDefinition) -> Result<Self, Self::Error> {
        PageDefinition::new(raw.pages)
    }
}

impl PageDefinition {
    pub fn new(pages: Vec<PagePlacement>) -> Result<Self, GeometryError> {
        if pages.is_empty() {
            return Err(GeometryError::NoPages);
        }
        for page in &pages {
            page.format.validate()?;
            if page.x < 0.0 || page.y < 0.0 {
                return Err(GeometryError::NegativeOffset(page.x, page.y));
            }
        }
        Ok(Self { pages })
    }

    /// A logical page printed on exactly one sheet.
    pub fn single(format: PageFormat) -> Result<Self, GeometryError> {
        Self::new(vec![PagePlacement {
            format,
            x: 0.0,
            y: 0.0,
        }])
    }

    /// A logical page spanning `rows` x `columns` identical sheets.
    pub fn tiled(format: PageFormat, rows: usize, columns: usize) -> Result<Self, GeometryError> {
        let (w, h) = format.oriented_pt();
        let mut pages = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for col in 0..columns {
                pages.push(PagePlacement {
                    format: format.clone(),
                    x: col as f32 * w,
                    y: row as f32 * h,
                });
            }
        }
        Self::new(pages)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&PagePlacement> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[PagePlacement] {
        &self.pages
    }

    /// Total logical width in micro-points.
    pub fn width(&self) -> i64 {
        self.pages.iter().map(|p| p.bounds().x2()).max().unwrap_or(0)
    }

    /// Total logical height in micro-points.
    pub fn height(&self) -> i64 {
        self.pages.iter().map(|p| p.bounds().y2()).max().unwrap_or(0)
    }
}
