use folio_types::Axis;

/// The four fixed sub-areas of a logical page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageAreaKind {
    Header,
    Footer,
    RepeatFooter,
    Watermark,
}

impl PageAreaKind {
    pub const ALL: [PageAreaKind; 4] = [
        PageAreaKind::Header,
        PageAreaKind::Footer,
        PageAreaKind::RepeatFooter,
        PageAreaKind::Watermark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageAreaKind::Header => "Header",
            PageAreaKind::Footer => "Footer",
            PageAreaKind::RepeatFooter => "RepeatFooter",
            PageAreaKind::Watermark => "Watermark",
        }
    }
}

/// How a box grows when one of its children grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendPolicy {
    /// Children stack along the vertical axis: every extra unit of child height is added
    /// to the box.
    Block,
    /// Children share a row: the box only grows until it contains the child's new bottom
    /// edge.
    Row,
}

/// Represents the specific type of a render node.
///
/// Every per-kind behaviour of the tree (axes, height extension, nesting rules, reference
/// counting) is answered here, so the tree itself never needs to dispatch on concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Spacer,
    Replaced,

    Block,
    Inline,
    Row,
    Canvas,
    Auto,
    Paragraph,
    Table,
    TableSection,
    TableRow,
    TableCell,
    /// A placeholder for content that is constructed later, e.g. an inline subreport.
    ContentHolder,
    PageArea(PageAreaKind),
    LogicalPage,
}

impl NodeKind {
    /// Maps the style sheet's `layout` name to a box kind.
    pub fn from_layout(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "block" => Some(NodeKind::Block),
            "inline" => Some(NodeKind::Inline),
            "row" => Some(NodeKind::Row),
            "canvas" => Some(NodeKind::Canvas),
            "auto" => Some(NodeKind::Auto),
            "paragraph" => Some(NodeKind::Paragraph),
            "table" => Some(NodeKind::Table),
            "table-section" => Some(NodeKind::TableSection),
            "table-row" => Some(NodeKind::TableRow),
            "table-cell" => Some(NodeKind::TableCell),
            _ => None,
        }
    }

    pub fn is_box(&self) -> bool {
        !matches!(self, NodeKind::Text | NodeKind::Spacer | NodeKind::Replaced)
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(self, NodeKind::Inline | NodeKind::Text)
    }

    /// Block containers must not hold inline-level content directly; text has to be wrapped
    /// in a paragraph first.
    pub fn requires_block_children(&self) -> bool {
        matches!(
            self,
            NodeKind::Block
                | NodeKind::Canvas
                | NodeKind::TableCell
                | NodeKind::ContentHolder
                | NodeKind::PageArea(_)
                | NodeKind::LogicalPage
        )
    }

    pub fn is_table_family(&self) -> bool {
        matches!(
            self,
            NodeKind::Table | NodeKind::TableSection | NodeKind::TableRow | NodeKind::TableCell
        )
    }

    /// Contribution of a node of this kind to its ancestors' table reference count.
    pub fn own_table_refs(&self) -> usize {
        usize::from(matches!(self, NodeKind::Table))
    }

    /// Contribution of a node of this kind to its ancestors' content reference count.
    pub fn own_content_refs(&self) -> usize {
        usize::from(matches!(self, NodeKind::ContentHolder))
    }

    /// The (major, minor) axis pair a box arranges its children along.
    pub fn axes(&self) -> (Axis, Axis) {
        match self {
            NodeKind::Inline | NodeKind::Row | NodeKind::TableRow | NodeKind::Text => {
                (Axis::Horizontal, Axis::Vertical)
            }
            _ => (Axis::Vertical, Axis::Horizontal),
        }
    }

    pub fn major_axis(&self) -> Axis {
        self.axes().0
    }

    pub fn minor_axis(&self) -> Axis {
        self.axes().1
    }

    pub fn extend_policy(&self) -> ExtendPolicy {
        match self {
            NodeKind::Inline | NodeKind::Row | NodeKind::TableRow | NodeKind::Canvas => {
                ExtendPolicy::Row
            }
            _ => ExtendPolicy::Block,
        }
    }

    /// Returns a string representation, primarily for debugging or error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Text => "Text",
            NodeKind::Spacer => "Spacer",
            NodeKind::Replaced => "Replaced",
            NodeKind::Block => "Block",
            NodeKind::Inline => "Inline",
            NodeKind::Row => "Row",
            NodeKind::Canvas => "Canvas",
            NodeKind::Auto => "Auto",
            NodeKind::Paragraph => "Paragraph",
            NodeKind::Table => "Table",
            NodeKind::TableSection => "TableSection",
            NodeKind::TableRow => "TableRow",
            NodeKind::TableCell => "TableCell",
            NodeKind::ContentHolder => "ContentHolder",
            NodeKind::PageArea(area) => area.as_str(),
            NodeKind::LogicalPage => "LogicalPage",
        }
    }
}
