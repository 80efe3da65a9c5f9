use super::PageGrid;
use crate::algorithms::page_breaks::PageBreakPositionList;
use crate::node_kind::{NodeKind, PageAreaKind};
use crate::tree::{Attachment, NodeId, RenderTree};
use crate::LayoutError;
use folio_style::StyleSheet;
use folio_types::{InstanceId, PageDefinition};
use std::sync::Arc;

/// Handles of the four fixed areas of a logical page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAreas {
    pub header: NodeId,
    pub footer: NodeId,
    pub repeat_footer: NodeId,
    pub watermark: NodeId,
}

impl PageAreas {
    pub fn get(&self, kind: PageAreaKind) -> NodeId {
        match kind {
            PageAreaKind::Header => self.header,
            PageAreaKind::Footer => self.footer,
            PageAreaKind::RepeatFooter => self.repeat_footer,
            PageAreaKind::Watermark => self.watermark,
        }
    }

    pub fn to_array(&self) -> [NodeId; 4] {
        [self.header, self.footer, self.repeat_footer, self.watermark]
    }

    pub(crate) fn try_map<E>(
        &self,
        mut f: impl FnMut(NodeId) -> Result<NodeId, E>,
    ) -> Result<PageAreas, E> {
        Ok(PageAreas {
            header: f(self.header)?,
            footer: f(self.footer)?,
            repeat_footer: f(self.repeat_footer)?,
            watermark: f(self.watermark)?,
        })
    }
}

/// Page-level state carried by a [`NodeKind::LogicalPage`] box.
#[derive(Debug, Clone)]
pub struct LogicalPageData {
    pub(crate) areas: PageAreas,
    pub(crate) saved: Option<PageAreas>,
    pub(crate) content_area: InstanceId,
    pub(crate) grid: Arc<PageGrid>,
    pub(crate) breaks: PageBreakPositionList,
    pub(crate) page_offset: i64,
    pub(crate) page_end: i64,
    pub(crate) definition: Arc<PageDefinition>,
}

impl LogicalPageData {
    pub fn areas(&self) -> PageAreas {
        self.areas
    }

    /// The frozen area snapshots taken by the last `store_save_information`.
    pub fn saved_areas(&self) -> Option<PageAreas> {
        self.saved
    }

    pub fn content_area_instance(&self) -> InstanceId {
        self.content_area
    }

    pub fn page_grid(&self) -> &PageGrid {
        &self.grid
    }

    pub fn page_breaks(&self) -> &PageBreakPositionList {
        &self.breaks
    }

    /// Flow position where the current page starts.
    pub fn page_offset(&self) -> i64 {
        self.page_offset
    }

    /// Flow position where the current page ends.
    pub fn page_end(&self) -> i64 {
        self.page_end
    }

    pub fn definition(&self) -> &Arc<PageDefinition> {
        &self.definition
    }

    pub fn page_width(&self) -> i64 {
        self.definition.width()
    }

    pub fn page_height(&self) -> i64 {
        self.definition.height()
    }

    /// Nodes owned by the page outside its child chain.
    pub(crate) fn owned_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.areas
            .to_array()
            .into_iter()
            .chain(self.saved.iter().flat_map(PageAreas::to_array))
    }
}

impl RenderTree {
    /// Builds an empty logical page for `definition`: the four page areas, one content area,
    /// the sheet grid and a break list holding the implicit first page start.
    pub fn create_logical_page(
        &mut self,
        definition: PageDefinition,
        style: Arc<StyleSheet>,
    ) -> Result<NodeId, LayoutError> {
        let definition = Arc::new(definition);
        let width = definition.width();
        let height = definition.height();

        let page = self.create_box(NodeKind::LogicalPage, style)?;
        let areas = PageAreas {
            header: self.create_page_area(page, PageAreaKind::Header, width)?,
            footer: self.create_page_area(page, PageAreaKind::Footer, width)?,
            repeat_footer: self.create_page_area(page, PageAreaKind::RepeatFooter, width)?,
            watermark: self.create_page_area(page, PageAreaKind::Watermark, width)?,
        };

        let content_style = self.default_style();
        let content = self.create_box(NodeKind::Block, content_style)?;
        self.set_width(content, width)?;
        self.add_generated_child(page, content)?;
        self.set_width(page, width)?;
        self.set_height(page, height)?;

        let data = LogicalPageData {
            areas,
            saved: None,
            content_area: self.node(content)?.instance_id(),
            grid: Arc::new(PageGrid::new(Arc::clone(&definition))),
            breaks: PageBreakPositionList::new(self.config().break_list),
            page_offset: 0,
            page_end: 0,
            definition,
        };
        self.box_mut(page)?.page = Some(Box::new(data));
        log::debug!(
            "Created logical page {} ({}x{}, {} sheets)",
            page,
            width,
            height,
            self.logical_page(page)?.grid.physical_page_count()
        );
        Ok(page)
    }

    fn create_page_area(&mut self, page: NodeId, kind: PageAreaKind, width: i64) -> Result<NodeId, LayoutError> {
        let style = self.default_style();
        let area = self.create_box(NodeKind::PageArea(kind), style)?;
        self.set_width(area, width)?;
        self.node_mut(area)?.attachment = Attachment::PageArea(page);
        Ok(area)
    }

    pub fn logical_page(&self, page: NodeId) -> Result<&LogicalPageData, LayoutError> {
        self.render_box(page)?
            .logical_page()
            .ok_or(LayoutError::NotALogicalPage(page))
    }

    fn logical_page_mut(&mut self, page: NodeId) -> Result<&mut LogicalPageData, LayoutError> {
        if self.node(page)?.is_frozen() {
            return Err(LayoutError::Frozen(page));
        }
        self.box_mut(page)?
            .page
            .as_deref_mut()
            .ok_or(LayoutError::NotALogicalPage(page))
    }

    pub fn page_area(&self, page: NodeId, kind: PageAreaKind) -> Result<NodeId, LayoutError> {
        Ok(self.logical_page(page)?.areas.get(kind))
    }

    /// The content area, looked up by its stable instance id so it is found again in derived
    /// copies of the page.
    pub fn content_area(&self, page: NodeId) -> Result<NodeId, LayoutError> {
        let instance = self.logical_page(page)?.content_area;
        self.children(page)
            .find(|child| {
                self.node(*child)
                    .map(|n| n.instance_id() == instance)
                    .unwrap_or(false)
            })
            .ok_or(LayoutError::MissingContentArea(page))
    }

    pub fn page_grid(&self, page: NodeId) -> Result<&PageGrid, LayoutError> {
        Ok(&self.logical_page(page)?.grid)
    }

    pub fn page_breaks(&self, page: NodeId) -> Result<&PageBreakPositionList, LayoutError> {
        Ok(&self.logical_page(page)?.breaks)
    }

    pub fn page_breaks_mut(&mut self, page: NodeId) -> Result<&mut PageBreakPositionList, LayoutError> {
        Ok(&mut self.logical_page_mut(page)?.breaks)
    }

    /// Sets the flow range `[offset, end)` of the page currently being paginated.
    pub fn set_page_range(&mut self, page: NodeId, offset: i64, end: i64) -> Result<(), LayoutError> {
        if offset > end {
            return Err(LayoutError::InvalidPageRange { offset, end });
        }
        let data = self.logical_page_mut(page)?;
        data.page_offset = offset;
        data.page_end = end;
        Ok(())
    }

    /// Replaces the saved area snapshots with frozen copies of the current page areas.
    pub fn store_save_information(&mut self, page: NodeId) -> Result<(), LayoutError> {
        let data = self.logical_page_mut(page)?;
        let areas = data.areas;
        let previous = data.saved.take();

        let saved = areas.try_map(|area| self.derive_page_area(area, page, true))?;
        self.logical_page_mut(page)?.saved = Some(saved);
        if let Some(previous) = previous {
            self.release_areas(previous)?;
        }
        log::debug!("Stored page areas of {}", page);
        Ok(())
    }

    /// Restores the page areas from the saved snapshots. Returns `false` if nothing was saved.
    pub fn rollback_save_information(&mut self, page: NodeId) -> Result<bool, LayoutError> {
        let data = self.logical_page_mut(page)?;
        let Some(saved) = data.saved else {
            return Ok(false);
        };
        let current = data.areas;

        let restored = saved.try_map(|area| self.derive_page_area(area, page, false))?;
        self.logical_page_mut(page)?.areas = restored;
        self.release_areas(current)?;
        self.touch(page)?;
        log::debug!("Restored page areas of {}", page);
        Ok(true)
    }

    fn release_areas(&mut self, areas: PageAreas) -> Result<(), LayoutError> {
        for area in areas.to_array() {
            self.node_mut(area)?.attachment = Attachment::Detached;
            self.discard(area)?;
        }
        Ok(())
    }
}
