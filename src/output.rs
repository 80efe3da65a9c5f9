// src/output.rs
//!
//! The seam between pagination and the format-specific writers.
//!
//! The report processor hands every committed logical page to an [`OutputProcessor`]. Writers
//! for concrete formats live outside this crate; [`PageCollector`] is the in-memory processor
//! used by tests and by callers that want to inspect the finished pages.

use crate::error::FolioError;
use folio_layout::{NodeId, RenderTree};
use serde::{Deserialize, Serialize};

/// A consumer of finished logical pages.
pub trait OutputProcessor {
    /// Receives a logical page once pagination has committed it.
    fn process_page(&mut self, tree: &mut RenderTree, page: NodeId) -> Result<(), FolioError>;

    fn logical_page_count(&self) -> usize;

    /// Number of physical sheets written so far. A logical page may span several.
    fn physical_page_count(&self) -> usize;
}

/// Flow geometry of one collected page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub index: usize,
    pub page_offset: i64,
    pub page_end: i64,
    pub header_size: i64,
    pub physical_pages: usize,
    pub node_count: usize,
}

/// Keeps a frozen copy of every page it receives.
#[derive(Debug, Default)]
pub struct PageCollector {
    pages: Vec<NodeId>,
    summaries: Vec<PageSummary>,
    physical_pages: usize,
}

impl PageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frozen page copies, in the order they were received.
    pub fn pages(&self) -> &[NodeId] {
        &self.pages
    }

    pub fn summaries(&self) -> &[PageSummary] {
        &self.summaries
    }

    pub fn summary_json(&self) -> Result<String, FolioError> {
        Ok(serde_json::to_string_pretty(&self.summaries)?)
    }
}

impl OutputProcessor for PageCollector {
    fn process_page(&mut self, tree: &mut RenderTree, page: NodeId) -> Result<(), FolioError> {
        let data = tree.logical_page(page)?;
        if !tree.is_committed(page)? {
            return Err(FolioError::Output(format!(
                "Logical page {} still has uncommitted content",
                page
            )));
        }
        let breaks = data.page_breaks();
        let page_index = breaks.find_page_index(data.page_offset());
        let summary = PageSummary {
            index: self.pages.len(),
            page_offset: data.page_offset(),
            page_end: data.page_end(),
            header_size: breaks.page_header_size_at(page_index).unwrap_or(0),
            physical_pages: data.page_grid().physical_page_count(),
            node_count: tree.render_box(page)?.descendant_count(),
        };

        let copy = tree.derive_frozen(page, true)?;
        log::debug!(
            "Collected logical page {} as {} ({} physical pages)",
            summary.index,
            copy,
            summary.physical_pages
        );
        self.physical_pages += summary.physical_pages;
        self.pages.push(copy);
        self.summaries.push(summary);
        Ok(())
    }

    fn logical_page_count(&self) -> usize {
        self.pages.len()
    }

    fn physical_page_count(&self) -> usize {
        self.physical_pages
    }
}
