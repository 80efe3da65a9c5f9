// src/setup.rs
use crate::error::FolioError;
use folio_layout::{NodeId, RenderTree};
use folio_style::StyleSheet;
use folio_types::PageDefinition;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The page setup of a report as stored in its JSON definition.
///
/// ```json
/// {
///   "page": { "pages": [ { "format": { "size": "A4", "margins": { "top": 36 } } } ] },
///   "style": { "padding-top": "4pt" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub page: PageDefinition,
    #[serde(default)]
    pub style: StyleSheet,
}

impl PageSetup {
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a fresh logical page for this setup in `tree`.
    pub fn create_page(&self, tree: &mut RenderTree) -> Result<NodeId, FolioError> {
        let style = Arc::new(self.style.clone());
        Ok(tree.create_logical_page(self.page.clone(), style)?)
    }
}
