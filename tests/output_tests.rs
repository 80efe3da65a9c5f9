mod common;

use common::fixtures::*;
use common::{TestResult, add_band, init_logger};
use folio::{
    FolioError, OutputProcessor, PageCollector, PageSetup, PageSummary, RenderTree, StyleKey,
};

fn commit_page(tree: &mut RenderTree, page: folio::NodeId) -> Result<(), FolioError> {
    let content = tree.content_area(page)?;
    tree.close(content)?;
    tree.close(page)?;
    tree.mark_seen_deep(page)?;
    tree.commit_deep(page)?;
    Ok(())
}

#[test]
fn test_collector_keeps_frozen_copies() -> TestResult {
    init_logger();
    let mut tree = RenderTree::new();
    let setup = PageSetup::from_json(&a4_setup().to_string())?;
    let page = setup.create_page(&mut tree)?;
    let content = tree.content_area(page)?;
    add_band(&mut tree, content, 120)?;
    tree.set_page_range(page, 0, 800)?;
    commit_page(&mut tree, page)?;

    let mut collector = PageCollector::new();
    collector.process_page(&mut tree, page)?;
    assert_eq!(collector.logical_page_count(), 1);
    assert_eq!(collector.physical_page_count(), 1);

    let stored = collector.pages()[0];
    assert!(tree.node(stored)?.is_frozen());
    assert_ne!(stored, page);
    assert_eq!(
        collector.summaries()[0],
        PageSummary {
            index: 0,
            page_offset: 0,
            page_end: 800,
            header_size: 0,
            physical_pages: 1,
            node_count: 3,
        }
    );
    assert!(tree.is_committed(page)?);
    Ok(())
}

#[test]
fn test_collector_rejects_uncommitted_pages() -> TestResult {
    let mut tree = RenderTree::new();
    let page = PageSetup::from_json(&a4_setup().to_string())?.create_page(&mut tree)?;
    let mut collector = PageCollector::new();

    let result = collector.process_page(&mut tree, page);
    assert!(matches!(result, Err(FolioError::Output(_))));
    assert_eq!(collector.logical_page_count(), 0);

    let style = tree.default_style();
    let not_a_page = tree.create_box(folio::NodeKind::Block, style)?;
    assert!(matches!(
        collector.process_page(&mut tree, not_a_page),
        Err(FolioError::Layout(folio::LayoutError::NotALogicalPage(_)))
    ));
    Ok(())
}

#[test]
fn test_tiled_pages_count_every_sheet() -> TestResult {
    init_logger();
    let mut tree = RenderTree::new();
    let setup = PageSetup::from_json(&tiled_letter_setup(2, 3).to_string())?;
    assert!(setup.style.get_length(StyleKey::PaddingTop).value() > 0);

    let mut collector = PageCollector::new();
    for start in [0, 1_584_000] {
        let page = setup.create_page(&mut tree)?;
        tree.page_breaks_mut(page)?.add_major_break(start, 0)?;
        tree.set_page_range(page, start, start + 1_584_000)?;
        commit_page(&mut tree, page)?;
        collector.process_page(&mut tree, page)?;
    }

    assert_eq!(collector.logical_page_count(), 2);
    assert_eq!(collector.physical_page_count(), 12);
    let grid = tree.page_grid(collector.pages()[1])?;
    assert_eq!((grid.row_count(), grid.column_count()), (2, 3));

    let json = collector.summary_json()?;
    let parsed: Vec<PageSummary> = serde_json::from_str(&json)?;
    assert_eq!(parsed, collector.summaries());
    assert!(json.contains("\"pageOffset\": 1584000"));
    Ok(())
}

#[test]
fn test_invalid_setup_is_rejected() {
    let result = PageSetup::from_json(r#"{ "page": { "pages": [] } }"#);
    assert!(matches!(result, Err(FolioError::Json(_))));

    let result = PageSetup::from_json(
        r#"{ "page": { "pages": [ { "format": {} } ] }, "style": { "padding-top": "wide" } }"#,
    );
    assert!(result.is_err());
}
