pub mod fixtures;
pub mod tree_assertions;

use folio::{LayoutError, NodeId, NodeKind, RenderTree};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a block of the given committed height and appends it to `parent`.
pub fn add_band(tree: &mut RenderTree, parent: NodeId, height: i64) -> Result<NodeId, LayoutError> {
    let style = tree.default_style();
    let band = tree.create_box(NodeKind::Block, style)?;
    tree.add_child(parent, band)?;
    tree.set_height(band, height)?;
    Ok(band)
}
