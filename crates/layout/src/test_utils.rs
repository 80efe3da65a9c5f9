use crate::{LayoutError, NodeId, NodeKind, RenderTree};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn boxed(tree: &mut RenderTree, kind: NodeKind) -> Result<NodeId, LayoutError> {
    let style = tree.default_style();
    tree.create_box(kind, style)
}

pub fn block(tree: &mut RenderTree) -> Result<NodeId, LayoutError> {
    boxed(tree, NodeKind::Block)
}

pub fn text(tree: &mut RenderTree, content: &str) -> NodeId {
    let style = tree.default_style();
    tree.create_text(content, style)
}
