pub mod page_breaks;
pub mod pagination;
