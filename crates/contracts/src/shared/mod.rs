pub mod months;
pub mod pagination;
