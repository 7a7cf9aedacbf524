pub mod catalog;
pub mod notion;
