pub mod position;
pub mod risk;
pub mod summary;
