pub mod audit;
pub mod context;
pub mod document;
pub mod target;
