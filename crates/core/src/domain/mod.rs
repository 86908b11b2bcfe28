pub mod analysis;
pub mod catalog;
pub mod contract;
pub mod financial;
