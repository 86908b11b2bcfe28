//! Proposal deck export: layout model plus the `.pptx` package writer.

pub mod deck;
pub mod pptx;
