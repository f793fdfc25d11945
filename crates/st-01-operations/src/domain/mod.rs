//! Domain layer: operation model and the document it mutates.

pub mod delta;
pub mod document;
pub mod errors;
pub mod long_form;
pub mod operation;
pub mod patches;
pub mod signed_data;
pub mod suffix_data;
pub mod validation;
