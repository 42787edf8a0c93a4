//! Domain types shared across the extraction and selection layers.

pub mod errors;
pub mod model;
