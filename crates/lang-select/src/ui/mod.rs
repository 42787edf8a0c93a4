//! User-facing surfaces: the CLI and the built-in terminal picker.

pub mod cli;
pub mod picker;
