//! Application layer: extraction, formatting, selection, and the response
//! manager.

pub mod classify;
pub mod extract;
pub mod format;
pub mod manager;
pub mod select;
