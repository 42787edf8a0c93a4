//! Infrastructure adapters for configuration and external picker tools.

pub mod config;
pub mod tools;
