//! Internal implementation modules for `foldicon-core`.
//!
//! Callers should use the re-exports at the crate root.

pub mod commands;
pub mod config;
pub mod restore;
pub mod runtime;
pub mod store;
pub mod tooling;
