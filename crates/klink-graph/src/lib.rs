//! Dependency graph resolution and diagnostics for the Kotlin IR linker.
//!
//! Merges per-library resolution records into one consistent graph,
//! compresses the Kotlin/Native platform libraries into a single synthetic
//! row for display, renders deterministic dependency trees, and composes
//! the fatal linker issues shown to the user.

pub mod compress;
pub mod issues;
pub mod merge;
pub mod render;
