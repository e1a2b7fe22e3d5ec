//! Shared utilities for the klink toolchain.
//!
//! This crate provides cross-cutting concerns used by all other klink
//! crates: error types, filesystem helpers, process spawning, and logging
//! initialization.

pub mod errors;
pub mod fs;
pub mod logging;
pub mod process;
