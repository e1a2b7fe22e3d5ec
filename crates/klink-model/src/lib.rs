//! Core data types for the klink toolchain.
//!
//! This crate defines the fundamental types shared by the dependency graph
//! diagnostics and the cinterop commonization planner: module identities and
//! versions, resolved dependency nodes, Kotlin/Native targets, commonizer
//! target trees, interop identifiers, shared work items, and invocation
//! parameters.
//!
//! This crate is intentionally free of I/O and process spawning.

pub mod dependency;
pub mod interop;
pub mod target;
