//! Cinterop commonization planning and dispatch.
//!
//! Collects the (target set, interop set) observations produced by the
//! shared native compilations of a project, reduces them to the minimal set
//! of non-redundant commonizer invocations, and dispatches each invocation
//! to the external commonizer tool shipped with the Kotlin/Native
//! distribution.

pub mod dispatch;
pub mod distribution;
pub mod fingerprint;
pub mod planner;
pub mod settings;
