//! Fatal linker issues: composed diagnostics for unresolvable symbols and
//! modules.
//!
//! Issues are not recoverable. Raising one delivers the full message
//! through the diagnostic sink at ERROR severity and hands back the fatal
//! linker error, which the caller must propagate; compilation never
//! continues past a raised issue.

use std::cmp::Ordering;

use klink_model::dependency::{DependencyId, ResolvedModules};
use klink_util::errors::KlinkError;

use crate::render::render_dependency_tree;

/// Severity of a delivered diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Where composed diagnostics are delivered. Implemented by the host
/// compiler or build tool.
pub trait DiagnosticSink {
    fn report(&mut self, severity: Severity, message: &str);
}

/// A fully composed, fatal linker diagnostic.
#[derive(Debug, Clone)]
pub struct LinkerIssue {
    message: String,
}

impl LinkerIssue {
    /// A requested symbol was found neither in its owning module nor in any
    /// of that module's dependencies.
    pub fn symbol_not_found(
        symbol: &str,
        module_id: &DependencyId,
        modules: &ResolvedModules,
        comparator: impl Fn(&DependencyId, &DependencyId) -> Ordering,
    ) -> Self {
        let mut message = String::new();
        // cause:
        message.push_str(&format!(
            "Module {module_id} has a reference to symbol {symbol}."
        ));
        message.push_str(" Neither the module itself nor its dependencies contain such declaration.");

        // explanation:
        message.push_str("\n\nThis could happen if the required dependency is missing in the project.");
        message.push_str(&format!(
            " Or if there are two (or more) dependency libraries, where one library ({module_id})"
        ));
        message.push_str(" was compiled against the different version of the other library");
        message.push_str(" than the one currently used in the project.");

        // action items:
        message.push_str(
            " Please check that the project configuration is correct and has consistent versions of all required dependencies.",
        );

        // the tree of dependencies:
        message.push_str("\n\n");
        message.push_str(&render_dependency_tree(modules, Some(module_id), comparator));

        Self { message }
    }

    /// A module could not be loaded at all; no resolved graph exists at
    /// this failure point, so no tree is attached.
    pub fn no_deserializer_for_module(module_name: &str, symbol: Option<&str>) -> Self {
        let mut message = format!("Could not load module {module_name}");
        if let Some(symbol) = symbol {
            message.push_str(&format!(
                " in an attempt to find deserializer for symbol {symbol}."
            ));
        }
        Self { message }
    }

    /// A lower-level symbol type mismatch. The upstream message is included
    /// verbatim; the offending module is not structurally identifiable, so
    /// the attached tree carries no problem marker.
    pub fn symbol_type_mismatch(
        cause: &str,
        modules: &ResolvedModules,
        comparator: impl Fn(&DependencyId, &DependencyId) -> Ordering,
    ) -> Self {
        let mut message = String::from(cause);

        // explanation:
        message.push_str("\n\nThis could happen if there are two (or more) dependency libraries,");
        message.push_str(" where one library was compiled against the different version of the other library");
        message.push_str(" than the one currently used in the project.");

        // action items:
        message.push_str(
            " Please check that the project configuration is correct and has consistent versions of dependencies.",
        );

        // the tree of dependencies:
        message.push_str("\n\n");
        message.push_str(&render_dependency_tree(modules, None, comparator));

        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Deliver the message at ERROR severity and return the fatal signal
    /// for the caller to propagate.
    pub fn raise(self, sink: &mut dyn DiagnosticSink) -> KlinkError {
        sink.report(Severity::Error, &self.message);
        KlinkError::Linker
    }
}
