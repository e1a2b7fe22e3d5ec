//! Shared work items and invocation parameters for cinterop commonization.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::target::{CommonizerTarget, KonanTarget};

/// Identity of one cinterop library within a project.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct InteropIdentifier {
    /// The module (compilation unit) that declared the interop.
    pub module: String,
    /// The interop name as declared in the build configuration.
    pub name: String,
}

impl InteropIdentifier {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for InteropIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.name)
    }
}

/// A (target set, interop set) pair describing one shared native
/// compilation's need for a commonized artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SharedInterop {
    pub target: CommonizerTarget,
    pub interops: BTreeSet<InteropIdentifier>,
}

impl SharedInterop {
    pub fn new(
        target: CommonizerTarget,
        interops: impl IntoIterator<Item = InteropIdentifier>,
    ) -> Self {
        Self {
            target,
            interops: interops.into_iter().collect(),
        }
    }

    /// Proper-subset relation used for invocation planning.
    ///
    /// Holds iff both the flattened target set and the interop set of
    /// `self` are strictly dominated by `other`. Equality in either
    /// dimension breaks the relation: exact duplicates are not proper
    /// subsets of each other.
    pub fn is_proper_subset_of(&self, other: &SharedInterop) -> bool {
        let own_leaves = self.target.leaves();
        let other_leaves = other.target.leaves();
        own_leaves != other_leaves
            && other_leaves.is_superset(&own_leaves)
            && self.interops != other.interops
            && other.interops.is_superset(&self.interops)
    }

    /// Copy of this item with interop references not present in
    /// `registered` dropped.
    pub fn retain_registered(&self, registered: &BTreeSet<InteropIdentifier>) -> SharedInterop {
        SharedInterop {
            target: self.target.clone(),
            interops: self
                .interops
                .iter()
                .filter(|interop| registered.contains(*interop))
                .cloned()
                .collect(),
        }
    }
}

/// A single planned invocation of the external commonizer.
///
/// Targets are rewritten to leaf granularity: the external tool operates
/// per concrete target, not per shared grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommonizationParameters {
    /// Concrete leaf targets covered by this invocation.
    pub targets: BTreeSet<KonanTarget>,
    /// Interops commonized by this invocation.
    pub interops: BTreeSet<InteropIdentifier>,
}

impl CommonizationParameters {
    /// Whether this invocation covers the given shared work item.
    pub fn supports(&self, shared: &SharedInterop) -> bool {
        self.targets.is_superset(&shared.target.leaves())
            && self.interops.is_superset(&shared.interops)
    }
}
