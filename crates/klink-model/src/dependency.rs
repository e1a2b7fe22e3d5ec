//! The resolved dependency model shared by graph merging, compression,
//! rendering, and issue reporting.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Identity of a module/library inside a resolved dependency graph.
///
/// One reserved value, [`DependencyId::source_root`], denotes the unit being
/// compiled. It is the implicit top of every graph: it never has incoming
/// edges and never identifies a real node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(String);

impl DependencyId {
    /// Reserved name of the unit being compiled.
    pub const SOURCE_ROOT_NAME: &'static str = "<source code>";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The reserved sentinel for the unit being compiled.
    pub fn source_root() -> Self {
        Self(Self::SOURCE_ROOT_NAME.to_string())
    }

    pub fn is_source_root(&self) -> bool {
        self.0 == Self::SOURCE_ROOT_NAME
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A library version as recorded during resolution.
///
/// The empty string means the version is unknown/unspecified. Two versions
/// are equal iff their underlying strings are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyVersion(String);

impl DependencyVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The unknown/unspecified version.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node of a resolved dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDependency {
    /// Identity; unique within a resolved map.
    pub id: DependencyId,
    /// The version actually in use after resolution.
    pub selected_version: DependencyVersion,
    /// For every module that depends on this one (including the source
    /// root), the version that dependent requested.
    pub requested_versions: BTreeMap<DependencyId, DependencyVersion>,
    /// Physical artifacts backing this node. Empty for synthetic nodes.
    pub artifact_paths: BTreeSet<PathBuf>,
    /// Whether this node is shown as a direct child of the source root.
    /// Only gates first-level display; deeper occurrences always render.
    pub visible_as_first_level: bool,
}

impl ResolvedDependency {
    pub fn new(id: DependencyId, selected_version: DependencyVersion) -> Self {
        Self {
            id,
            selected_version,
            requested_versions: BTreeMap::new(),
            artifact_paths: BTreeSet::new(),
            visible_as_first_level: true,
        }
    }
}

/// The merged, de-duplicated mapping from module identity to its resolution
/// record.
///
/// Built once by the merger, optionally rewritten by compression, then
/// treated as read-only for rendering. All node creation goes through
/// [`ResolvedModules::ensure`]; no node escapes as an independently mutable
/// aliased reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedModules {
    modules: BTreeMap<DependencyId, ResolvedDependency>,
}

impl ResolvedModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the node for `id`, creating a default one (unknown version, no
    /// artifacts) if this is the first time the id is seen.
    pub fn ensure(&mut self, id: &DependencyId) -> &mut ResolvedDependency {
        self.modules
            .entry(id.clone())
            .or_insert_with(|| ResolvedDependency::new(id.clone(), DependencyVersion::unknown()))
    }

    /// Insert a node wholesale, replacing any previous node with the same id.
    pub fn insert(&mut self, module: ResolvedDependency) {
        self.modules.insert(module.id.clone(), module);
    }

    pub fn get(&self, id: &DependencyId) -> Option<&ResolvedDependency> {
        self.modules.get(id)
    }

    pub fn get_mut(&mut self, id: &DependencyId) -> Option<&mut ResolvedDependency> {
        self.modules.get_mut(id)
    }

    pub fn contains(&self, id: &DependencyId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn values(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.modules.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &DependencyId> {
        self.modules.keys()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
