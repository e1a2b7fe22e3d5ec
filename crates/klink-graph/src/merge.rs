//! Building a resolved dependency map from raw per-library descriptors.

use std::collections::BTreeSet;
use std::path::PathBuf;

use klink_model::dependency::{DependencyId, DependencyVersion, ResolvedModules};

/// One outgoing dependency edge declared by a module descriptor.
#[derive(Debug, Clone)]
pub struct DependencyRequest {
    pub id: DependencyId,
    /// The version the declaring module asked for, when the manifest
    /// recorded one. Most Kotlin/Native manifests do not.
    pub requested_version: Option<DependencyVersion>,
}

impl DependencyRequest {
    pub fn unversioned(id: DependencyId) -> Self {
        Self {
            id,
            requested_version: None,
        }
    }
}

/// Raw resolution record for one deserialized library, as handed over by
/// the module deserializer.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    pub id: DependencyId,
    pub selected_version: DependencyVersion,
    pub artifact_path: Option<PathBuf>,
    pub dependencies: Vec<DependencyRequest>,
}

/// Merge raw descriptors into a single resolved dependency map.
///
/// The merge is best-effort: its output feeds diagnostics for failures
/// found elsewhere, so malformed input (self-referential edges, repeated
/// descriptors, duplicate artifact paths) is tolerated rather than
/// rejected.
///
/// Requested versions are stamped in a late pass, once every descriptor has
/// been seen: a selected version is not final until then. Absent an
/// explicit request on an edge, the requester is assumed to have wanted
/// whatever was ultimately selected.
pub fn merge(descriptors: impl IntoIterator<Item = ModuleDescriptor>) -> ResolvedModules {
    let mut modules = ResolvedModules::new();
    let mut described: BTreeSet<DependencyId> = BTreeSet::new();
    let mut edges: Vec<(DependencyId, DependencyRequest)> = Vec::new();

    for descriptor in descriptors {
        if descriptor.id.is_source_root() {
            // The compiling unit itself never materializes as a node.
            tracing::debug!("Ignoring descriptor with the reserved source root id");
            continue;
        }

        described.insert(descriptor.id.clone());
        let node = modules.ensure(&descriptor.id);
        if node.selected_version.is_unknown() {
            node.selected_version = descriptor.selected_version;
        }
        if let Some(path) = descriptor.artifact_path {
            node.artifact_paths.insert(path);
        }

        for request in descriptor.dependencies {
            if request.id == descriptor.id {
                tracing::debug!("Ignoring self-dependency declared by {}", descriptor.id);
                continue;
            }
            edges.push((descriptor.id.clone(), request));
        }
    }

    // Modules referenced as edge targets but never described stay at their
    // default unknown version: "referenced but never resolved" is a visible
    // gap in the rendered tree, not an error here.
    for (_, request) in &edges {
        modules.ensure(&request.id);
    }

    // Late stamping pass over the now-complete node set.
    for (source_id, request) in edges {
        if let Some(target) = modules.get_mut(&request.id) {
            let stamped = request
                .requested_version
                .unwrap_or_else(|| target.selected_version.clone());
            target.requested_versions.insert(source_id, stamped);
        }
    }

    // Every described module is, from the compiling unit's point of view, a
    // first-level dependency; the root's requested version follows the same
    // default policy.
    let root = DependencyId::source_root();
    for id in described {
        if let Some(module) = modules.get_mut(&id) {
            let selected = module.selected_version.clone();
            module.requested_versions.insert(root.clone(), selected);
        }
    }

    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, version: &str, deps: &[&str]) -> ModuleDescriptor {
        ModuleDescriptor {
            id: DependencyId::new(id),
            selected_version: DependencyVersion::new(version),
            artifact_path: Some(PathBuf::from(format!("/libs/{id}.klib"))),
            dependencies: deps
                .iter()
                .map(|dep| DependencyRequest::unversioned(DependencyId::new(*dep)))
                .collect(),
        }
    }

    #[test]
    fn described_modules_become_first_level() {
        let modules = merge([descriptor("kurl", "1.2.3", &[])]);
        let kurl = modules.get(&DependencyId::new("kurl")).unwrap();
        assert_eq!(
            kurl.requested_versions.get(&DependencyId::source_root()),
            Some(&DependencyVersion::new("1.2.3"))
        );
        assert!(kurl.visible_as_first_level);
    }

    #[test]
    fn edges_are_stamped_with_target_selected_version() {
        let modules = merge([
            descriptor("kurl", "1.2.3", &["stdlib"]),
            descriptor("stdlib", "1.8.0", &[]),
        ]);
        let stdlib = modules.get(&DependencyId::new("stdlib")).unwrap();
        assert_eq!(
            stdlib.requested_versions.get(&DependencyId::new("kurl")),
            Some(&DependencyVersion::new("1.8.0"))
        );
    }

    #[test]
    fn explicit_requested_version_wins_over_default_policy() {
        let modules = merge([
            ModuleDescriptor {
                id: DependencyId::new("kurl"),
                selected_version: DependencyVersion::new("1.2.3"),
                artifact_path: None,
                dependencies: vec![DependencyRequest {
                    id: DependencyId::new("stdlib"),
                    requested_version: Some(DependencyVersion::new("1.7.20")),
                }],
            },
            descriptor("stdlib", "1.8.0", &[]),
        ]);
        let stdlib = modules.get(&DependencyId::new("stdlib")).unwrap();
        assert_eq!(
            stdlib.requested_versions.get(&DependencyId::new("kurl")),
            Some(&DependencyVersion::new("1.7.20"))
        );
    }

    #[test]
    fn referenced_but_never_described_stays_unknown() {
        let modules = merge([descriptor("kurl", "1.2.3", &["missing"])]);
        let missing = modules.get(&DependencyId::new("missing")).unwrap();
        assert!(missing.selected_version.is_unknown());
        // Not described, so not a first-level dependency.
        assert!(!missing
            .requested_versions
            .contains_key(&DependencyId::source_root()));
        // But the traversed edge is recorded, stamped with the (unknown)
        // selected version.
        assert_eq!(
            missing.requested_versions.get(&DependencyId::new("kurl")),
            Some(&DependencyVersion::unknown())
        );
    }

    #[test]
    fn self_loops_are_ignored() {
        let modules = merge([descriptor("kurl", "1.2.3", &["kurl"])]);
        let kurl = modules.get(&DependencyId::new("kurl")).unwrap();
        assert!(!kurl.requested_versions.contains_key(&DependencyId::new("kurl")));
        assert_eq!(modules.len(), 1);
    }

    #[test]
    fn repeated_descriptors_union_artifacts_and_keep_first_version() {
        let modules = merge([
            ModuleDescriptor {
                id: DependencyId::new("kurl"),
                selected_version: DependencyVersion::new("1.2.3"),
                artifact_path: Some(PathBuf::from("/a/kurl.klib")),
                dependencies: vec![],
            },
            ModuleDescriptor {
                id: DependencyId::new("kurl"),
                selected_version: DependencyVersion::new("9.9.9"),
                artifact_path: Some(PathBuf::from("/b/kurl.klib")),
                dependencies: vec![],
            },
        ]);
        let kurl = modules.get(&DependencyId::new("kurl")).unwrap();
        assert_eq!(kurl.selected_version, DependencyVersion::new("1.2.3"));
        assert_eq!(kurl.artifact_paths.len(), 2);
    }

    #[test]
    fn source_root_descriptor_is_dropped() {
        let modules = merge([ModuleDescriptor {
            id: DependencyId::source_root(),
            selected_version: DependencyVersion::new("1.0"),
            artifact_path: None,
            dependencies: vec![],
        }]);
        assert!(modules.is_empty());
    }

    #[test]
    fn cycle_edges_are_both_recorded() {
        let modules = merge([
            descriptor("a", "1.0", &["b"]),
            descriptor("b", "1.0", &["a"]),
        ]);
        let a = modules.get(&DependencyId::new("a")).unwrap();
        let b = modules.get(&DependencyId::new("b")).unwrap();
        assert!(a.requested_versions.contains_key(&DependencyId::new("b")));
        assert!(b.requested_versions.contains_key(&DependencyId::new("a")));
    }
}
