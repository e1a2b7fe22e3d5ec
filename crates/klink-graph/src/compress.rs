//! Display-level aggregation of Kotlin/Native platform libraries.
//!
//! A Kotlin/Native build links against 100+ platform libraries, all shipped
//! with the compiler at the same version. Showing each of them as a
//! first-level row would drown the actual project dependencies, so they are
//! folded into one synthetic row. Display layer only: real dependency
//! decisions never read the compressed map.

use std::collections::BTreeSet;

use klink_model::dependency::{
    DependencyId, DependencyVersion, ResolvedDependency, ResolvedModules,
};

/// Name prefix shared by all Kotlin/Native platform libraries.
pub const PLATFORM_LIBS_PREFIX: &str = "org.jetbrains.kotlin.native.platform.";

fn is_platform_library(id: &DependencyId) -> bool {
    id.name().starts_with(PLATFORM_LIBS_PREFIX)
}

/// Fold all first-level platform libraries into one synthetic node.
///
/// The platform libraries must agree on a single selected version; if they
/// disagree the map is returned unchanged, because a version conflict among
/// them must stay visible rather than be hidden by aggregation. Platform
/// nodes that are not direct children of the source root are never touched.
pub fn compress_platform_libraries(mut modules: ResolvedModules) -> ResolvedModules {
    let root = DependencyId::source_root();

    let mut common_version: Option<DependencyVersion> = None;
    let mut platform_ids: Vec<DependencyId> = Vec::new();
    // Non-platform modules with an incoming edge from a platform library;
    // these get rewired onto the synthetic node so they stay visible.
    let mut rewired_ids: BTreeSet<DependencyId> = BTreeSet::new();

    let mut version_conflict = false;
    for module in modules.values() {
        if is_platform_library(&module.id) {
            if !module.requested_versions.contains_key(&root) {
                continue;
            }
            match &common_version {
                Some(version) if *version != module.selected_version => {
                    // Multiple versions of platform libs. Give up.
                    version_conflict = true;
                    break;
                }
                _ => common_version = Some(module.selected_version.clone()),
            }
            platform_ids.push(module.id.clone());
        } else if module.requested_versions.keys().any(is_platform_library) {
            rewired_ids.insert(module.id.clone());
        }
    }
    if version_conflict {
        return modules;
    }

    let Some(version) = common_version else {
        return modules;
    };

    for id in &platform_ids {
        if let Some(module) = modules.get_mut(id) {
            module.visible_as_first_level = false;
        }
    }

    let synthetic_id = DependencyId::new(format!(
        "{PLATFORM_LIBS_PREFIX}* ({} libraries)",
        platform_ids.len()
    ));
    let mut synthetic = ResolvedDependency::new(synthetic_id.clone(), version.clone());
    synthetic
        .requested_versions
        .insert(root, version.clone());

    for id in &rewired_ids {
        if let Some(module) = modules.get_mut(id) {
            module
                .requested_versions
                .insert(synthetic_id.clone(), version.clone());
        }
    }

    modules.insert(synthetic);
    modules
}
