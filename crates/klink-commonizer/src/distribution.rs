//! Distribution-provided dependency libraries for concrete targets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use klink_model::target::KonanTarget;

/// Registry of dependency libraries shipped with the Kotlin/Native
/// distribution, keyed by concrete leaf target.
pub trait NativeDistribution {
    fn dependencies_for(&self, target: KonanTarget) -> BTreeSet<PathBuf>;
}

/// The standard distribution layout: `klib/common/stdlib` shared by every
/// target plus `klib/platform/<target>/` per-target platform libraries.
pub struct KonanDistribution {
    klib_dir: PathBuf,
}

impl KonanDistribution {
    pub fn new(konan_home: &Path) -> Self {
        Self {
            klib_dir: konan_home.join("klib"),
        }
    }
}

impl NativeDistribution for KonanDistribution {
    fn dependencies_for(&self, target: KonanTarget) -> BTreeSet<PathBuf> {
        let mut libraries = BTreeSet::new();

        let stdlib = self.klib_dir.join("common").join("stdlib");
        if stdlib.exists() {
            libraries.insert(stdlib);
        }

        let platform_dir = self.klib_dir.join("platform").join(target.name());
        match std::fs::read_dir(&platform_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    libraries.insert(entry.path());
                }
            }
            Err(_) => {
                tracing::debug!(
                    "No platform libraries for {target} at {}",
                    platform_dir.display()
                );
            }
        }

        libraries
    }
}
