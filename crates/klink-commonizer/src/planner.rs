//! Invocation planning for cinterop commonization.
//!
//! Every shared native compilation contributes a [`SharedInterop`]
//! observation. Many of those observations describe overlapping subsets of
//! the same work, so running the commonizer once per observation would
//! redo expensive merges. The planner reduces the observations to their
//! maximal elements under the proper-subset relation and dispatches one
//! invocation per maximal element.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use klink_model::interop::{CommonizationParameters, InteropIdentifier, SharedInterop};
use klink_model::target::KonanTarget;
use klink_util::errors::KlinkError;
use klink_util::fs;

use crate::dispatch::{Commonizer, CommonizeRequest, CommonizerDependency};
use crate::distribution::NativeDistribution;
use crate::settings::CommonizerSettings;

/// Registration record for one concrete cinterop build: the produced
/// library plus the dependency files it was built against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct InteropGist {
    pub identifier: InteropIdentifier,
    pub target: KonanTarget,
    pub library_file: PathBuf,
    pub dependencies: BTreeSet<PathBuf>,
}

/// Plans and dispatches commonizer invocations.
///
/// The planner carries no derived state: every query recomputes roots and
/// subsets from the current registrations. Registration is purely
/// additive; exclusion is purely subtractive filtering by identifier.
#[derive(Debug, Default)]
pub struct CommonizerPlanner {
    interops: BTreeSet<InteropGist>,
    shared: BTreeSet<SharedInterop>,
}

impl CommonizerPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a concrete cinterop build.
    pub fn register(&mut self, gist: InteropGist) {
        self.interops.insert(gist);
    }

    /// Record one shared compilation's (target set, interop set) need.
    pub fn record_shared(&mut self, shared: SharedInterop) {
        self.shared.insert(shared);
    }

    /// Remove registrations by interop identifier.
    pub fn exclude(&mut self, identifiers: &[InteropIdentifier]) {
        self.interops
            .retain(|gist| !identifiers.contains(&gist.identifier));
    }

    /// Compute the minimal set of invocations covering every recorded
    /// shared work item.
    pub fn parameters(&self) -> BTreeSet<CommonizationParameters> {
        let registered: BTreeSet<InteropIdentifier> = self
            .interops
            .iter()
            .map(|gist| gist.identifier.clone())
            .collect();

        // References to unregistered (e.g. excluded or stale) interops must
        // not influence planning.
        let items: BTreeSet<SharedInterop> = self
            .shared
            .iter()
            .map(|item| item.retain_registered(&registered))
            .collect();

        items
            .iter()
            // An item is a root iff no other item strictly supersedes it.
            .filter(|candidate| !items.iter().any(|other| candidate.is_proper_subset_of(other)))
            .map(|root| {
                // The external tool operates per concrete target: rewrite
                // the root and its subsumed items to leaf granularity.
                let mut targets: BTreeSet<KonanTarget> = root.target.leaves();
                for subset in items.iter().filter(|other| other.is_proper_subset_of(root)) {
                    targets.extend(subset.target.leaves());
                }
                CommonizationParameters {
                    targets,
                    interops: root.interops.clone(),
                }
            })
            .collect()
    }

    /// Find the single invocation that covers `shared`.
    ///
    /// More than one covering invocation means the reduction produced
    /// overlapping coverage, which is a bug in the planner rather than an
    /// input error.
    pub fn find_parameters(&self, shared: &SharedInterop) -> Option<CommonizationParameters> {
        let supported: Vec<CommonizationParameters> = self
            .parameters()
            .into_iter()
            .filter(|parameters| parameters.supports(shared))
            .collect();
        if supported.is_empty() {
            return None;
        }
        assert!(
            supported.len() == 1,
            "Unnecessary work detected: multiple commonizer invocations cover the same shared interops"
        );
        supported.into_iter().next()
    }

    /// Output directory of the invocation covering `shared`, if any.
    /// Callers wire this as the compile dependency of the corresponding
    /// shared compilation.
    pub fn commonized_output_directory(
        &self,
        settings: &CommonizerSettings,
        shared: &SharedInterop,
    ) -> Option<PathBuf> {
        self.find_parameters(shared)
            .map(|parameters| settings.output_directory_for(&parameters))
    }

    /// Dispatch every computed invocation to the external commonizer.
    ///
    /// Invocations are independent (disjoint output directories); they are
    /// dispatched sequentially here and any scheduling beyond that is the
    /// caller's concern.
    pub fn commonize_all(
        &self,
        settings: &CommonizerSettings,
        distribution: &dyn NativeDistribution,
        commonizer: &dyn Commonizer,
    ) -> miette::Result<()> {
        for parameters in self.parameters() {
            self.commonize(&parameters, settings, distribution, commonizer)?;
        }
        Ok(())
    }

    fn commonize(
        &self,
        parameters: &CommonizationParameters,
        settings: &CommonizerSettings,
        distribution: &dyn NativeDistribution,
        commonizer: &dyn Commonizer,
    ) -> miette::Result<()> {
        let members: Vec<&InteropGist> = self
            .interops
            .iter()
            .filter(|gist| parameters.interops.contains(&gist.identifier))
            .collect();

        // Wipe first: a re-run must never see stale output, even when the
        // invocation ends up being skipped.
        let output_directory = settings.output_directory_for(parameters);
        fs::remove_dir_recursively(&output_directory).map_err(KlinkError::Io)?;

        let input_libraries: BTreeSet<PathBuf> = members
            .iter()
            .map(|gist| gist.library_file.clone())
            .filter(|path| path.is_file())
            .collect();
        if input_libraries.is_empty() {
            tracing::debug!(
                "Skipping commonization into {}: no input libraries",
                output_directory.display()
            );
            return Ok(());
        }

        let mut dependency_libraries: BTreeSet<CommonizerDependency> = members
            .iter()
            .flat_map(|gist| gist.dependencies.iter().cloned())
            .map(CommonizerDependency::NonTargeted)
            .collect();
        for target in &parameters.targets {
            for library in distribution.dependencies_for(*target) {
                dependency_libraries.insert(CommonizerDependency::Targeted(*target, library));
            }
        }

        fs::ensure_dir(&output_directory).map_err(KlinkError::Io)?;
        write_plan_record(&output_directory, parameters)?;

        commonizer.commonize_libraries(&CommonizeRequest {
            konan_home: settings.konan_home.clone(),
            output_targets: parameters.targets.clone(),
            input_libraries,
            dependency_libraries,
            output_directory,
            log_level: settings.log_level,
        })
    }
}

/// Name of the per-invocation plan record file.
pub const PLAN_RECORD_FILE: &str = ".commonizer-parameters.json";

/// Record what is about to be produced, for stale-output inspection and
/// host-tool up-to-date checks.
fn write_plan_record(
    output_directory: &Path,
    parameters: &CommonizationParameters,
) -> miette::Result<()> {
    let record = serde_json::to_string_pretty(parameters).map_err(|e| KlinkError::Generic {
        message: format!("Failed to encode commonizer parameters: {e}"),
    })?;
    std::fs::write(output_directory.join(PLAN_RECORD_FILE), record).map_err(KlinkError::Io)?;
    Ok(())
}
