//! Stable identity for invocation parameter sets.
//!
//! Output directories must be unique per parameter set. The directory name
//! combines a readable target identity with a hash over the canonical JSON
//! form of the full parameter set (targets and interops), so parameter sets
//! that share a target list still get disjoint directories.

use klink_model::interop::CommonizationParameters;
use sha2::{Digest, Sha256};

/// Readable prefixes longer than this fall back to a target count.
const MAX_READABLE_PREFIX: usize = 100;

/// Short hex fingerprint of the full parameter set.
pub fn parameters_fingerprint(parameters: &CommonizationParameters) -> String {
    let mut hasher = Sha256::new();
    let canonical = serde_json::to_string(parameters).unwrap_or_default();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{digest:x}");
    hex[..12].to_string()
}

/// Directory name for one invocation: `<targets>-<fingerprint>`.
pub fn output_directory_name(parameters: &CommonizationParameters) -> String {
    let joined = parameters
        .targets
        .iter()
        .map(|target| target.name())
        .collect::<Vec<_>>()
        .join(".");
    let prefix = if joined.len() <= MAX_READABLE_PREFIX {
        joined
    } else {
        format!("{}-targets", parameters.targets.len())
    };
    format!("{}-{}", prefix, parameters_fingerprint(parameters))
}
