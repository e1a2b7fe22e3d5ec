//! External commonizer invocation.
//!
//! The commonizer itself is a black box: it accepts library paths and
//! produces merged library artifacts under the output directory. Nothing
//! here parses its results.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use klink_model::target::KonanTarget;
use klink_util::errors::KlinkError;
use klink_util::process::CommandBuilder;

use crate::settings::CommonizerLogLevel;

/// A dependency library passed to the commonizer, either bound to one
/// concrete target or visible to all of them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommonizerDependency {
    NonTargeted(PathBuf),
    Targeted(KonanTarget, PathBuf),
}

impl fmt::Display for CommonizerDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonTargeted(path) => write!(f, "{}", path.display()),
            Self::Targeted(target, path) => write!(f, "{}@{}", target.name(), path.display()),
        }
    }
}

/// One fully assembled call to the external commonizer.
#[derive(Debug, Clone)]
pub struct CommonizeRequest {
    pub konan_home: PathBuf,
    pub output_targets: BTreeSet<KonanTarget>,
    pub input_libraries: BTreeSet<PathBuf>,
    pub dependency_libraries: BTreeSet<CommonizerDependency>,
    pub output_directory: PathBuf,
    pub log_level: CommonizerLogLevel,
}

/// The external commonization tool.
pub trait Commonizer {
    fn commonize_libraries(&self, request: &CommonizeRequest) -> miette::Result<()>;
}

/// Invokes the commonizer CLI shipped with the Kotlin/Native distribution.
pub struct CliCommonizer;

impl Commonizer for CliCommonizer {
    fn commonize_libraries(&self, request: &CommonizeRequest) -> miette::Result<()> {
        let targets: Vec<&str> = request
            .output_targets
            .iter()
            .map(KonanTarget::name)
            .collect();
        tracing::info!(
            "Commonizing {} libraries for ({})",
            request.input_libraries.len(),
            targets.join(", ")
        );

        let output = CommandBuilder::new(commonizer_binary(&request.konan_home).to_string_lossy())
            .arg("commonize-libraries")
            .arg("-distribution-path")
            .arg(request.konan_home.to_string_lossy())
            .arg("-input-libraries")
            .arg(join_paths(&request.input_libraries))
            .arg("-dependency-libraries")
            .arg(join_dependencies(&request.dependency_libraries))
            .arg("-output-targets")
            .arg(targets.join(";"))
            .arg("-output-path")
            .arg(request.output_directory.to_string_lossy())
            .arg("-log-level")
            .arg(request.log_level.as_str())
            .exec()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KlinkError::Commonizer {
                message: format!("commonizer exited with {}: {}", output.status, stderr.trim()),
            }
            .into());
        }
        Ok(())
    }
}

fn commonizer_binary(konan_home: &Path) -> PathBuf {
    let name = if cfg!(windows) {
        "kotlin-native-commonizer.bat"
    } else {
        "kotlin-native-commonizer"
    };
    konan_home.join("bin").join(name)
}

fn join_paths(paths: &BTreeSet<PathBuf>) -> String {
    paths
        .iter()
        .map(|path| path.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn join_dependencies(dependencies: &BTreeSet<CommonizerDependency>) -> String {
    dependencies
        .iter()
        .map(CommonizerDependency::to_string)
        .collect::<Vec<_>>()
        .join(";")
}
