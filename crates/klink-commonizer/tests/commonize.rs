use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::PathBuf;

use klink_commonizer::dispatch::{Commonizer, CommonizeRequest, CommonizerDependency};
use klink_commonizer::distribution::NativeDistribution;
use klink_commonizer::planner::{CommonizerPlanner, InteropGist, PLAN_RECORD_FILE};
use klink_commonizer::settings::{CommonizerLogLevel, CommonizerSettings};
use klink_model::interop::{InteropIdentifier, SharedInterop};
use klink_model::target::{CommonizerTarget, KonanTarget};
use tempfile::TempDir;

/// Records every request instead of spawning the external tool.
#[derive(Default)]
struct RecordingCommonizer {
    requests: RefCell<Vec<CommonizeRequest>>,
}

impl Commonizer for RecordingCommonizer {
    fn commonize_libraries(&self, request: &CommonizeRequest) -> miette::Result<()> {
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

/// A distribution that hands out one fixed stdlib path per target.
struct FixedDistribution {
    stdlib: PathBuf,
}

impl NativeDistribution for FixedDistribution {
    fn dependencies_for(&self, _target: KonanTarget) -> BTreeSet<PathBuf> {
        [self.stdlib.clone()].into_iter().collect()
    }
}

fn interop(name: &str) -> InteropIdentifier {
    InteropIdentifier::new(":app", name)
}

fn settings(tmp: &TempDir) -> CommonizerSettings {
    CommonizerSettings {
        konan_home: tmp.path().join("konan"),
        output_directory: tmp.path().join("out"),
        log_level: CommonizerLogLevel::Quiet,
    }
}

fn write_library(tmp: &TempDir, name: &str) -> PathBuf {
    let path = tmp.path().join(format!("{name}.klib"));
    std::fs::write(&path, b"klib").unwrap();
    path
}

#[test]
fn dispatch_assembles_inputs_dependencies_and_output_directory() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(&tmp);
    let curl_lib = write_library(&tmp, "curl-ios_arm64");
    let dep_lib = write_library(&tmp, "libz");

    let mut planner = CommonizerPlanner::new();
    planner.register(InteropGist {
        identifier: interop("curl"),
        target: KonanTarget::IosArm64,
        library_file: curl_lib.clone(),
        dependencies: [dep_lib.clone()].into_iter().collect(),
    });
    planner.record_shared(SharedInterop::new(
        CommonizerTarget::shared([KonanTarget::IosArm64, KonanTarget::IosX64]),
        [interop("curl")],
    ));

    let distribution = FixedDistribution {
        stdlib: tmp.path().join("stdlib"),
    };
    let commonizer = RecordingCommonizer::default();
    planner
        .commonize_all(&settings, &distribution, &commonizer)
        .unwrap();

    let requests = commonizer.requests.borrow();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.konan_home, settings.konan_home);
    assert_eq!(
        request.output_targets,
        [KonanTarget::IosArm64, KonanTarget::IosX64].into_iter().collect()
    );
    assert_eq!(request.input_libraries, [curl_lib].into_iter().collect());

    // Declared inter-item dependencies arrive untargeted; distribution
    // libraries arrive once per covered leaf target.
    assert!(request
        .dependency_libraries
        .contains(&CommonizerDependency::NonTargeted(dep_lib)));
    for target in [KonanTarget::IosArm64, KonanTarget::IosX64] {
        assert!(request.dependency_libraries.contains(
            &CommonizerDependency::Targeted(target, tmp.path().join("stdlib"))
        ));
    }

    // The output directory was created fresh and records the plan.
    assert!(request.output_directory.starts_with(&settings.output_directory));
    assert!(request.output_directory.join(PLAN_RECORD_FILE).is_file());
}

#[test]
fn dispatch_wipes_stale_output_before_running() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(&tmp);
    let curl_lib = write_library(&tmp, "curl-ios_arm64");

    let mut planner = CommonizerPlanner::new();
    planner.register(InteropGist {
        identifier: interop("curl"),
        target: KonanTarget::IosArm64,
        library_file: curl_lib,
        dependencies: BTreeSet::new(),
    });
    let item = SharedInterop::new(
        CommonizerTarget::shared([KonanTarget::IosArm64, KonanTarget::IosX64]),
        [interop("curl")],
    );
    planner.record_shared(item.clone());

    // Seed a stale artifact where the invocation will write.
    let output_directory = planner
        .commonized_output_directory(&settings, &item)
        .unwrap();
    std::fs::create_dir_all(&output_directory).unwrap();
    let stale = output_directory.join("stale.klib");
    std::fs::write(&stale, b"old").unwrap();

    let distribution = FixedDistribution {
        stdlib: tmp.path().join("stdlib"),
    };
    let commonizer = RecordingCommonizer::default();
    planner
        .commonize_all(&settings, &distribution, &commonizer)
        .unwrap();

    assert!(!stale.exists());
    assert_eq!(commonizer.requests.borrow().len(), 1);
}

#[test]
fn dispatch_skips_invocation_with_no_existing_inputs() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(&tmp);

    let mut planner = CommonizerPlanner::new();
    planner.register(InteropGist {
        identifier: interop("curl"),
        target: KonanTarget::IosArm64,
        // Never written to disk.
        library_file: tmp.path().join("missing.klib"),
        dependencies: BTreeSet::new(),
    });
    let item = SharedInterop::new(
        CommonizerTarget::shared([KonanTarget::IosArm64, KonanTarget::IosX64]),
        [interop("curl")],
    );
    planner.record_shared(item.clone());

    // Stale output from an earlier run must still be wiped.
    let output_directory = planner
        .commonized_output_directory(&settings, &item)
        .unwrap();
    std::fs::create_dir_all(&output_directory).unwrap();

    let distribution = FixedDistribution {
        stdlib: tmp.path().join("stdlib"),
    };
    let commonizer = RecordingCommonizer::default();
    planner
        .commonize_all(&settings, &distribution, &commonizer)
        .unwrap();

    assert!(commonizer.requests.borrow().is_empty());
    assert!(!output_directory.exists());
}

#[test]
fn empty_planner_makes_no_external_calls() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(&tmp);
    let planner = CommonizerPlanner::new();
    let distribution = FixedDistribution {
        stdlib: tmp.path().join("stdlib"),
    };
    let commonizer = RecordingCommonizer::default();
    planner
        .commonize_all(&settings, &distribution, &commonizer)
        .unwrap();
    assert!(commonizer.requests.borrow().is_empty());
}

#[test]
fn disjoint_invocations_get_disjoint_output_directories() {
    let tmp = TempDir::new().unwrap();
    let settings = settings(&tmp);
    let curl_lib = write_library(&tmp, "curl-ios_arm64");
    let sqlite_lib = write_library(&tmp, "sqlite-linux_x64");

    let mut planner = CommonizerPlanner::new();
    planner.register(InteropGist {
        identifier: interop("curl"),
        target: KonanTarget::IosArm64,
        library_file: curl_lib,
        dependencies: BTreeSet::new(),
    });
    planner.register(InteropGist {
        identifier: interop("sqlite"),
        target: KonanTarget::LinuxX64,
        library_file: sqlite_lib,
        dependencies: BTreeSet::new(),
    });
    planner.record_shared(SharedInterop::new(
        CommonizerTarget::shared([KonanTarget::IosArm64, KonanTarget::IosX64]),
        [interop("curl")],
    ));
    planner.record_shared(SharedInterop::new(
        CommonizerTarget::shared([KonanTarget::LinuxX64, KonanTarget::LinuxArm64]),
        [interop("sqlite")],
    ));

    let distribution = FixedDistribution {
        stdlib: tmp.path().join("stdlib"),
    };
    let commonizer = RecordingCommonizer::default();
    planner
        .commonize_all(&settings, &distribution, &commonizer)
        .unwrap();

    let requests = commonizer.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].output_directory, requests[1].output_directory);
}
