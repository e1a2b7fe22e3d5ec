use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// All Kotlin/Native leaf targets the commonizer can produce output for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum KonanTarget {
    IosArm64,
    IosSimulatorArm64,
    IosX64,
    MacosArm64,
    MacosX64,
    LinuxX64,
    LinuxArm64,
    MingwX64,
    TvosArm64,
    TvosSimulatorArm64,
    WatchosArm64,
    WatchosSimulatorArm64,
    #[serde(rename = "android_arm64")]
    AndroidNativeArm64,
    #[serde(rename = "android_x64")]
    AndroidNativeX64,
}

impl KonanTarget {
    /// Parse a target name (Kotlin/Native identity or Gradle camelCase)
    /// into a `KonanTarget`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ios_arm64" | "iosArm64" => Some(Self::IosArm64),
            "ios_simulator_arm64" | "iosSimulatorArm64" => Some(Self::IosSimulatorArm64),
            "ios_x64" | "iosX64" => Some(Self::IosX64),
            "macos_arm64" | "macosArm64" => Some(Self::MacosArm64),
            "macos_x64" | "macosX64" => Some(Self::MacosX64),
            "linux_x64" | "linuxX64" => Some(Self::LinuxX64),
            "linux_arm64" | "linuxArm64" => Some(Self::LinuxArm64),
            "mingw_x64" | "mingwX64" => Some(Self::MingwX64),
            "tvos_arm64" | "tvosArm64" => Some(Self::TvosArm64),
            "tvos_simulator_arm64" | "tvosSimulatorArm64" => Some(Self::TvosSimulatorArm64),
            "watchos_arm64" | "watchosArm64" => Some(Self::WatchosArm64),
            "watchos_simulator_arm64" | "watchosSimulatorArm64" => {
                Some(Self::WatchosSimulatorArm64)
            }
            "android_arm64" | "androidNativeArm64" => Some(Self::AndroidNativeArm64),
            "android_x64" | "androidNativeX64" => Some(Self::AndroidNativeX64),
            _ => None,
        }
    }

    /// The Kotlin/Native identity name, as used in the distribution's
    /// `klib/platform/` layout and on the commonizer command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IosArm64 => "ios_arm64",
            Self::IosSimulatorArm64 => "ios_simulator_arm64",
            Self::IosX64 => "ios_x64",
            Self::MacosArm64 => "macos_arm64",
            Self::MacosX64 => "macos_x64",
            Self::LinuxX64 => "linux_x64",
            Self::LinuxArm64 => "linux_arm64",
            Self::MingwX64 => "mingw_x64",
            Self::TvosArm64 => "tvos_arm64",
            Self::TvosSimulatorArm64 => "tvos_simulator_arm64",
            Self::WatchosArm64 => "watchos_arm64",
            Self::WatchosSimulatorArm64 => "watchos_simulator_arm64",
            Self::AndroidNativeArm64 => "android_arm64",
            Self::AndroidNativeX64 => "android_x64",
        }
    }

    /// Returns `true` if this target is an Apple platform (iOS, macOS,
    /// tvOS, watchOS).
    pub fn is_apple(&self) -> bool {
        matches!(
            self,
            Self::IosArm64
                | Self::IosSimulatorArm64
                | Self::IosX64
                | Self::MacosArm64
                | Self::MacosX64
                | Self::TvosArm64
                | Self::TvosSimulatorArm64
                | Self::WatchosArm64
                | Self::WatchosSimulatorArm64
        )
    }
}

impl fmt::Display for KonanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A commonizer target: either a single concrete Kotlin/Native target or a
/// shared grouping of nested commonizer targets.
///
/// Shared targets compare via their flattened leaf set for planning
/// purposes; see [`crate::interop::SharedInterop::is_proper_subset_of`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommonizerTarget {
    Leaf(KonanTarget),
    Shared(BTreeSet<CommonizerTarget>),
}

impl CommonizerTarget {
    /// Convenience constructor for a shared grouping of leaf targets.
    pub fn shared(targets: impl IntoIterator<Item = KonanTarget>) -> Self {
        Self::Shared(targets.into_iter().map(Self::Leaf).collect())
    }

    /// Flatten to the set of concrete leaf targets.
    pub fn leaves(&self) -> BTreeSet<KonanTarget> {
        match self {
            Self::Leaf(target) => std::iter::once(*target).collect(),
            Self::Shared(targets) => targets.iter().flat_map(CommonizerTarget::leaves).collect(),
        }
    }

    /// Canonical textual identity: `ios_arm64` for a leaf,
    /// `(ios_arm64, ios_x64)` for a shared grouping.
    pub fn identity_string(&self) -> String {
        match self {
            Self::Leaf(target) => target.name().to_string(),
            Self::Shared(targets) => {
                let inner: Vec<String> =
                    targets.iter().map(CommonizerTarget::identity_string).collect();
                format!("({})", inner.join(", "))
            }
        }
    }
}

impl fmt::Display for CommonizerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity_string())
    }
}
