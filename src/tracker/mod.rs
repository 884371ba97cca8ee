//! Installation-state tracking for a fixed set of remote packages.
//!
//! Each tracked package owns a small state machine ([`PackageTracker`])
//! driven by polling; [`TrackerRegistry`] owns the set of trackers and the
//! single shared list operation their reconciliations share. All mutation
//! happens on ticks from one caller-owned scheduler loop.

mod package;
mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use package::PackageTracker;
pub use registry::TrackerRegistry;

/// Identity of a trackable package. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    /// Human label shown by the presentation layer.
    pub display_name: String,
    /// Dotted identifier used as the registry key.
    pub canonical_id: String,
    /// Where an add is installed from (remote archive/VCS reference).
    pub source_locator: String,
}

impl PackageRef {
    pub fn new(
        display_name: impl Into<String>,
        canonical_id: impl Into<String>,
        source_locator: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            canonical_id: canonical_id.into(),
            source_locator: source_locator.into(),
        }
    }
}

/// Observable installation state of one tracked package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing observed yet; the state before the first reconciliation.
    #[default]
    Unknown,
    /// An add, remove, or list is outstanding for this package.
    Loading,
    Present,
    Absent,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unknown => write!(f, "unknown"),
            Status::Loading => write!(f, "loading"),
            Status::Present => write!(f, "installed"),
            Status::Absent => write!(f, "not installed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Unknown.to_string(), "unknown");
        assert_eq!(Status::Loading.to_string(), "loading");
        assert_eq!(Status::Present.to_string(), "installed");
        assert_eq!(Status::Absent.to_string(), "not installed");
    }

    #[test]
    fn test_package_ref_round_trips_through_json() {
        let package = PackageRef::new(
            "Core Library",
            "com.srawls1.core",
            "https://github.com/srawls1/core.git",
        );
        let json = serde_json::to_string(&package).unwrap();
        let back: PackageRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, package);
    }
}
