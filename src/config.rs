//! Tracked-package configuration.
//!
//! The tracked list is fixed for the life of the process. It comes from an
//! explicit file when given, from the user's config directory when present,
//! and otherwise from the built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::runtime::Runtime;
use crate::tracker::PackageRef;

/// Registry used when neither flag, env, nor config file names one.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.srawls.dev";

/// On-disk shape of the config file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    registry_url: Option<String>,
    #[serde(default)]
    packages: Vec<PackageRef>,
}

/// Resolved configuration for the tracker commands.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub registry_url: String,
    pub packages: Vec<PackageRef>,
}

impl TrackerConfig {
    /// Resolve the configuration.
    ///
    /// `packages_file` wins over the per-user config file; `registry_url`
    /// (from flag or env) wins over whatever the file names.
    pub fn load<R: Runtime>(
        runtime: &R,
        packages_file: Option<&Path>,
        registry_url: Option<String>,
    ) -> Result<Self> {
        let file = match packages_file {
            Some(path) => Some(Self::read_file(runtime, path)?),
            None => match Self::user_config_path(runtime) {
                Some(path) if runtime.exists(&path) => Some(Self::read_file(runtime, &path)?),
                _ => None,
            },
        };

        let (file_url, packages) = match file {
            Some(file) => {
                let packages = if file.packages.is_empty() {
                    default_packages()
                } else {
                    file.packages
                };
                (file.registry_url, packages)
            }
            None => {
                debug!("No package config file; using built-in package list");
                (None, default_packages())
            }
        };

        Ok(Self {
            registry_url: registry_url
                .or(file_url)
                .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            packages,
        })
    }

    fn read_file<R: Runtime>(runtime: &R, path: &Path) -> Result<ConfigFile> {
        let contents = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read package config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse package config {}", path.display()))
    }

    fn user_config_path<R: Runtime>(runtime: &R) -> Option<PathBuf> {
        runtime
            .config_dir()
            .map(|dir| dir.join("pkgkit").join("packages.json"))
    }
}

/// The built-in tracked set.
pub fn default_packages() -> Vec<PackageRef> {
    vec![
        PackageRef::new(
            "Core Library",
            "com.srawls1.core",
            "https://github.com/srawls1/core.git",
        ),
        PackageRef::new(
            "Hitboxes",
            "com.srawls1.hitboxes",
            "https://github.com/srawls1/HitBoxes.git",
        ),
    ]
}
