//! Scaffolding for new package directories.
//!
//! Generates the directory structure and metadata files of a new package:
//! manifest, README, changelog, license, gitignore, and the source/test
//! directories. Identity fields are normalized before anything touches the
//! filesystem, so the scaffolded layout always uses the canonical names.

mod manifest;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use log::debug;

pub use manifest::PackageManifest;

use crate::identifier::{self, NormalizedId};
use crate::runtime::Runtime;

/// Inputs to a scaffold, as typed by the user (un-normalized).
#[derive(Debug, Clone)]
pub struct NewPackageOptions {
    /// Short package name; becomes the directory name after normalization.
    pub name: String,
    pub display_name: String,
    /// Dotted identifier; coerced into `tld.owner.name` shape.
    pub full_name: String,
    pub author: String,
    pub description: String,
}

/// Scaffold action - creates a new package directory under a root.
pub struct ScaffoldAction<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> ScaffoldAction<'a, R> {
    pub fn new(runtime: &'a R, root: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            root: root.into(),
        }
    }

    /// Create the package directory and all template files.
    ///
    /// Refuses to touch an existing directory. Returns the path of the new
    /// package directory.
    pub fn create(&self, opts: &NewPackageOptions) -> Result<PathBuf> {
        let id = identifier::normalize(&opts.name, &opts.full_name);
        debug!(
            "Creating package structure with name={}, display name={}, fully qualified name={}, and author={}",
            id.short, opts.display_name, id.full, opts.author
        );

        let base = self.root.join(&id.short);
        if self.runtime.exists(&base) {
            anyhow::bail!(
                "Folder named {} already exists; not doing anything.",
                id.short
            );
        }

        self.runtime.create_dir_all(&base)?;
        self.write_manifest(&base, &id, opts)?;
        self.write_readme(&base, &id, opts)?;
        self.write_changelog(&base)?;
        self.write_license(&base, opts)?;
        self.write_gitignore(&base)?;
        self.runtime.create_dir_all(&base.join("src"))?;
        self.runtime.create_dir_all(&base.join("tests"))?;

        Ok(base)
    }

    fn write_manifest(
        &self,
        base: &Path,
        id: &NormalizedId,
        opts: &NewPackageOptions,
    ) -> Result<()> {
        let manifest = PackageManifest::new(
            &id.short,
            &opts.author,
            &opts.description,
            &opts.display_name,
        );
        let json = serde_json::to_string_pretty(&manifest)?;
        self.runtime.write(&base.join("package.json"), json.as_bytes())
    }

    fn write_readme(
        &self,
        base: &Path,
        id: &NormalizedId,
        opts: &NewPackageOptions,
    ) -> Result<()> {
        let contents = format!(
            "# {display}\n\n\
             {description}\n\n\
             This package template was generated by pkgkit.\n\n\
             You can import this package into your project by adding the following line \
             into the `dependencies` section of your project manifest:\n\n\
             ```\"{full}\": \"https://github.com/{owner}/{short}\"```\n",
            display = opts.display_name,
            description = opts.description,
            full = id.full,
            owner = id.owner(),
            short = id.short,
        );
        self.runtime.write(&base.join("README.md"), contents.as_bytes())
    }

    fn write_changelog(&self, base: &Path) -> Result<()> {
        let contents = format!(
            "# Changelog\n\
             All notable changes to this project will be documented in this file.\n\n\
             The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.0.0),\n\
             and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).\n\n\
             ## [Unreleased]\n\n\
             ## [1.0.0] - {date}\n\
             Initial template - generated by pkgkit\n",
            date = Local::now().format("%Y-%m-%d"),
        );
        self.runtime.write(&base.join("CHANGELOG.md"), contents.as_bytes())
    }

    fn write_license(&self, base: &Path, opts: &NewPackageOptions) -> Result<()> {
        let contents = format!(
            "Copyright {year} {author}\n\
             Creative Commons Attribution 4.0 International License (CC BY 4.0)\n\
             https://creativecommons.org/licenses/by/4.0\n\
             Unless expressly provided otherwise, the Software under this license is \
             made available strictly on an \"AS IS\" BASIS WITHOUT WARRANTY OF ANY KIND, \
             EXPRESS OR IMPLIED. Please review the license for details on these and \
             other terms and conditions.\n",
            year = Local::now().format("%Y"),
            author = opts.author,
        );
        self.runtime.write(&base.join("LICENSE.md"), contents.as_bytes())
    }

    fn write_gitignore(&self, base: &Path) -> Result<()> {
        let contents = "/target\n*.log\n.DS_Store\n";
        self.runtime.write(&base.join(".gitignore"), contents.as_bytes())
    }
}
