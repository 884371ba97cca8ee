//! Package manifest model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The `package.json` written into a freshly scaffolded package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    pub display_name: String,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// A fresh manifest at the initial version with no dependencies.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            author: author.into(),
            description: description.into(),
            display_name: display_name.into(),
            dependencies: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serializes_with_camel_case_display_name() {
        let manifest = PackageManifest::new("core", "Spencer", "Fill me in!", "Core Library");
        let json = serde_json::to_string_pretty(&manifest).unwrap();

        assert!(json.contains("\"displayName\": \"Core Library\""));
        assert!(json.contains("\"version\": \"1.0.0\""));
        assert!(json.contains("\"dependencies\": {}"));
    }

    #[test]
    fn test_manifest_round_trips_through_json() {
        let manifest = PackageManifest::new("core", "Spencer", "Fill me in!", "Core Library");
        let json = serde_json::to_string(&manifest).unwrap();
        let back: PackageManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_manifest_tolerates_missing_dependencies() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{
                "name": "core",
                "version": "1.0.0",
                "author": "Spencer",
                "description": "Fill me in!",
                "displayName": "Core Library"
            }"#,
        )
        .unwrap();
        assert!(manifest.dependencies.is_empty());
    }
}
