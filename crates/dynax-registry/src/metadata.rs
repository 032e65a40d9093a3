use std::collections::BTreeMap;

use dynax_version::VersionSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registry document for one package name.
///
/// Only `versions` and `dist-tags` are read; everything else the registry
/// sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub versions: BTreeMap<String, VersionRecord>,
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: BTreeMap<String, String>,
}

/// Per-version document, kept opaque so a malformed record only fails the
/// lookup that touches it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRecord(Value);

impl VersionRecord {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn version(&self) -> Option<&str> {
        self.0.get("version").and_then(Value::as_str)
    }

    /// `dist.tarball`, if both the block and the URL are present.
    pub fn tarball(&self) -> Option<&str> {
        self.0
            .get("dist")
            .and_then(|dist| dist.get("tarball"))
            .and_then(Value::as_str)
    }
}

impl PackageMetadata {
    pub fn version_set(&self) -> VersionSet {
        self.versions.keys().cloned().collect()
    }

    pub fn tag(&self, tag: &str) -> Option<&str> {
        self.dist_tags.get(tag).map(String::as_str)
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_registry_document() {
        let metadata: PackageMetadata = serde_json::from_value(json!({
            "name": "demo",
            "dist-tags": { "latest": "1.0.0", "beta": "2.0.0-beta.1" },
            "versions": {
                "1.0.0": { "version": "1.0.0", "dist": { "tarball": "https://r/demo-1.0.0.tgz", "shasum": "x" } },
                "2.0.0-beta.1": { "version": "2.0.0-beta.1", "dist": {} }
            },
            "time": {}
        }))
        .unwrap();

        assert_eq!(metadata.tag("beta"), Some("2.0.0-beta.1"));
        assert_eq!(metadata.versions["1.0.0"].tarball(), Some("https://r/demo-1.0.0.tgz"));
        assert_eq!(metadata.versions["1.0.0"].version(), Some("1.0.0"));
        assert_eq!(metadata.versions["2.0.0-beta.1"].tarball(), None);
        assert_eq!(metadata.version_set().len(), 2);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let metadata: PackageMetadata = serde_json::from_value(json!({ "name": "bare" })).unwrap();
        assert!(metadata.versions.is_empty());
        assert!(metadata.dist_tags.is_empty());
    }

    #[test]
    fn malformed_version_record_is_tolerated() {
        let metadata: PackageMetadata = serde_json::from_value(json!({
            "versions": { "1.0.0": "oops" }
        }))
        .unwrap();
        assert!(metadata.has_version("1.0.0"));
        assert_eq!(metadata.versions["1.0.0"].tarball(), None);
    }
}
