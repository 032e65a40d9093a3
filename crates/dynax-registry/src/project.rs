//! Helpers for reading a local project's manifests.

use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};

const MANIFEST: &str = "package.json";

/// Parse `<project_dir>/package.json`.
pub async fn read_package_json(project_dir: &Path) -> Result<Value> {
    let path = project_dir.join(MANIFEST);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| manifest_error(&path, e))?;
    if !exists {
        return Err(Error::ManifestNotFound(project_dir.to_path_buf()));
    }
    read_json(&path).await
}

/// Version of `package` as installed under `<project_dir>/node_modules`.
pub async fn installed_version(project_dir: &Path, package: &str) -> Result<String> {
    let path = project_dir.join("node_modules").join(package).join(MANIFEST);
    let manifest = read_json(&path).await?;
    manifest
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::Manifest {
            path,
            reason: "missing string field 'version'".to_owned(),
        })
}

async fn read_json(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| manifest_error(path, e))?;
    serde_json::from_slice(&raw).map_err(|e| manifest_error(path, e))
}

fn manifest_error(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::Manifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
