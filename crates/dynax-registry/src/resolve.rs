//! Resolution of a requested version against one registry document.

use dynax_version::{LATEST_TAG, RequestedVersion};
use semver::Version;

use crate::error::{Error, Result};
use crate::metadata::PackageMetadata;

/// Turn `requested` into a version that is a key of `metadata.versions`.
///
/// Exact versions must be published as-is. Tags fall back to `latest` when
/// absent, and the tag's target must itself be a published semver version.
pub fn resolve_version(
    name: &str,
    metadata: &PackageMetadata,
    requested: &RequestedVersion,
) -> Result<String> {
    let candidate = match requested {
        RequestedVersion::Exact(version) => Some(version.to_string()),
        RequestedVersion::Tag(tag) => metadata
            .tag(tag)
            .or_else(|| metadata.tag(LATEST_TAG))
            .filter(|target| Version::parse(target).is_ok())
            .map(str::to_owned),
    };

    candidate
        .filter(|version| metadata.has_version(version))
        .ok_or_else(|| Error::VersionNotFound {
            name: name.to_owned(),
            requested: requested.to_string(),
        })
}

/// Download URL of the archive for `version`.
pub fn locate_tarball(name: &str, metadata: &PackageMetadata, version: &str) -> Result<String> {
    metadata
        .versions
        .get(version)
        .and_then(|record| record.tarball())
        .map(str::to_owned)
        .ok_or_else(|| Error::TarballNotFound {
            name: name.to_owned(),
            version: version.to_owned(),
        })
}
