//! Registry metadata lookup, version resolution and tarball location.
//!
//! # Architecture
//!
//! - `endpoints.rs` - Endpoint configuration (defaults, TOML file, environment)
//! - `metadata.rs` - Registry document model
//! - `resolve.rs` - Exact/tag resolution and tarball lookup over a document
//! - `client.rs` - Transport abstraction and the registry client
//! - `probe.rs` - Internal network detection
//! - `project.rs` - Local `package.json` helpers
//!
//! Nothing here caches: every lookup re-fetches the package document.

pub use client::{MetadataSource, RegistryClient, ReqwestSource};
pub use endpoints::{Endpoints, INTERNAL_SCOPES, is_internal};
pub use error::{Error, Result};
pub use metadata::{PackageMetadata, VersionRecord};
pub use probe::{PROBE_TIMEOUT, probe_internal};
pub use project::{installed_version, read_package_json};
pub use resolve::{locate_tarball, resolve_version};

pub use dynax_version::{RequestedVersion, VersionSet};

mod client;
mod endpoints;
mod error;
mod metadata;
mod probe;
mod project;
mod resolve;
