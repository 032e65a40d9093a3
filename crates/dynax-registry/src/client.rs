use std::future::Future;
use std::time::Duration;

use dynax_version::{RequestedVersion, VersionSet, latest_compatible, satisfying};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::endpoints::Endpoints;
use crate::error::{Error, Result};
use crate::metadata::PackageMetadata;
use crate::resolve::{locate_tarball, resolve_version};

/// Asynchronous JSON transport.
///
/// # Implementations
///
/// - [`ReqwestSource`]: Production implementation using `reqwest`
/// - In-memory sources for testing
pub trait MetadataSource: Send + Sync {
    /// `GET` a JSON document. `timeout` bounds the whole request when set.
    ///
    /// Implementations map every transport, status and decode failure to
    /// [`Error::RegistryUnavailable`].
    fn get_json(
        &self,
        url: &Url,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Production transport using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestSource {
    client: reqwest::Client,
}

impl ReqwestSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("dynax/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Client)?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl MetadataSource for ReqwestSource {
    async fn get_json(&self, url: &Url, timeout: Option<Duration>) -> Result<Value> {
        let unavailable = |e: reqwest::Error| Error::RegistryUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let mut request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(unavailable)?
            .json::<Value>()
            .await
            .map_err(unavailable)
    }
}

/// Registry lookups for package documents, versions and tarballs.
pub struct RegistryClient<S: MetadataSource = ReqwestSource> {
    source: S,
    endpoints: Endpoints,
}

impl RegistryClient<ReqwestSource> {
    pub fn with_reqwest(endpoints: Endpoints) -> Result<Self> {
        Ok(Self::new(ReqwestSource::new()?, endpoints))
    }
}

impl<S: MetadataSource> RegistryClient<S> {
    pub fn new(source: S, endpoints: Endpoints) -> Self {
        Self { source, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// `<registry>/<name>`, with a scoped name kept as one encoded segment.
    pub fn metadata_url(&self, name: &str, registry: Option<&str>) -> Result<Url> {
        let base = registry.unwrap_or_else(|| self.endpoints.registry_for(name));
        let invalid = || Error::InvalidUrl {
            url: base.to_owned(),
        };

        let mut url = Url::parse(base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    pub async fn fetch_metadata(
        &self,
        name: &str,
        registry: Option<&str>,
    ) -> Result<PackageMetadata> {
        let url = self.metadata_url(name, registry)?;
        debug!(%url, "fetching package metadata");

        let document = self.source.get_json(&url, None).await?;
        serde_json::from_value(document).map_err(|e| Error::RegistryUnavailable {
            url: url.to_string(),
            reason: format!("malformed package document: {e}"),
        })
    }

    pub async fn versions(&self, name: &str, registry: Option<&str>) -> Result<VersionSet> {
        Ok(self.fetch_metadata(name, registry).await?.version_set())
    }

    /// Target of the `latest` dist-tag.
    pub async fn latest_version(&self, name: &str, registry: Option<&str>) -> Result<String> {
        let metadata = self.fetch_metadata(name, registry).await?;
        metadata
            .tag(dynax_version::LATEST_TAG)
            .map(str::to_owned)
            .ok_or_else(|| Error::VersionNotFound {
                name: name.to_owned(),
                requested: dynax_version::LATEST_TAG.to_owned(),
            })
    }

    /// Published versions satisfying `range`, highest first.
    pub async fn satisfying_versions(
        &self,
        name: &str,
        range: &str,
        registry: Option<&str>,
    ) -> Result<Vec<String>> {
        let versions = self.versions(name, registry).await?;
        Ok(satisfying(range, &versions)?)
    }

    /// Highest published version in the caret range of `base`.
    pub async fn latest_compatible_version(
        &self,
        name: &str,
        base: &str,
        registry: Option<&str>,
    ) -> Result<Option<String>> {
        let versions = self.versions(name, registry).await?;
        Ok(latest_compatible(base, &versions))
    }

    /// Resolve an exact version or dist-tag to a published version.
    pub async fn resolve(
        &self,
        name: &str,
        requested: Option<&str>,
        registry: Option<&str>,
    ) -> Result<String> {
        let metadata = self.fetch_metadata(name, registry).await?;
        resolve_version(name, &metadata, &RequestedVersion::parse(requested))
    }

    /// Resolve `requested` and return its archive URL from one document fetch.
    pub async fn tarball_url(
        &self,
        name: &str,
        requested: Option<&str>,
        registry: Option<&str>,
    ) -> Result<(String, String)> {
        let metadata = self.fetch_metadata(name, registry).await?;
        let version = resolve_version(name, &metadata, &RequestedVersion::parse(requested))?;
        let tarball = locate_tarball(name, &metadata, &version)?;
        debug!(name, %version, %tarball, "located tarball");
        Ok((version, tarball))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves fixed documents and records every requested URL.
    #[derive(Default)]
    pub(crate) struct StaticSource {
        documents: HashMap<String, Value>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub(crate) fn with(mut self, url: &str, document: Value) -> Self {
            self.documents.insert(url.to_owned(), document);
            self
        }
    }

    impl MetadataSource for StaticSource {
        async fn get_json(&self, url: &Url, _timeout: Option<Duration>) -> Result<Value> {
            self.requests.lock().unwrap().push(url.to_string());
            self.documents
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| Error::RegistryUnavailable {
                    url: url.to_string(),
                    reason: "404 Not Found".to_owned(),
                })
        }
    }

    fn demo_document() -> Value {
        json!({
            "dist-tags": { "latest": "1.5.3", "next": "2.0.0" },
            "versions": {
                "1.0.0": { "dist": { "tarball": "https://registry.npmmirror.com/demo/-/demo-1.0.0.tgz" } },
                "1.2.0": { "dist": { "tarball": "https://registry.npmmirror.com/demo/-/demo-1.2.0.tgz" } },
                "1.5.3": { "dist": { "tarball": "https://registry.npmmirror.com/demo/-/demo-1.5.3.tgz" } },
                "2.0.0": { "dist": { "tarball": "https://registry.npmmirror.com/demo/-/demo-2.0.0.tgz" } }
            }
        })
    }

    fn client() -> RegistryClient<StaticSource> {
        let source =
            StaticSource::default().with("https://registry.npmmirror.com/demo", demo_document());
        RegistryClient::new(source, Endpoints::default())
    }

    #[test]
    fn metadata_url_joins_without_double_slash() {
        let client = client();
        let url = client.metadata_url("demo", Some("http://mirror.local/npm/")).unwrap();
        assert_eq!(url.as_str(), "http://mirror.local/npm/demo");
    }

    #[test]
    fn metadata_url_encodes_scope_separator() {
        let client = client();
        let url = client.metadata_url("@vitejs/plugin-react", None).unwrap();
        assert_eq!(url.as_str(), "https://registry.npmmirror.com/@vitejs%2Fplugin-react");
    }

    #[test]
    fn metadata_url_rejects_garbage_registry() {
        let client = client();
        assert!(matches!(
            client.metadata_url("demo", Some("not a url")),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn resolves_tag_and_locates_tarball() {
        let (version, tarball) = client().tarball_url("demo", Some("next"), None).await.unwrap();
        assert_eq!(version, "2.0.0");
        assert!(tarball.ends_with("demo-2.0.0.tgz"));
    }

    #[tokio::test]
    async fn every_call_refetches() {
        let client = client();
        client.latest_version("demo", None).await.unwrap();
        client.versions("demo", None).await.unwrap();
        assert_eq!(client.source().requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn latest_compatible_over_registry_versions() {
        let client = client();
        let found = client.latest_compatible_version("demo", "1.2.0", None).await.unwrap();
        assert_eq!(found.as_deref(), Some("1.5.3"));
        let none = client.latest_compatible_version("demo", "3.0.0", None).await.unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn satisfying_versions_highest_first() {
        let matched = client().satisfying_versions("demo", "^1", None).await.unwrap();
        assert_eq!(matched, vec!["1.5.3", "1.2.0", "1.0.0"]);
    }

    #[tokio::test]
    async fn unknown_package_is_registry_unavailable() {
        let err = client().fetch_metadata("missing", None).await.unwrap_err();
        assert!(matches!(err, Error::RegistryUnavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_document_is_registry_unavailable() {
        let source = StaticSource::default()
            .with("https://registry.npmmirror.com/bad", json!({ "dist-tags": ["latest"] }));
        let client = RegistryClient::new(source, Endpoints::default());
        let err = client.fetch_metadata("bad", None).await.unwrap_err();
        assert!(matches!(err, Error::RegistryUnavailable { ref reason, .. } if reason.contains("malformed")));
    }

    #[tokio::test]
    async fn latest_without_tag_is_version_not_found() {
        let source = StaticSource::default()
            .with("https://registry.npmmirror.com/untagged", json!({ "versions": { "1.0.0": {} } }));
        let client = RegistryClient::new(source, Endpoints::default());
        let err = client.latest_version("untagged", None).await.unwrap_err();
        assert!(matches!(err, Error::VersionNotFound { .. }));
    }
}
