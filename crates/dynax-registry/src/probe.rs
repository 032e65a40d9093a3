use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::{MetadataSource, RegistryClient};
use crate::endpoints::Endpoints;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Detect whether the internal registry is reachable.
///
/// Environment detection only: every failure means "not internal" and is
/// never propagated.
pub async fn probe_internal<S: MetadataSource>(source: &S, endpoints: &Endpoints) -> bool {
    let url = match Url::parse(&endpoints.probe_url) {
        Ok(url) => url,
        Err(e) => {
            debug!(probe_url = %endpoints.probe_url, error = %e, "invalid probe URL");
            return false;
        }
    };

    match source.get_json(&url, Some(PROBE_TIMEOUT)).await {
        Ok(body) => body.get("db_name").and_then(Value::as_str) == Some("registry"),
        Err(e) => {
            debug!(%url, error = %e, "internal registry probe failed");
            false
        }
    }
}

impl<S: MetadataSource> RegistryClient<S> {
    pub async fn probe_internal(&self) -> bool {
        probe_internal(self.source(), self.endpoints()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::StaticSource;
    use serde_json::json;

    fn endpoints() -> Endpoints {
        Endpoints {
            probe_url: "http://probe.internal/".to_owned(),
            ..Endpoints::default()
        }
    }

    #[tokio::test]
    async fn registry_database_means_internal() {
        let source = StaticSource::default().with("http://probe.internal/", json!({ "db_name": "registry" }));
        assert!(probe_internal(&source, &endpoints()).await);
    }

    #[tokio::test]
    async fn other_database_is_not_internal() {
        let source = StaticSource::default().with("http://probe.internal/", json!({ "db_name": "mirror" }));
        let client = RegistryClient::new(source, endpoints());
        assert!(!client.probe_internal().await);
    }

    #[tokio::test]
    async fn transport_failure_is_swallowed() {
        assert!(!probe_internal(&StaticSource::default(), &endpoints()).await);
    }

    #[tokio::test]
    async fn invalid_probe_url_is_swallowed() {
        let endpoints = Endpoints {
            probe_url: "::nope::".to_owned(),
            ..Endpoints::default()
        };
        assert!(!probe_internal(&StaticSource::default(), &endpoints).await);
    }
}
