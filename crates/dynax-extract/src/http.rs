use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::Result;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An opened archive response.
pub struct Download {
    /// Advertised `Content-Length`, if any.
    pub content_length: Option<u64>,

    /// Compressed body chunks in arrival order.
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP client abstraction.
///
/// The extractor only needs a streaming GET. Implementations follow
/// redirects and map non-success statuses to [`Error::Network`].
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - In-memory clients for testing
///
/// [`Error::Network`]: crate::Error::Network
pub trait HttpClient: Send + Sync {
    /// Send the request and return once response headers have arrived.
    fn open(&self, url: &str) -> impl Future<Output = Result<Download>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::TryStreamExt;

    use super::*;
    use crate::error::Error;
    use crate::options::RESPONSE_TIMEOUT;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder()
                .user_agent(concat!("dynax/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(RESPONSE_TIMEOUT)
                .build()
                .map_err(|e| Error::Network(e.to_string()))?;
            Ok(Self { client })
        }

        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        async fn open(&self, url: &str) -> Result<Download> {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| network_error(url, e))?;

            let content_length = response.content_length();
            let url = url.to_owned();
            let body = response
                .bytes_stream()
                .map_err(move |e| network_error(&url, e));

            Ok(Download {
                content_length,
                body: Box::pin(body),
            })
        }
    }

    fn network_error(url: &str, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::NetworkTimeout { url: url.to_owned() }
        } else {
            Error::Network(e.to_string())
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
