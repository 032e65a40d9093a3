//! Streaming download, gzip decompression and tar extraction of package
//! archives.
//!
//! # Architecture
//!
//! The pipeline never buffers a whole archive:
//! - [`HttpClient`] - Response body as a byte stream, progress counted per chunk
//! - `parse.rs` - Blocking gzip + tar stage, entries sent over bounded channels
//! - [`Extractor`] - Async coordinator: path mapping, [`DirectoryCache`],
//!   semaphore-bounded writer tasks, completion gate
//!
//! # Key Features
//!
//! - **Backpressure**: Slow disks stall parsing, which stops network reads
//! - **Contained**: Entry paths with `..` or a root are refused, never normalized
//! - **Mechanism-Only**: No retries or cleanup; caller handles progress UI

mod dirs;
mod entry;
mod error;
mod extractor;
mod http;
mod options;
mod parse;
mod path;
mod progress;

pub use dirs::DirectoryCache;
pub use entry::{ArchiveEntry, EntryKind};
pub use error::{Error, Result};
pub use extractor::{Extractor, extract};
pub use http::{BoxStream, Download, HttpClient};
pub use options::{
    DEFAULT_MAX_CONCURRENT_WRITES, ExtractOptions, RESPONSE_TIMEOUT, RenameFn, unescape_dotfile,
};
pub use path::{destination_for, strip_package_root};
pub use progress::{ExtractPhase, Progress, ProgressFn};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
