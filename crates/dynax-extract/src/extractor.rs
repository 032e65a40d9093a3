use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::{debug, info, trace, warn};

use crate::dirs::DirectoryCache;
use crate::entry::ArchiveEntry;
use crate::error::{Error, Result, StageFault};
use crate::http::HttpClient;
use crate::options::ExtractOptions;
use crate::parse::{ENTRY_QUEUE, ParseOutcome, parse_archive};
use crate::path::destination_for;
use crate::progress::ProgressTracker;

/// Streams a `.tgz` from a URL straight onto disk.
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> dynax_extract::Result<()> {
/// use dynax_extract::Extractor;
///
/// let extractor = Extractor::with_reqwest()?;
/// let files = extractor
///     .extract("./vendor/left-pad", "https://registry.npmmirror.com/left-pad/-/left-pad-1.3.0.tgz")
///     .await?;
/// println!("{} files", files.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Extractor<C: HttpClient> {
    client: C,
    options: ExtractOptions,
}

impl<C: HttpClient> Extractor<C> {
    pub fn new(client: C) -> Self {
        Self::with_options(client, ExtractOptions::default())
    }

    pub fn with_options(client: C, options: ExtractOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Download, decompress and unpack `url` into `destination`.
    ///
    /// Returns the written file paths in the order the archive lists them.
    /// When several entries map to the same path, the last one wins and the
    /// path is listed once per entry.
    pub async fn extract(
        &self,
        destination: impl AsRef<Path>,
        url: &str,
    ) -> Result<Vec<PathBuf>> {
        extract(&self.client, destination.as_ref(), url, &self.options).await
    }
}

#[cfg(feature = "reqwest")]
impl Extractor<crate::http::ReqwestClient> {
    pub fn with_reqwest() -> Result<Self> {
        Ok(Self::new(crate::http::ReqwestClient::new()?))
    }
}

/// Run one extraction with an explicit client.
pub async fn extract<C: HttpClient>(
    client: &C,
    destination: &Path,
    url: &str,
    options: &ExtractOptions,
) -> Result<Vec<PathBuf>> {
    let result = run(client, destination, url, options).await;
    if let Err(ref e) = result {
        warn!(url, destination = %destination.display(), error = %e, "extraction failed");
    }
    result
}

async fn run<C: HttpClient>(
    client: &C,
    destination: &Path,
    url: &str,
    options: &ExtractOptions,
) -> Result<Vec<PathBuf>> {
    let download = tokio::time::timeout(options.response_timeout, client.open(url))
        .await
        .map_err(|_| Error::NetworkTimeout { url: url.to_owned() })??;
    debug!(url, content_length = ?download.content_length, "archive response opened");

    tokio::fs::create_dir_all(destination)
        .await
        .map_err(|source| Error::FileWrite {
            path: destination.to_path_buf(),
            source,
        })?;

    let tracker = Arc::new(ProgressTracker::new(
        download.content_length,
        options.on_progress.clone(),
    ));
    let counted = Arc::clone(&tracker);
    // Dropping `stop` ends the body, so a parser blocked on the network
    // returns instead of outliving the call.
    let (stop, stopped) = oneshot::channel::<()>();
    let body = download
        .body
        .take_until(stopped)
        .inspect_ok(move |chunk| counted.advance(chunk.len()))
        .map_err(|e| StageFault::network(&e).into_io());
    let reader = SyncIoBridge::new(StreamReader::new(body));

    let (entry_tx, entry_rx) = mpsc::channel(ENTRY_QUEUE);
    let parser = tokio::task::spawn_blocking(move || parse_archive(reader, entry_tx));

    // On failure the entry receiver goes too, which stops the parser at its
    // next send.
    let written = match write_entries(destination, entry_rx, options).await {
        Ok(written) => written,
        Err(e) => {
            drop(stop);
            return Err(e);
        }
    };

    let parsed = parser.await;
    drop(stop);
    match parsed {
        Ok(Ok(ParseOutcome::Finished)) => {}
        Ok(Ok(ParseOutcome::Abandoned)) => {
            return Err(Error::Interrupted(
                "writer stopped before the archive ended".to_owned(),
            ));
        }
        Ok(Err(e)) => return Err(e),
        Err(e) => return Err(interrupted(e)),
    }

    tracker.complete();
    info!(
        url,
        destination = %destination.display(),
        files = written.len(),
        bytes = tracker.downloaded(),
        "extracted archive"
    );
    Ok(written)
}

/// Fan entries out to writer tasks, bounded by the semaphore.
async fn write_entries(
    destination: &Path,
    mut entries: mpsc::Receiver<ArchiveEntry>,
    options: &ExtractOptions,
) -> Result<Vec<PathBuf>> {
    let dirs = DirectoryCache::new();
    let permits = Arc::new(Semaphore::new(options.max_concurrent_writes.max(1)));
    let mut writes = JoinSet::new();
    let mut written = Vec::new();
    let mut last_write: HashMap<PathBuf, oneshot::Receiver<()>> = HashMap::new();

    loop {
        tokio::select! {
            biased;

            Some(done) = writes.join_next(), if !writes.is_empty() => settle(done)?,

            next = entries.recv() => {
                let Some(entry) = next else { break };

                if entry.is_directory() {
                    trace!(path = %entry.path.display(), "directory entry");
                    entry.drain().await;
                    continue;
                }

                let target = destination_for(destination, &entry.path, &options.rename)?;
                if let Some(parent) = target.parent() {
                    dirs.ensure(parent).await?;
                }
                let permit = Arc::clone(&permits)
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Interrupted(e.to_string()))?;

                debug!(entry = %entry.path.display(), target = %target.display(), "writing");
                written.push(target.clone());

                // Same-path entries are written in archive order. The earlier
                // writer drops `done` when it ends, whatever the outcome.
                let (done, finished) = oneshot::channel::<()>();
                let previous = last_write.insert(target.clone(), finished);
                writes.spawn(async move {
                    let _done = done;
                    if let Some(previous) = previous {
                        let _ = previous.await;
                    }
                    write_entry(target, entry, permit).await
                });
            }
        }
    }

    while let Some(done) = writes.join_next().await {
        settle(done)?;
    }
    Ok(written)
}

fn settle(done: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    done.map_err(interrupted)?
}

fn interrupted(e: JoinError) -> Error {
    if e.is_panic() {
        Error::Interrupted(format!("pipeline task panicked: {e}"))
    } else {
        Error::Interrupted(format!("pipeline task cancelled: {e}"))
    }
}

async fn write_entry(
    target: PathBuf,
    mut entry: ArchiveEntry,
    _permit: OwnedSemaphorePermit,
) -> Result<()> {
    let mut file = File::create(&target)
        .await
        .map_err(|e| write_error(&target, e))?;
    while let Some(chunk) = entry.chunk().await {
        file.write_all(&chunk)
            .await
            .map_err(|e| write_error(&target, e))?;
    }
    file.flush().await.map_err(|e| write_error(&target, e))?;

    #[cfg(unix)]
    if let Some(mode) = entry.mode {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode & 0o777))
            .await
            .map_err(|e| write_error(&target, e))?;
    }

    Ok(())
}

fn write_error(path: &Path, source: std::io::Error) -> Error {
    Error::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}
