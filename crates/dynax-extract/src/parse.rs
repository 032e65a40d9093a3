//! Blocking gzip + tar stage.
//!
//! Runs on a `spawn_blocking` thread and feeds [`ArchiveEntry`] values to the
//! async side. Both channels are bounded, so a slow writer stalls parsing,
//! which in turn stops pulling bytes off the network.

use std::io::{self, Read};

use bytes::BytesMut;
use flate2::read::GzDecoder;
use tar::Archive;
use tokio::sync::mpsc;
use tracing::debug;

use crate::entry::{ArchiveEntry, EntryKind};
use crate::error::{Error, Result, StageFault};

/// Entries discovered but not yet picked up by the coordinator.
pub(crate) const ENTRY_QUEUE: usize = 16;

/// Body chunks buffered per entry.
pub(crate) const BODY_QUEUE: usize = 8;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseOutcome {
    /// Every entry was handed over and the gzip trailer checked out.
    Finished,
    /// The consumer hung up first.
    Abandoned,
}

/// Gzip decoder that tags its own failures.
///
/// Errors already carrying a [`StageFault`] come from the network below and
/// pass through untouched.
struct GzipStage<R> {
    inner: GzDecoder<R>,
}

impl<R: Read> GzipStage<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: GzDecoder::new(reader),
        }
    }
}

impl<R: Read> Read for GzipStage<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::Interrupted || StageFault::find(&e).is_some() {
                e
            } else {
                StageFault::Decompression(e.to_string()).into_io()
            }
        })
    }
}

/// Parse a gzipped tar stream, sending file and directory entries in
/// archive order.
pub(crate) fn parse_archive<R: Read>(
    reader: R,
    entries: mpsc::Sender<ArchiveEntry>,
) -> Result<ParseOutcome> {
    let mut archive = Archive::new(GzipStage::new(reader));

    for entry in archive.entries().map_err(Error::from_parse)? {
        let mut entry = entry.map_err(Error::from_parse)?;
        let entry_type = entry.header().entry_type();
        let path = entry.path().map_err(Error::from_parse)?.into_owned();

        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_file() {
            EntryKind::File
        } else {
            debug!(path = %path.display(), ?entry_type, "skipping unsupported entry");
            continue;
        };
        let mode = entry.header().mode().ok();

        let (body_tx, body_rx) = mpsc::channel(BODY_QUEUE);
        if entries
            .blocking_send(ArchiveEntry::new(path, kind, mode, body_rx))
            .is_err()
        {
            return Ok(ParseOutcome::Abandoned);
        }
        if !pump_body(&mut entry, &body_tx)? {
            return Ok(ParseOutcome::Abandoned);
        }
    }

    // The tar end marker can arrive before the gzip trailer. Reading to the
    // end verifies the checksum and lets progress reach the full length.
    let mut rest = archive.into_inner();
    io::copy(&mut rest, &mut io::sink()).map_err(Error::from_parse)?;

    Ok(ParseOutcome::Finished)
}

/// Forward one entry's body. Returns `false` if the receiver went away.
fn pump_body<R: Read>(body: &mut R, chunks: &mpsc::Sender<bytes::Bytes>) -> Result<bool> {
    loop {
        let mut buf = BytesMut::zeroed(CHUNK_SIZE);
        let n = match body.read(&mut buf) {
            Ok(0) => return Ok(true),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::from_parse(e)),
        };
        buf.truncate(n);
        if chunks.blocking_send(buf.freeze()).is_err() {
            return Ok(false);
        }
    }
}
