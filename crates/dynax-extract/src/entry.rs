use std::path::PathBuf;

use bytes::Bytes;
use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One archive member handed from the parser to the writers.
///
/// The body arrives in order over a bounded channel. It must be drained
/// before the parser can move past this entry, so a consumer that is not
/// interested in the content still calls [`ArchiveEntry::drain`].
#[derive(Debug)]
pub struct ArchiveEntry {
    /// Path as stored in the archive, before any stripping.
    pub path: PathBuf,
    pub kind: EntryKind,
    pub mode: Option<u32>,
    pub(crate) body: mpsc::Receiver<Bytes>,
}

impl ArchiveEntry {
    pub(crate) fn new(
        path: PathBuf,
        kind: EntryKind,
        mode: Option<u32>,
        body: mpsc::Receiver<Bytes>,
    ) -> Self {
        Self {
            path,
            kind,
            mode,
            body,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Check if entry is executable (has execute bit set)
    pub fn is_executable(&self) -> bool {
        self.mode.is_some_and(|m| m & 0o111 != 0)
    }

    /// Next chunk of the body, `None` once the entry is exhausted.
    pub async fn chunk(&mut self) -> Option<Bytes> {
        self.body.recv().await
    }

    /// Discard the remaining body, returning how many bytes were skipped.
    pub async fn drain(mut self) -> u64 {
        let mut skipped = 0;
        while let Some(chunk) = self.body.recv().await {
            skipped += chunk.len() as u64;
        }
        skipped
    }
}
