use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Progress callback shared with the pipeline.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Phases reported by an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractPhase {
    /// Archive bytes are arriving; one event per received chunk.
    #[default]
    Downloading,

    /// Every entry has been written. Reported exactly once, last.
    Completed,
}

impl std::fmt::Display for ExtractPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractPhase::Downloading => write!(f, "Downloading"),
            ExtractPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Snapshot passed to progress callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub phase: ExtractPhase,

    /// Compressed bytes received so far.
    pub downloaded: u64,

    /// Advertised `Content-Length`, if the server sent one.
    pub total: Option<u64>,

    /// `downloaded / total`, unadjusted.
    ///
    /// `None` while the total is unknown (absent or zero). The ratio is not
    /// clamped: an inaccurate header can push it past 1.0. The `Completed`
    /// event always carries exactly 1.0.
    pub percent: Option<f64>,
}

impl Progress {
    pub fn downloading(downloaded: u64, total: Option<u64>) -> Self {
        Self {
            phase: ExtractPhase::Downloading,
            downloaded,
            total,
            percent: total
                .filter(|&t| t > 0)
                .map(|t| downloaded as f64 / t as f64),
        }
    }

    pub fn completed(downloaded: u64, total: Option<u64>) -> Self {
        Self {
            phase: ExtractPhase::Completed,
            downloaded,
            total,
            percent: Some(1.0),
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == ExtractPhase::Completed
    }
}

/// Byte accounting for one extraction call.
pub(crate) struct ProgressTracker {
    downloaded: AtomicU64,
    total: Option<u64>,
    callback: Option<ProgressFn>,
}

impl ProgressTracker {
    pub(crate) fn new(total: Option<u64>, callback: Option<ProgressFn>) -> Self {
        Self {
            downloaded: AtomicU64::new(0),
            total,
            callback,
        }
    }

    pub(crate) fn advance(&self, len: usize) {
        let downloaded = self.downloaded.fetch_add(len as u64, Ordering::Relaxed) + len as u64;
        self.report(Progress::downloading(downloaded, self.total));
    }

    pub(crate) fn complete(&self) {
        self.report(Progress::completed(self.downloaded(), self.total));
    }

    pub(crate) fn downloaded(&self) -> u64 {
        self.downloaded.load(Ordering::Relaxed)
    }

    fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.callback {
            callback(&progress);
        }
    }
}
