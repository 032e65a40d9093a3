use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::progress::{Progress, ProgressFn};

/// Basename rewrite applied to every extracted file.
pub type RenameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Bound on opening the archive response. Streaming the body is unbounded.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on files being written at the same time.
pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 64;

static DOTFILE_ALIAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^_([0-9A-Za-z_])").unwrap());

/// Recover dotfiles that were published under an underscore alias.
///
/// `_gitignore` becomes `.gitignore`; names without a leading underscore are
/// returned unchanged.
///
/// ```
/// use dynax_extract::unescape_dotfile;
///
/// assert_eq!(unescape_dotfile("_npmrc"), ".npmrc");
/// assert_eq!(unescape_dotfile("index.js"), "index.js");
/// ```
pub fn unescape_dotfile(name: &str) -> String {
    DOTFILE_ALIAS.replace(name, ".$1").into_owned()
}

/// Configuration for one extraction.
///
/// # Examples
///
/// ```
/// use dynax_extract::{ExtractOptions, Progress};
/// use std::sync::Arc;
///
/// let options = ExtractOptions::default()
///     .max_concurrent_writes(8)
///     .on_progress(Arc::new(|progress: &Progress| {
///         if let Some(pct) = progress.percent {
///             println!("{:.0}%", pct * 100.0);
///         }
///     }));
/// assert_eq!(options.max_concurrent_writes, 8);
/// ```
#[derive(Clone)]
pub struct ExtractOptions {
    /// Invoked per received chunk and once after the last write.
    ///
    /// Default: None
    pub on_progress: Option<ProgressFn>,

    /// Applied to the basename of every file entry.
    ///
    /// Default: [`unescape_dotfile`]
    pub rename: RenameFn,

    /// Default: [`RESPONSE_TIMEOUT`]
    pub response_timeout: Duration,

    /// Default: [`DEFAULT_MAX_CONCURRENT_WRITES`]
    pub max_concurrent_writes: usize,
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .field("rename", &"{ ... }")
            .field("response_timeout", &self.response_timeout)
            .field("max_concurrent_writes", &self.max_concurrent_writes)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            on_progress: None,
            rename: Arc::new(unescape_dotfile),
            response_timeout: RESPONSE_TIMEOUT,
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    #[must_use]
    pub fn rename(mut self, rename: RenameFn) -> Self {
        self.rename = rename;
        self
    }

    /// Write basenames exactly as archived.
    #[must_use]
    pub fn keep_names(self) -> Self {
        self.rename(Arc::new(str::to_owned))
    }

    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Clamped to at least one writer.
    #[must_use]
    pub fn max_concurrent_writes(mut self, limit: usize) -> Self {
        self.max_concurrent_writes = limit.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_alias_becomes_dot() {
        assert_eq!(unescape_dotfile("_gitignore"), ".gitignore");
        assert_eq!(unescape_dotfile("_eslintrc.cjs"), ".eslintrc.cjs");
    }

    #[test]
    fn ordinary_names_untouched() {
        assert_eq!(unescape_dotfile("index.js"), "index.js");
        assert_eq!(unescape_dotfile("README_"), "README_");
        assert_eq!(unescape_dotfile("a_b"), "a_b");
    }

    #[test]
    fn lone_underscore_untouched() {
        assert_eq!(unescape_dotfile("_"), "_");
        assert_eq!(unescape_dotfile("_.txt"), "_.txt");
    }

    #[test]
    fn defaults() {
        let options = ExtractOptions::default();
        assert!(options.on_progress.is_none());
        assert_eq!(options.response_timeout, Duration::from_secs(10));
        assert_eq!((options.rename)("_npmrc"), ".npmrc");
    }

    #[test]
    fn keep_names_is_identity() {
        let options = ExtractOptions::default().keep_names();
        assert_eq!((options.rename)("_gitignore"), "_gitignore");
    }

    #[test]
    fn concurrency_clamped() {
        assert_eq!(ExtractOptions::default().max_concurrent_writes(0).max_concurrent_writes, 1);
    }

    #[test]
    fn debug_hides_callbacks() {
        let rendered = format!("{:?}", ExtractOptions::default());
        assert!(rendered.contains("max_concurrent_writes: 64"));
    }
}
