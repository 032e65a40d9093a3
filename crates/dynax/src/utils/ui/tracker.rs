use std::sync::Arc;

use dynax_extract::{Progress, ProgressFn};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

pub trait Tracker {
    type Ctx: Clone;
    fn new(ctx: Self::Ctx) -> Self;
    fn finish(&self, msg: Option<String>);
}

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Download bar fed by extraction progress events.
pub struct ProgressTracker {
    pub pb: ProgressBar,
}

#[derive(Debug, Clone)]
pub struct ProgressTrackerConfig {
    pub label: String,
    pub hidden: bool,
}

impl Tracker for ProgressTracker {
    type Ctx = ProgressTrackerConfig;

    fn new(ctx: Self::Ctx) -> Self {
        let pb = if ctx.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::no_length()
        };

        if let Some(pb_style) = PB_TEMPLATE.as_ref() {
            pb.set_style(pb_style.clone());
        }
        pb.set_message(ctx.label);
        ProgressTracker { pb }
    }

    fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}

impl ProgressTracker {
    /// Callback for `ExtractOptions::on_progress`.
    pub fn callback(&self) -> ProgressFn {
        let pb = self.pb.clone();
        Arc::new(move |progress: &Progress| update(&pb, progress))
    }
}

fn update(pb: &ProgressBar, progress: &Progress) {
    if let Some(total) = progress.total {
        if pb.length() != Some(total) {
            pb.set_length(total);
        }
    }
    pb.set_position(progress.downloaded);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden() -> ProgressTracker {
        ProgressTracker::new(ProgressTrackerConfig {
            label: "demo".to_owned(),
            hidden: true,
        })
    }

    #[test]
    fn events_move_the_bar() {
        let tracker = hidden();
        let callback = tracker.callback();

        callback(&Progress::downloading(10, Some(40)));
        assert_eq!(tracker.pb.length(), Some(40));
        assert_eq!(tracker.pb.position(), 10);

        callback(&Progress::completed(40, Some(40)));
        assert_eq!(tracker.pb.position(), 40);
    }

    #[test]
    fn unknown_length_keeps_counting() {
        let tracker = hidden();
        (tracker.callback())(&Progress::downloading(123, None));
        assert_eq!(tracker.pb.position(), 123);
        tracker.finish(Some("done".to_owned()));
        assert!(tracker.pb.is_finished());
    }
}
