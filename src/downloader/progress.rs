use serde::Deserialize;
use tokio::time::{Duration, Instant};

/// Width of the textual progress gauge in cells.
const PROGRESS_BAR_WIDTH: usize = 20;

/// Minimum wall-clock gap between two outward status updates.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Single progress line emitted by the download tool's progress template.
#[derive(Debug, Deserialize)]
struct DownloadProgress {
    progress_percentage: String,
}

/// Renders a percentage as a fixed-width gauge, e.g. `██████████░░░░░░░░░░`.
pub fn render_progress_bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * PROGRESS_BAR_WIDTH as f64) as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);

    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(PROGRESS_BAR_WIDTH - filled));
    bar
}

/// Decodes one line of download-tool output into a percentage.
///
/// Lines are either single-line JSON objects produced by the progress
/// template or free text; anything that does not decode cleanly means
/// "no update", never an error.
pub fn parse_download_line(line: &str) -> Option<f64> {
    if !line.starts_with('{') {
        return None;
    }

    let progress: DownloadProgress = serde_json::from_str(line).ok()?;
    progress
        .progress_percentage
        .trim()
        .trim_end_matches('%')
        .parse()
        .ok()
}

/// Decodes one `key=value` line of transcode-tool output into a percentage,
/// given the source's total duration in seconds.
///
/// Only `out_time=HH:MM:SS[.fraction]` lines carry progress; everything
/// else means "no update".
pub fn parse_conversion_line(line: &str, total_duration: f64) -> Option<f64> {
    if total_duration <= 0.0 {
        return None;
    }

    let index = line.find("out_time=")?;
    let timestamp = &line[index + "out_time=".len()..];

    let mut parts = timestamp.splitn(3, ':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;

    let elapsed = hours * 3600.0 + minutes * 60.0 + seconds;
    Some(elapsed / total_duration * 100.0)
}

/// Throttle state for outward status updates, one per process execution.
pub struct ProgressTracker {
    last_update: Instant,
    last_percentage: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            last_percentage: 0.0,
        }
    }

    /// Whether a freshly parsed percentage is worth reporting: at least the
    /// update interval since the previous report and a different value.
    pub fn should_report(&self, percentage: f64) -> bool {
        self.last_update.elapsed() >= UPDATE_INTERVAL && percentage != self.last_percentage
    }

    pub fn mark_reported(&mut self, percentage: f64) {
        self.last_update = Instant::now();
        self.last_percentage = percentage;
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
