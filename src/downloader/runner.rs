use std::process::Stdio;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout_at, Duration, Instant};

use crate::downloader::progress::{
    parse_conversion_line, parse_download_line, render_progress_bar, ProgressTracker,
};
use crate::errors::{AppError, Result};
use crate::reporter::ProgressReporter;
use crate::utils::capitalize_first;

/// Marker the download tool prints when the size ceiling is breached.
const SIZE_ABORT_MARKER: &str = "File is larger than max-filesize";

/// Which pipeline stage invoked the runner, with the stage-specific parsing
/// inputs.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    Download { max_file_size_mb: u64 },
    Conversion { total_duration: f64 },
}

impl Operation {
    fn label(&self) -> &'static str {
        match self {
            Operation::Download { .. } => "download",
            Operation::Conversion { .. } => "conversion",
        }
    }

    fn status_text(&self, percentage: f64) -> String {
        let verb = match self {
            Operation::Download { .. } => "Downloading",
            Operation::Conversion { .. } => "Converting",
        };
        format!(
            "{} video\n{} {:.2}%",
            verb,
            render_progress_bar(percentage),
            percentage
        )
    }
}

/// Runs one external command under a deadline, streaming its stdout
/// line-by-line and reporting throttled progress updates to the caller.
///
/// Deadline expiry kills the subprocess and yields `AppError::Timeout`
/// regardless of how the tool reacted to the kill; any other non-zero exit
/// is `AppError::CommandFailed`. A zero exit says nothing about output
/// files, verifying those is the caller's responsibility.
pub async fn execute_with_progress(
    mut cmd: Command,
    deadline: Duration,
    operation: Operation,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<()> {
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::null());

    let mut child = cmd
        .spawn()
        .map_err(|e| AppError::CommandFailed(format!("error starting command: {}", e)))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| AppError::CommandFailed("error getting stdout".to_string()))?;

    let deadline = Instant::now() + deadline;
    let mut lines = BufReader::new(stdout).lines();
    let mut tracker = ProgressTracker::new();

    reporter
        .report_status(&format!(
            "Starting video {}\n{} {:.2}%",
            operation.label(),
            render_progress_bar(0.0),
            0.0
        ))
        .await;

    loop {
        let line = match timeout_at(deadline, lines.next_line()).await {
            Err(_) => {
                warn!("⏰ [RUNNER] {} deadline expired, killing process", operation.label());
                let _ = child.kill().await;
                return Err(AppError::Timeout(capitalize_first(operation.label())));
            }
            Ok(Ok(Some(line))) => line,
            // EOF and read errors both end the streaming phase; the exit
            // status decides the outcome.
            Ok(_) => break,
        };

        let percentage = match operation {
            Operation::Download { max_file_size_mb } => {
                if line.contains(SIZE_ABORT_MARKER) {
                    info!("🛑 [RUNNER] Size ceiling hit, killing download process");
                    let _ = child.kill().await;
                    return Err(AppError::SizeExceeded(max_file_size_mb));
                }
                parse_download_line(&line)
            }
            Operation::Conversion { total_duration } => {
                parse_conversion_line(&line, total_duration)
            }
        };

        if let Some(percentage) = percentage {
            if tracker.should_report(percentage) {
                reporter.report_status(&operation.status_text(percentage)).await;
                tracker.mark_reported(percentage);
            }
        }
    }

    match timeout_at(deadline, child.wait()).await {
        Err(_) => {
            warn!("⏰ [RUNNER] {} deadline expired, killing process", operation.label());
            let _ = child.kill().await;
            Err(AppError::Timeout(capitalize_first(operation.label())))
        }
        Ok(Err(e)) => Err(AppError::CommandFailed(format!(
            "error waiting for command: {}",
            e
        ))),
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(AppError::CommandFailed(format!(
            "command exited with {}",
            status
        ))),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::reporter::testing::RecordingReporter;
    use crate::utils::write_fake_tool;

    fn recording() -> (Arc<RecordingReporter>, Arc<dyn ProgressReporter>) {
        let recorder = Arc::new(RecordingReporter::default());
        let reporter: Arc<dyn ProgressReporter> = recorder.clone();
        (recorder, reporter)
    }

    #[tokio::test]
    async fn successful_run_reports_the_initial_status() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_fake_tool(dir.path(), "downloader", "exit 0");
        let (recorder, reporter) = recording();

        execute_with_progress(
            Command::new(&tool),
            Duration::from_secs(5),
            Operation::Download { max_file_size_mb: 10 },
            &reporter,
        )
        .await
        .unwrap();

        let statuses = recorder.statuses.lock().unwrap();
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].starts_with("Starting video download"));
    }

    #[tokio::test]
    async fn progress_updates_are_throttled_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_fake_tool(
            dir.path(),
            "downloader",
            concat!(
                "echo '{\"progress_percentage\": \"50.0%\"}'\n",
                "sleep 1.2\n",
                "echo '{\"progress_percentage\": \"80.0%\"}'",
            ),
        );
        let (recorder, reporter) = recording();

        execute_with_progress(
            Command::new(&tool),
            Duration::from_secs(10),
            Operation::Download { max_file_size_mb: 10 },
            &reporter,
        )
        .await
        .unwrap();

        let statuses = recorder.statuses.lock().unwrap();
        // The 50% line lands inside the throttle window; only 80% goes out.
        assert_eq!(statuses.len(), 2);
        assert!(statuses[1].starts_with("Downloading video"));
        assert!(statuses[1].contains("80.00%"));
    }

    #[tokio::test]
    async fn conversion_progress_uses_the_probed_duration() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_fake_tool(
            dir.path(),
            "transcoder",
            concat!("sleep 1.1\n", "echo 'out_time=00:00:05.000000'"),
        );
        let (recorder, reporter) = recording();

        execute_with_progress(
            Command::new(&tool),
            Duration::from_secs(10),
            Operation::Conversion { total_duration: 10.0 },
            &reporter,
        )
        .await
        .unwrap();

        let statuses = recorder.statuses.lock().unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses[1].starts_with("Converting video"));
        assert!(statuses[1].contains("50.00%"));
    }

    #[tokio::test]
    async fn size_abort_marker_kills_the_process() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_fake_tool(
            dir.path(),
            "downloader",
            concat!(
                "echo 'ERROR: File is larger than max-filesize'\n",
                "sleep 30",
            ),
        );
        let (_, reporter) = recording();

        let started = std::time::Instant::now();
        let err = execute_with_progress(
            Command::new(&tool),
            Duration::from_secs(60),
            Operation::Download { max_file_size_mb: 42 },
            &reporter,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::SizeExceeded(42)));
        // The configured ceiling goes into the message, not the real size.
        assert!(err.to_string().contains("Maximum is 42MB"));
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_fake_tool(dir.path(), "downloader", "exit 3");
        let (_, reporter) = recording();

        let err = execute_with_progress(
            Command::new(&tool),
            Duration::from_secs(5),
            Operation::Download { max_file_size_mb: 10 },
            &reporter,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::CommandFailed(_)));
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout_not_a_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = write_fake_tool(dir.path(), "downloader", "sleep 5");
        let (_, reporter) = recording();

        let err = execute_with_progress(
            Command::new(&tool),
            Duration::from_millis(200),
            Operation::Download { max_file_size_mb: 10 },
            &reporter,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
        assert_eq!(err.to_string(), "Download canceled as it took too long");
    }
}
