use std::path::{Path, PathBuf};

use log::{error, info};
use tokio::process::Command;

use crate::config::AppConfig;
use crate::downloader::probe;
use crate::downloader::runner::{execute_with_progress, Operation};
use crate::downloader::DownloadJob;
use crate::errors::{AppError, Result};

/// Filename stem the download stage writes into the workspace; the extension
/// is whatever the download tool picked.
const DOWNLOAD_STEM: &str = "video_download.";

/// Per-job orchestrator: sequences download, codec probe, conversion and
/// delivery, and reclaims the workspace on every exit path.
pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Runs one job to a terminal state.
    ///
    /// Failures are reported to the job's reporter here and never propagate
    /// past the orchestrator; the workspace is removed whatever happens.
    pub async fn run(self, job: DownloadJob) {
        self.handle(&job).await;
        cleanup(&job.workspace).await;
    }

    async fn handle(&self, job: &DownloadJob) {
        info!("⬇️ [PIPELINE] Starting download job for {}", job.url);
        job.reporter.report_status("Starting video download...").await;

        let downloaded = match self.download_video(job).await {
            Ok(file) => file,
            Err(e) => {
                report_failure(job, "Error while downloading video", &e).await;
                return;
            }
        };

        let processed = match self.convert_video(job, &downloaded).await {
            Ok(file) => file,
            Err(e) => {
                report_failure(job, "Error while converting video", &e).await;
                return;
            }
        };

        if let Err(e) = self.attach_file(job, &processed).await {
            report_failure(job, "Error while attaching file", &e).await;
            return;
        }

        info!("✅ [PIPELINE] Finished download job for {}", job.url);
    }

    async fn download_video(&self, job: &DownloadJob) -> Result<PathBuf> {
        let output_template = job.workspace.join("video_download.%(ext)s");

        let mut cmd = Command::new(&self.config.ytdlp_path);
        cmd.arg(&job.url)
            .arg("-o")
            .arg(&output_template)
            .arg("--max-filesize")
            .arg(format!("{}M", job.max_file_size_mb))
            .args(["--format-sort", "res:720,codec:h264"])
            .args(["--merge-output-format", "mp4"])
            .args([
                "--progress-template",
                r#"{"progress_percentage": "%(progress._percent_str)s"}"#,
            ])
            .arg("--newline");

        execute_with_progress(
            cmd,
            self.config.download_timeout(),
            Operation::Download {
                max_file_size_mb: job.max_file_size_mb,
            },
            &job.reporter,
        )
        .await?;

        find_downloaded_file(&job.workspace).await
    }

    async fn convert_video(&self, job: &DownloadJob, downloaded: &Path) -> Result<PathBuf> {
        let codec = probe::video_codec(&self.config.ffprobe_path, downloaded).await?;
        info!("🎬 [PIPELINE] Probed video codec: {}", codec);

        // Already at the baseline codec, the downloaded file is used as-is.
        if codec == self.config.video.target_codec {
            return Ok(downloaded.to_path_buf());
        }

        let total_duration = probe::video_duration(&self.config.ffprobe_path, downloaded).await?;

        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.arg("-i")
            .arg(downloaded)
            .args(["-c:v", &self.config.video.target_codec])
            .args(["-b:v", &self.config.video.bitrate])
            .args(["-c:a", "aac"])
            .args(["-pix_fmt", &self.config.video.pixel_format])
            .args(["-f", "mp4"])
            .arg(&job.processed_path)
            .args(["-progress", "pipe:1"])
            .arg("-nostats");

        execute_with_progress(
            cmd,
            self.config.conversion_timeout(),
            Operation::Conversion { total_duration },
            &job.reporter,
        )
        .await?;

        Ok(job.processed_path.clone())
    }

    async fn attach_file(&self, job: &DownloadJob, file_path: &Path) -> Result<()> {
        // Make sure the artifact is actually readable before handing it off.
        tokio::fs::File::open(file_path)
            .await
            .map_err(|e| AppError::Delivery(format!("error opening file: {}", e)))?;

        match job.reporter.deliver_artifact(file_path).await {
            Ok(()) => Ok(()),
            Err(e @ AppError::Delivery(_)) => Err(e),
            Err(e) => Err(AppError::Delivery(e.to_string())),
        }
    }
}

/// Locates the file the download stage produced, whatever its extension.
async fn find_downloaded_file(workspace: &Path) -> Result<PathBuf> {
    let mut entries = tokio::fs::read_dir(workspace)
        .await
        .map_err(|e| AppError::Pipeline(format!("error finding downloaded file: {}", e)))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::Pipeline(format!("error finding downloaded file: {}", e)))?
    {
        if entry.file_name().to_string_lossy().starts_with(DOWNLOAD_STEM) {
            return Ok(entry.path());
        }
    }

    Err(AppError::Pipeline(
        "no downloaded file found in workspace".to_string(),
    ))
}

/// Picks the user-facing failure title and sends the single failure report.
async fn report_failure(job: &DownloadJob, title: &str, error: &AppError) {
    let title = match error {
        AppError::Timeout(_) => "Timed out",
        _ => title,
    };
    error!("❌ [PIPELINE] Download job failed: {}", error);
    job.reporter.report_failure(title, &error.to_string()).await;
}

/// Removes the job workspace; failure is logged, never escalated.
async fn cleanup(workspace: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(workspace).await {
        error!("Error while removing downloaded files: {}", e);
    }
}
