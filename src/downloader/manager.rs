use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::downloader::intake;
use crate::downloader::pipeline::Pipeline;
use crate::downloader::DownloadJob;
use crate::errors::{AppError, Result};
use crate::policy::GuildTier;
use crate::reporter::ProgressReporter;
use crate::utils::{ensure_dir_exists, generate_job_id};

/// Service object owning the job backlog and the single download worker.
///
/// Constructed once at startup and injected into the command layer. At most
/// one job is ever being processed; everything else waits in FIFO order,
/// and a full backlog blocks the submitter rather than dropping requests.
pub struct DownloadManager {
    queue: mpsc::Sender<DownloadJob>,
    config: AppConfig,
}

impl DownloadManager {
    /// Creates the manager and spawns the worker that drains the backlog
    /// for the lifetime of the process.
    pub fn new(config: AppConfig) -> Self {
        let (queue, rx) = mpsc::channel(config.queue_capacity);
        tokio::spawn(download_worker(rx, config.clone()));

        Self { queue, config }
    }

    /// Validates, normalizes and enqueues one download request.
    ///
    /// Blocks while the backlog is full; once the job has been accepted the
    /// queued status goes out to the caller.
    pub async fn submit(
        &self,
        url: &str,
        tier: GuildTier,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<()> {
        if url.is_empty() {
            return Err(AppError::InvalidInput("No URL provided".to_string()));
        }
        let url = intake::normalize_url(url)?;

        ensure_dir_exists(&self.config.downloads_dir).await?;
        let workspace = self
            .config
            .downloads_dir
            .join(format!("video_{}", generate_job_id()));
        tokio::fs::create_dir_all(&workspace).await?;

        let job = DownloadJob {
            url,
            processed_path: workspace.join(format!("{}_processed.mp4", generate_job_id())),
            workspace,
            max_file_size_mb: tier.max_file_size_mb(),
            created_at: Utc::now(),
            reporter: reporter.clone(),
        };

        if self.queue.send(job).await.is_err() {
            return Err(AppError::Pipeline(
                "download worker is not running".to_string(),
            ));
        }

        reporter
            .report_status("Waiting for previous download tasks to finish...")
            .await;
        Ok(())
    }
}

/// Drains the backlog strictly one job at a time for the process lifetime.
/// A failed or even panicked job never stops the loop.
async fn download_worker(mut rx: mpsc::Receiver<DownloadJob>, config: AppConfig) {
    info!("Download worker started");

    while let Some(job) = rx.recv().await {
        let pipeline = Pipeline::new(config.clone());
        if let Err(e) = tokio::spawn(pipeline.run(job)).await {
            error!("Download job crashed: {}", e);
        }
    }

    info!("Download worker stopped");
}
