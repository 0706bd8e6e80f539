use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::errors::{AppError, Result};
use crate::utils::ensure_dir_exists;

/// Caller-facing reporting boundary.
///
/// The chat gateway implements this against its interaction/message APIs;
/// the bundled console front-end implements it for terminal use. Status
/// updates replace the previously visible text, mirroring how chat
/// platforms edit a single response message.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// Replaces the visible status message for this job.
    async fn report_status(&self, text: &str);

    /// Reports a terminal failure with a short title and detail text.
    async fn report_failure(&self, title: &str, detail: &str);

    /// Hands the finished file over for attachment/delivery.
    async fn deliver_artifact(&self, path: &Path) -> Result<()>;
}

/// Reporter for the command-line front-end: prints status lines and
/// "delivers" by copying the finished file into an output directory.
pub struct ConsoleReporter {
    output_dir: PathBuf,
    done: Notify,
}

impl ConsoleReporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            done: Notify::new(),
        }
    }

    /// Waits until the job reached a terminal state (delivered or failed).
    pub async fn wait(&self) {
        self.done.notified().await;
    }
}

#[async_trait]
impl ProgressReporter for ConsoleReporter {
    async fn report_status(&self, text: &str) {
        println!("{}", text);
    }

    async fn report_failure(&self, title: &str, detail: &str) {
        eprintln!("{}: {}", title, detail);
        self.done.notify_one();
    }

    async fn deliver_artifact(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| AppError::Delivery("missing file name".to_string()))?;

        ensure_dir_exists(&self.output_dir).await?;
        let target = self.output_dir.join(file_name);
        tokio::fs::copy(path, &target).await?;

        println!("Saved video to {:?}", target);
        self.done.notify_one();
        Ok(())
    }
}
