pub mod intake;
pub mod manager;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod runner;

use std::path::PathBuf;
use std::sync::Arc;

use crate::reporter::ProgressReporter;

pub use manager::DownloadManager;

/// One accepted download-and-normalize request.
///
/// Read-only once built. The workspace directory is exclusively owned by
/// this job and removed again when the job reaches a terminal state.
pub struct DownloadJob {
    pub url: String,
    pub workspace: PathBuf,
    pub processed_path: PathBuf,
    pub max_file_size_mb: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub reporter: Arc<dyn ProgressReporter>,
}
