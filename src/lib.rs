//! Media-acquisition core for a chat bot: a single-lane download queue that
//! fetches videos with yt-dlp, normalizes them to h264 MP4 with ffmpeg and
//! delivers the result through a caller-supplied reporter.

pub mod config;
pub mod downloader;
pub mod errors;
pub mod policy;
pub mod reporter;
pub mod utils;

pub use config::AppConfig;
pub use downloader::{DownloadJob, DownloadManager};
pub use errors::{AppError, Result};
pub use policy::GuildTier;
pub use reporter::{ConsoleReporter, ProgressReporter};
