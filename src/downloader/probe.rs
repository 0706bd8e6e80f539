use std::path::Path;

use tokio::process::Command;

use crate::errors::{AppError, Result};

/// Reads the video codec of the first video stream, e.g. `h264` or `vp9`.
pub async fn video_codec(ffprobe_path: &str, video_file: &Path) -> Result<String> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_name",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(video_file)
        .output()
        .await
        .map_err(|e| AppError::Probe(format!("error getting video codec: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Probe(format!(
            "error getting video codec: {}",
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Reads the container duration in seconds.
pub async fn video_duration(ffprobe_path: &str, video_file: &Path) -> Result<f64> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(video_file)
        .output()
        .await
        .map_err(|e| AppError::Probe(format!("error getting duration: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Probe(format!(
            "error getting duration: {}",
            stderr.trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .map_err(|e| AppError::Probe(format!("error parsing duration: {}", e)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::utils::write_fake_tool;

    #[tokio::test]
    async fn codec_probe_trims_tool_output() {
        let dir = tempfile::tempdir().unwrap();
        let probe = write_fake_tool(dir.path(), "ffprobe", "echo h264");

        let codec = video_codec(&probe, Path::new("video.mp4")).await.unwrap();
        assert_eq!(codec, "h264");
    }

    #[tokio::test]
    async fn duration_probe_parses_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let probe = write_fake_tool(dir.path(), "ffprobe", "echo 12.5");

        let duration = video_duration(&probe, Path::new("video.mp4")).await.unwrap();
        assert_eq!(duration, 12.5);
    }

    #[tokio::test]
    async fn failed_probe_is_a_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = write_fake_tool(dir.path(), "ffprobe", "echo broken >&2; exit 1");

        let err = video_codec(&probe, Path::new("video.mp4")).await.unwrap_err();
        assert!(matches!(err, AppError::Probe(_)));
    }

    #[tokio::test]
    async fn unparsable_duration_is_a_probe_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = write_fake_tool(dir.path(), "ffprobe", "echo N/A");

        let err = video_duration(&probe, Path::new("video.mp4")).await.unwrap_err();
        assert!(matches!(err, AppError::Probe(_)));
    }
}
