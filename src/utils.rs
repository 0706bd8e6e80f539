use crate::errors::Result;
use log::info;

/// Generates a unique ID for download jobs
pub fn generate_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Creates a directory if it doesn't exist
pub async fn ensure_dir_exists(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
        info!("Created directory: {:?}", path);
    }
    Ok(())
}

/// Capitalizes the first character, the form operation names take in
/// user-facing timeout messages ("download" -> "Download")
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Writes an executable shell script standing in for an external tool binary.
#[cfg(all(test, unix))]
pub fn write_fake_tool(dir: &std::path::Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_uppercases_only_the_first_letter() {
        assert_eq!(capitalize_first("download"), "Download");
        assert_eq!(capitalize_first("conversion"), "Conversion");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(generate_job_id(), generate_job_id());
    }
}
