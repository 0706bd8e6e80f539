use url::Url;

use crate::errors::{AppError, Result};

const SHORT_LINK_PREFIX: &str = "https://ylilauta.org/file/";
const CONTENT_HOST_PREFIX: &str = "https://i.ylilauta.org/";
const APPLE_SUFFIX: &str = "-apple.mp4";

/// Validates the raw URL and applies the site-specific rewrite rules.
///
/// Short links are expanded to the CDN address derived from the file id,
/// and direct CDN links are pointed at the `-apple` rendition the download
/// tool can actually fetch.
pub fn normalize_url(raw: &str) -> Result<String> {
    Url::parse(raw).map_err(|e| AppError::InvalidInput(format!("Invalid URL: {}", e)))?;

    let mut url = raw.to_string();

    if url.starts_with(SHORT_LINK_PREFIX) {
        url = expand_short_link(&url)?;
    }

    if url.starts_with(CONTENT_HOST_PREFIX) && !url.ends_with(APPLE_SUFFIX) {
        if let Some((base, filename)) = url.rsplit_once('/') {
            let stem = filename.strip_suffix(".mp4").unwrap_or(filename);
            let rewritten = format!("{}/{}{}", base, stem, APPLE_SUFFIX);
            url = rewritten;
        }
    }

    Ok(url)
}

/// `https://ylilauta.org/file/<id>` -> `https://i.ylilauta.org/<aa>/<bb>/<id>-apple.mp4`
/// where `aa`/`bb` are the first two character pairs of the file id.
fn expand_short_link(url: &str) -> Result<String> {
    let file_id = url.rsplit('/').next().unwrap_or_default();

    if file_id.len() < 4 {
        return Err(AppError::InvalidInput("File ID is too short".to_string()));
    }

    let (first, second) = match (file_id.get(..2), file_id.get(2..4)) {
        (Some(first), Some(second)) => (first, second),
        _ => return Err(AppError::InvalidInput("Invalid URL format".to_string())),
    };

    Ok(format!(
        "https://i.ylilauta.org/{}/{}/{}{}",
        first, second, file_id, APPLE_SUFFIX
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_links_expand_to_the_cdn_address() {
        assert_eq!(
            normalize_url("https://ylilauta.org/file/ab12cdEF").unwrap(),
            "https://i.ylilauta.org/ab/12/ab12cdEF-apple.mp4"
        );
    }

    #[test]
    fn short_file_ids_are_rejected() {
        let err = normalize_url("https://ylilauta.org/file/ab1").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(err.to_string().contains("File ID is too short"));
    }

    #[test]
    fn direct_links_get_the_apple_suffix() {
        assert_eq!(
            normalize_url("https://i.ylilauta.org/ab/12/ab12cdEF.mp4").unwrap(),
            "https://i.ylilauta.org/ab/12/ab12cdEF-apple.mp4"
        );
    }

    #[test]
    fn direct_links_with_the_suffix_are_left_alone() {
        assert_eq!(
            normalize_url("https://i.ylilauta.org/ab/12/ab12cdEF-apple.mp4").unwrap(),
            "https://i.ylilauta.org/ab/12/ab12cdEF-apple.mp4"
        );
    }

    #[test]
    fn unrelated_urls_pass_through_unchanged() {
        assert_eq!(
            normalize_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn unparsable_urls_are_invalid_input() {
        let err = normalize_url("not a url").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
