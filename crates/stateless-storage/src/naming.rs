//! Remote object naming.

use std::path::Path;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left as-is when encoding an object name into a URL segment.
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Derive the object name for a file under the upload directory.
///
/// The upload base is stripped, separators are normalized to `/`, and
/// `root_dir` (if any) is prepended.
pub fn remote_key(upload_dir: &Path, local_path: &Path, root_dir: &str) -> String {
    let relative = local_path.strip_prefix(upload_dir).unwrap_or(local_path);
    let name = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .filter(|c| c != "/" && !c.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let root = root_dir.trim_matches('/');
    if root.is_empty() {
        name
    } else {
        format!("{root}/{name}")
    }
}

/// Percent-encode an object name as a single URL path segment.
pub fn encode_object_name(name: &str) -> String {
    utf8_percent_encode(name, OBJECT_NAME).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_key_strips_upload_dir() {
        let key = remote_key(
            Path::new("/srv/uploads"),
            Path::new("/srv/uploads/2024/05/photo.jpg"),
            "",
        );
        assert_eq!(key, "2024/05/photo.jpg");
    }

    #[test]
    fn test_remote_key_applies_root_dir() {
        let key = remote_key(
            Path::new("/srv/uploads"),
            Path::new("/srv/uploads/2024/05/photo.jpg"),
            "/sites/blog/",
        );
        assert_eq!(key, "sites/blog/2024/05/photo.jpg");
    }

    #[test]
    fn test_encode_object_name() {
        assert_eq!(
            encode_object_name("2024/05/my photo.jpg"),
            "2024%2F05%2Fmy%20photo.jpg"
        );
    }
}
