//! Media class derived from a MIME type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse media class; registries and progress markers are kept per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeClass {
    /// `image/*`.
    Image,
    /// Everything else.
    Other,
}

impl MimeClass {
    /// Classify by the `image/` prefix of a MIME type.
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else {
            Self::Other
        }
    }

    /// Key fragment used in option names (`images` / `other`).
    pub fn option_key(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MimeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(MimeClass::from_mime("image/jpeg"), MimeClass::Image);
        assert_eq!(MimeClass::from_mime("image/svg+xml"), MimeClass::Image);
        assert_eq!(MimeClass::from_mime("application/pdf"), MimeClass::Other);
        assert_eq!(MimeClass::from_mime("video/image"), MimeClass::Other);
        assert_eq!(MimeClass::from_mime(""), MimeClass::Other);
    }
}
