use std::fmt;

use serde::{Deserialize, Serialize};

/// Default ceiling for thumbnail uploads (10 MiB).
pub const THUMBNAIL_MAX_BYTES: u64 = 10 << 20;
/// Default ceiling for video uploads (1 GiB).
pub const VIDEO_MAX_BYTES: u64 = 1 << 30;

/// Category of upload; each class has its own form field, allow-list,
/// size ceiling and storage target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Thumbnail,
    Video,
}

impl AssetClass {
    /// Name of the multipart field carrying the file.
    pub fn form_field(&self) -> &'static str {
        match self {
            AssetClass::Thumbnail => "thumbnail",
            AssetClass::Video => "video",
        }
    }

    pub fn default_allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            AssetClass::Thumbnail => &["image/jpeg", "image/png"],
            AssetClass::Video => &["video/mp4"],
        }
    }

    pub fn default_max_bytes(&self) -> u64 {
        match self {
            AssetClass::Thumbnail => THUMBNAIL_MAX_BYTES,
            AssetClass::Video => VIDEO_MAX_BYTES,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_field())
    }
}

/// Validation rules applied to one asset class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPolicy {
    pub class: AssetClass,
    /// Normalized `type/subtype` pairs, lowercase.
    pub allowed_content_types: Vec<String>,
    pub max_bytes: u64,
}

impl AssetPolicy {
    pub fn new(class: AssetClass, max_bytes: u64) -> Self {
        Self {
            class,
            allowed_content_types: class
                .default_allowed_content_types()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_bytes,
        }
    }

    pub fn for_class(class: AssetClass) -> Self {
        Self::new(class, class.default_max_bytes())
    }

    pub fn allows(&self, media_type: &mime::Mime) -> bool {
        let essence = media_type.essence_str();
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }

    pub fn exceeds_limit(&self, size: u64) -> bool {
        size > self.max_bytes
    }
}

/// File extension for a normalized media type, taken from its subtype
/// (`image/jpeg` -> `jpeg`, `video/mp4` -> `mp4`).
pub fn extension_for(media_type: &mime::Mime) -> &str {
    media_type.subtype().as_str()
}
