//! Declared content-type and size checks applied before any byte is stored.
//!
//! The declared size is only a first gate; the transferred size is enforced
//! while streaming (see `tubely_storage::BoundedReader`).

use mime::Mime;
use tubely_core::{AppError, AssetPolicy};

pub struct UploadValidator;

impl UploadValidator {
    /// Validate the declared metadata of an upload against `policy`.
    ///
    /// Returns the normalized media type: parameters such as `charset` are
    /// dropped and only `type/subtype` is kept.
    pub fn validate(
        declared_content_type: Option<&str>,
        declared_size: Option<u64>,
        policy: &AssetPolicy,
    ) -> Result<Mime, AppError> {
        let media_type = Self::normalize(declared_content_type).ok_or_else(|| {
            AppError::UnsupportedMediaType {
                content_type: declared_content_type.unwrap_or("(none)").to_string(),
                allowed: policy.allowed_content_types.clone(),
            }
        })?;

        if !policy.allows(&media_type) {
            return Err(AppError::UnsupportedMediaType {
                content_type: media_type.essence_str().to_string(),
                allowed: policy.allowed_content_types.clone(),
            });
        }

        if let Some(size) = declared_size {
            if policy.exceeds_limit(size) {
                return Err(AppError::PayloadTooLarge {
                    limit: policy.max_bytes,
                });
            }
        }

        Ok(media_type)
    }

    fn normalize(declared: Option<&str>) -> Option<Mime> {
        let parsed: Mime = declared?.trim().parse().ok()?;
        parsed.essence_str().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::AssetClass;

    fn thumbnail() -> AssetPolicy {
        AssetPolicy::for_class(AssetClass::Thumbnail)
    }

    #[test]
    fn test_accepts_allowed_type() {
        let media_type =
            UploadValidator::validate(Some("image/png"), Some(1024), &thumbnail()).unwrap();
        assert_eq!(media_type.essence_str(), "image/png");
    }

    #[test]
    fn test_strips_parameters() {
        let media_type =
            UploadValidator::validate(Some("image/jpeg; charset=binary"), None, &thumbnail())
                .unwrap();
        assert_eq!(media_type.essence_str(), "image/jpeg");
        assert!(media_type.params().next().is_none());
    }

    #[test]
    fn test_rejects_type_outside_allow_list() {
        let err = UploadValidator::validate(Some("image/gif"), Some(10), &thumbnail()).unwrap_err();
        match err {
            AppError::UnsupportedMediaType { content_type, allowed } => {
                assert_eq!(content_type, "image/gif");
                assert_eq!(allowed, vec!["image/jpeg", "image/png"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_missing_or_unparseable_type() {
        assert!(matches!(
            UploadValidator::validate(None, None, &thumbnail()),
            Err(AppError::UnsupportedMediaType { .. })
        ));
        assert!(matches!(
            UploadValidator::validate(Some("not a mime"), None, &thumbnail()),
            Err(AppError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn test_rejects_declared_size_over_ceiling() {
        let policy = thumbnail();
        assert!(
            UploadValidator::validate(Some("image/png"), Some(policy.max_bytes), &policy).is_ok()
        );
        assert!(matches!(
            UploadValidator::validate(Some("image/png"), Some(policy.max_bytes + 1), &policy),
            Err(AppError::PayloadTooLarge { limit }) if limit == 10 << 20
        ));
    }

    #[test]
    fn test_type_is_checked_before_size() {
        let policy = AssetPolicy::for_class(AssetClass::Video);
        assert!(matches!(
            UploadValidator::validate(Some("video/quicktime"), Some(u64::MAX), &policy),
            Err(AppError::UnsupportedMediaType { .. })
        ));
    }
}
