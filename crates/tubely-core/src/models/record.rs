use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AssetClass;

/// A user-owned record whose asset locations the upload pipeline fills in.
///
/// A location of `None` means the asset has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Current location of the asset of the given class.
    pub fn location(&self, class: AssetClass) -> Option<&str> {
        match class {
            AssetClass::Thumbnail => self.thumbnail_url.as_deref(),
            AssetClass::Video => self.video_url.as_deref(),
        }
    }

    /// Overwrite the location field of `class`, leaving the other one alone.
    pub fn set_location(&mut self, class: AssetClass, url: String) {
        match class {
            AssetClass::Thumbnail => self.thumbnail_url = Some(url),
            AssetClass::Video => self.video_url = Some(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_has_no_locations() {
        let record = Record::new(Uuid::new_v4(), "Boots", "A video about boots");
        assert!(record.location(AssetClass::Thumbnail).is_none());
        assert!(record.location(AssetClass::Video).is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_set_location_only_touches_its_class() {
        let mut record = Record::new(Uuid::new_v4(), "Boots", "");
        record.set_location(AssetClass::Video, "https://b.s3.r.amazonaws.com/k.mp4".into());
        assert_eq!(
            record.location(AssetClass::Video),
            Some("https://b.s3.r.amazonaws.com/k.mp4")
        );
        assert!(record.thumbnail_url.is_none());
    }

    #[test]
    fn test_ownership() {
        let owner = Uuid::new_v4();
        let record = Record::new(owner, "Boots", "");
        assert!(record.is_owned_by(owner));
        assert!(!record.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_serializes_missing_locations_as_null() {
        let record = Record::new(Uuid::new_v4(), "Boots", "");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["thumbnail_url"].is_null());
        assert!(json["video_url"].is_null());
    }
}
