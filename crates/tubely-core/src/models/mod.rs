pub mod asset;
pub mod record;

pub use asset::{extension_for, AssetClass, AssetPolicy, THUMBNAIL_MAX_BYTES, VIDEO_MAX_BYTES};
pub use record::Record;
