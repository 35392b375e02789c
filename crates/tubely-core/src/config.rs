//! Configuration module
//!
//! All settings are read once from the environment at startup into an
//! immutable [`Config`] that is handed to each component's constructor.

use std::env;
use std::path::{Path, PathBuf};

use crate::models::{AssetClass, AssetPolicy, THUMBNAIL_MAX_BYTES, VIDEO_MAX_BYTES};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_ISSUER: &str = "tubely-access";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    /// Host used when building URLs for locally stored assets.
    pub public_host: String,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub environment: String,
}

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub base: BaseConfig,
    /// When unset, records live in memory (development only).
    pub database_url: Option<String>,
    // Storage routing per asset class
    pub thumbnail_storage_backend: StorageBackend,
    pub video_storage_backend: StorageBackend,
    // Local filesystem backend
    pub assets_root: PathBuf,
    pub assets_url_prefix: String,
    // S3 backend
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    /// Directory for temporary spool files; OS temp dir when unset.
    pub upload_spool_dir: Option<PathBuf>,
    // Upload policies
    pub thumbnail_max_bytes: u64,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub video_max_bytes: u64,
    pub video_allowed_content_types: Vec<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn as_upload(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_upload().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_upload().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_upload().base.server_port
    }

    pub fn public_host(&self) -> &str {
        &self.as_upload().base.public_host
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_upload().base.jwt_secret
    }

    pub fn jwt_issuer(&self) -> &str {
        &self.as_upload().base.jwt_issuer
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_upload().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_upload().base.environment
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_upload().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_upload().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_upload().base.db_timeout_seconds
    }

    pub fn storage_backend(&self, class: AssetClass) -> StorageBackend {
        match class {
            AssetClass::Thumbnail => self.as_upload().thumbnail_storage_backend,
            AssetClass::Video => self.as_upload().video_storage_backend,
        }
    }

    pub fn assets_root(&self) -> &Path {
        &self.as_upload().assets_root
    }

    pub fn assets_url_prefix(&self) -> &str {
        self.as_upload().assets_url_prefix.trim_matches('/')
    }

    /// Base URL under which locally stored assets are served,
    /// e.g. `http://localhost:8091/assets`.
    pub fn local_base_url(&self) -> String {
        format!(
            "http://{}:{}/{}",
            self.public_host(),
            self.server_port(),
            self.assets_url_prefix()
        )
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_upload().s3_bucket.as_deref()
    }

    /// S3 region, falling back to AWS_REGION.
    pub fn s3_region(&self) -> Option<&str> {
        let config = self.as_upload();
        config
            .s3_region
            .as_deref()
            .or(config.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_upload().s3_endpoint.as_deref()
    }

    pub fn upload_spool_dir(&self) -> Option<&Path> {
        self.as_upload().upload_spool_dir.as_deref()
    }

    pub fn asset_policy(&self, class: AssetClass) -> AssetPolicy {
        let config = self.as_upload();
        let (allowed, max_bytes) = match class {
            AssetClass::Thumbnail => (
                &config.thumbnail_allowed_content_types,
                config.thumbnail_max_bytes,
            ),
            AssetClass::Video => (&config.video_allowed_content_types, config.video_max_bytes),
        };
        AssetPolicy {
            class,
            allowed_content_types: allowed.clone(),
            max_bytes,
        }
    }
}

fn env_list(name: &str, default: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(value) => value
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

/// Byte ceiling from `name`. Unset means `default`; anything else must be a
/// plain byte count.
fn env_bytes(name: &str, default: u64) -> Result<u64, anyhow::Error> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| {
            anyhow::anyhow!("{} must be a whole number of bytes, got '{}'", name, value)
        }),
        Err(_) => Ok(default),
    }
}

fn env_backend(name: &str, default: StorageBackend) -> Result<StorageBackend, anyhow::Error> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        Err(_) => Ok(default),
    }
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            public_host: env::var("PUBLIC_HOST").unwrap_or_else(|_| "localhost".to_string()),
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| JWT_ISSUER.to_string()),
            environment,
        };

        Ok(Self {
            base,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            thumbnail_storage_backend: env_backend(
                "THUMBNAIL_STORAGE_BACKEND",
                StorageBackend::Local,
            )?,
            video_storage_backend: env_backend("VIDEO_STORAGE_BACKEND", StorageBackend::S3)?,
            assets_root: env::var("ASSETS_ROOT")
                .unwrap_or_else(|_| "./assets".to_string())
                .into(),
            assets_url_prefix: env::var("ASSETS_URL_PREFIX")
                .unwrap_or_else(|_| "assets".to_string()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            upload_spool_dir: env::var("UPLOAD_SPOOL_DIR").ok().map(PathBuf::from),
            thumbnail_max_bytes: env_bytes("THUMBNAIL_MAX_BYTES", THUMBNAIL_MAX_BYTES)?,
            thumbnail_allowed_content_types: env_list(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES",
                AssetClass::Thumbnail.default_allowed_content_types(),
            ),
            video_max_bytes: env_bytes("VIDEO_MAX_BYTES", VIDEO_MAX_BYTES)?,
            video_allowed_content_types: env_list(
                "VIDEO_ALLOWED_CONTENT_TYPES",
                AssetClass::Video.default_allowed_content_types(),
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.thumbnail_max_bytes == 0 || self.video_max_bytes == 0 {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_MAX_BYTES and VIDEO_MAX_BYTES must be greater than zero"
            ));
        }

        for (name, allowed) in [
            (
                "THUMBNAIL_ALLOWED_CONTENT_TYPES",
                &self.thumbnail_allowed_content_types,
            ),
            ("VIDEO_ALLOWED_CONTENT_TYPES", &self.video_allowed_content_types),
        ] {
            if allowed.is_empty() {
                return Err(anyhow::anyhow!(
                    "{} must list at least one content type",
                    name
                ));
            }
            if let Some(bad) = allowed
                .iter()
                .find(|t| t.parse::<mime::Mime>().is_err())
            {
                return Err(anyhow::anyhow!(
                    "{} contains an invalid content type '{}'",
                    name,
                    bad
                ));
            }
        }

        for backend in [self.thumbnail_storage_backend, self.video_storage_backend] {
            match backend {
                StorageBackend::S3 => {
                    if self.s3_bucket.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_BUCKET must be set when using S3 storage backend"
                        ));
                    }
                    if self.s3_region.is_none() && self.aws_region.is_none() {
                        return Err(anyhow::anyhow!(
                            "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                        ));
                    }
                }
                StorageBackend::Local => {
                    if self.assets_root.as_os_str().is_empty() {
                        return Err(anyhow::anyhow!(
                            "ASSETS_ROOT must be set when using local storage backend"
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
