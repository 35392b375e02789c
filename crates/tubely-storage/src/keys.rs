//! Storage key generation.
//!
//! Keys are never checked against existing objects; uniqueness rests on the
//! 256 bits of entropy behind every key.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Bytes of entropy drawn per key.
pub const KEY_ENTROPY_BYTES: usize = 32;

/// Source of the random bytes behind a key.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]);
}

/// Thread-local CSPRNG, periodically reseeded from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}

/// Opaque storage key: a URL-safe random token plus a file extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    token: String,
    extension: String,
}

impl StorageKey {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// `<token>.<extension>`, the name objects are stored under.
    pub fn as_filename(&self) -> String {
        format!("{}.{}", self.token, self.extension)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.token, self.extension)
    }
}

#[derive(Clone)]
pub struct KeyGenerator {
    entropy: Arc<dyn EntropySource>,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::with_entropy(Arc::new(OsEntropy))
    }

    pub fn with_entropy(entropy: Arc<dyn EntropySource>) -> Self {
        Self { entropy }
    }

    /// Draw a fresh key. `extension` is lowercased and stripped of any
    /// character that could not appear in a flat file name.
    pub fn new_key(&self, extension: &str) -> StorageKey {
        let mut raw = [0u8; KEY_ENTROPY_BYTES];
        self.entropy.fill(&mut raw);

        let extension: String = extension
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        StorageKey {
            token: URL_SAFE_NO_PAD.encode(raw),
            extension: if extension.is_empty() {
                "bin".to_string()
            } else {
                extension
            },
        }
    }
}
