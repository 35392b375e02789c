use std::fmt;

/// Progress of one upload. Stages are passed strictly in declaration order;
/// the first failure is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UploadStage {
    AuthPending,
    RecordLoaded,
    OwnershipVerified,
    Validated,
    KeyAssigned,
    Persisted,
    MetadataUpdated,
    Complete,
}

impl UploadStage {
    /// The only stage that may follow this one.
    pub fn next(self) -> Option<UploadStage> {
        use UploadStage::*;
        match self {
            AuthPending => Some(RecordLoaded),
            RecordLoaded => Some(OwnershipVerified),
            OwnershipVerified => Some(Validated),
            Validated => Some(KeyAssigned),
            KeyAssigned => Some(Persisted),
            Persisted => Some(MetadataUpdated),
            MetadataUpdated => Some(Complete),
            Complete => None,
        }
    }

    /// Whether the upload's bytes may already be in storage at this stage.
    pub fn has_persisted(self) -> bool {
        self >= UploadStage::Persisted
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::AuthPending => "auth_pending",
            UploadStage::RecordLoaded => "record_loaded",
            UploadStage::OwnershipVerified => "ownership_verified",
            UploadStage::Validated => "validated",
            UploadStage::KeyAssigned => "key_assigned",
            UploadStage::Persisted => "persisted",
            UploadStage::MetadataUpdated => "metadata_updated",
            UploadStage::Complete => "complete",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current stage of one upload and refuses to skip ahead.
#[derive(Debug)]
pub(crate) struct StageTracker {
    current: UploadStage,
}

impl StageTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: UploadStage::AuthPending,
        }
    }

    pub(crate) fn current(&self) -> UploadStage {
        self.current
    }

    pub(crate) fn advance(&mut self, to: UploadStage) {
        debug_assert_eq!(
            self.current.next(),
            Some(to),
            "upload stage {} cannot be followed by {}",
            self.current,
            to
        );
        tracing::debug!(from = %self.current, to = %to, "Upload stage transition");
        self.current = to;
    }
}
