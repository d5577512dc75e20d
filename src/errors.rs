use std::fmt;

use thiserror::Error;

/// Which call of the two-stage summarization produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStage {
    /// First pass: one sentence in the target language.
    Condense,
    /// Second pass: shorten the first pass output.
    Shorten,
}

impl fmt::Display for SummaryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStage::Condense => write!(f, "condense"),
            SummaryStage::Shorten => write!(f, "shorten"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Text transform request failed: {0}")]
    Http(String),

    #[error("Text transform API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Text transform returned no text")]
    EmptyResponse,

    #[error("Text transform response was malformed: {0}")]
    Malformed(String),

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: SummaryStage,
        #[source]
        source: Box<TransformError>,
    },
}

impl TransformError {
    #[must_use]
    pub fn in_stage(self, stage: SummaryStage) -> Self {
        TransformError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage the failure is attributed to, if known.
    #[must_use]
    pub fn stage(&self) -> Option<SummaryStage> {
        match self {
            TransformError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to receive batch from queue: {0}")]
    AcquisitionError(String),

    #[error("Failed to remove queue item: {0}")]
    RemovalError(String),

    #[error("Failed to deliver digest: {0}")]
    DeliveryError(String),
}

impl From<lettre::error::Error> for DigestError {
    fn from(error: lettre::error::Error) -> Self {
        DigestError::DeliveryError(format!("Failed to build email: {error}"))
    }
}

impl From<lettre::address::AddressError> for DigestError {
    fn from(error: lettre::address::AddressError) -> Self {
        DigestError::DeliveryError(format!("Invalid email address: {error}"))
    }
}

impl From<lettre::transport::smtp::Error> for DigestError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        DigestError::DeliveryError(format!("SMTP send failed: {error}"))
    }
}
