//! Domain-level error taxonomy for caseflow.
//!
//! Only fatal conditions live here. Missing fields, empty cells, short
//! histories and zero baselines are recovered inside the engine and never
//! surface as errors.

/// Caseflow domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CaseflowError {
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for caseflow domain operations.
pub type Result<T> = std::result::Result<T, CaseflowError>;
