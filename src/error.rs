// src/error.rs
use thiserror::Error;

/// Everything that can go wrong inside the triage pipeline.
///
/// None of these are fatal to the host process. `TriageEngine::load_or_train`
/// folds the load-side variants into an unavailable engine, and
/// `TriageEngine::classify` reports `ModelUnavailable` instead of panicking.
#[derive(Debug, Error)]
pub enum TriageError {
    /// No trained model is held. Recoverable by retraining.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact encoding failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("artifact is corrupt: {0}")]
    CorruptArtifact(String),

    #[error("artifact format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("training corpus produced an empty vocabulary")]
    EmptyVocabulary,

    #[error("training corpus needs at least two categories, found {0}")]
    TooFewClasses(usize),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TriageError>;
