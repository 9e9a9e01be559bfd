//! Error taxonomy for the analysis pipeline.
//!
//! Only [`AnalysisError::PolicyIo`] and its siblings live here — a policy
//! miss is recovered locally by [`crate::policy::search::HeuristicSearch`]
//! and never surfaces as an error. Everything below is fatal and
//! terminates the pipeline.

use thiserror::Error;

/// Errors that can abort the `analyze` pipeline. Each variant corresponds
/// to one of the CLI's non-zero exit codes.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("host exploration failed during {phase}: {reason}")]
    Host { phase: &'static str, reason: String },

    #[error("policy serialization failed: {0}")]
    PolicyIo(#[from] PolicyIoError),
}

impl AnalysisError {
    /// Maps to the exit codes enumerated in the CLI surface: 1 configuration,
    /// 2 host-exploration failure, 3 serialization I/O failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            AnalysisError::Configuration(_) => 1,
            AnalysisError::Host { .. } => 2,
            AnalysisError::PolicyIo(_) => 3,
        }
    }
}

/// Narrow error type for reading/writing the serialized policy trie.
/// Kept distinct from [`AnalysisError`] so [`crate::policy::trie`] has no
/// dependency on the pipeline-level error type.
#[derive(Debug, Error)]
pub enum PolicyIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad magic header, expected policy trie file")]
    BadMagic,

    #[error("unsupported policy format version {0}")]
    UnsupportedVersion(u8),

    #[error("truncated policy file: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}
