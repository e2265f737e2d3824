use thiserror::Error;

/// Failure taxonomy surfaced at the two operation boundaries
/// (`process_document`, `answer_query`). None of these terminate the
/// process; every variant maps to a distinct user-visible condition.
#[derive(Error, Debug)]
pub enum RagError {
    /// Rejected configuration value (zero chunk size, zero k, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Document bytes could not be turned into text.
    #[error("Document extraction failed: {0}")]
    Extraction(String),

    /// Extraction succeeded but produced no usable text.
    #[error("Document contains no extractable text")]
    EmptyDocument,

    /// Embedding backend failure (connection, status, malformed reply).
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector length does not match the index dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Query attempted before any document was processed.
    #[error("No document has been processed yet")]
    NotReady,

    /// Query text is empty or whitespace-only.
    #[error("No question entered")]
    EmptyQuery,

    /// Generation backend is unreachable. Carries remediation guidance.
    #[error("Generator backend unreachable: {0}. Start the local backend (e.g. run `ollama serve`) and retry")]
    GeneratorUnavailable(String),

    /// Generation backend answered with a non-success status or a
    /// malformed body.
    #[error("Generator error: {0}")]
    Generator(String),

    /// Another build is in progress on this session.
    #[error("Session is busy processing another document")]
    Busy,
}
