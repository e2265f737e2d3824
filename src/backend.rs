//! Collaborator seams for the engine's black-box dependencies.
//!
//! Extraction, embedding, and generation are external concerns reached
//! through these traits. All three are object-safe so a session can hold
//! them as trait objects and tests can substitute deterministic fakes.

use crate::error::RagError;

/// Turns raw document bytes into one extracted text string.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, RagError>;
}

/// Maps a batch of texts to one embedding vector per text.
///
/// Implementations must be deterministic for identical input and must
/// return vectors of a single fixed dimension per model.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// Maps an assembled prompt to a natural-language answer.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, RagError>;
}
