//! Fixed-size character chunking.
//!
//! Splits extracted document text into consecutive, non-overlapping
//! substrings of `size` characters; only the final chunk may be shorter.
//! Deliberately boundary-unaware: no normalization, no sentence or
//! paragraph detection. Chunk order is source order, and concatenating
//! the chunks reproduces the input exactly.

use crate::error::RagError;

/// Split `text` into fixed-size character chunks.
///
/// Characters are Unicode scalar values, so a chunk boundary never lands
/// inside a multi-byte code point. Empty text yields an empty vec.
pub fn chunk(text: &str, size: usize) -> Result<Vec<String>, RagError> {
    if size == 0 {
        return Err(RagError::InvalidConfiguration(
            "chunk size must be greater than 0".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let split_at = match rest.char_indices().nth(size) {
            Some((idx, _)) => idx,
            None => rest.len(),
        };
        let (head, tail) = rest.split_at(split_at);
        chunks.push(head.to_string());
        rest = tail;
    }

    Ok(chunks)
}
