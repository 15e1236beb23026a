//! Passage splitting for reference documents

use crate::error::{CoreError, Result};

/// Split text into consecutive passages of at most `max_chars` characters
///
/// Lengths are counted in Unicode scalar values, so accented text yields
/// passages of the same length as ASCII text. Concatenating the passages
/// yields the original text.
pub fn chunk_text(text: &str, max_chars: usize) -> Result<Vec<&str>> {
    if max_chars == 0 {
        return Err(CoreError::InvalidChunkSize { size: max_chars });
    }

    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(offset, _)| offset);
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }

    Ok(chunks)
}
