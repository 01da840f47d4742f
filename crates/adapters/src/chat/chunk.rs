// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound text chunking.
//!
//! Transports cap message size in UTF-16 code units (Telegram: 4096).
//! Chunks are split at the limit, preferring the last newline and then the
//! last space inside the window so words survive intact.

/// Split `text` into chunks of at most `limit` UTF-16 code units.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while utf16_len(rest) > limit {
        let hard_end = byte_index_at_utf16(rest, limit);
        let window = &rest[..hard_end];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map(|i| i + 1)
            .unwrap_or(hard_end);
        let (chunk, tail) = rest.split_at(split_at);
        chunks.push(chunk.trim_end_matches('\n').to_string());
        rest = tail;
    }
    chunks.push(rest.to_string());
    chunks
}

fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Byte index of the first char boundary at or past `limit` UTF-16 units.
fn byte_index_at_utf16(s: &str, limit: usize) -> usize {
    let mut units = 0;
    for (index, c) in s.char_indices() {
        let next = units + c.len_utf16();
        if next > limit {
            return index;
        }
        units = next;
    }
    s.len()
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
