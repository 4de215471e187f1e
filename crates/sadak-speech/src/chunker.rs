//! Text preprocessing for speech output.
//!
//! Strips emphasis markers left over from assistant markdown and splits text
//! into bounded chunks that engines render reliably. Platform synthesizers
//! tend to stall or cut off on long utterances, so every message is broken
//! up before it reaches the queue.
//!
//! All lengths are counted in `char`s, never bytes, so Devanagari text is
//! never split inside a code point.

/// Target character length per chunk.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 150;

/// Preferred split points, searched before falling back to whitespace.
const SENTENCE_BREAKS: [char; 4] = ['.', '?', '!', ';'];

/// Remove markdown emphasis characters (`*`, `_`, `` ` ``) so they are not
/// read out literally.
#[must_use]
pub fn strip_emphasis_marks(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect()
}

/// Split text into chunks of about `max_chars` characters.
///
/// Text that already fits is returned unchanged as a single chunk. Longer
/// text is cut at the last sentence break (`.`, `?`, `!`, `;`) at or before
/// index `max_chars`, else at the last whitespace in that range, else hard
/// after `max_chars` characters. The break character stays with the chunk it
/// ends, so a break at index `max_chars` yields a chunk one character over
/// the bound. The whitespace around a cut is dropped.
#[must_use]
pub fn split(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            chunks.push(rest.to_string());
            break;
        }

        let (head, tail) = rest.split_at(split_point(rest, max_chars));
        chunks.push(head.trim_end().to_string());
        rest = tail.trim_start();
    }

    chunks
}

/// Strip emphasis marks and split, dropping text that is blank afterwards.
#[must_use]
pub fn prepare(text: &str, max_chars: usize) -> Vec<String> {
    let plain = strip_emphasis_marks(text);
    if plain.trim().is_empty() {
        return Vec::new();
    }
    split(&plain, max_chars)
}

// ── Internal helpers ───────────────────────────────────────────────

/// Byte offset just past the character the next chunk should end on.
///
/// Boundaries are searched up to and including index `max_chars`. `text`
/// must hold more than `max_chars` characters and must not start with
/// whitespace.
fn split_point(text: &str, max_chars: usize) -> usize {
    let window: Vec<(usize, char)> = text.char_indices().take(max_chars + 1).collect();
    let end_of = |&(idx, c): &(usize, char)| idx + c.len_utf8();

    window
        .iter()
        .rev()
        .find(|(_, c)| SENTENCE_BREAKS.contains(c))
        .or_else(|| window.iter().rev().find(|(_, c)| c.is_whitespace()))
        .or_else(|| window.get(max_chars - 1))
        .map_or(text.len(), end_of)
}
