//! Chunk command handler.

use crate::presentation::chunk_listing;

/// Print the chunks `text` would be spoken as.
pub fn execute(text: &str, max_chars: usize) {
    let chunks = sadak_speech::prepare(text, max_chars);
    print!("{}", chunk_listing(&chunks));
    if chunks.is_empty() {
        println!();
    }
}
