//! Separator-preferring text chunker with overlap.
//!
//! Splits corpus text into chunks of at most `chunk_size` characters where
//! each chunk shares its first `chunk_overlap` characters with the tail of
//! the previous chunk. Cut points prefer the largest semantic separator
//! present in the window: paragraph break (`"\n\n"`), then line break,
//! then word space, falling back to a raw cut at `chunk_size`.
//!
//! Chunks are exact substrings of the input, so concatenating chunk 0 with
//! every later chunk minus its leading overlap reproduces the input.

/// Separators tried in order of preference; a raw cut is the implicit last resort.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Split `text` into overlapping chunks. Sizes are measured in characters
/// and cuts always land on UTF-8 char boundaries.
///
/// Empty input yields no chunks; input shorter than `chunk_size` yields a
/// single chunk equal to the whole text. Out-of-range parameters degrade
/// rather than panic: a zero `chunk_size` yields the whole text as one
/// chunk, and `chunk_overlap` is capped at `chunk_size - 1` so every
/// window advances.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if chunk_size == 0 {
        return vec![text.to_string()];
    }
    let chunk_overlap = chunk_overlap.min(chunk_size - 1);

    // Byte offset of every char, so windows can be addressed in char units.
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n_chars = offsets.len();
    let byte_of = |k: usize| if k < n_chars { offsets[k] } else { text.len() };

    let mut chunks = Vec::new();
    let mut start = 0usize; // char index of the current window
    loop {
        if n_chars - start <= chunk_size {
            chunks.push(text[byte_of(start)..].to_string());
            break;
        }

        let window_start = byte_of(start);
        let window_end = byte_of(start + chunk_size);
        // The cut must leave at least one char beyond the shared overlap,
        // otherwise the next window would not advance.
        let min_cut = byte_of(start + chunk_overlap + 1);

        let cut = pick_cut(text, window_start, min_cut, window_end);
        chunks.push(text[window_start..cut].to_string());

        // Next chunk begins `chunk_overlap` chars before the cut.
        let cut_char = offsets.partition_point(|&b| b < cut);
        start = cut_char - chunk_overlap;
    }

    chunks
}

/// Choose a cut point in `(min_cut..=window_end]`, preferring the latest
/// occurrence of the largest separator. The cut falls just after the
/// separator so the separator stays with the chunk it terminates.
fn pick_cut(text: &str, window_start: usize, min_cut: usize, window_end: usize) -> usize {
    for sep in SEPARATORS {
        if let Some(pos) = text[window_start..window_end].rfind(sep) {
            let cut = window_start + pos + sep.len();
            if cut >= min_cut {
                return cut;
            }
        }
    }
    window_end
}
