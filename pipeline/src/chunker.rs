//! Overlapping text chunker.
//!
//! Splits document text into windows of at most `chunk_size` characters,
//! preferring semantic boundaries (paragraph, then line, then sentence, then
//! word) over hard character cuts, and carrying `chunk_overlap` trailing
//! characters into the next window so context survives the split.
//!
//! Guarantees:
//! - every character of the input appears in at least one chunk
//! - `chunk.len() <= chunk_size` for every produced chunk
//! - termination: each window starts strictly after the previous one

use data_sources::{DocMetadata, Document};

/// A chunk of a source document with the parent metadata attached.
#[derive(Clone, Debug)]
pub struct DocChunk {
    pub text: String,
    pub metadata: DocMetadata,
}

/// Split all documents, propagating each parent's metadata unchanged.
pub fn split_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<DocChunk> {
    documents
        .iter()
        .flat_map(|doc| {
            split_text(&doc.text, chunk_size, chunk_overlap)
                .into_iter()
                .map(|text| DocChunk {
                    text,
                    metadata: doc.metadata.clone(),
                })
        })
        .collect()
}

/// Split one text into overlapping windows.
///
/// `chunk_overlap` must be smaller than `chunk_size` (enforced by config
/// validation upstream); values are clamped here so the function itself
/// always terminates.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let chunk_size = chunk_size.max(1);
    let chunk_overlap = chunk_overlap.min(chunk_size.saturating_sub(1));

    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let hard_end = floor_char_boundary(text, (start + chunk_size).min(text.len()));
        let mut end = if hard_end == text.len() {
            hard_end
        } else {
            pick_boundary(&text[start..hard_end], chunk_overlap)
                .map(|cut| start + cut)
                .unwrap_or(hard_end)
        };
        if end <= start {
            // Degenerate window (chunk_size smaller than one char); take
            // the next full character so the loop always advances.
            end = ceil_char_boundary(text, start + 1);
        }

        chunks.push(text[start..end].to_string());

        if end >= text.len() {
            break;
        }

        // Step back by the overlap, but always move forward.
        let mut next = end.saturating_sub(chunk_overlap);
        next = ceil_char_boundary(text, next);
        if next <= start {
            next = ceil_char_boundary(text, start + 1).min(end);
        }
        start = next;
    }

    chunks
}

/// Latest semantic boundary within a window, by preference order.
///
/// A cut inside the overlap region (`cut <= min_cut`) would make the window
/// fail to advance past the carried tail, so such boundaries are skipped in
/// favor of the next separator class. Returns the cut position (exclusive
/// end) or `None` for a hard cut.
fn pick_boundary(window: &str, min_cut: usize) -> Option<usize> {
    for sep in ["\n\n", "\n", ". ", " "] {
        if let Some(pos) = window.rfind(sep) {
            let cut = pos + sep.len();
            if cut > min_cut {
                return Some(cut);
            }
        }
    }
    None
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
