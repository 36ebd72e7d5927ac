//! Script segmentation
//!
//! Splits the source script into renderable chunks at sentence boundaries,
//! packing sentences up to a word budget. Chunk character ranges tile the
//! script exactly (no gaps, no overlaps); the stored text is the trimmed
//! slice of its range. Segmentation happens once at project creation and
//! is immutable afterwards.

use crate::error::{NarravoxError, Result};

/// One segmented chunk of script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptChunk {
    /// Trimmed text of the range.
    pub text: String,
    /// Byte offset of the range start in the script.
    pub char_start: usize,
    /// Byte offset one past the range end.
    pub char_end: usize,
}

/// Sentence spans tiling the script: each span ends after sentence-final
/// punctuation (or a newline) plus the whitespace run that follows it.
fn sentence_spans(script: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = script.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?' | '\n') {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if next.is_whitespace() {
                chars.next();
                end = j + next.len_utf8();
            } else {
                break;
            }
        }
        spans.push((start, end));
        start = end;
    }
    if start < script.len() {
        spans.push((start, script.len()));
    }

    // Whitespace-only spans carry no renderable text; fold them into the
    // preceding span so the tiling stays gap-free.
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (s, e) in spans {
        if script[s..e].trim().is_empty() {
            match merged.last_mut() {
                Some(last) => last.1 = e,
                None => merged.push((s, e)),
            }
        } else {
            merged.push((s, e));
        }
    }
    if let Some(&(s, e)) = merged.first() {
        if script[s..e].trim().is_empty() && merged.len() > 1 {
            merged[1].0 = s;
            merged.remove(0);
        }
    }
    merged
}

/// Split one over-long span into word groups of at most `max_words`,
/// preserving the tiling.
fn split_span_by_words(script: &str, start: usize, end: usize, max_words: usize) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut group_start = start;
    let mut words_in_group = 0;
    let mut chars = script[start..end].char_indices().peekable();
    let mut in_word = false;

    while let Some((rel, c)) = chars.next() {
        if c.is_whitespace() {
            if in_word {
                in_word = false;
                words_in_group += 1;
                if words_in_group >= max_words {
                    // Cut after the whitespace run following this word
                    let mut cut = start + rel + c.len_utf8();
                    while let Some(&(rel2, c2)) = chars.peek() {
                        if c2.is_whitespace() {
                            chars.next();
                            cut = start + rel2 + c2.len_utf8();
                        } else {
                            break;
                        }
                    }
                    groups.push((group_start, cut));
                    group_start = cut;
                    words_in_group = 0;
                }
            }
        } else {
            in_word = true;
        }
    }
    if group_start < end {
        groups.push((group_start, end));
    }
    groups
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Segment a script into chunks of at most `max_words` words, cut at
/// sentence boundaries where possible.
pub fn segment(script: &str, max_words: usize) -> Result<Vec<ScriptChunk>> {
    let max_words = max_words.max(1);
    let mut pieces: Vec<(usize, usize)> = Vec::new();
    for (s, e) in sentence_spans(script) {
        if word_count(&script[s..e]) > max_words {
            pieces.extend(split_span_by_words(script, s, e, max_words));
        } else {
            pieces.push((s, e));
        }
    }

    let mut chunks: Vec<ScriptChunk> = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    for (s, e) in pieces {
        current = match current {
            None => Some((s, e)),
            Some((cs, ce)) => {
                let combined = word_count(&script[cs..e]);
                if combined > max_words {
                    chunks.push(make_chunk(script, cs, ce));
                    Some((s, e))
                } else {
                    Some((cs, e))
                }
            }
        };
    }
    if let Some((cs, ce)) = current {
        chunks.push(make_chunk(script, cs, ce));
    }

    chunks.retain(|c| !c.text.is_empty());
    if chunks.is_empty() {
        return Err(NarravoxError::EmptyScript);
    }
    Ok(chunks)
}

fn make_chunk(script: &str, start: usize, end: usize) -> ScriptChunk {
    ScriptChunk {
        text: script[start..end].trim().to_string(),
        char_start: start,
        char_end: end,
    }
}
