use std::ops::Range;

use crate::Chunk;

fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Split `text` into sentence-aligned chunks of roughly `sentences / num_parts`
/// sentences each.
///
/// A sentence ends after `.`, `!` or `?` when followed by whitespace. The
/// whitespace between sentences that fall into different chunks is dropped;
/// inside a chunk the original text is kept verbatim. Leftover sentences form
/// a final, possibly smaller, chunk, so the number of chunks may differ from
/// `num_parts`. When `num_parts` is zero or exceeds the sentence count every
/// sentence becomes its own chunk.
pub fn split(text: &str, num_parts: usize) -> Vec<Chunk> {
    let sentences = sentence_spans(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let target = sentences
        .len()
        .checked_div(num_parts)
        .unwrap_or(0)
        .max(1);

    sentences
        .chunks(target)
        .filter_map(|group| {
            let start = group.first()?.start;
            let end = group.last()?.end;
            text.get(start..end).map(str::to_owned)
        })
        .enumerate()
        .map(|(id, text)| Chunk { id, text })
        .collect()
}

// Byte ranges of the sentences in `text`, excluding surrounding whitespace.
fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let sentence_start = match start {
            Some(sentence_start) => sentence_start,
            None if ch.is_whitespace() => continue,
            None => *start.insert(idx),
        };

        if is_sentence_terminator(ch)
            && chars.peek().is_some_and(|(_, next)| next.is_whitespace())
        {
            spans.push(sentence_start..idx.saturating_add(ch.len_utf8()));
            start = None;
        }
    }

    if let Some(sentence_start) = start {
        let tail = text.get(sentence_start..).unwrap_or_default().trim_end();
        if !tail.is_empty() {
            spans.push(sentence_start..sentence_start.saturating_add(tail.len()));
        }
    }

    spans
}
