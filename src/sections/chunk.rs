//! Overlapping, length-bounded chunking of one section's lines

use crate::document::normalize_text;

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `count` characters of `text` (all of it when shorter).
fn tail_chars(text: &str, count: usize) -> String {
    let len = char_len(text);
    text.chars().skip(len.saturating_sub(count)).collect()
}

/// Greedily pack lines into chunks of at most `max_chars` characters.
///
/// A chunk that has to be closed seeds the next one with its trailing
/// `overlap_chars` characters. When the seeded chunk is still too long it is
/// cut once at `max_chars` and the remainder, overlap included, carries on
/// collecting lines. A single line is never split any further, so a chunk
/// may exceed `max_chars`.
pub(crate) fn chunk_lines(lines: &[String], max_chars: usize, overlap_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let overlap = overlap_chars.min(max_chars - 1);

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines.iter().filter(|line| !line.is_empty()) {
        if current.is_empty() {
            current = line.clone();
            continue;
        }
        if char_len(&current) + 1 + char_len(line) <= max_chars {
            current.push('\n');
            current.push_str(line);
            continue;
        }

        let tail = tail_chars(&current, overlap);
        chunks.push(std::mem::take(&mut current));
        current = if tail.is_empty() {
            line.clone()
        } else {
            format!("{tail}\n{line}")
        };

        if char_len(&current) > max_chars {
            chunks.push(current.chars().take(max_chars).collect());
            current = current.chars().skip(max_chars - overlap).collect();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .iter()
        .map(|chunk| normalize_text(chunk))
        .filter(|chunk| !chunk.is_empty())
        .collect()
}
