//! Distributing replacement text over existing runs and paragraphs

/// Split `new_len` characters over runs proportionally to their original
/// lengths, using largest-remainder rounding.
///
/// The result has one entry per run and always sums to `new_len`. When the
/// original runs hold no text at all, everything goes to the first run.
/// Ties between equal remainders favour the later run.
pub fn proportional_split(lengths: &[usize], new_len: usize) -> Vec<usize> {
    if lengths.is_empty() {
        return Vec::new();
    }

    let total: usize = lengths.iter().sum();
    if total == 0 {
        let mut counts = vec![0; lengths.len()];
        counts[0] = new_len;
        return counts;
    }

    let (new_len_wide, total_wide) = (new_len as u128, total as u128);
    let mut counts = Vec::with_capacity(lengths.len());
    let mut remainders = Vec::with_capacity(lengths.len());
    for (index, &length) in lengths.iter().enumerate() {
        let scaled = new_len_wide * length as u128;
        counts.push((scaled / total_wide) as usize);
        remainders.push((scaled % total_wide, index));
    }

    let assigned: usize = counts.iter().sum();
    remainders.sort_unstable_by(|a, b| b.cmp(a));
    for &(_, index) in remainders.iter().take(new_len - assigned) {
        counts[index] += 1;
    }
    counts
}

/// Cut `text` into consecutive segments, one per original run length.
pub fn split_segments(text: &str, lengths: &[usize]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut cursor = 0;
    proportional_split(lengths, chars.len())
        .into_iter()
        .map(|count| {
            let segment: String = chars[cursor..cursor + count].iter().collect();
            cursor += count;
            segment
        })
        .collect()
}

/// Assign the lines of a replacement cell text to `paragraph_count` paragraphs.
///
/// Lines come from `\n` breaks. Text without breaks that still carries the
/// extractor's ` / ` cell separator is split on that instead when the cell has
/// several paragraphs. Surplus lines are folded into the last paragraph and
/// missing ones become empty.
pub fn cell_lines(text: &str, paragraph_count: usize) -> Vec<String> {
    if paragraph_count == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = if !text.contains('\n') && paragraph_count > 1 && text.contains(" / ") {
        text.split(" / ").map(str::to_string).collect()
    } else {
        text.split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect()
    };

    if lines.len() > paragraph_count {
        let extra = lines.split_off(paragraph_count).join(" ");
        let extra = extra.trim();
        if !extra.is_empty() {
            if let Some(last) = lines.last_mut() {
                *last = format!("{last} {extra}").trim().to_string();
            }
        }
    }
    lines.resize(paragraph_count, String::new());
    lines
}
