//! A1-style cell references

/// Last column of a worksheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// Split `"AB12"` into (row 12, column 28), both 1-based.
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.trim().replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        let value = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        column = column.checked_mul(26)?.checked_add(value)?;
    }
    let row = digits.parse::<u32>().ok().filter(|row| *row > 0)?;
    Some((row, column))
}

/// Column letters for a 1-based column index (`28` → `"AB"`).
pub fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

pub fn cell_ref(row: u32, column: u32) -> String {
    format!("{}{row}", column_letter(column))
}
