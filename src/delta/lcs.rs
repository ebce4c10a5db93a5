//! Sequence alignment via longest common subsequence
//!
//! Produces difflib-style opcodes: maximal `Equal` spans separated by the
//! `Insert`, `Delete` or `Replace` span covering each gap.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// `a[i1..i2]` relates to `b[j1..j2]` as described by `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: OpTag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

/// Last row of the LCS length table of `a` against every prefix of `b`,
/// or against every suffix of `b` when `reverse` is set (both sides read
/// back to front). Only two rows are ever held.
fn lcs_row<T: PartialEq>(a: &[T], b: &[T], reverse: bool) -> Vec<u32> {
    let at = |items: &[T], k: usize| if reverse { items.len() - 1 - k } else { k };
    let n = b.len();
    let mut previous = vec![0u32; n + 1];
    let mut current = vec![0u32; n + 1];

    for i in 0..a.len() {
        let x = &a[at(a, i)];
        for j in 0..n {
            current[j + 1] = if *x == b[at(b, j)] {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous
}

/// Hirschberg's divide and conquer: halve `a`, find where an LCS crosses the
/// middle row, recurse on both quadrants. Memory stays linear in `b`.
fn collect_pairs<T: PartialEq>(a: &[T], b: &[T], offset: (usize, usize), pairs: &mut Vec<(usize, usize)>) {
    if a.is_empty() || b.is_empty() {
        return;
    }
    if let [only] = a {
        if let Some(j) = b.iter().position(|y| y == only) {
            pairs.push((offset.0, offset.1 + j));
        }
        return;
    }

    let mid = a.len() / 2;
    let forward = lcs_row(&a[..mid], b, false);
    let backward = lcs_row(&a[mid..], b, true);
    let n = b.len();
    let mut split = 0;
    for j in 1..=n {
        if forward[j] + backward[n - j] > forward[split] + backward[n - split] {
            split = j;
        }
    }

    collect_pairs(&a[..mid], &b[..split], offset, pairs);
    collect_pairs(&a[mid..], &b[split..], (offset.0 + mid, offset.1 + split), pairs);
}

/// Matched index pairs of one LCS, in increasing order on both sides.
fn matching_pairs<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    // Common prefix and suffix never need the alignment
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mut pairs: Vec<(usize, usize)> = (0..prefix).map(|k| (k, k)).collect();

    let a_tail = a.len() - suffix;
    let b_tail = b.len() - suffix;
    collect_pairs(&a[prefix..a_tail], &b[prefix..b_tail], (prefix, prefix), &mut pairs);

    pairs.extend((0..suffix).map(|k| (a_tail + k, b_tail + k)));
    pairs
}

fn push_gap(ops: &mut Vec<Opcode>, i1: usize, i2: usize, j1: usize, j2: usize) {
    let tag = match (i1 < i2, j1 < j2) {
        (true, true) => OpTag::Replace,
        (true, false) => OpTag::Delete,
        (false, true) => OpTag::Insert,
        (false, false) => return,
    };
    ops.push(Opcode { tag, i1, i2, j1, j2 });
}

/// Compute the opcodes transforming `a` into `b`.
pub fn opcodes<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Opcode> {
    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);

    for (ai, bj) in matching_pairs(a, b) {
        push_gap(&mut ops, i, ai, j, bj);
        match ops.last_mut() {
            Some(last) if last.tag == OpTag::Equal && last.i2 == ai && last.j2 == bj => {
                last.i2 += 1;
                last.j2 += 1;
            }
            _ => ops.push(Opcode {
                tag: OpTag::Equal,
                i1: ai,
                i2: ai + 1,
                j1: bj,
                j2: bj + 1,
            }),
        }
        i = ai + 1;
        j = bj + 1;
    }
    push_gap(&mut ops, i, a.len(), j, b.len());

    ops
}
