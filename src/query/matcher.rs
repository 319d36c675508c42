//! Set operations over doc-id ordered match lists.
//!
//! Every list handled here holds [`Hit`]s sorted by ascending doc id with no
//! duplicates. Combining lists sums the scores of a document across them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use crate::error::{LoupeError, Result};
use crate::query::collector::Hit;

/// Matches of one query node, sorted by doc id.
pub type MatchList = Vec<Hit>;

/// Fail with an internal error unless `list` is strictly sorted by doc id.
pub fn check_sorted(list: &[Hit], context: &dyn fmt::Display) -> Result<()> {
    match list.windows(2).find(|w| w[0].doc_id >= w[1].doc_id) {
        Some(w) => Err(LoupeError::internal(format!(
            "{context}: doc ids out of order ({} then {})",
            w[0].doc_id, w[1].doc_id
        ))),
        None => Ok(()),
    }
}

/// Documents present in every list.
///
/// Lists are merged smallest first so the running result only shrinks.
pub fn intersect(mut lists: Vec<MatchList>) -> MatchList {
    if lists.is_empty() {
        return Vec::new();
    }
    lists.sort_by_key(Vec::len);

    let mut lists = lists.into_iter();
    let mut result = lists.next().unwrap_or_default();
    for list in lists {
        if result.is_empty() {
            break;
        }
        result = intersect_pair(&result, &list);
    }
    result
}

fn intersect_pair(left: &[Hit], right: &[Hit]) -> MatchList {
    let mut result = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let (a, b) = (left[i], right[j]);
        if a.doc_id < b.doc_id {
            i += 1;
        } else if a.doc_id > b.doc_id {
            j += 1;
        } else {
            result.push(Hit::new(a.doc_id, a.score + b.score));
            i += 1;
            j += 1;
        }
    }

    result
}

/// Documents present in at least one list.
pub fn union(lists: Vec<MatchList>) -> MatchList {
    match lists.len() {
        0 => return Vec::new(),
        1 => return lists.into_iter().next().unwrap_or_default(),
        _ => {}
    }

    let total: usize = lists.iter().map(Vec::len).sum();
    let mut result: MatchList = Vec::with_capacity(total);
    let mut cursors = vec![0usize; lists.len()];
    let mut heap = BinaryHeap::with_capacity(lists.len());

    for (index, list) in lists.iter().enumerate() {
        if let Some(first) = list.first() {
            heap.push(Reverse((first.doc_id, index)));
        }
    }

    while let Some(Reverse((doc_id, index))) = heap.pop() {
        let hit = lists[index][cursors[index]];
        match result.last_mut() {
            Some(last) if last.doc_id == doc_id => last.score += hit.score,
            _ => result.push(hit),
        }

        cursors[index] += 1;
        if let Some(next) = lists[index].get(cursors[index]) {
            heap.push(Reverse((next.doc_id, index)));
        }
    }

    result
}

/// Whether the term positions form a phrase.
///
/// `positions[i]` are the document positions of the i-th phrase term and
/// `offsets[i]` its position within the query. The phrase matches when, for
/// some position `p0` of the first term, every term `i` occurs within `slop`
/// of `p0 + offsets[i] - offsets[0]`.
pub fn phrase_matches(positions: &[&[u32]], offsets: &[u32], slop: u32) -> bool {
    let (Some(first), Some(&base)) = (positions.first(), offsets.first()) else {
        return false;
    };

    first.iter().any(|&p0| {
        positions
            .iter()
            .zip(offsets)
            .skip(1)
            .all(|(candidates, &offset)| locate(candidates, p0, offset - base, slop).is_some())
    })
}

/// Every occurrence of the phrase, as the document position chosen for each
/// term, ordered by the first term's position.
pub fn phrase_occurrences(positions: &[&[u32]], offsets: &[u32], slop: u32) -> Vec<Vec<u32>> {
    let (Some(first), Some(&base)) = (positions.first(), offsets.first()) else {
        return Vec::new();
    };

    first
        .iter()
        .filter_map(|&p0| {
            std::iter::once(Some(p0))
                .chain(
                    positions
                        .iter()
                        .zip(offsets)
                        .skip(1)
                        .map(|(candidates, &offset)| locate(candidates, p0, offset - base, slop)),
                )
                .collect::<Option<Vec<u32>>>()
        })
        .collect()
}

/// Earliest of the sorted `candidates` within `slop` of `p0 + distance`.
fn locate(candidates: &[u32], p0: u32, distance: u32, slop: u32) -> Option<u32> {
    let target = p0 as i64 + distance as i64;
    let slop = slop as i64;
    let start = candidates.partition_point(|&p| (p as i64) < target - slop);
    candidates
        .get(start)
        .copied()
        .filter(|&p| (p as i64) <= target + slop)
}
