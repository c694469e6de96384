//! Ordering and rank assignment.
//!
//! Scores closer than [`TIE_EPSILON`] are treated as tied and ordered by
//! ascending institution name. Ranks follow competition ranking: a school
//! tied with the school immediately above it shares that school's rank,
//! and the next distinct score resumes at its 1-based position.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dataset::SchoolRecord;

/// Scores differing by less than this are tied.
pub const TIE_EPSILON: f64 = 1e-5;

/// A school with its composite score and final rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub school: SchoolRecord,
    pub raw_score: f64,
    pub rank: u32,
}

pub fn scores_tied(a: f64, b: f64) -> bool {
    (a - b).abs() < TIE_EPSILON
}

/// Descending by score; near-equal scores fall back to ascending name.
pub fn compare_scored(a: (&str, f64), b: (&str, f64)) -> Ordering {
    if scores_tied(a.1, b.1) {
        a.0.cmp(b.0)
    } else {
        b.1.total_cmp(&a.1)
    }
}

/// Sort by score and assign competition ranks.
pub fn rank_scored(scored: Vec<(SchoolRecord, f64)>) -> Vec<ScoredRecord> {
    let sorted = merge_sort_by(scored, &|a: &(SchoolRecord, f64), b: &(SchoolRecord, f64)| {
        compare_scored((a.0.name.as_str(), a.1), (b.0.name.as_str(), b.1))
    });

    let mut ranked: Vec<ScoredRecord> = Vec::with_capacity(sorted.len());
    for (index, (school, raw_score)) in sorted.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if scores_tied(raw_score, prev.raw_score) => prev.rank,
            _ => index as u32 + 1,
        };
        ranked.push(ScoredRecord { school, raw_score, rank });
    }
    ranked
}

// The epsilon comparator is not transitive, which std's sorts may reject
// with a panic. A plain stable merge sort accepts it and stays deterministic
// for a given input order.
fn merge_sort_by<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(l, r) == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}
