use std::fmt;

use tracing::trace;

use crate::engine::compare::{Diff, FloatPolicy};
use crate::engine::types::{ResultSet, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Same rows in the same order.
    ExactOrdered,
    /// Same multiset of rows, any order.
    ContainsOnly,
    /// Every expected row present (with multiplicity); extra actual rows allowed.
    Contains,
    /// Same column tag sequence; rows ignored.
    HasColumns,
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareMode::ExactOrdered => "exact ordered",
            CompareMode::ContainsOnly => "contains only",
            CompareMode::Contains => "contains",
            CompareMode::HasColumns => "has columns",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Match,
    Mismatch(Diff),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match)
    }

    pub fn diff(&self) -> Option<&Diff> {
        match self {
            MatchResult::Match => None,
            MatchResult::Mismatch(diff) => Some(diff),
        }
    }
}

pub fn compare(
    actual: &ResultSet,
    expected: &ResultSet,
    mode: CompareMode,
    policy: FloatPolicy,
) -> MatchResult {
    let mut diff = Diff::new(mode);
    match mode {
        CompareMode::ExactOrdered => ordered(actual.rows(), expected.rows(), policy, &mut diff),
        CompareMode::ContainsOnly => unordered(actual.rows(), expected.rows(), policy, true, &mut diff),
        CompareMode::Contains => unordered(actual.rows(), expected.rows(), policy, false, &mut diff),
        CompareMode::HasColumns => {
            let (a, e) = (actual.column_types(), expected.column_types());
            if a != e {
                diff.columns = Some((a, e));
            }
        }
    }
    trace!(%mode, matched = diff.is_empty(), "Compared result sets");
    if diff.is_empty() {
        MatchResult::Match
    } else {
        MatchResult::Mismatch(diff)
    }
}

fn ordered(actual: &[Row], expected: &[Row], policy: FloatPolicy, diff: &mut Diff) {
    let longest = actual.len().max(expected.len());
    for index in 0..longest {
        match (actual.get(index), expected.get(index)) {
            (Some(a), Some(e)) if a.matches(e, policy) => {}
            (a, e) => {
                diff.first_divergence.get_or_insert(index);
                if let Some(a) = a {
                    diff.unexpected.push((index, a.clone()));
                }
                if let Some(e) = e {
                    diff.missing.push((index, e.clone()));
                }
            }
        }
    }
}

/// Multiset matching: each actual row can satisfy at most one expected row.
fn unordered(
    actual: &[Row],
    expected: &[Row],
    policy: FloatPolicy,
    exhaustive: bool,
    diff: &mut Diff,
) {
    let used = if policy == FloatPolicy::Exact {
        first_fit(actual, expected, diff)
    } else {
        maximum_matching(actual, expected, policy, diff)
    };
    if exhaustive {
        diff.unexpected.extend(
            actual
                .iter()
                .enumerate()
                .filter(|(i, _)| !used[*i])
                .map(|(i, a)| (i, a.clone())),
        );
    }
}

/// Exact equality is transitive, so taking the first free equal row never
/// blocks a later expected row.
fn first_fit(actual: &[Row], expected: &[Row], diff: &mut Diff) -> Vec<bool> {
    let mut used = vec![false; actual.len()];
    for (e_index, e) in expected.iter().enumerate() {
        let hit = actual
            .iter()
            .enumerate()
            .position(|(a_index, a)| !used[a_index] && a.matches(e, FloatPolicy::Exact));
        match hit {
            Some(a_index) => used[a_index] = true,
            None => diff.missing.push((e_index, e.clone())),
        }
    }
    used
}

/// Tolerant float equality is not transitive; augmenting paths find a full
/// pairing whenever one exists.
fn maximum_matching(
    actual: &[Row],
    expected: &[Row],
    policy: FloatPolicy,
    diff: &mut Diff,
) -> Vec<bool> {
    let candidates: Vec<Vec<usize>> = expected
        .iter()
        .map(|e| {
            actual
                .iter()
                .enumerate()
                .filter(|(_, a)| a.matches(e, policy))
                .map(|(a_index, _)| a_index)
                .collect()
        })
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; actual.len()];
    for (e_index, e) in expected.iter().enumerate() {
        let mut visited = vec![false; actual.len()];
        if !augment(e_index, &candidates, &mut owner, &mut visited) {
            diff.missing.push((e_index, e.clone()));
        }
    }
    owner.iter().map(Option::is_some).collect()
}

fn augment(
    e_index: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &a_index in &candidates[e_index] {
        if visited[a_index] {
            continue;
        }
        visited[a_index] = true;
        let free = match owner[a_index] {
            None => true,
            Some(previous) => augment(previous, candidates, owner, visited),
        };
        if free {
            owner[a_index] = Some(e_index);
            return true;
        }
    }
    false
}
