//! Tournament ranking from per-round match scores.
//!
//! Teams are ordered by their best round, then second best, then third (and so
//! on). Teams with identical sorted score lists share a rank: 1, 2, 2, 4.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamRounds {
  pub team: String,
  #[serde(default)]
  pub scores: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTeam {
  pub rank: usize,
  pub team: String,
  pub best: i64,
  /// Round scores, highest first.
  pub sorted_scores: Vec<i64>,
}

/// Compare two descending score lists; a missing round loses to any played one.
fn compare_desc(a: &[i64], b: &[i64]) -> Ordering {
  for i in 0..a.len().max(b.len()) {
    let ord = match (a.get(i), b.get(i)) {
      (Some(x), Some(y)) => y.cmp(x),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    };
    if ord != Ordering::Equal {
      return ord;
    }
  }
  Ordering::Equal
}

pub fn rank_teams(entries: &[TeamRounds]) -> Vec<RankedTeam> {
  let mut rows: Vec<(String, Vec<i64>)> = entries
    .iter()
    .map(|e| {
      let mut s = e.scores.clone();
      s.sort_unstable_by(|a, b| b.cmp(a));
      (e.team.clone(), s)
    })
    .collect();
  rows.sort_by(|a, b| compare_desc(&a.1, &b.1).then_with(|| a.0.cmp(&b.0)));

  let mut out: Vec<RankedTeam> = Vec::with_capacity(rows.len());
  for (i, (team, sorted_scores)) in rows.into_iter().enumerate() {
    let rank = match out.last() {
      Some(prev) if compare_desc(&prev.sorted_scores, &sorted_scores) == Ordering::Equal => prev.rank,
      _ => i + 1,
    };
    out.push(RankedTeam { rank, team, best: sorted_scores.first().copied().unwrap_or(0), sorted_scores });
  }
  out
}
