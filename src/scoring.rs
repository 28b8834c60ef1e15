//! Mission scoring calculator.
//!
//! Pure functions over mission definitions and a sparse response map.
//! Missing, malformed or out-of-range answers contribute 0; nothing here fails.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Mission, MissionType, Points, ResponseValue, Responses};

/// Text answer that marks a plain switch as accomplished.
pub const SWITCH_YES: &str = "Sim";

/// Contribution of every slot of one mission (index 0 = mission, 1..N = sub-missions).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MissionScore {
  pub id: String,
  pub name: String,
  pub total: i64,
  pub parts: Vec<i64>,
}

/// Total score for a response map.
pub fn compute_score(missions: &[Mission], responses: &Responses) -> i64 {
  score_breakdown(missions, responses).iter().map(|m| m.total).fold(0, i64::saturating_add)
}

/// Per-mission contributions, in mission order.
pub fn score_breakdown(missions: &[Mission], responses: &Responses) -> Vec<MissionScore> {
  missions
    .iter()
    .map(|mission| {
      let answers = responses.get(&mission.id);
      let answer = |slot: u32| answers.and_then(|a| a.get(&slot));

      let mut parts = Vec::with_capacity(mission.submissions.len() + 1);
      parts.push(slot_points(&mission.kind, &mission.points, answer(0)));
      for (i, sub) in mission.submissions.iter().enumerate() {
        parts.push(slot_points(&sub.kind, &sub.points, answer(i as u32 + 1)));
      }

      MissionScore {
        id: mission.id.clone(),
        name: mission.name.clone(),
        total: parts.iter().copied().fold(0, i64::saturating_add),
        parts,
      }
    })
    .collect()
}

/// Best achievable total for a mission set.
pub fn max_score(missions: &[Mission]) -> i64 {
  missions
    .iter()
    .map(|m| {
      m.submissions
        .iter()
        .map(|s| slot_max(&s.kind, &s.points))
        .fold(slot_max(&m.kind, &m.points), i64::saturating_add)
    })
    .fold(0, i64::saturating_add)
}

/// Points for one slot given its stored answer (if any).
pub fn slot_points(kind: &MissionType, points: &Points, answer: Option<&ResponseValue>) -> i64 {
  let Some(answer) = answer else { return 0 };
  match kind {
    MissionType::Switch { options } if options.is_empty() => {
      let fixed = points.fixed_value();
      let accomplished = match answer {
        ResponseValue::Text(s) => s.trim() == SWITCH_YES,
        ResponseValue::Flag(b) => *b,
        ResponseValue::Number(n) => fixed != 0 && *n == fixed as f64,
        ResponseValue::Empty => false,
      };
      if accomplished { fixed } else { 0 }
    }
    MissionType::Switch { options } => {
      let picked = match answer {
        ResponseValue::Text(s) => options.iter().position(|o| o == s.trim()),
        other => other
          .as_index()
          .and_then(|i| usize::try_from(i).ok())
          .filter(|i| *i < options.len()),
      };
      match (picked, points) {
        (Some(_), Points::Flat(p)) => *p,
        (Some(i), Points::Scale(v)) => v.get(i).copied().unwrap_or(0),
        (None, _) => 0,
      }
    }
    MissionType::Range { start, end } => {
      let count = end.saturating_sub(*start).saturating_add(1);
      match answer.as_index() {
        Some(i) if i >= 0 && i < count => match points {
          Points::Flat(p) => i.saturating_mul(*p),
          Points::Scale(v) => usize::try_from(i).ok().and_then(|i| v.get(i)).copied().unwrap_or(0),
        },
        _ => 0,
      }
    }
    MissionType::Unknown(_) => 0,
  }
}

fn slot_max(kind: &MissionType, points: &Points) -> i64 {
  let best = match kind {
    MissionType::Switch { options } if options.is_empty() => points.fixed_value(),
    MissionType::Switch { options } => match points {
      Points::Flat(p) => *p,
      Points::Scale(v) => v.iter().take(options.len()).copied().max().unwrap_or(0),
    },
    MissionType::Range { start, end } => {
      let count = end.saturating_sub(*start).saturating_add(1);
      if count <= 0 {
        0
      } else {
        match points {
          Points::Flat(p) => (count - 1).saturating_mul(*p).max(0),
          Points::Scale(v) => v.iter().take(count as usize).copied().max().unwrap_or(0),
        }
      }
    }
    MissionType::Unknown(_) => 0,
  };
  best.max(0)
}

/// Count of answered slots per mission, handy for "x of y answered" indicators.
pub fn answered_slots(missions: &[Mission], responses: &Responses) -> HashMap<String, usize> {
  missions
    .iter()
    .map(|m| {
      let n = responses
        .get(&m.id)
        .map(|a| {
          a.iter()
            .filter(|(slot, v)| (**slot as usize) <= m.submissions.len() && **v != ResponseValue::Empty)
            .count()
        })
        .unwrap_or(0);
      (m.id.clone(), n)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SubMission;

  fn mission(id: &str, kind: MissionType, points: Points) -> Mission {
    Mission { id: id.into(), name: id.into(), kind, points, submissions: vec![] }
  }

  fn switch(id: &str, points: i64) -> Mission {
    mission(id, MissionType::Switch { options: vec![] }, Points::Flat(points))
  }

  fn answers(id: &str, slots: &[(u32, ResponseValue)]) -> Responses {
    let mut r = Responses::new();
    r.insert(id.into(), slots.iter().cloned().collect());
    r
  }

  fn text(s: &str) -> ResponseValue { ResponseValue::Text(s.into()) }

  #[test]
  fn empty_inputs_score_zero() {
    assert_eq!(compute_score(&[], &Responses::new()), 0);
    let ms = vec![switch("M01", 8), mission("M02", MissionType::Range { start: 0, end: 5 }, Points::Flat(3))];
    assert_eq!(compute_score(&ms, &Responses::new()), 0);
  }

  #[test]
  fn plain_switch_awards_on_sim_only() {
    let ms = vec![switch("M01", 8)];
    assert_eq!(compute_score(&ms, &answers("M01", &[(0, text("Sim"))])), 8);
    assert_eq!(compute_score(&ms, &answers("M01", &[(0, text("Não"))])), 0);
    assert_eq!(compute_score(&ms, &answers("M01", &[(0, ResponseValue::Flag(true))])), 8);
    assert_eq!(compute_score(&ms, &answers("M01", &[(0, ResponseValue::Number(8.0))])), 8);
    assert_eq!(compute_score(&ms, &answers("M01", &[(0, ResponseValue::Number(1.0))])), 0);
  }

  #[test]
  fn range_with_scale_indexes_points() {
    let ms = vec![mission("M03", MissionType::Range { start: 0, end: 5 }, Points::Scale(vec![0, 2, 4, 6, 8, 10]))];
    assert_eq!(compute_score(&ms, &answers("M03", &[(0, ResponseValue::Number(3.0))])), 6);
    assert_eq!(compute_score(&ms, &answers("M03", &[(0, ResponseValue::Number(9.0))])), 0);
    assert_eq!(compute_score(&ms, &answers("M03", &[(0, text("5"))])), 10);
    assert_eq!(compute_score(&ms, &answers("M03", &[(0, ResponseValue::Number(-1.0))])), 0);
  }

  #[test]
  fn range_with_flat_points_scales_linearly() {
    let ms = vec![mission("M04", MissionType::Range { start: 1, end: 4 }, Points::Flat(5))];
    assert_eq!(compute_score(&ms, &answers("M04", &[(0, ResponseValue::Number(3.0))])), 15);
    // window 1..=4 has 4 steps, so index 4 is out of range
    assert_eq!(compute_score(&ms, &answers("M04", &[(0, ResponseValue::Number(4.0))])), 0);
  }

  #[test]
  fn range_index_past_short_scale_is_zero() {
    let ms = vec![mission("M05", MissionType::Range { start: 0, end: 10 }, Points::Scale(vec![0, 5]))];
    assert_eq!(compute_score(&ms, &answers("M05", &[(0, ResponseValue::Number(7.0))])), 0);
  }

  #[test]
  fn switch_with_options_uses_label_or_index() {
    let opts = MissionType::Switch { options: vec!["Nenhum".into(), "Parcial".into(), "Completo".into()] };
    let ms = vec![mission("M06", opts, Points::Scale(vec![0, 10, 20]))];
    assert_eq!(compute_score(&ms, &answers("M06", &[(0, text("Completo"))])), 20);
    assert_eq!(compute_score(&ms, &answers("M06", &[(0, ResponseValue::Number(1.0))])), 10);
    assert_eq!(compute_score(&ms, &answers("M06", &[(0, text("Talvez"))])), 0);
    assert_eq!(compute_score(&ms, &answers("M06", &[(0, ResponseValue::Number(3.0))])), 0);
  }

  #[test]
  fn unknown_type_scores_zero() {
    let ms = vec![mission("M07", MissionType::Unknown("bonus".into()), Points::Flat(50))];
    assert_eq!(compute_score(&ms, &answers("M07", &[(0, text("Sim"))])), 0);
  }

  #[test]
  fn submissions_are_scored_by_slot() {
    let mut m = switch("M08", 10);
    m.submissions = vec![
      SubMission { id: None, name: "a".into(), kind: MissionType::Switch { options: vec![] }, points: Points::Flat(5) },
      SubMission { id: None, name: "b".into(), kind: MissionType::Range { start: 0, end: 3 }, points: Points::Flat(2) },
    ];
    let r = answers("M08", &[(0, text("Sim")), (2, ResponseValue::Number(3.0)), (9, text("Sim"))]);
    let breakdown = score_breakdown(&[m.clone()], &r);
    assert_eq!(breakdown[0].parts, vec![10, 0, 6]);
    assert_eq!(breakdown[0].total, 16);
    assert_eq!(compute_score(&[m], &r), 16);
  }

  #[test]
  fn score_is_deterministic_and_order_independent() {
    let a = switch("A", 8);
    let b = mission("B", MissionType::Range { start: 0, end: 5 }, Points::Flat(4));
    let mut r = answers("A", &[(0, text("Sim"))]);
    r.extend(answers("B", &[(0, ResponseValue::Number(2.0))]));
    let forward = compute_score(&[a.clone(), b.clone()], &r);
    assert_eq!(forward, 16);
    assert_eq!(compute_score(&[a.clone(), b.clone()], &r), forward);
    assert_eq!(compute_score(&[b, a], &r), forward);
  }

  #[test]
  fn max_score_takes_best_of_each_slot() {
    let mut m = switch("M01", 20);
    m.submissions.push(SubMission {
      id: None,
      name: "tokens".into(),
      kind: MissionType::Range { start: 0, end: 3 },
      points: Points::Scale(vec![0, 10, 15, 25, 99]),
    });
    let ranged = mission("M02", MissionType::Range { start: 0, end: 4 }, Points::Flat(5));
    assert_eq!(max_score(&[m, ranged]), 20 + 25 + 20);
  }

  #[test]
  fn huge_point_values_saturate_instead_of_overflowing() {
    let mut big = switch("A", i64::MAX);
    big.submissions.push(SubMission {
      id: None,
      name: "again".into(),
      kind: MissionType::Switch { options: vec![] },
      points: Points::Flat(i64::MAX),
    });
    let ms = vec![big, switch("B", i64::MAX)];
    let mut r = answers("A", &[(0, text("Sim")), (1, text("Sim"))]);
    r.extend(answers("B", &[(0, text("Sim"))]));
    assert_eq!(score_breakdown(&ms, &r)[0].total, i64::MAX);
    assert_eq!(compute_score(&ms, &r), i64::MAX);
    assert_eq!(max_score(&ms), i64::MAX);
  }

  #[test]
  fn answered_slots_ignores_unknown_and_empty_slots() {
    let mut m = switch("M01", 20);
    m.submissions.push(SubMission { id: None, name: "x".into(), kind: MissionType::default(), points: Points::Flat(1) });
    let r = answers("M01", &[(0, text("Sim")), (1, ResponseValue::Empty), (5, text("Sim"))]);
    assert_eq!(answered_slots(&[m], &r)["M01"], 1);
  }
}
