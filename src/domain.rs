//! Domain models: missions and responses for scoring, movements, poses and
//! animation data for the robot path simulator.
//!
//! Mission definitions come from hand-edited JSON assets, so decoding is lenient:
//! odd shapes degrade to neutral values instead of failing the whole file.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Scoring mode selected by the first element of a mission's `type` tuple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMissionType", into = "Vec<Value>")]
pub enum MissionType {
  /// Yes/no or pick-one-of-several. Empty `options` means a plain "Sim" switch.
  Switch { options: Vec<String> },
  /// Ordinal scale over the inclusive window `start..=end`.
  Range { start: i64, end: i64 },
  /// Anything else; always scores 0.
  Unknown(String),
}

impl Default for MissionType {
  fn default() -> Self { MissionType::Unknown(String::new()) }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMissionType {
  Tuple(Vec<Value>),
  Tag(String),
  Other(Value),
}

const RANGE_DEFAULT_START: i64 = 0;
const RANGE_DEFAULT_END: i64 = 10;

fn value_as_i64(v: &Value) -> Option<i64> {
  match v {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
    Value::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  }
}

impl From<RawMissionType> for MissionType {
  fn from(raw: RawMissionType) -> Self {
    let items = match raw {
      RawMissionType::Tuple(items) => items,
      RawMissionType::Tag(tag) => vec![Value::String(tag)],
      RawMissionType::Other(_other) => return MissionType::default(),
    };
    let tag = items.first().and_then(Value::as_str).unwrap_or("").trim().to_lowercase();
    match tag.as_str() {
      "switch" => MissionType::Switch {
        options: items[1..]
          .iter()
          .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
          })
          .collect(),
      },
      "range" => MissionType::Range {
        start: items.get(1).and_then(value_as_i64).unwrap_or(RANGE_DEFAULT_START),
        end: items.get(2).and_then(value_as_i64).unwrap_or(RANGE_DEFAULT_END),
      },
      _ => MissionType::Unknown(tag),
    }
  }
}

impl From<MissionType> for Vec<Value> {
  fn from(t: MissionType) -> Self {
    match t {
      MissionType::Switch { options } => std::iter::once(Value::from("switch"))
        .chain(options.into_iter().map(Value::from))
        .collect(),
      MissionType::Range { start, end } => vec![Value::from("range"), Value::from(start), Value::from(end)],
      MissionType::Unknown(tag) => vec![Value::from(tag)],
    }
  }
}

/// Point value of a mission: uniform per step, or one value per selectable index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum Points {
  Flat(i64),
  Scale(Vec<i64>),
}

impl Default for Points {
  fn default() -> Self { Points::Flat(0) }
}

impl From<Value> for Points {
  fn from(v: Value) -> Self {
    match v {
      Value::Array(items) => Points::Scale(items.iter().map(|i| value_as_i64(i).unwrap_or(0)).collect()),
      other => Points::Flat(value_as_i64(&other).unwrap_or(0)),
    }
  }
}

impl Points {
  /// Value awarded by a plain switch: the flat value, or the best entry of a scale.
  pub fn fixed_value(&self) -> i64 {
    match self {
      Points::Flat(p) => *p,
      Points::Scale(v) => v.iter().copied().max().unwrap_or(0),
    }
  }
}

/// A scoring rule from the season rulebook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mission {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default)]
  pub kind: MissionType,
  #[serde(default)]
  pub points: Points,
  #[serde(default, alias = "subMissions", alias = "sub_missions")]
  pub submissions: Vec<SubMission>,
}

/// Nested refinement of a mission; scored in declaration order as slots 1..N.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubMission {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "type", default)]
  pub kind: MissionType,
  #[serde(default)]
  pub points: Points,
}

/// A single stored answer. Forms store labels, step indices or raw point values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum ResponseValue {
  Flag(bool),
  Number(f64),
  Text(String),
  Empty,
}

impl From<Value> for ResponseValue {
  fn from(v: Value) -> Self {
    match v {
      Value::Bool(b) => ResponseValue::Flag(b),
      Value::Number(n) => n.as_f64().map(ResponseValue::Number).unwrap_or(ResponseValue::Empty),
      Value::String(s) => ResponseValue::Text(s),
      _ => ResponseValue::Empty,
    }
  }
}

impl ResponseValue {
  /// Integer reading of the answer (numbers with no fraction, or numeric text).
  pub fn as_index(&self) -> Option<i64> {
    match self {
      ResponseValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
      ResponseValue::Text(s) => s.trim().parse::<i64>().ok(),
      _ => None,
    }
  }
}

/// mission id -> slot index (0 = mission itself, 1..N = sub-missions) -> answer.
pub type Responses = HashMap<String, HashMap<u32, ResponseValue>>;

/// Decodes a response map from form data. Slot keys that are not slot indices
/// and missions whose answers are not an object are dropped.
pub fn lenient_responses<'de, D: Deserializer<'de>>(de: D) -> Result<Responses, D::Error> {
  let raw = HashMap::<String, Value>::deserialize(de)?;
  Ok(
    raw
      .into_iter()
      .map(|(id, slots)| {
        let slots = match slots {
          Value::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| k.trim().parse::<u32>().ok().map(|slot| (slot, ResponseValue::from(v))))
            .collect(),
          _ => HashMap::new(),
        };
        (id, slots)
      })
      .collect(),
  )
}

pub const DEFAULT_SPEED: f64 = 50.0;

fn default_speed() -> f64 { DEFAULT_SPEED }

/// One authored robot command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Movement {
  /// Move straight by a signed distance in cm; speed in cm/s.
  Reto {
    distance: f64,
    #[serde(default = "default_speed")]
    speed: f64,
  },
  /// Rotate by signed degrees (positive = clockwise); speed in deg/s.
  Giro {
    degrees: f64,
    #[serde(default = "default_speed")]
    speed: f64,
  },
}

impl Movement {
  pub fn speed(&self) -> f64 {
    match self {
      Movement::Reto { speed, .. } | Movement::Giro { speed, .. } => *speed,
    }
  }
}

/// Position in field centimeters plus heading in degrees (0 = +Y, clockwise).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
  pub x: f64,
  pub y: f64,
  #[serde(default)]
  pub heading: f64,
}

/// What produced a path point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
  Start,
  Reto,
  Giro,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
  pub x: f64,
  pub y: f64,
  pub heading: f64,
  #[serde(rename = "type")]
  pub kind: PointKind,
  pub speed: f64,
  /// Signed degrees turned to reach this point (0 unless `kind` is `Giro`).
  pub rotation: f64,
}

impl PathPoint {
  pub fn pose(&self) -> Pose {
    Pose { x: self.x, y: self.y, heading: self.heading }
  }
}

/// Time-bounded interval between two consecutive path points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSegment {
  pub index: usize,
  #[serde(rename = "type")]
  pub kind: PointKind,
  pub from: Pose,
  pub to: Pose,
  pub rotation: f64,
  pub duration_ms: f64,
  pub start_time: f64,
  pub end_time: f64,
}

/// Interpolated robot pose plus playback bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
  pub x: f64,
  pub y: f64,
  pub angle: f64,
  pub running: bool,
  pub segment_index: usize,
  pub progress: f64,
}

impl RobotState {
  pub fn at(pose: Pose) -> Self {
    Self { x: pose.x, y: pose.y, angle: pose.heading, running: false, segment_index: 0, progress: 0.0 }
  }

  pub fn pose(&self) -> Pose {
    Pose { x: self.x, y: self.y, heading: self.angle }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
  Idle,
  Running,
  Paused,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mission_type_decodes_tuple_forms() {
    let m: Mission = serde_json::from_str(r#"{"id":"M01","type":["range",0,5],"points":[0,2,4]}"#).unwrap();
    assert_eq!(m.kind, MissionType::Range { start: 0, end: 5 });
    assert_eq!(m.points, Points::Scale(vec![0, 2, 4]));

    let m: Mission = serde_json::from_str(r#"{"id":"M02","type":["switch"],"points":8}"#).unwrap();
    assert_eq!(m.kind, MissionType::Switch { options: vec![] });
    assert_eq!(m.points, Points::Flat(8));
  }

  #[test]
  fn range_bounds_default_when_absent() {
    let t: MissionType = serde_json::from_str(r#"["range"]"#).unwrap();
    assert_eq!(t, MissionType::Range { start: 0, end: 10 });
  }

  #[test]
  fn unknown_shapes_degrade_instead_of_failing() {
    let m: Mission = serde_json::from_str(r#"{"id":"X","type":{"weird":true},"points":"lots"}"#).unwrap();
    assert_eq!(m.kind, MissionType::Unknown(String::new()));
    assert_eq!(m.points, Points::Flat(0));

    let t: MissionType = serde_json::from_str(r#"["bonus", 3]"#).unwrap();
    assert_eq!(t, MissionType::Unknown("bonus".into()));
  }

  #[test]
  fn responses_accept_integer_slot_keys_and_mixed_values() {
    let r: Responses = serde_json::from_str(r#"{"M01":{"0":"Sim","1":3,"2":null,"3":true}}"#).unwrap();
    let slots = &r["M01"];
    assert_eq!(slots[&0], ResponseValue::Text("Sim".into()));
    assert_eq!(slots[&1].as_index(), Some(3));
    assert_eq!(slots[&2], ResponseValue::Empty);
    assert_eq!(slots[&3], ResponseValue::Flag(true));
  }

  #[test]
  fn lenient_responses_drop_stray_keys() {
    let raw = serde_json::json!({ "M01": { "0": "Sim", "note": "x", "-1": 4, "2": 1 }, "M02": "oops" });
    let r = lenient_responses(raw).unwrap();
    assert_eq!(r["M01"].len(), 2);
    assert_eq!(r["M01"][&0], ResponseValue::Text("Sim".into()));
    assert_eq!(r["M01"][&2], ResponseValue::Number(1.0));
    assert!(r["M02"].is_empty());
  }

  #[test]
  fn movement_speed_defaults() {
    let m: Movement = serde_json::from_str(r#"{"type":"giro","degrees":90}"#).unwrap();
    assert_eq!(m, Movement::Giro { degrees: 90.0, speed: 50.0 });
  }
}
