//! Robot path simulation on the competition mat.
//!
//! Coordinates are field centimeters with the origin in a mat corner. Headings
//! follow a survey convention: 0° points along +Y and angles grow clockwise, so
//! a straight move advances by `(sin h, cos h) * distance`. This matches the
//! mat artwork the front end draws under the path.
//!
//! Headings are normalized into `(-180, 180]` after every turn. The signed
//! turn is kept on each point so animation timing uses the commanded rotation.

use serde::{Deserialize, Serialize};

use crate::domain::{AnimationSegment, Movement, PathPoint, PointKind, Pose, RobotState};

/// Lower bound for effective speeds, keeps durations finite.
pub const SPEED_EPSILON: f64 = 1e-6;

/// Playing-field rectangle in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBounds {
  pub width: f64,
  pub height: f64,
}

impl Default for FieldBounds {
  fn default() -> Self {
    // FLL table mat
    Self { width: 236.0, height: 114.0 }
  }
}

impl FieldBounds {
  pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
    (x.clamp(0.0, self.width.max(0.0)), y.clamp(0.0, self.height.max(0.0)))
  }
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn normalize_heading(deg: f64) -> f64 {
  let h = deg.rem_euclid(360.0);
  if h > 180.0 { h - 360.0 } else { h }
}

/// Discretize a movement list into path points, starting with a synthetic
/// `start` point. Output length is always `movements.len() + 1`.
pub fn build_path(movements: &[Movement], initial: Pose, field: FieldBounds) -> Vec<PathPoint> {
  let (x, y) = field.clamp(initial.x, initial.y);
  let mut current = PathPoint {
    x,
    y,
    heading: normalize_heading(initial.heading),
    kind: PointKind::Start,
    speed: 0.0,
    rotation: 0.0,
  };

  let mut path = Vec::with_capacity(movements.len() + 1);
  path.push(current);

  for m in movements {
    current = match *m {
      Movement::Giro { degrees, speed } => PathPoint {
        heading: normalize_heading(current.heading + degrees),
        kind: PointKind::Giro,
        speed,
        rotation: degrees,
        ..current
      },
      Movement::Reto { distance, speed } => {
        let rad = current.heading.to_radians();
        let (x, y) = field.clamp(current.x + distance * rad.sin(), current.y + distance * rad.cos());
        PathPoint { x, y, kind: PointKind::Reto, speed, rotation: 0.0, ..current }
      }
    };
    path.push(current);
  }
  path
}

/// Time every consecutive pair of path points. Segments form a contiguous
/// timeline from 0; zero-length moves still get a (zero-duration) segment.
pub fn build_segments(path: &[PathPoint], speed_factor: f64) -> Vec<AnimationSegment> {
  let mut clock = 0.0;
  path
    .windows(2)
    .enumerate()
    .map(|(index, pair)| {
      let (a, b) = (pair[0], pair[1]);
      // inf or NaN speeds collapse to the largest finite speed
      let effective = (b.speed * speed_factor).min(f64::MAX).max(SPEED_EPSILON);
      let amount = match b.kind {
        PointKind::Giro => b.rotation.abs(),
        _ => (b.x - a.x).hypot(b.y - a.y),
      };
      let duration_ms = amount / effective * 1000.0;
      let seg = AnimationSegment {
        index,
        kind: b.kind,
        from: a.pose(),
        to: b.pose(),
        rotation: b.rotation,
        duration_ms,
        start_time: clock,
        end_time: clock + duration_ms,
      };
      clock = seg.end_time;
      seg
    })
    .collect()
}

pub fn total_duration_ms(segments: &[AnimationSegment]) -> f64 {
  segments.last().map(|s| s.end_time).unwrap_or(0.0)
}

/// Pose of a segment at `progress` in `[0, 1]`. Endpoints are returned exactly.
pub fn pose_along(seg: &AnimationSegment, progress: f64) -> Pose {
  if progress <= 0.0 {
    return seg.from;
  }
  if progress >= 1.0 {
    return seg.to;
  }
  Pose {
    x: seg.from.x + (seg.to.x - seg.from.x) * progress,
    y: seg.from.y + (seg.to.y - seg.from.y) * progress,
    heading: normalize_heading(seg.from.heading + seg.rotation * progress),
  }
}

/// Robot state at `time_ms` after playback start. `None` only for an empty
/// segment list. Times outside the timeline clamp to its ends; on a shared
/// boundary the earliest containing segment wins.
pub fn interpolate(segments: &[AnimationSegment], time_ms: f64) -> Option<RobotState> {
  let first = segments.first()?;
  let last = segments.last()?;

  let state = |seg: &AnimationSegment, progress: f64| {
    // an instantaneous segment is already at its end
    let pose = if seg.duration_ms == 0.0 { seg.to } else { pose_along(seg, progress) };
    RobotState {
      x: pose.x,
      y: pose.y,
      angle: pose.heading,
      running: false,
      segment_index: seg.index,
      progress,
    }
  };

  if time_ms.is_nan() || time_ms < first.start_time {
    return Some(state(first, 0.0));
  }
  if time_ms > last.end_time {
    return Some(state(last, 1.0));
  }

  let seg = segments
    .iter()
    .find(|s| s.start_time <= time_ms && time_ms <= s.end_time)
    .unwrap_or(last);
  let progress = if seg.duration_ms == 0.0 {
    0.0
  } else {
    ((time_ms - seg.start_time) / seg.duration_ms).clamp(0.0, 1.0)
  };
  Some(state(seg, progress))
}
