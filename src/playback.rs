//! Playback controller for the path animation.
//!
//! States: `Idle -> Running -> Paused | Idle`. The host drives it by calling
//! [`Playback::tick`] whenever a frame requested through [`FrameScheduler`]
//! fires. Time comes from a [`Clock`], so tests can step it by hand.
//!
//! At most one frame is pending at any time. Pausing, resetting, loading a new
//! path and dropping the controller all cancel it synchronously.

use tracing::{debug, trace};

use crate::domain::{AnimationSegment, PathPoint, PlaybackStatus, Pose, RobotState};
use crate::path::{build_segments, interpolate, total_duration_ms};

/// Monotonic milliseconds.
pub trait Clock {
  fn now_ms(&self) -> f64;
}

/// Handle of a requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// "Run tick before the next repaint" port.
pub trait FrameScheduler {
  fn request_frame(&mut self) -> FrameId;
  fn cancel_frame(&mut self, id: FrameId);
}

pub struct Playback<C: Clock, S: FrameScheduler> {
  clock: C,
  frames: S,
  path: Vec<PathPoint>,
  segments: Vec<AnimationSegment>,
  speed_factor: f64,
  status: PlaybackStatus,
  elapsed_ms: f64,
  last_tick_ms: Option<f64>,
  pending: Option<FrameId>,
  initial: RobotState,
  state: RobotState,
}

impl<C: Clock, S: FrameScheduler> Playback<C, S> {
  pub fn new(clock: C, frames: S) -> Self {
    Self {
      clock,
      frames,
      path: Vec::new(),
      segments: Vec::new(),
      speed_factor: 1.0,
      status: PlaybackStatus::Idle,
      elapsed_ms: 0.0,
      last_tick_ms: None,
      pending: None,
      initial: RobotState::at(Pose::default()),
      state: RobotState::at(Pose::default()),
    }
  }

  /// Replace the animated path. Always resets to the path's first pose.
  pub fn load(&mut self, path: &[PathPoint], speed_factor: f64) {
    self.path = path.to_vec();
    self.segments = build_segments(path, speed_factor);
    self.speed_factor = speed_factor;
    self.initial = RobotState::at(path.first().map(PathPoint::pose).unwrap_or_default());
    self.reset();
    debug!(target: "playback", segments = self.segments.len(), total_ms = self.total_duration_ms(), "Path loaded");
  }

  pub fn play(&mut self) {
    if self.status == PlaybackStatus::Running || self.segments.is_empty() {
      return;
    }
    if self.is_finished() {
      self.elapsed_ms = 0.0;
      self.state = self.initial;
    }
    self.status = PlaybackStatus::Running;
    self.last_tick_ms = Some(self.clock.now_ms());
    self.state.running = true;
    self.schedule();
    debug!(target: "playback", elapsed_ms = self.elapsed_ms, "Playback started");
  }

  pub fn pause(&mut self) {
    if self.status != PlaybackStatus::Running {
      return;
    }
    self.advance();
    self.cancel_pending();
    self.status = PlaybackStatus::Paused;
    self.last_tick_ms = None;
    self.state.running = false;
    debug!(target: "playback", elapsed_ms = self.elapsed_ms, "Playback paused");
  }

  pub fn reset(&mut self) {
    self.cancel_pending();
    self.status = PlaybackStatus::Idle;
    self.elapsed_ms = 0.0;
    self.last_tick_ms = None;
    self.state = self.initial;
  }

  /// Frame callback. Advances by wall-clock time since the previous tick and
  /// requests the next frame unless the end was reached.
  pub fn tick(&mut self) -> RobotState {
    self.pending = None;
    if self.status != PlaybackStatus::Running {
      return self.state;
    }
    self.advance();
    if self.elapsed_ms >= self.total_duration_ms() {
      self.status = PlaybackStatus::Idle;
      self.last_tick_ms = None;
      self.state.running = false;
      debug!(target: "playback", "Playback reached the end");
    } else {
      self.schedule();
    }
    self.state
  }

  /// Jump to a timeline position without changing the running status.
  pub fn seek(&mut self, time_ms: f64) {
    let total = self.total_duration_ms();
    self.elapsed_ms = if time_ms.is_finite() { time_ms.clamp(0.0, total) } else { 0.0 };
    if self.last_tick_ms.is_some() {
      self.last_tick_ms = Some(self.clock.now_ms());
    }
    self.refresh_state();
  }

  /// Retime the path, keeping the robot where it is on the current segment.
  pub fn set_speed_factor(&mut self, speed_factor: f64) {
    if self.status == PlaybackStatus::Running {
      self.advance();
    }
    let (index, progress) = (self.state.segment_index, self.state.progress);
    let at_end = self.is_finished();
    self.segments = build_segments(&self.path, speed_factor);
    self.speed_factor = speed_factor;
    self.elapsed_ms = if at_end {
      self.total_duration_ms()
    } else {
      self.segments
        .get(index)
        .map(|s| s.start_time + s.duration_ms * progress)
        .unwrap_or(0.0)
    };
    self.refresh_state();
  }

  pub fn state(&self) -> RobotState {
    self.state
  }

  pub fn status(&self) -> PlaybackStatus {
    self.status
  }

  pub fn elapsed_ms(&self) -> f64 {
    self.elapsed_ms
  }

  pub fn speed_factor(&self) -> f64 {
    self.speed_factor
  }

  pub fn total_duration_ms(&self) -> f64 {
    total_duration_ms(&self.segments)
  }

  pub fn is_finished(&self) -> bool {
    !self.segments.is_empty() && self.elapsed_ms >= self.total_duration_ms()
  }

  pub fn frame_pending(&self) -> Option<FrameId> {
    self.pending
  }

  pub fn frames_mut(&mut self) -> &mut S {
    &mut self.frames
  }

  fn advance(&mut self) {
    let now = self.clock.now_ms();
    if let Some(last) = self.last_tick_ms {
      self.elapsed_ms = (self.elapsed_ms + (now - last).max(0.0)).min(self.total_duration_ms());
    }
    self.last_tick_ms = Some(now);
    self.refresh_state();
    trace!(target: "playback", elapsed_ms = self.elapsed_ms, segment = self.state.segment_index, "Advanced");
  }

  fn refresh_state(&mut self) {
    let running = self.status == PlaybackStatus::Running;
    self.state = interpolate(&self.segments, self.elapsed_ms).unwrap_or(self.initial);
    self.state.running = running;
  }

  fn schedule(&mut self) {
    if self.pending.is_none() {
      self.pending = Some(self.frames.request_frame());
    }
  }

  fn cancel_pending(&mut self) {
    if let Some(id) = self.pending.take() {
      self.frames.cancel_frame(id);
    }
  }
}

impl<C: Clock, S: FrameScheduler> Drop for Playback<C, S> {
  fn drop(&mut self) {
    self.cancel_pending();
  }
}
