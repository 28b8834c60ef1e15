//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Resolving a program (source text or structured movements) into a path
//!     and its animation timeline
//!   - Scoring a response map against a mission set
//!   - Request validation for the few inputs that can be rejected

use tracing::{debug, info, instrument};

use crate::config::AppConfig;
use crate::domain::{Mission, Responses};
use crate::error::ApiError;
use crate::path::{build_path, build_segments, total_duration_ms};
use crate::program::{parse_program, ParsedProgram};
use crate::protocol::{ProgramIn, ScoreOut, SimulationOut};
use crate::scoring::{answered_slots, max_score, score_breakdown};

/// Speed factor to use: the request's when given, else the configured one.
pub fn resolve_speed_factor(cfg: &AppConfig, requested: Option<f64>) -> Result<f64, ApiError> {
  match requested {
    None => Ok(cfg.simulation.speed_factor),
    Some(f) if f.is_finite() && f > 0.0 => Ok(f),
    Some(f) => Err(ApiError::bad_request(format!("speedFactor must be a positive number, got {}", f))),
  }
}

/// Structured movements win over source text; neither means an empty program.
pub fn resolve_program(cfg: &AppConfig, program: &ProgramIn) -> Result<ParsedProgram, ApiError> {
  if let Some(movements) = &program.movements {
    return Ok(ParsedProgram { movements: movements.clone(), skipped: vec![] });
  }
  let source = program.source.as_deref().unwrap_or("");
  check_program_size(cfg, source)?;
  Ok(parse_program(source))
}

pub fn check_program_size(cfg: &AppConfig, source: &str) -> Result<(), ApiError> {
  let lines = source.lines().count();
  if lines > cfg.simulation.max_program_lines {
    return Err(ApiError::bad_request(format!(
      "program has {} lines, limit is {}",
      lines, cfg.simulation.max_program_lines
    )));
  }
  Ok(())
}

#[instrument(level = "info", skip(cfg, program), fields(has_source = program.source.is_some(), has_movements = program.movements.is_some()))]
pub fn simulate(cfg: &AppConfig, program: &ProgramIn) -> Result<SimulationOut, ApiError> {
  let speed_factor = resolve_speed_factor(cfg, program.speed_factor)?;
  let initial = program.initial_pose.unwrap_or(cfg.robot.start);
  if !(initial.x.is_finite() && initial.y.is_finite() && initial.heading.is_finite()) {
    return Err(ApiError::bad_request("initialPose must contain finite numbers"));
  }
  let parsed = resolve_program(cfg, program)?;

  let path = build_path(&parsed.movements, initial, cfg.field);
  let segments = build_segments(&path, speed_factor);
  let total = total_duration_ms(&segments);
  info!(target: "path", movements = parsed.movements.len(), skipped = parsed.skipped.len(), total_ms = total, "Path simulated");

  Ok(SimulationOut {
    movements: parsed.movements,
    skipped: parsed.skipped,
    path,
    segments,
    total_duration_ms: total,
  })
}

#[instrument(level = "info", skip_all, fields(missions = missions.len(), answered_missions = responses.len()))]
pub fn score_report(missions: &[Mission], responses: &Responses) -> ScoreOut {
  let breakdown = score_breakdown(missions, responses);
  let total = breakdown.iter().map(|m| m.total).sum();
  let answered = answered_slots(missions, responses).values().sum();
  let report = ScoreOut { total, max_score: max_score(missions), answered, breakdown };
  debug!(target: "scoring", total = report.total, max = report.max_score, answered = report.answered, "Score computed");
  report
}
