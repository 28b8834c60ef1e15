//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic::*;
use crate::path::interpolate;
use crate::program::{format_program, parse_program};
use crate::protocol::*;
use crate::ranking::rank_teams;
use crate::scoring::max_score;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_missions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let missions = state.missions().await;
  let max = max_score(&missions);
  Json(MissionsOut { missions: missions.to_vec(), max_score: max })
}

#[instrument(level = "info", skip(state, body), fields(count = body.missions.len()))]
pub async fn http_put_missions(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MissionsIn>,
) -> Result<Json<MissionsOut>, ApiError> {
  if let Some(dup) = first_duplicate_id(&body.missions) {
    return Err(ApiError::bad_request(format!("duplicate mission id: {}", dup)));
  }
  let max = max_score(&body.missions);
  state.replace_missions(body.missions.clone()).await;
  Ok(Json(MissionsOut { missions: body.missions, max_score: max }))
}

fn first_duplicate_id(missions: &[crate::domain::Mission]) -> Option<String> {
  let mut seen = std::collections::HashSet::new();
  missions.iter().find(|m| !seen.insert(m.id.as_str())).map(|m| m.id.clone())
}

#[instrument(level = "info", skip(state, body), fields(answered_missions = body.responses.len(), custom_missions = body.missions.is_some()))]
pub async fn http_post_score(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ScoreIn>,
) -> impl IntoResponse {
  let report = match &body.missions {
    Some(ms) => score_report(ms, &body.responses),
    None => score_report(&state.missions().await, &body.responses),
  };
  info!(target: "scoring", total = report.total, max = report.max_score, "HTTP score computed");
  Json(report)
}

#[instrument(level = "info", skip(body), fields(teams = body.teams.len()))]
pub async fn http_post_rankings(Json(body): Json<RankingsIn>) -> impl IntoResponse {
  Json(RankingsOut { rankings: rank_teams(&body.teams) })
}

#[instrument(level = "info", skip(state, body), fields(source_len = body.source.len()))]
pub async fn http_post_parse(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ParseIn>,
) -> Result<Json<ParseOut>, ApiError> {
  check_program_size(&state.config, &body.source)?;
  let parsed = parse_program(&body.source);
  Ok(Json(ParseOut { movements: parsed.movements, skipped: parsed.skipped }))
}

#[instrument(level = "info", skip(body), fields(movements = body.movements.len()))]
pub async fn http_post_format(Json(body): Json<FormatIn>) -> impl IntoResponse {
  Json(FormatOut { source: format_program(&body.movements) })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_path(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ProgramIn>,
) -> Result<Json<SimulationOut>, ApiError> {
  Ok(Json(simulate(&state.config, &body)?))
}

#[instrument(level = "info", skip(state, body), fields(time_ms = body.time_ms))]
pub async fn http_post_interpolate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<InterpolateIn>,
) -> Result<impl IntoResponse, ApiError> {
  let sim = simulate(&state.config, &body.program)?;
  Ok(Json(interpolate(&sim.segments, body.time_ms)))
}
