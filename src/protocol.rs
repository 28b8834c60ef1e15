//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names are camelCase to match the front end.

use serde::{Deserialize, Serialize};

use crate::domain::{AnimationSegment, Mission, Movement, PathPoint, PlaybackStatus, Pose, Responses, RobotState, lenient_responses};
use crate::program::SkippedLine;
use crate::ranking::{RankedTeam, TeamRounds};
use crate::scoring::MissionScore;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    LoadProgram {
        #[serde(flatten)]
        program: ProgramIn,
    },
    Play,
    Pause,
    Reset,
    Seek {
        #[serde(rename = "timeMs")]
        time_ms: f64,
    },
    SetSpeed {
        factor: f64,
    },
    Score {
        #[serde(default, deserialize_with = "lenient_responses")]
        responses: Responses,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    ProgramLoaded {
        #[serde(flatten)]
        simulation: SimulationOut,
    },
    State {
        state: RobotState,
        status: PlaybackStatus,
        #[serde(rename = "elapsedMs")]
        elapsed_ms: f64,
        #[serde(rename = "speedFactor")]
        speed_factor: f64,
    },
    Score {
        #[serde(flatten)]
        report: ScoreOut,
    },
    Error {
        message: String,
    },
}

/// A movement program, either as mini-language source or structured editor state.
/// `movements` wins when both are present.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramIn {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub movements: Option<Vec<Movement>>,
    #[serde(default)]
    pub initial_pose: Option<Pose>,
    #[serde(default)]
    pub speed_factor: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOut {
    pub movements: Vec<Movement>,
    pub skipped: Vec<SkippedLine>,
    pub path: Vec<PathPoint>,
    pub segments: Vec<AnimationSegment>,
    pub total_duration_ms: f64,
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionsOut {
    pub missions: Vec<Mission>,
    pub max_score: i64,
}

#[derive(Deserialize)]
pub struct MissionsIn {
    pub missions: Vec<Mission>,
}

#[derive(Deserialize)]
pub struct ScoreIn {
    #[serde(default, deserialize_with = "lenient_responses")]
    pub responses: Responses,
    /// Score against this mission set instead of the loaded one.
    #[serde(default)]
    pub missions: Option<Vec<Mission>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOut {
    pub total: i64,
    pub max_score: i64,
    pub answered: usize,
    pub breakdown: Vec<MissionScore>,
}

#[derive(Deserialize)]
pub struct RankingsIn {
    pub teams: Vec<TeamRounds>,
}

#[derive(Serialize)]
pub struct RankingsOut {
    pub rankings: Vec<RankedTeam>,
}

#[derive(Deserialize)]
pub struct ParseIn {
    pub source: String,
}

#[derive(Serialize)]
pub struct ParseOut {
    pub movements: Vec<Movement>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Deserialize)]
pub struct FormatIn {
    pub movements: Vec<Movement>,
}

#[derive(Serialize)]
pub struct FormatOut {
    pub source: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolateIn {
    #[serde(flatten)]
    pub program: ProgramIn,
    pub time_ms: f64,
}
