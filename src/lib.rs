//! RoboStage backend: mission scoring and robot path simulation for FIRST LEGO
//! League events.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`scoring`] | Mission point calculation from a sparse response map |
//! | [`ranking`] | Tournament ranking from round scores |
//! | [`program`] | `reto`/`giro` movement mini-language |
//! | [`path`] | Path discretization, animation timeline, interpolation |
//! | [`playback`] | Play/pause/reset controller over an injected clock and frame scheduler |
//! | [`routes`] | axum HTTP + WebSocket surface |

pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod path;
pub mod playback;
pub mod program;
pub mod protocol;
pub mod ranking;
pub mod routes;
pub mod scoring;
pub mod seeds;
pub mod state;
pub mod telemetry;
