//! WebSocket playback sessions. Each client message is parsed as JSON and
//! forwarded to core logic; while playback runs the server also pushes one
//! `state` frame per interval tick.
//!
//! The tokio interval plays the role of the display refresh: a frame is only
//! awaited while the controller has one pending, so pausing, resetting or
//! finishing stops the stream without a separate task to abort.

use std::sync::Arc;
use std::time::Duration;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::logic::{resolve_speed_factor, score_report, simulate};
use crate::playback::{Clock, FrameId, FrameScheduler, Playback};
use crate::protocol::{ClientWsMessage, ProgramIn, ServerWsMessage};
use crate::state::AppState;

/// Milliseconds since the session started, on tokio's clock.
pub struct TokioClock {
  origin: Instant,
}

impl TokioClock {
  pub fn new() -> Self {
    Self { origin: Instant::now() }
  }
}

impl Clock for TokioClock {
  fn now_ms(&self) -> f64 {
    self.origin.elapsed().as_secs_f64() * 1000.0
  }
}

/// Frame bookkeeping for the select loop: at most one frame outstanding.
#[derive(Default)]
pub struct IntervalFrames {
  next: u64,
  pending: Option<FrameId>,
}

impl IntervalFrames {
  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Consume the outstanding frame; `false` when there was none.
  pub fn fire(&mut self) -> bool {
    self.pending.take().is_some()
  }
}

impl FrameScheduler for IntervalFrames {
  fn request_frame(&mut self) -> FrameId {
    self.next += 1;
    let id = FrameId(self.next);
    self.pending = Some(id);
    id
  }

  fn cancel_frame(&mut self, id: FrameId) {
    if self.pending == Some(id) {
      self.pending = None;
    }
  }
}

type Session = Playback<TokioClock, IntervalFrames>;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "robostage_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(session = %Uuid::new_v4()))]
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
  info!(target: "robostage_backend", "WebSocket connected");
  let (outgoing, incoming) = socket.split();
  run_session(incoming, outgoing, state).await;
  info!(target: "robostage_backend", "WebSocket disconnected");
}

/// Session loop over any message transport: replies to client messages and,
/// while a frame is pending, ticks playback and pushes a `state` frame.
async fn run_session<I, O, E>(mut incoming: I, mut outgoing: O, state: Arc<AppState>)
where
  I: Stream<Item = Result<Message, E>> + Unpin,
  O: Sink<Message> + Unpin,
  O::Error: std::fmt::Display,
{
  let mut playback: Session = Playback::new(TokioClock::new(), IntervalFrames::default());
  if let Ok(sim) = simulate(&state.config, &ProgramIn::default()) {
    playback.load(&sim.path, state.config.simulation.speed_factor);
  }

  let mut ticker = tokio::time::interval(Duration::from_millis(state.config.simulation.frame_interval_ms));
  ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

  loop {
    let frame_due = playback.frame_pending().is_some();
    tokio::select! {
      received = incoming.next() => {
        let Some(Ok(msg)) = received else { break };
        match msg {
          Message::Text(txt) => {
            let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(parsed) => {
                debug!(target: "robostage_backend", "WS received: {:?}", &parsed);
                handle_client_ws(parsed, &state, &mut playback).await
              }
              Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
            };
            if !send_all(&mut outgoing, &replies).await {
              break;
            }
          }
          Message::Ping(payload) => { let _ = outgoing.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      _ = ticker.tick(), if frame_due => {
        if !playback.frames_mut().fire() {
          continue;
        }
        playback.tick();
        if !send_all(&mut outgoing, &[state_frame(&playback)]).await {
          break;
        }
      }
    }
  }

  // Teardown: no frame may stay scheduled after the socket is gone.
  playback.reset();
}

async fn send_all<O>(outgoing: &mut O, msgs: &[ServerWsMessage]) -> bool
where
  O: Sink<Message> + Unpin,
  O::Error: std::fmt::Display,
{
  for m in msgs {
    let out = serde_json::to_string(m).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = outgoing.send(Message::Text(out)).await {
      error!(target: "robostage_backend", error = %e, "WS send error");
      return false;
    }
  }
  true
}

fn state_frame(playback: &Session) -> ServerWsMessage {
  ServerWsMessage::State {
    state: playback.state(),
    status: playback.status(),
    elapsed_ms: playback.elapsed_ms(),
    speed_factor: playback.speed_factor(),
  }
}

#[instrument(level = "info", skip(state, playback))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, playback: &mut Session) -> Vec<ServerWsMessage> {
  match msg {
    ClientWsMessage::Ping => vec![ServerWsMessage::Pong],

    ClientWsMessage::LoadProgram { program } => match simulate(&state.config, &program) {
      Ok(sim) => {
        let factor = program.speed_factor.unwrap_or(state.config.simulation.speed_factor);
        playback.load(&sim.path, factor);
        info!(target: "playback", movements = sim.movements.len(), total_ms = sim.total_duration_ms, "WS program loaded");
        vec![ServerWsMessage::ProgramLoaded { simulation: sim }, state_frame(playback)]
      }
      Err(e) => {
        warn!(target: "playback", error = %e, "WS program rejected");
        vec![ServerWsMessage::Error { message: e.to_string() }]
      }
    },

    ClientWsMessage::Play => {
      playback.play();
      vec![state_frame(playback)]
    }

    ClientWsMessage::Pause => {
      playback.pause();
      vec![state_frame(playback)]
    }

    ClientWsMessage::Reset => {
      playback.reset();
      vec![state_frame(playback)]
    }

    ClientWsMessage::Seek { time_ms } => {
      playback.seek(time_ms);
      vec![state_frame(playback)]
    }

    ClientWsMessage::SetSpeed { factor } => match resolve_speed_factor(&state.config, Some(factor)) {
      Ok(f) => {
        playback.set_speed_factor(f);
        vec![state_frame(playback)]
      }
      Err(e) => vec![ServerWsMessage::Error { message: e.to_string() }],
    },

    ClientWsMessage::Score { responses } => {
      let report = score_report(&state.missions().await, &responses);
      info!(target: "scoring", total = report.total, "WS score computed");
      vec![ServerWsMessage::Score { report }]
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use futures::channel::mpsc;
  use serde_json::{json, Value};

  #[test]
  fn interval_frames_track_a_single_pending_frame() {
    let mut frames = IntervalFrames::default();
    assert!(!frames.is_pending());
    let a = frames.request_frame();
    assert!(frames.is_pending());
    frames.cancel_frame(FrameId(a.0 + 100));
    assert!(frames.is_pending());
    frames.cancel_frame(a);
    assert!(!frames.fire());
    frames.request_frame();
    assert!(frames.fire());
    assert!(!frames.is_pending());
  }

  type ClientTx = mpsc::UnboundedSender<Result<Message, axum::Error>>;

  fn start_session() -> (ClientTx, mpsc::UnboundedReceiver<Message>, tokio::task::JoinHandle<()>) {
    let state = Arc::new(AppState::from_config(AppConfig::default()));
    let (client_tx, client_rx) = mpsc::unbounded();
    let (server_tx, server_rx) = mpsc::unbounded();
    let session = tokio::spawn(run_session(client_rx, server_tx, state));
    (client_tx, server_rx, session)
  }

  fn send_json(tx: &ClientTx, msg: Value) {
    tx.unbounded_send(Ok(Message::Text(msg.to_string()))).unwrap();
  }

  async fn next_json(rx: &mut mpsc::UnboundedReceiver<Message>) -> Value {
    match rx.next().await {
      Some(Message::Text(txt)) => serde_json::from_str(&txt).unwrap(),
      other => panic!("unexpected server message: {:?}", other),
    }
  }

  async fn next_with_status(rx: &mut mpsc::UnboundedReceiver<Message>, status: &str) -> (Value, usize) {
    let mut running_frames = 0;
    loop {
      let msg = next_json(rx).await;
      assert_eq!(msg["type"], "state");
      if msg["status"] == status {
        return (msg, running_frames);
      }
      assert_eq!(msg["status"], "running");
      running_frames += 1;
    }
  }

  async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Message>) {
    let silence = tokio::time::timeout(Duration::from_secs(2), rx.next()).await;
    assert!(silence.is_err(), "frame sent while not running: {:?}", silence);
  }

  #[tokio::test(start_paused = true)]
  async fn session_streams_frames_while_running_and_stops_on_pause() {
    let (tx, mut rx, session) = start_session();

    send_json(&tx, json!({ "type": "load_program", "source": "reto 50 50", "initialPose": { "x": 10.0, "y": 10.0 } }));
    assert_eq!(next_json(&mut rx).await["type"], "program_loaded");
    let loaded = next_json(&mut rx).await;
    assert_eq!(loaded["status"], "idle");
    assert_eq!(loaded["speedFactor"], 1.0);
    assert_quiet(&mut rx).await;

    send_json(&tx, json!({ "type": "play" }));
    assert_eq!(next_json(&mut rx).await["status"], "running");
    let mut last_elapsed = 0.0;
    for _ in 0..3 {
      let frame = next_json(&mut rx).await;
      assert_eq!(frame["status"], "running");
      let elapsed = frame["elapsedMs"].as_f64().unwrap();
      assert!(elapsed >= last_elapsed);
      last_elapsed = elapsed;
    }

    send_json(&tx, json!({ "type": "pause" }));
    let (paused, _) = next_with_status(&mut rx, "paused").await;
    assert!(paused["elapsedMs"].as_f64().unwrap() < 1000.0);
    assert_quiet(&mut rx).await;

    drop(tx);
    session.await.unwrap();
  }

  #[tokio::test(start_paused = true)]
  async fn session_stops_streaming_when_the_path_ends() {
    let (tx, mut rx, session) = start_session();

    send_json(&tx, json!({ "type": "load_program", "source": "reto 50 50", "initialPose": { "x": 10.0, "y": 10.0 } }));
    next_json(&mut rx).await;
    next_json(&mut rx).await;

    send_json(&tx, json!({ "type": "play" }));
    assert_eq!(next_json(&mut rx).await["status"], "running");
    let (done, running_frames) = next_with_status(&mut rx, "idle").await;
    assert!(running_frames > 0);
    assert_eq!(done["elapsedMs"], 1000.0);
    assert_eq!(done["state"]["y"], 60.0);
    assert_eq!(done["state"]["running"], false);
    assert_quiet(&mut rx).await;

    drop(tx);
    session.await.unwrap();
  }

  #[tokio::test(start_paused = true)]
  async fn tokio_clock_follows_paused_time() {
    let clock = TokioClock::new();
    tokio::time::advance(Duration::from_millis(250)).await;
    assert!((clock.now_ms() - 250.0).abs() < 1.0);
  }
}
