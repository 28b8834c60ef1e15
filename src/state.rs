//! Application state: loaded configuration and the in-memory mission set.
//!
//! Missions are reference data: loaded once at startup (mission asset or
//! built-in seeds) and replaced wholesale when an organizer uploads a new set.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::{load_config_from_env, load_missions, AppConfig};
use crate::domain::Mission;
use crate::seeds::seed_missions;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub missions: Arc<RwLock<Arc<Vec<Mission>>>>,
}

impl AppState {
    /// Build state from env: load config, then the mission asset it names.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config_from_env())
    }

    pub fn from_config(config: AppConfig) -> Self {
        let missions = match &config.missions_path {
            Some(path) => match load_missions(path) {
                Ok(ms) => {
                    info!(target: "scoring", %path, count = ms.len(), "Loaded mission asset");
                    ms
                }
                Err(e) => {
                    error!(target: "scoring", %path, error = %e, "Failed to load mission asset; using built-in seeds");
                    seed_missions()
                }
            },
            None => {
                info!(target: "scoring", "No missions_path configured; using built-in seeds");
                seed_missions()
            }
        };

        info!(
            target: "robostage_backend",
            field_width = config.field.width,
            field_height = config.field.height,
            speed_factor = config.simulation.speed_factor,
            missions = missions.len(),
            "Startup configuration"
        );

        Self {
            config,
            missions: Arc::new(RwLock::new(Arc::new(missions))),
        }
    }

    /// Cheap snapshot of the current mission set.
    pub async fn missions(&self) -> Arc<Vec<Mission>> {
        self.missions.read().await.clone()
    }

    #[instrument(level = "info", skip(self, missions), fields(count = missions.len()))]
    pub async fn replace_missions(&self, missions: Vec<Mission>) {
        *self.missions.write().await = Arc::new(missions);
        info!(target: "scoring", "Mission set replaced");
    }
}
