//! Request and response bodies for the simulation backend.

use serde::{Deserialize, Serialize};

use crate::catalog::{AgentKind, GridSize, TrainingBudget};
use crate::error::{Result, SlitherError};
use crate::snapshot::{validate_run, Snapshot};

pub const SIMULATE_PATH: &str = "/simulate";
pub const PING_PATH: &str = "/ping";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub agent: String,
    pub training: String,
    /// Interior dimension; the backend adds the border itself.
    pub grid_size: u32,
    /// Up to three digits, or empty for an unseeded run.
    #[serde(default)]
    pub seed: String,
}

impl SimulationRequest {
    pub fn new(agent: AgentKind, training: TrainingBudget, grid: GridSize, seed: &str) -> Self {
        Self {
            agent: agent.code().to_string(),
            training: training.label().to_string(),
            grid_size: grid.interior(),
            seed: seed.to_string(),
        }
    }

    pub fn agent_kind(&self) -> Result<AgentKind> {
        AgentKind::parse(&self.agent)
    }

    pub fn grid(&self) -> Result<GridSize> {
        GridSize::from_interior(self.grid_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub states: Vec<Snapshot>,
}

impl SimulationResponse {
    /// Decode a response body and check it against the grid it was requested for.
    pub fn decode(body: &str, grid: GridSize) -> Result<Vec<Snapshot>> {
        let resp: SimulationResponse = serde_json::from_str(body)?;
        validate_run(grid, &resp.states)?;
        Ok(resp.states)
    }
}

/// Join a configured base URL and an endpoint path without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Liveness as reported by the startup ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerStatus {
    #[default]
    Unknown,
    Awake,
    Sleeping,
}

impl ServerStatus {
    pub fn from_ping<E>(result: &core::result::Result<(), E>) -> Self {
        if result.is_ok() {
            ServerStatus::Awake
        } else {
            ServerStatus::Sleeping
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServerStatus::Unknown => "waking server...",
            ServerStatus::Awake => "server awake",
            ServerStatus::Sleeping => "server sleeping",
        }
    }
}
