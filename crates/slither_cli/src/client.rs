//! HTTP access to the simulation backend.

use std::time::Duration;

use reqwest::Client;
use slither::catalog::GridSize;
use slither::error::SlitherError;
use slither::snapshot::Snapshot;
use slither::wire::{endpoint, SimulationRequest, SimulationResponse, PING_PATH, SIMULATE_PATH};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: String,
}

fn transport(e: reqwest::Error) -> SlitherError {
    SlitherError::Transport(e.to_string())
}

impl ApiClient {
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self, SlitherError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build().map_err(transport)?,
            base: base.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Fetch one run and check it against `grid`.
    pub async fn simulate(
        &self,
        request: &SimulationRequest,
        grid: GridSize,
    ) -> Result<Vec<Snapshot>, SlitherError> {
        let url = endpoint(&self.base, SIMULATE_PATH);
        debug!(%url, agent = %request.agent, training = %request.training, "requesting run");
        let body = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)?;
        let states = SimulationResponse::decode(&body, grid)?;
        info!(agent = %request.agent, frames = states.len(), "run received");
        Ok(states)
    }

    pub async fn ping(&self) -> Result<(), SlitherError> {
        self.http
            .post(endpoint(&self.base, PING_PATH))
            .json(&serde_json::json!({}))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map(|_| ())
            .map_err(transport)
    }
}
