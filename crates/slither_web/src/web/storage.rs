use serde::{Deserialize, Serialize};
use slither::catalog::{AgentKind, GridSize, Speed};
use slither::lane::LaneId;
use slither::session::Session;
use slither::wire::DEFAULT_API_BASE;

pub(super) const LOCALSTORAGE_SETTINGS_KEY: &str = "slither.settings.v1";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(super) fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

pub(super) fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

/// Control selections and the backend address, restored on the next visit.
/// Run data and history are not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct PersistedSettings {
    #[serde(default = "default_version")]
    pub(super) version: u32,
    #[serde(default)]
    pub(super) api_base: String,
    #[serde(default = "default_agent")]
    pub(super) lane1_agent: String,
    #[serde(default)]
    pub(super) lane1_training: String,
    #[serde(default = "default_agent")]
    pub(super) lane2_agent: String,
    #[serde(default)]
    pub(super) lane2_training: String,
    #[serde(default = "default_grid")]
    pub(super) grid: u32,
    #[serde(default)]
    pub(super) seed: String,
    #[serde(default)]
    pub(super) second_lane: bool,
    #[serde(default = "default_speed")]
    pub(super) speed: u32,
}

fn default_version() -> u32 {
    1
}

fn default_agent() -> String {
    AgentKind::default().code().to_string()
}

fn default_grid() -> u32 {
    GridSize::default().interior()
}

fn default_speed() -> u32 {
    1
}

impl PersistedSettings {
    pub(super) fn capture(session: &Session, api_base: &str) -> Self {
        let l1 = session.lane(LaneId::One);
        let l2 = session.lane(LaneId::Two);
        Self {
            version: default_version(),
            api_base: api_base.to_string(),
            lane1_agent: l1.agent.code().to_string(),
            lane1_training: l1.training.label().to_string(),
            lane2_agent: l2.agent.code().to_string(),
            lane2_training: l2.training.label().to_string(),
            grid: session.grid().interior(),
            seed: session.seed().to_string(),
            second_lane: session.second_lane(),
            speed: session.clock().speed().multiplier(),
        }
    }

    /// Apply onto a fresh session. Values that no longer parse are skipped.
    pub(super) fn apply(&self, session: &mut Session) {
        for (lane, agent, training) in [
            (LaneId::One, &self.lane1_agent, &self.lane1_training),
            (LaneId::Two, &self.lane2_agent, &self.lane2_training),
        ] {
            if let Ok(a) = AgentKind::parse(agent) {
                session.set_agent(lane, a);
                let _ = session.set_training(lane, training);
            }
        }
        if let Ok(g) = GridSize::from_interior(self.grid) {
            session.set_grid(g);
        }
        session.set_seed(&self.seed);
        session.set_second_lane(self.second_lane);
        if let Some(speed) = Speed::from_multiplier(self.speed) {
            session.set_speed(speed);
        }
    }
}

pub(super) fn load_persisted_settings() -> Option<PersistedSettings> {
    let raw = local_storage_get_string(LOCALSTORAGE_SETTINGS_KEY)?;
    serde_json::from_str(&raw).ok()
}

pub(super) fn save_persisted_settings(settings: &PersistedSettings) {
    if let Ok(raw) = serde_json::to_string(settings) {
        local_storage_set_string(LOCALSTORAGE_SETTINGS_KEY, &raw);
    }
}

/// Backend base URL: the saved one, else the build-time override, else the default.
pub(super) fn resolve_api_base(saved: &str) -> String {
    let saved = saved.trim();
    if !saved.is_empty() {
        return saved.to_string();
    }
    option_env!("SLITHER_API_URL")
        .unwrap_or(DEFAULT_API_BASE)
        .to_string()
}
