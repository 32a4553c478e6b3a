//! UI labels and row formatting that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! control inventory and the history table on the host.

use slither::catalog::{AgentKind, GridSize, Speed, TrainingBudget};
use slither::clock::PlayState;
use slither::ledger::HistoryEntry;
use slither::render::FrameStatus;

/// The single play/pause/restart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayButton {
    Play,
    Pause,
    Restart,
}

impl PlayButton {
    pub fn for_state(state: PlayState, at_end: bool) -> Self {
        match state {
            PlayState::Playing => PlayButton::Pause,
            PlayState::Stopped if at_end => PlayButton::Restart,
            PlayState::Stopped => PlayButton::Play,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayButton::Play => "▶ Play",
            PlayButton::Pause => "⏸ Pause",
            PlayButton::Restart => "⟲ Restart",
        }
    }
}

pub fn speed_label(speed: Speed) -> String {
    format!("Speed {}", speed.label())
}

/// `(value, label)` pairs for the agent dropdown.
pub fn agent_options() -> Vec<(&'static str, &'static str)> {
    AgentKind::all()
        .iter()
        .map(|a| (a.code(), a.display_name()))
        .collect()
}

pub fn training_options(agent: AgentKind) -> Vec<(&'static str, &'static str)> {
    agent
        .budgets()
        .iter()
        .map(|b| (b.label(), b.display()))
        .collect()
}

/// `(interior value, "NxN" label)` pairs for the grid dropdown.
pub fn grid_options() -> Vec<(String, String)> {
    GridSize::all()
        .iter()
        .map(|g| (g.interior().to_string(), g.to_string()))
        .collect()
}

pub fn training_column(training: TrainingBudget) -> String {
    if training.is_applicable() {
        format!("{} eps", training.label())
    } else {
        training.display().to_string()
    }
}

pub fn frame_status_line(status: Option<FrameStatus>) -> String {
    let Some(s) = status else {
        return "no run loaded".to_string();
    };
    let outcome = if s.won {
        " · won"
    } else if s.died {
        " · died"
    } else {
        ""
    };
    format!(
        "move {}/{} · fruit {} · length {}{}",
        s.index, s.last_index, s.fruit_count, s.length, outcome
    )
}

/// One row of the history table, pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: u64,
    pub agent: String,
    pub grid: String,
    pub training: String,
    pub moves: String,
    pub fruits: String,
    pub length: String,
    pub avg_moves_per_fruit: String,
    pub outcome: &'static str,
}

impl HistoryRow {
    pub const HEADERS: [&'static str; 8] = [
        "Agent", "Grid", "Training", "Moves", "Fruits", "Length", "Moves/fruit", "Result",
    ];

    pub fn from_entry(e: &HistoryEntry) -> Self {
        Self {
            id: e.id,
            agent: e.agent.display_name().to_string(),
            grid: e.grid.to_string(),
            training: training_column(e.training),
            moves: e.summary.move_count.to_string(),
            fruits: e.summary.fruit_count.to_string(),
            length: e.summary.final_length.to_string(),
            avg_moves_per_fruit: format!("{:.3}", e.summary.avg_moves_per_fruit),
            outcome: e.summary.outcome.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slither::prelude::*;

    #[test]
    fn play_button_follows_clock() {
        assert_eq!(PlayButton::for_state(PlayState::Playing, false), PlayButton::Pause);
        assert_eq!(PlayButton::for_state(PlayState::Stopped, false), PlayButton::Play);
        assert_eq!(PlayButton::for_state(PlayState::Stopped, true), PlayButton::Restart);
        assert_eq!(PlayButton::for_state(PlayState::Playing, true), PlayButton::Pause);
    }

    #[test]
    fn option_inventories_are_stable() {
        let agents = agent_options();
        assert_eq!(agents.len(), 5);
        assert!(agents.iter().any(|(code, _)| *code == "a*"));

        assert_eq!(training_options(AgentKind::AStar), vec![("na", "n/a")]);
        assert_eq!(training_options(AgentKind::Dqn).len(), 3);

        let grids = grid_options();
        assert_eq!(grids[0], ("3".to_string(), "5x5".to_string()));
        assert_eq!(grids.len(), 3);
    }

    #[test]
    fn history_row_formats_summary() {
        let mut s = Session::new();
        s.set_grid(GridSize::Small);
        let ticket = s.begin_load().unwrap();
        let run = vec![
            Snapshot { snake: vec![12], fruit: 6, won: false, died: false },
            Snapshot { snake: vec![12, 11], fruit: 6, won: false, died: true },
        ];
        s.finish_lane(ticket.generation, LaneId::One, Ok(run));

        let row = HistoryRow::from_entry(s.ledger().get(0).unwrap());
        assert_eq!(row.agent, "A* search");
        assert_eq!(row.grid, "5x5");
        assert_eq!(row.training, "n/a");
        assert_eq!(row.moves, "1");
        assert_eq!(row.fruits, "1");
        assert_eq!(row.length, "2");
        assert_eq!(row.avg_moves_per_fruit, "1.000");
        assert_eq!(row.outcome, "Lost");
    }

    #[test]
    fn status_line_mentions_outcome() {
        assert_eq!(frame_status_line(None), "no run loaded");
        let line = frame_status_line(Some(FrameStatus {
            index: 3,
            last_index: 9,
            fruit_count: 2,
            length: 3,
            won: false,
            died: true,
        }));
        assert_eq!(line, "move 3/9 · fruit 2 · length 3 · died");
        assert_eq!(speed_label(Speed::X2), "Speed 2x");
        assert_eq!(training_column(AgentKind::Sarsa.default_budget()), "1000 eps");
    }
}
