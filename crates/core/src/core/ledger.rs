//! Append-only record of finished runs, newest first.

use std::collections::VecDeque;

use crate::catalog::{AgentKind, GridSize, TrainingBudget};
use crate::lane::LaneId;
use crate::snapshot::Snapshot;

/// Added to the fruit count before dividing so a fruitless run does not divide by zero.
pub const FRUIT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Won => "Won",
            Outcome::Lost => "Lost",
        }
    }
}

/// Figures derived once from a run's terminal snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub move_count: usize,
    pub fruit_count: usize,
    pub final_length: usize,
    pub avg_moves_per_fruit: f64,
    pub outcome: Outcome,
}

impl RunSummary {
    pub fn from_run(snapshots: &[Snapshot]) -> Option<Self> {
        let terminal = snapshots.last()?;
        let move_count = snapshots.len() - 1;
        let fruit_count = terminal.fruit_count();
        Some(Self {
            move_count,
            fruit_count,
            final_length: terminal.body_len(),
            avg_moves_per_fruit: move_count as f64 / (fruit_count as f64 + FRUIT_EPSILON),
            outcome: if terminal.won {
                Outcome::Won
            } else {
                Outcome::Lost
            },
        })
    }
}

/// One finished run with everything needed to put it back into a lane.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Unique and increasing; stable key for list rendering.
    pub id: u64,
    /// Lane the run was first loaded into.
    pub origin: LaneId,
    pub agent: AgentKind,
    pub training: TrainingBudget,
    pub grid: GridSize,
    pub summary: RunSummary,
    snapshots: Vec<Snapshot>,
}

impl HistoryEntry {
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a run. The ledger keeps its own copy of `snapshots`. Empty
    /// runs are not recorded.
    pub fn record(
        &mut self,
        origin: LaneId,
        agent: AgentKind,
        training: TrainingBudget,
        grid: GridSize,
        snapshots: &[Snapshot],
    ) -> Option<&HistoryEntry> {
        let summary = RunSummary::from_run(snapshots)?;
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_front(HistoryEntry {
            id,
            origin,
            agent,
            training,
            grid,
            summary,
            snapshots: snapshots.to_vec(),
        });
        self.entries.front()
    }

    /// Entry at display position `index` (0 is the newest).
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ending_with(len: usize, body: usize, won: bool) -> Vec<Snapshot> {
        let mut v: Vec<Snapshot> = (0..len)
            .map(|_| Snapshot {
                snake: vec![20],
                fruit: 30,
                won: false,
                died: false,
            })
            .collect();
        if let Some(last) = v.last_mut() {
            last.snake = (20..20 + body as u32).collect();
            last.won = won;
            last.died = !won;
        }
        v
    }

    #[test]
    fn summary_comes_from_terminal_frame() {
        let s = RunSummary::from_run(&run_ending_with(31, 4, false)).unwrap();
        assert_eq!(s.move_count, 30);
        assert_eq!(s.fruit_count, 3);
        assert_eq!(s.final_length, 4);
        assert!((s.avg_moves_per_fruit - 10.0).abs() < 1e-3);
        assert_eq!(s.outcome, Outcome::Lost);

        let s = RunSummary::from_run(&run_ending_with(5, 1, true)).unwrap();
        assert_eq!(s.fruit_count, 0);
        assert!(s.avg_moves_per_fruit.is_finite());
        assert_eq!(s.outcome.label(), "Won");

        assert!(RunSummary::from_run(&[]).is_none());
    }

    #[test]
    fn entries_are_prepended_with_fresh_ids() {
        let mut ledger = HistoryLedger::new();
        let run = run_ending_with(3, 2, false);
        let a = ledger
            .record(LaneId::One, AgentKind::AStar, TrainingBudget::NOT_APPLICABLE, GridSize::Large, &run)
            .unwrap()
            .id;
        let b = ledger
            .record(LaneId::Two, AgentKind::AStar, TrainingBudget::NOT_APPLICABLE, GridSize::Large, &run)
            .unwrap()
            .id;
        assert_ne!(a, b);
        assert_eq!(ledger.get(0).unwrap().id, b);
        assert_eq!(ledger.get(1).unwrap().id, a);
        assert_eq!(ledger.find(a).unwrap().origin, LaneId::One);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn empty_runs_are_not_recorded() {
        let mut ledger = HistoryLedger::new();
        assert!(ledger
            .record(LaneId::One, AgentKind::Dqn, AgentKind::Dqn.default_budget(), GridSize::Small, &[])
            .is_none());
        assert!(ledger.is_empty());
    }
}
