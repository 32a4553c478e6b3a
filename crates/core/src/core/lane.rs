//! The two playback lanes and the store that owns them.

use crate::catalog::{AgentKind, GridSize, TrainingBudget};
use crate::error::Result;
use crate::snapshot::{validate_run, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneId {
    One,
    Two,
}

impl LaneId {
    pub fn index(self) -> usize {
        match self {
            LaneId::One => 0,
            LaneId::Two => 1,
        }
    }

    pub fn other(self) -> LaneId {
        match self {
            LaneId::One => LaneId::Two,
            LaneId::Two => LaneId::One,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LaneId::One => "Grid 1",
            LaneId::Two => "Grid 2",
        }
    }

    pub fn all() -> [LaneId; 2] {
        [LaneId::One, LaneId::Two]
    }
}

/// One playback slot: the agent selection for this lane plus the run data
/// of its most recent load or restore.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub agent: AgentKind,
    pub training: TrainingBudget,
    grid: GridSize,
    snapshots: Vec<Snapshot>,
}

impl Default for Lane {
    fn default() -> Self {
        Self::new(AgentKind::default())
    }
}

impl Lane {
    pub fn new(agent: AgentKind) -> Self {
        Self {
            agent,
            training: agent.default_budget(),
            grid: GridSize::default(),
            snapshots: Vec::new(),
        }
    }

    /// Replace run data and configuration in one step. An invalid run leaves
    /// the lane exactly as it was.
    pub fn set(
        &mut self,
        snapshots: Vec<Snapshot>,
        grid: GridSize,
        agent: AgentKind,
        training: TrainingBudget,
    ) -> Result<()> {
        validate_run(grid, &snapshots)?;
        self.snapshots = snapshots;
        self.grid = grid;
        self.agent = agent;
        self.training = training;
        Ok(())
    }

    /// Drop the run data; the agent and training selection stay.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Change the agent selection, re-deriving the training budget when the
    /// current one is not offered for the new agent.
    pub fn select_agent(&mut self, agent: AgentKind) {
        self.agent = agent;
        self.training = TrainingBudget::resolve_or_default(agent, self.training.label());
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub(crate) fn set_grid(&mut self, grid: GridSize) {
        debug_assert!(self.snapshots.is_empty() || self.grid == grid);
        self.grid = grid;
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index actually drawn for `cursor`: a lane that ended early holds its
    /// last frame. `None` when nothing is loaded.
    pub fn effective_index(&self, cursor: usize) -> Option<usize> {
        self.snapshots.len().checked_sub(1).map(|last| cursor.min(last))
    }

    pub fn current(&self, cursor: usize) -> Option<&Snapshot> {
        self.effective_index(cursor).map(|i| &self.snapshots[i])
    }

    pub fn terminal(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayStore {
    lanes: [Lane; 2],
}

impl ReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id.index()]
    }

    pub fn lane_mut(&mut self, id: LaneId) -> &mut Lane {
        &mut self.lanes[id.index()]
    }

    pub fn set_lane(
        &mut self,
        id: LaneId,
        snapshots: Vec<Snapshot>,
        grid: GridSize,
        agent: AgentKind,
        training: TrainingBudget,
    ) -> Result<()> {
        self.lane_mut(id).set(snapshots, grid, agent, training)
    }

    pub fn clear_lane(&mut self, id: LaneId) {
        self.lane_mut(id).clear();
    }

    pub fn clear_all(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
    }

    /// Highest cursor value worth showing: the last index of the longer lane.
    pub fn ceiling(&self) -> Option<usize> {
        self.lanes
            .iter()
            .map(Lane::len)
            .max()
            .and_then(|n| n.checked_sub(1))
    }
}
