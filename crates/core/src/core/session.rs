//! The whole client state as one object with explicit transitions.
//!
//! Every control edit goes through [`Session`], which is what guarantees the
//! orderings the UI depends on: lanes are cleared before anything new is
//! stored, playback is stopped before the cursor moves by hand, and a load
//! response is applied only if nothing invalidated it while it was in flight.

use crate::catalog::{accept_seed_edit, AgentKind, GridSize, Speed, TrainingBudget};
use crate::clock::{PlaybackClock, TickOutcome, TimerPlan};
use crate::error::{Result, SlitherError};
use crate::lane::{Lane, LaneId, ReplayStore};
use crate::ledger::HistoryLedger;
use crate::render::Frame;
use crate::snapshot::Snapshot;
use crate::wire::SimulationRequest;

/// Requests to send for one load. Hand the `generation` back with each
/// response so stale results can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub requests: Vec<(LaneId, SimulationRequest)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadProgress {
    /// The response belongs to a load that was superseded; nothing changed.
    Stale,
    /// Stored; other lanes of the same load are still outstanding.
    Pending,
    /// Last lane stored. `playing` tells whether auto-play started.
    Complete { playing: bool },
    /// The load was abandoned and an error is now surfaced.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
struct PendingLoad {
    generation: u64,
    outstanding: Vec<(LaneId, SimulationRequest)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    store: ReplayStore,
    clock: PlaybackClock,
    ledger: HistoryLedger,
    grid: GridSize,
    seed: String,
    second_lane: bool,
    generation: u64,
    pending: Option<PendingLoad>,
    error: Option<SlitherError>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            store: ReplayStore::new(),
            clock: PlaybackClock::new(),
            ledger: HistoryLedger::new(),
            grid: GridSize::default(),
            seed: String::new(),
            second_lane: false,
            generation: 0,
            pending: None,
            error: None,
        }
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        self.store.lane(id)
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn cursor(&self) -> usize {
        self.clock.cursor()
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn second_lane(&self) -> bool {
        self.second_lane
    }

    pub fn is_lane_active(&self, id: LaneId) -> bool {
        id == LaneId::One || self.second_lane
    }

    pub fn active_lanes(&self) -> impl Iterator<Item = LaneId> + '_ {
        LaneId::all()
            .into_iter()
            .filter(move |id| self.is_lane_active(*id))
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Current load generation. Bumps whenever an in-flight load is superseded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn error(&self) -> Option<&SlitherError> {
        self.error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn ceiling(&self) -> Option<usize> {
        self.store.ceiling()
    }

    pub fn frame(&self, id: LaneId) -> Frame {
        Frame::for_lane(self.store.lane(id), self.clock.cursor(), self.grid)
    }

    /// "Restart" replaces "play" once the cursor sits on the ceiling.
    pub fn at_end(&self) -> bool {
        self.clock.at_end(self.ceiling())
    }

    fn primary_loaded(&self) -> bool {
        !self.store.lane(LaneId::One).is_empty()
    }

    /// Drop run data, rewind, stop, and orphan any in-flight load.
    fn invalidate_runs(&mut self) {
        self.store.clear_all();
        self.clock.restart();
        self.supersede_load();
    }

    fn supersede_load(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
    }

    /// Drop one lane's run data. Any in-flight load is orphaned so a late
    /// response cannot refill the lane.
    pub fn clear_lane(&mut self, id: LaneId) {
        self.store.clear_lane(id);
        self.clock.restart();
        self.supersede_load();
    }

    pub fn set_agent(&mut self, id: LaneId, agent: AgentKind) {
        self.store.lane_mut(id).select_agent(agent);
        self.invalidate_runs();
    }

    pub fn set_training(&mut self, id: LaneId, label: &str) -> Result<()> {
        let agent = self.store.lane(id).agent;
        let training = TrainingBudget::parse(agent, label)?;
        self.store.lane_mut(id).training = training;
        self.invalidate_runs();
        Ok(())
    }

    /// Apply a seed edit. Returns `false` when the edit was rejected, in
    /// which case nothing changes.
    pub fn set_seed(&mut self, proposed: &str) -> bool {
        let accepted = accept_seed_edit(&self.seed, proposed);
        if accepted != proposed {
            return false;
        }
        if accepted != self.seed {
            self.seed = accepted;
            self.invalidate_runs();
        }
        true
    }

    pub fn set_grid(&mut self, grid: GridSize) {
        self.invalidate_runs();
        self.grid = grid;
        for id in LaneId::all() {
            self.store.lane_mut(id).set_grid(grid);
        }
    }

    pub fn set_second_lane(&mut self, on: bool) {
        self.second_lane = on;
        self.invalidate_runs();
    }

    /// Start a load for every active lane. Refused while another load is
    /// outstanding.
    pub fn begin_load(&mut self) -> Result<LoadTicket> {
        if self.pending.is_some() {
            return Err(SlitherError::LoadInFlight);
        }
        self.invalidate_runs();
        self.error = None;

        let requests: Vec<(LaneId, SimulationRequest)> = self
            .active_lanes()
            .map(|id| {
                let lane = self.store.lane(id);
                (
                    id,
                    SimulationRequest::new(lane.agent, lane.training, self.grid, &self.seed),
                )
            })
            .collect();

        self.pending = Some(PendingLoad {
            generation: self.generation,
            outstanding: requests.clone(),
        });
        Ok(LoadTicket {
            generation: self.generation,
            requests,
        })
    }

    /// Apply one lane's response. Results from a superseded load are dropped.
    pub fn finish_lane(
        &mut self,
        generation: u64,
        id: LaneId,
        result: Result<Vec<Snapshot>>,
    ) -> LoadProgress {
        let Some(pending) = self.pending.as_mut() else {
            return LoadProgress::Stale;
        };
        if pending.generation != generation {
            return LoadProgress::Stale;
        }
        let Some(pos) = pending.outstanding.iter().position(|(l, _)| *l == id) else {
            return LoadProgress::Stale;
        };
        let (_, request) = pending.outstanding.remove(pos);
        let no_more = pending.outstanding.is_empty();

        let stored = result.and_then(|snapshots| {
            let agent = request.agent_kind()?;
            let training = TrainingBudget::parse(agent, &request.training)?;
            self.store
                .set_lane(id, snapshots, self.grid, agent, training)?;
            Ok((agent, training))
        });

        match stored {
            Ok((agent, training)) => {
                self.ledger.record(
                    id,
                    agent,
                    training,
                    self.grid,
                    self.store.lane(id).snapshots(),
                );
                if !no_more {
                    return LoadProgress::Pending;
                }
                self.pending = None;
                self.clock.restart();
                let playing = self.clock.play(self.ceiling(), self.primary_loaded());
                LoadProgress::Complete { playing }
            }
            Err(e) => {
                self.supersede_load();
                self.error = Some(e);
                LoadProgress::Failed
            }
        }
    }

    /// Put a history entry back into `target`, by display position.
    ///
    /// The grid size is global, so when the entry was recorded on a
    /// different grid the active sibling lane gets the same entry rather
    /// than being left on a mismatched dimension.
    pub fn restore(&mut self, index: usize, target: LaneId) -> Result<()> {
        let entry = self
            .ledger
            .get(index)
            .cloned()
            .ok_or(SlitherError::NoSuchEntry(index))?;

        self.supersede_load();
        self.error = None;
        if target == LaneId::Two {
            self.second_lane = true;
        }

        self.store.set_lane(
            target,
            entry.snapshots().to_vec(),
            entry.grid,
            entry.agent,
            entry.training,
        )?;

        let sibling = target.other();
        if entry.grid != self.store.lane(sibling).grid() {
            if self.is_lane_active(sibling) {
                self.store.set_lane(
                    sibling,
                    entry.snapshots().to_vec(),
                    entry.grid,
                    entry.agent,
                    entry.training,
                )?;
            } else {
                let lane = self.store.lane_mut(sibling);
                lane.clear();
                lane.set_grid(entry.grid);
            }
        }
        self.grid = entry.grid;
        self.clock.restart();
        Ok(())
    }

    /// Restore by entry id rather than display position.
    pub fn restore_id(&mut self, id: u64, target: LaneId) -> Result<()> {
        let index = self
            .ledger
            .iter()
            .position(|e| e.id == id)
            .ok_or(SlitherError::NoSuchEntryId(id))?;
        self.restore(index, target)
    }

    pub fn play(&mut self) -> bool {
        let ceiling = self.ceiling();
        let primary = self.primary_loaded();
        self.clock.play(ceiling, primary)
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn toggle_play(&mut self) -> bool {
        let ceiling = self.ceiling();
        let primary = self.primary_loaded();
        self.clock.toggle(ceiling, primary)
    }

    pub fn step_forward(&mut self) {
        let ceiling = self.ceiling();
        self.clock.step_forward(ceiling);
    }

    pub fn step_back(&mut self) {
        self.clock.step_back();
    }

    pub fn restart(&mut self) {
        self.clock.restart();
    }

    pub fn cycle_speed(&mut self) -> Speed {
        self.clock.cycle_speed()
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.clock.set_speed(speed);
    }

    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        let ceiling = self.ceiling();
        self.clock.tick(epoch, ceiling)
    }

    pub fn timer_plan(&self) -> Option<TimerPlan> {
        self.clock.timer_plan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::PlayState;

    fn run(len: usize, grid: GridSize) -> Vec<Snapshot> {
        let first = grid.total() + 1;
        (0..len)
            .map(|i| Snapshot {
                snake: vec![first],
                fruit: first + 1,
                won: false,
                died: i + 1 == len,
            })
            .collect()
    }

    fn loaded(lane1: usize, lane2: Option<usize>) -> Session {
        let mut s = Session::new();
        if lane2.is_some() {
            s.set_second_lane(true);
        }
        let ticket = s.begin_load().unwrap();
        let g = s.grid();
        s.finish_lane(ticket.generation, LaneId::One, Ok(run(lane1, g)));
        if let Some(n) = lane2 {
            s.finish_lane(ticket.generation, LaneId::Two, Ok(run(n, g)));
        }
        s
    }

    #[test]
    fn load_populates_records_and_autoplays() {
        let s = loaded(4, Some(6));
        assert!(!s.is_loading());
        assert_eq!(s.ledger().len(), 2);
        assert_eq!(s.ceiling(), Some(5));
        assert_eq!(s.clock().state(), PlayState::Playing);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn second_load_is_refused_while_outstanding() {
        let mut s = Session::new();
        s.begin_load().unwrap();
        assert_eq!(s.begin_load(), Err(SlitherError::LoadInFlight));
    }

    #[test]
    fn control_edit_orphans_in_flight_load() {
        let mut s = Session::new();
        let ticket = s.begin_load().unwrap();
        s.set_agent(LaneId::One, AgentKind::Dqn);
        assert!(!s.is_loading());

        let g = s.grid();
        let p = s.finish_lane(ticket.generation, LaneId::One, Ok(run(3, g)));
        assert_eq!(p, LoadProgress::Stale);
        assert!(s.lane(LaneId::One).is_empty());
        assert!(s.ledger().is_empty());
    }

    #[test]
    fn failure_surfaces_error_and_clears_loading() {
        let mut s = Session::new();
        let ticket = s.begin_load().unwrap();
        let p = s.finish_lane(
            ticket.generation,
            LaneId::One,
            Err(SlitherError::Transport("connection refused".into())),
        );
        assert_eq!(p, LoadProgress::Failed);
        assert!(!s.is_loading());
        assert!(matches!(s.error(), Some(SlitherError::Transport(_))));

        s.begin_load().unwrap();
        assert!(s.error().is_none());
    }

    #[test]
    fn out_of_range_response_is_rejected() {
        let mut s = Session::new();
        s.set_grid(GridSize::Small);
        let ticket = s.begin_load().unwrap();
        let bad = vec![Snapshot {
            snake: vec![99],
            fruit: 6,
            won: false,
            died: true,
        }];
        assert_eq!(
            s.finish_lane(ticket.generation, LaneId::One, Ok(bad)),
            LoadProgress::Failed
        );
        assert!(s.lane(LaneId::One).is_empty());
        assert!(matches!(s.error(), Some(SlitherError::CellOutOfRange { .. })));
    }

    #[test]
    fn rejected_seed_edit_changes_nothing() {
        let mut s = loaded(5, None);
        assert!(!s.set_seed("0042"));
        assert!(!s.lane(LaneId::One).is_empty());
        assert!(s.set_seed("42"));
        assert_eq!(s.seed(), "42");
        assert!(s.lane(LaneId::One).is_empty());
        assert_eq!(s.clock().state(), PlayState::Stopped);
    }

    #[test]
    fn unknown_training_label_is_an_error() {
        let mut s = Session::new();
        s.set_agent(LaneId::One, AgentKind::QLearning);
        assert!(s.set_training(LaneId::One, "10000").is_ok());
        assert!(matches!(
            s.set_training(LaneId::One, "7"),
            Err(SlitherError::UnknownTraining { .. })
        ));
        assert_eq!(s.lane(LaneId::One).training.label(), "10000");
    }

    #[test]
    fn clearing_a_lane_rewinds_and_stops() {
        let mut s = loaded(5, None);
        let epoch = s.timer_plan().unwrap().epoch;
        s.tick(epoch);
        s.clear_lane(LaneId::One);
        assert_eq!(s.cursor(), 0);
        assert!(s.timer_plan().is_none());
        assert_eq!(s.tick(epoch), TickOutcome::Ignored);
    }

    #[test]
    fn restore_same_grid_keeps_sibling() {
        let mut s = loaded(4, Some(6));
        let sibling_before = s.lane(LaneId::Two).clone();
        s.restore(1, LaneId::One).unwrap();
        assert_eq!(s.lane(LaneId::Two), &sibling_before);
        assert_eq!(s.clock().state(), PlayState::Stopped);
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn restore_by_id_matches_restore_by_position() {
        let mut s = loaded(4, None);
        let id = s.ledger().get(0).unwrap().id;
        s.restore_id(id, LaneId::Two).unwrap();
        assert!(s.second_lane());
        assert_eq!(s.lane(LaneId::Two).len(), 4);
        assert_eq!(
            s.restore_id(id + 10, LaneId::One),
            Err(SlitherError::NoSuchEntryId(id + 10))
        );
    }

    #[test]
    fn clearing_a_lane_orphans_in_flight_load() {
        let mut s = Session::new();
        let ticket = s.begin_load().unwrap();
        s.clear_lane(LaneId::One);
        assert!(!s.is_loading());

        let g = s.grid();
        let p = s.finish_lane(ticket.generation, LaneId::One, Ok(run(3, g)));
        assert_eq!(p, LoadProgress::Stale);
        assert!(s.lane(LaneId::One).is_empty());
        assert!(s.ledger().is_empty());
    }

    #[test]
    fn restore_dismisses_earlier_load_failure() {
        let mut s = loaded(4, None);
        let ticket = s.begin_load().unwrap();
        s.finish_lane(
            ticket.generation,
            LaneId::One,
            Err(SlitherError::Transport("connection refused".into())),
        );
        assert!(s.error().is_some());

        s.restore(0, LaneId::One).unwrap();
        assert!(s.error().is_none());
        assert_eq!(s.lane(LaneId::One).len(), 4);
    }
}
