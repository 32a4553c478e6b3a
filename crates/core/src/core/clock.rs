//! Shared playback cursor and the auto-play state.

use crate::catalog::Speed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// What the driver's recurring timer should look like right now.
///
/// `epoch` changes whenever the timer must be rebuilt (start, stop, speed
/// change). A tick carrying an old epoch is ignored, so a callback queued
/// before its timer was cancelled can never move the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPlan {
    pub epoch: u64,
    pub period_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cursor moved to the contained value.
    Advanced(usize),
    /// Cursor was already at the ceiling; playback stopped.
    Finished,
    /// Not playing, or the tick came from a cancelled timer.
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackClock {
    cursor: usize,
    state: PlayState,
    speed: Speed,
    epoch: u64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    fn set_state(&mut self, state: PlayState) {
        if self.state != state {
            self.state = state;
            self.epoch = self.epoch.wrapping_add(1);
        }
    }

    /// Start auto-play. Refused unless the primary lane has data and the
    /// cursor is below `ceiling`. Returns whether the clock is now playing.
    pub fn play(&mut self, ceiling: Option<usize>, primary_loaded: bool) -> bool {
        if self.is_playing() {
            return true;
        }
        match ceiling {
            Some(c) if primary_loaded && self.cursor < c => {
                self.set_state(PlayState::Playing);
                true
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) {
        self.set_state(PlayState::Stopped);
    }

    pub fn toggle(&mut self, ceiling: Option<usize>, primary_loaded: bool) -> bool {
        if self.is_playing() {
            self.pause();
            false
        } else {
            self.play(ceiling, primary_loaded)
        }
    }

    pub fn step_forward(&mut self, ceiling: Option<usize>) {
        self.pause();
        if matches!(ceiling, Some(c) if self.cursor < c) {
            self.cursor += 1;
        }
    }

    pub fn step_back(&mut self) {
        self.pause();
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Rewind to the first frame and stop.
    pub fn restart(&mut self) {
        self.pause();
        self.cursor = 0;
    }

    /// Whether the UI should offer "restart" in place of "play".
    pub fn at_end(&self, ceiling: Option<usize>) -> bool {
        matches!(ceiling, Some(c) if self.cursor >= c)
    }

    pub fn set_speed(&mut self, speed: Speed) {
        if self.speed != speed {
            self.speed = speed;
            if self.is_playing() {
                self.epoch = self.epoch.wrapping_add(1);
            }
        }
    }

    pub fn cycle_speed(&mut self) -> Speed {
        self.set_speed(self.speed.next());
        self.speed
    }

    pub fn tick(&mut self, epoch: u64, ceiling: Option<usize>) -> TickOutcome {
        if !self.is_playing() || epoch != self.epoch {
            return TickOutcome::Ignored;
        }
        match ceiling {
            Some(c) if self.cursor < c => {
                self.cursor += 1;
                TickOutcome::Advanced(self.cursor)
            }
            _ => {
                self.pause();
                TickOutcome::Finished
            }
        }
    }

    pub fn timer_plan(&self) -> Option<TimerPlan> {
        self.is_playing().then(|| TimerPlan {
            epoch: self.epoch,
            period_ms: self.speed.period_ms(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(ceiling: usize) -> PlaybackClock {
        let mut c = PlaybackClock::new();
        assert!(c.play(Some(ceiling), true));
        c
    }

    #[test]
    fn play_requires_data_and_headroom() {
        let mut c = PlaybackClock::new();
        assert!(!c.play(None, false));
        assert!(!c.play(Some(4), false));
        assert!(!c.play(Some(0), true));
        assert!(c.play(Some(4), true));
        assert_eq!(c.state(), PlayState::Playing);
    }

    #[test]
    fn ticks_advance_by_one_then_stop_at_ceiling() {
        let mut c = playing(3);
        let mut seen = Vec::new();
        loop {
            let epoch = c.timer_plan().map(|p| p.epoch).unwrap_or_default();
            match c.tick(epoch, Some(3)) {
                TickOutcome::Advanced(n) => seen.push(n),
                TickOutcome::Finished => break,
                TickOutcome::Ignored => panic!("tick ignored while playing"),
            }
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(c.cursor(), 3);
        assert_eq!(c.state(), PlayState::Stopped);
        assert!(c.at_end(Some(3)));
        assert!(c.timer_plan().is_none());
    }

    #[test]
    fn stale_epoch_ticks_are_ignored() {
        let mut c = playing(10);
        let old = c.timer_plan().unwrap().epoch;
        c.pause();
        assert_eq!(c.tick(old, Some(10)), TickOutcome::Ignored);
        assert!(c.play(Some(10), true));
        assert_eq!(c.tick(old, Some(10)), TickOutcome::Ignored);
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn speed_change_while_playing_rebuilds_timer_once() {
        let mut c = playing(10);
        let before = c.timer_plan().unwrap();
        c.set_speed(Speed::X4);
        let after = c.timer_plan().unwrap();
        assert_ne!(before.epoch, after.epoch);
        assert_eq!(after.period_ms, 125);

        assert_eq!(c.tick(before.epoch, Some(10)), TickOutcome::Ignored);
        assert_eq!(c.tick(after.epoch, Some(10)), TickOutcome::Advanced(1));
        assert_eq!(c.cursor(), 1);
    }

    #[test]
    fn speed_change_while_stopped_keeps_epoch() {
        let mut c = PlaybackClock::new();
        c.cycle_speed();
        c.cycle_speed();
        assert_eq!(c.speed(), Speed::X4);
        assert!(c.play(Some(2), true));
        assert_eq!(c.timer_plan().unwrap().epoch, 1);
    }

    #[test]
    fn manual_steps_pause_and_clamp() {
        let mut c = playing(2);
        c.step_forward(Some(2));
        assert_eq!(c.state(), PlayState::Stopped);
        assert_eq!(c.cursor(), 1);
        c.step_forward(Some(2));
        c.step_forward(Some(2));
        assert_eq!(c.cursor(), 2);

        c.step_back();
        c.step_back();
        c.step_back();
        assert_eq!(c.cursor(), 0);

        c.step_forward(None);
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn restart_rewinds_without_playing() {
        let mut c = playing(1);
        let epoch = c.timer_plan().unwrap().epoch;
        c.tick(epoch, Some(1));
        c.tick(epoch, Some(1));
        assert!(!c.play(Some(1), true));
        c.restart();
        assert_eq!(c.cursor(), 0);
        assert_eq!(c.state(), PlayState::Stopped);
    }
}
