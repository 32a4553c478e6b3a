//! Keeps exactly one platform timer in line with [`PlaybackClock::timer_plan`].
//!
//! [`PlaybackClock::timer_plan`]: crate::clock::PlaybackClock::timer_plan

use crate::clock::TimerPlan;

/// Platform hook that owns real recurring timers (browser intervals, tokio
/// intervals, test fakes).
pub trait TickScheduler {
    type Handle;
    type Error;

    /// Start a recurring timer that reports `plan.epoch` every `plan.period_ms`.
    fn schedule(&mut self, plan: TimerPlan) -> Result<Self::Handle, Self::Error>;

    /// Stop a timer. No tick may be delivered for it afterwards.
    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Debug)]
pub struct TimerSlot<H> {
    active: Option<(TimerPlan, H)>,
}

impl<H> Default for TimerSlot<H> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<H> TimerSlot<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> Option<TimerPlan> {
        self.active.as_ref().map(|(p, _)| *p)
    }

    pub fn handle(&self) -> Option<&H> {
        self.active.as_ref().map(|(_, h)| h)
    }

    /// Cancel whatever is running unless it already matches `desired`, then
    /// schedule `desired` if there is one. Calling this again with the same
    /// plan is a no-op.
    pub fn reconcile<S>(&mut self, desired: Option<TimerPlan>, scheduler: &mut S) -> Result<(), S::Error>
    where
        S: TickScheduler<Handle = H>,
    {
        if self.plan() == desired {
            return Ok(());
        }
        if let Some((_, handle)) = self.active.take() {
            scheduler.cancel(handle);
        }
        if let Some(plan) = desired {
            let handle = scheduler.schedule(plan)?;
            self.active = Some((plan, handle));
        }
        Ok(())
    }

    /// Cancel the running timer, if any. Used on teardown.
    pub fn clear<S>(&mut self, scheduler: &mut S)
    where
        S: TickScheduler<Handle = H>,
    {
        if let Some((_, handle)) = self.active.take() {
            scheduler.cancel(handle);
        }
    }
}
