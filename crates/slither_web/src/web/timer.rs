use slither::clock::TimerPlan;
use slither::timer::TickScheduler;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// A live `setInterval`. The callback is owned here so it is freed when the
/// interval is cancelled.
pub(super) struct IntervalHandle {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

/// Schedules playback ticks on the window's interval timer.
pub(super) struct IntervalScheduler<F> {
    on_tick: F,
}

impl<F> IntervalScheduler<F> {
    pub(super) fn new(on_tick: F) -> Self {
        Self { on_tick }
    }
}

impl<F> TickScheduler for IntervalScheduler<F>
where
    F: Fn(u64) + Clone + 'static,
{
    type Handle = IntervalHandle;
    type Error = String;

    fn schedule(&mut self, plan: TimerPlan) -> Result<IntervalHandle, String> {
        let window = web_sys::window().ok_or("no window")?;
        let on_tick = self.on_tick.clone();
        let cb = Closure::wrap(Box::new(move || on_tick(plan.epoch)) as Box<dyn FnMut()>);

        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                plan.period_ms as i32,
            )
            .map_err(|_| "failed to start interval".to_string())?;
        Ok(IntervalHandle { id, _callback: cb })
    }

    fn cancel(&mut self, handle: IntervalHandle) {
        if let Some(w) = web_sys::window() {
            w.clear_interval_with_handle(handle.id);
        }
    }
}
