use leptos::prelude::*;
use slither::catalog::GridSize;
use slither::error::SlitherError;
use slither::lane::LaneId;
use slither::session::{LoadProgress, Session};
use slither::timer::TimerSlot;
use slither::wire::ServerStatus;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;
use web_time::Instant;

use crate::ui_model::{grid_options, speed_label, PlayButton};

mod api;
mod canvas;
mod history;
mod lanes;
mod storage;
mod timer;

use history::HistoryTable;
use lanes::{LaneControls, LaneGrid};
use storage::{
    load_persisted_settings, resolve_api_base, save_persisted_settings, PersistedSettings,
};
use timer::{IntervalHandle, IntervalScheduler};

pub fn start() {
    mount_to_body(|| view! { <App /> });
}

pub(super) fn console_log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub(super) fn console_warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

#[component]
fn App() -> impl IntoView {
    let saved = load_persisted_settings();
    let mut initial = Session::new();
    if let Some(settings) = &saved {
        settings.apply(&mut initial);
    }

    let session = RwSignal::new(initial);
    let api_base = RwSignal::new(resolve_api_base(
        saved.as_ref().map(|s| s.api_base.as_str()).unwrap_or(""),
    ));
    let (server, set_server) = signal(ServerStatus::Unknown);
    let (status, set_status) = signal(String::new());

    // Playback timer: one interval at most, rebuilt whenever the clock's plan changes.
    let timer = StoredValue::new_local(TimerSlot::<IntervalHandle>::new());
    let on_tick = move |epoch: u64| {
        session.update(|s| {
            s.tick(epoch);
        });
    };
    Effect::new(move |_| {
        let plan = session.with(|s| s.timer_plan());
        timer.update_value(|slot| {
            let mut scheduler = IntervalScheduler::new(on_tick);
            if let Err(e) = slot.reconcile(plan, &mut scheduler) {
                console_warn(&e);
                set_status.set(e);
            }
        });
    });
    on_cleanup(move || {
        timer.update_value(|slot| slot.clear(&mut IntervalScheduler::new(on_tick)));
    });

    // Persist control selections, not playback state.
    let persisted = Memo::new(move |_| {
        let base = api_base.get();
        session.with(|s| PersistedSettings::capture(s, &base))
    });
    Effect::new(move |_| save_persisted_settings(&persisted.get()));

    {
        let base = api_base.get_untracked();
        spawn_local(async move {
            let result = api::ping(&base).await;
            if let Err(e) = &result {
                console_warn(&format!("ping failed: {e}"));
            }
            set_server.set(ServerStatus::from_ping(&result));
        });
    }

    let do_load = move || {
        let ticket = match session.try_update(|s| s.begin_load()) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                set_status.set(e.to_string());
                return;
            }
            None => return,
        };
        let base = api_base.get_untracked();
        let grid = session.with_untracked(|s| s.grid());
        let started = Instant::now();
        console_log(&format!(
            "load #{}: {} lane(s) on {grid}",
            ticket.generation,
            ticket.requests.len()
        ));
        set_status.set("loading...".to_string());

        for (lane, request) in ticket.requests {
            let base = base.clone();
            let generation = ticket.generation;
            spawn_local(async move {
                let result = api::simulate(&base, &request, grid).await;
                let progress = session.try_update(|s| s.finish_lane(generation, lane, result));
                match progress {
                    Some(LoadProgress::Complete { .. }) => set_status.set(format!(
                        "loaded in {} ms",
                        started.elapsed().as_millis()
                    )),
                    Some(LoadProgress::Failed) => set_status.set("load failed".to_string()),
                    Some(LoadProgress::Stale) => {
                        console_log(&format!("load #{generation}: dropped stale {}", lane.label()))
                    }
                    Some(LoadProgress::Pending) | None => {}
                }
            });
        }
    };

    let play_button = move || {
        session.with(|s| PlayButton::for_state(s.clock().state(), s.at_end()))
    };
    let no_run = move || session.with(|s| s.ceiling().is_none());
    let loading = move || session.with(|s| s.is_loading());

    view! {
        <main class="app">
            <header class="app-header">
                <h1 class="brand">"slither"</h1>
                <span class=move || format!("server {:?}", server.get()).to_lowercase()>
                    {move || server.get().label()}
                </span>
                <span class="status">{move || status.get()}</span>
            </header>

            <section class="controls">
                <LaneControls session=session lane=LaneId::One />
                <Show when=move || session.with(|s| s.second_lane())>
                    <LaneControls session=session lane=LaneId::Two />
                </Show>

                <fieldset class="run-controls">
                    <legend>"Run"</legend>
                    <label>
                        <span>"Seed"</span>
                        <input
                            type="text"
                            inputmode="numeric"
                            placeholder="random"
                            maxlength="3"
                            prop:value=move || session.with(|s| s.seed().to_string())
                            on:input=move |ev| {
                                let v = event_target_value(&ev);
                                // A rejected edit still notifies, which puts the old value back.
                                session.update(|s| {
                                    s.set_seed(&v);
                                });
                            }
                        />
                    </label>
                    <label>
                        <span>"Grid"</span>
                        <select on:change=move |ev| {
                            let v = event_target_value(&ev);
                            if let Some(g) = v.parse::<u32>().ok().and_then(|n| GridSize::from_interior(n).ok()) {
                                session.update(|s| s.set_grid(g));
                            }
                        }>
                            {grid_options()
                                .into_iter()
                                .map(|(value, label)| {
                                    let v = value.clone();
                                    view! {
                                        <option
                                            value=value
                                            selected=move || session.with(|s| s.grid().interior().to_string() == v)
                                        >
                                            {label}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </label>
                    <label class="toggle">
                        <input
                            type="checkbox"
                            prop:checked=move || session.with(|s| s.second_lane())
                            on:change=move |ev| {
                                let on = event_target_checked(&ev);
                                session.update(|s| s.set_second_lane(on));
                            }
                        />
                        <span>"Compare with a second grid"</span>
                    </label>
                    <button class="btn primary" disabled=loading on:click=move |_| do_load()>
                        {move || if loading() { "Loading..." } else { "Run" }}
                    </button>
                </fieldset>
            </section>

            <Show when=move || session.with(|s| s.error().is_some())>
                <div class="error-banner">
                    <span>
                        {move || session.with(|s| s.error().map(SlitherError::to_string).unwrap_or_default())}
                    </span>
                    <button class="btn sm ghost" on:click=move |_| session.update(|s| s.dismiss_error())>
                        "Dismiss"
                    </button>
                </div>
            </Show>

            <section class="playback">
                <button class="btn" disabled=no_run on:click=move |_| session.update(|s| s.step_back())>
                    "◀ Back"
                </button>
                <button
                    class="btn"
                    disabled=no_run
                    on:click=move |_| {
                        session.update(|s| match PlayButton::for_state(s.clock().state(), s.at_end()) {
                            PlayButton::Restart => s.restart(),
                            PlayButton::Play | PlayButton::Pause => {
                                s.toggle_play();
                            }
                        })
                    }
                >
                    {move || play_button().label()}
                </button>
                <button class="btn" disabled=no_run on:click=move |_| session.update(|s| s.step_forward())>
                    "Forward ▶"
                </button>
                <button
                    class="btn ghost"
                    on:click=move |_| {
                        session.update(|s| {
                            s.cycle_speed();
                        })
                    }
                >
                    {move || session.with(|s| speed_label(s.clock().speed()))}
                </button>
                <span class="cursor">
                    {move || {
                        session.with(|s| match s.ceiling() {
                            Some(c) => format!("t = {} / {}", s.cursor(), c),
                            None => "t = -".to_string(),
                        })
                    }}
                </span>
            </section>

            <section class="lanes">
                <LaneGrid session=session lane=LaneId::One />
                <Show when=move || session.with(|s| s.second_lane())>
                    <LaneGrid session=session lane=LaneId::Two />
                </Show>
            </section>

            <HistoryTable session=session />

            <details class="settings">
                <summary>"Server"</summary>
                <label>
                    <span>"API base URL"</span>
                    <input
                        type="url"
                        prop:value=move || api_base.get()
                        on:change=move |ev| api_base.set(resolve_api_base(&event_target_value(&ev)))
                    />
                </label>
            </details>
        </main>
    }
}
