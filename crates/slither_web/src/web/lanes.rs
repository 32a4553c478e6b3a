use leptos::prelude::*;
use slither::catalog::AgentKind;
use slither::lane::LaneId;
use slither::render::Palette;
use slither::session::Session;

use super::{canvas, console_warn};
use crate::ui_model::{agent_options, frame_status_line, training_options};

const CANVAS_PX: u32 = 360;

/// Agent and training selectors for one lane.
#[component]
pub(super) fn LaneControls(session: RwSignal<Session>, lane: LaneId) -> impl IntoView {
    let agent = move || session.with(|s| s.lane(lane).agent);
    let training = move || session.with(|s| s.lane(lane).training);

    view! {
        <fieldset class="lane-controls">
            <legend>{lane.label()}</legend>
            <label>
                <span>"Agent"</span>
                <select on:change=move |ev| {
                    if let Ok(a) = AgentKind::parse(&event_target_value(&ev)) {
                        session.update(|s| s.set_agent(lane, a));
                    }
                }>
                    {agent_options()
                        .into_iter()
                        .map(|(code, name)| {
                            view! {
                                <option value=code selected=move || agent().code() == code>
                                    {name}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
            </label>
            <label>
                <span>"Training"</span>
                <select
                    disabled=move || !agent().default_budget().is_applicable()
                    on:change=move |ev| {
                        let v = event_target_value(&ev);
                        session.update(|s| {
                            if let Err(e) = s.set_training(lane, &v) {
                                console_warn(&e.to_string());
                            }
                        });
                    }
                >
                    {move || {
                        training_options(agent())
                            .into_iter()
                            .map(|(value, label)| {
                                view! {
                                    <option value=value selected=move || training().label() == value>
                                        {label}
                                    </option>
                                }
                            })
                            .collect_view()
                    }}
                </select>
            </label>
        </fieldset>
    }
}

/// Canvas view of one lane at the shared cursor.
#[component]
pub(super) fn LaneGrid(session: RwSignal<Session>, lane: LaneId) -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let frame = Memo::new(move |_| session.with(|s| s.frame(lane)));

    Effect::new(move |_| {
        let f = frame.get();
        if let Some(canvas) = canvas_ref.get() {
            if let Err(e) = canvas::draw_frame(&canvas, &f, &Palette::default()) {
                console_warn(&e);
            }
        }
    });

    let caption = move || {
        session.with(|s| {
            let l = s.lane(lane);
            if l.is_empty() {
                String::new()
            } else {
                format!("{} · {}", l.agent.display_name(), l.training.display())
            }
        })
    };

    view! {
        <div class="lane">
            <h3>
                {lane.label()}
                " "
                <span class="subtle">{caption}</span>
            </h3>
            <canvas node_ref=canvas_ref width=CANVAS_PX.to_string() height=CANVAS_PX.to_string()></canvas>
            <div class="lane-status">{move || frame_status_line(frame.with(|f| f.status))}</div>
        </div>
    }
}
