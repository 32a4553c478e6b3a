use leptos::prelude::*;
use slither::lane::LaneId;
use slither::session::Session;

use super::console_warn;
use crate::ui_model::HistoryRow;

#[component]
pub(super) fn HistoryTable(session: RwSignal<Session>) -> impl IntoView {
    // Rows only change when a run is recorded; ticks leave them alone.
    let rows = Memo::new(move |_| {
        session.with(|s| s.ledger().iter().map(HistoryRow::from_entry).collect::<Vec<_>>())
    });

    let restore = move |id: u64, lane: LaneId| {
        session.update(|s| {
            if let Err(e) = s.restore_id(id, lane) {
                console_warn(&format!("restore failed: {e}"));
            }
        });
    };

    view! {
        <section class="history">
            <h2>"History"</h2>
            <Show
                when=move || rows.with(|r| !r.is_empty())
                fallback=|| view! { <p class="subtle">"Finished runs show up here."</p> }
            >
                <table>
                    <thead>
                        <tr>
                            {HistoryRow::HEADERS
                                .iter()
                                .map(|h| view! { <th>{*h}</th> })
                                .collect_view()}
                            <th>"Replay"</th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=move || rows.get()
                            key=|row| row.id
                            children=move |row: HistoryRow| {
                                let id = row.id;
                                let row_class = if row.outcome == "Won" { "won" } else { "lost" };
                                view! {
                                    <tr class=row_class>
                                        <td>{row.agent}</td>
                                        <td>{row.grid}</td>
                                        <td>{row.training}</td>
                                        <td class="num">{row.moves}</td>
                                        <td class="num">{row.fruits}</td>
                                        <td class="num">{row.length}</td>
                                        <td class="num">{row.avg_moves_per_fruit}</td>
                                        <td>{row.outcome}</td>
                                        <td class="replay">
                                            <button class="btn sm" on:click=move |_| restore(id, LaneId::One)>
                                                "Grid 1"
                                            </button>
                                            <button class="btn sm" on:click=move |_| restore(id, LaneId::Two)>
                                                "Grid 2"
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </Show>
        </section>
    }
}
