//! # slither
//!
//! Replay state machine for a snake-playing-agent simulation service.
//!
//! A remote backend trains or runs an agent and returns every frame of the
//! resulting game. This crate holds everything a client needs to play those
//! frames back: two lanes of run data, one shared playback cursor with an
//! auto-play clock, an append-only history of finished runs that can be
//! restored into either lane, and the grid rendering contract.
//!
//! Nothing here does I/O. The browser and terminal clients drive a
//! [`Session`](session::Session), send the requests it hands out, and feed the
//! responses back.
//!
//! ## Quick Start
//!
//! ```
//! use slither::prelude::*;
//!
//! let mut session = Session::new();
//! session.set_grid(GridSize::Small);
//!
//! let ticket = session.begin_load().unwrap();
//! let (lane, _request) = &ticket.requests[0];
//!
//! let body = r#"{"states":[
//!     {"snake":[12],"fruit":6,"won":false,"died":false},
//!     {"snake":[12,11],"fruit":6,"won":false,"died":true}
//! ]}"#;
//! let run = SimulationResponse::decode(body, session.grid());
//! session.finish_lane(ticket.generation, *lane, run);
//!
//! assert_eq!(session.ledger().get(0).unwrap().summary.outcome, Outcome::Lost);
//! assert!(session.timer_plan().is_some());
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: agent, training, grid and speed option sets; seed filter
//! - [`wire`]: backend request/response bodies
//! - [`lane`]: lanes and the replay store
//! - [`clock`]: playback cursor and auto-play
//! - [`timer`]: reconciling a platform timer with the clock
//! - [`ledger`]: run history
//! - [`render`]: cell classification and colours
//! - [`session`]: the combined state machine

#[path = "core/catalog.rs"]
pub mod catalog;

#[path = "core/clock.rs"]
pub mod clock;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/lane.rs"]
pub mod lane;

#[path = "core/ledger.rs"]
pub mod ledger;

#[path = "core/render.rs"]
pub mod render;

#[path = "core/session.rs"]
pub mod session;

#[path = "core/snapshot.rs"]
pub mod snapshot;

#[path = "core/timer.rs"]
pub mod timer;

#[path = "core/wire.rs"]
pub mod wire;

/// Prelude module for convenient imports.
///
/// ```
/// use slither::prelude::*;
/// ```
pub mod prelude {
    pub use crate::catalog::{AgentKind, GridSize, Speed, TrainingBudget};
    pub use crate::clock::{PlayState, TickOutcome, TimerPlan};
    pub use crate::error::SlitherError;
    pub use crate::lane::{Lane, LaneId};
    pub use crate::ledger::{HistoryEntry, Outcome, RunSummary};
    pub use crate::render::{CellKind, Frame, Palette, Rgb};
    pub use crate::session::{LoadProgress, LoadTicket, Session};
    pub use crate::snapshot::Snapshot;
    pub use crate::timer::{TickScheduler, TimerSlot};
    pub use crate::wire::{ServerStatus, SimulationRequest, SimulationResponse};
}
