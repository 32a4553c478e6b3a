//! Terminal playback: a tokio interval scheduler, the interactive loop, and
//! saved replay files.

use std::convert::Infallible;
use std::io::Write;
use std::time::Duration;

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use slither::clock::{TickOutcome, TimerPlan};
use slither::error::SlitherError;
use slither::lane::LaneId;
use slither::render::{Frame, Palette};
use slither::session::{LoadProgress, Session};
use slither::snapshot::Snapshot;
use slither::timer::{TickScheduler, TimerSlot};
use slither::wire::SimulationRequest;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::term::{render_frames, render_history, TermStyle};

/// Runs each timer as a spawned task that reports its epoch on a channel.
pub struct TokioScheduler {
    ticks: mpsc::UnboundedSender<u64>,
}

impl TokioScheduler {
    pub fn new(ticks: mpsc::UnboundedSender<u64>) -> Self {
        Self { ticks }
    }
}

impl TickScheduler for TokioScheduler {
    type Handle = JoinHandle<()>;
    type Error = Infallible;

    fn schedule(&mut self, plan: TimerPlan) -> Result<JoinHandle<()>, Infallible> {
        let tx = self.ticks.clone();
        let period = Duration::from_millis(plan.period_ms.into());
        debug!(epoch = plan.epoch, period_ms = plan.period_ms, "timer scheduled");
        Ok(tokio::spawn(async move {
            // First tick one period out, like a browser interval.
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(plan.epoch).is_err() {
                    break;
                }
            }
        }))
    }

    fn cancel(&mut self, handle: JoinHandle<()>) {
        handle.abort();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    Forward,
    Back,
    Speed,
    Restart,
    History,
    /// Put history row `row` (1-based, as listed) back into `lane`.
    Restore { lane: LaneId, row: usize },
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        if let Some((lane, row)) = line.trim().split_once(char::is_whitespace) {
            let lane = match lane {
                "1" => LaneId::One,
                "2" => LaneId::Two,
                _ => return None,
            };
            let row = row.trim().parse::<usize>().ok().filter(|&r| r > 0)?;
            return Some(Command::Restore { lane, row });
        }
        match line.trim() {
            "" | "p" => Some(Command::TogglePlay),
            "n" => Some(Command::Forward),
            "b" => Some(Command::Back),
            "s" => Some(Command::Speed),
            "r" => Some(Command::Restart),
            "h" => Some(Command::History),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "[enter/p] play/pause  [n] next  [b] back  [s] speed  [r] restart  [h] history  [1 N/2 N] replay row N in grid 1/2  [q] quit";

pub struct Player {
    session: Session,
    style: TermStyle,
    palette: Palette,
    interactive: bool,
}

impl Player {
    pub fn new(session: Session, style: TermStyle, interactive: bool) -> Self {
        Self {
            session,
            style,
            palette: Palette::default(),
            interactive,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply one command. Play at the last frame stays put; `r` rewinds.
    pub fn apply(&mut self, cmd: Command) -> Result<(), SlitherError> {
        match cmd {
            Command::TogglePlay => {
                self.session.toggle_play();
            }
            Command::Forward => self.session.step_forward(),
            Command::Back => self.session.step_back(),
            Command::Speed => {
                self.session.cycle_speed();
            }
            Command::Restart => self.session.restart(),
            Command::Restore { lane, row } => self.session.restore(row - 1, lane)?,
            Command::History | Command::Quit => {}
        }
        Ok(())
    }

    fn status_line(&self, id: LaneId, frame: &Frame) -> String {
        let lane = self.session.lane(id);
        let head = format!("{} {} ({})", id.label(), lane.agent.display_name(), lane.training.display());
        match frame.status {
            Some(s) => {
                let mut line = format!(
                    "{head}: move {}/{} fruits {} length {}",
                    s.index, s.last_index, s.fruit_count, s.length
                );
                if s.won {
                    line.push_str(" WON");
                } else if s.died {
                    line.push_str(" DIED");
                }
                line
            }
            None => format!("{head}: no run"),
        }
    }

    pub fn draw(&self, out: &mut impl Write) -> std::io::Result<()> {
        let lanes: Vec<LaneId> = self.session.active_lanes().collect();
        let frames: Vec<Frame> = lanes.iter().map(|&id| self.session.frame(id)).collect();
        let refs: Vec<&Frame> = frames.iter().collect();

        if self.style == TermStyle::Ansi {
            write!(out, "\x1b[2J\x1b[H")?;
        }
        write!(out, "{}", render_frames(&refs, &self.palette, self.style, 3))?;
        for (&id, frame) in lanes.iter().zip(&frames) {
            writeln!(out, "{}", self.status_line(id, frame))?;
        }
        let clock = self.session.clock();
        let state = if clock.is_playing() { "playing" } else { "paused" };
        match self.style {
            TermStyle::Ansi => writeln!(out, "{} {}", state.bold(), clock.speed().label().dimmed())?,
            TermStyle::Plain => writeln!(out, "{state} {}", clock.speed().label())?,
        }
        if let Some(e) = self.session.error() {
            writeln!(out, "error: {e}")?;
        }
        if self.interactive {
            writeln!(out, "{HELP}")?;
        }
        out.flush()
    }

    /// Drive playback until the user quits or, without a terminal on stdin,
    /// until the replay reaches its last frame.
    pub async fn run(&mut self, out: &mut impl Write) -> anyhow::Result<()> {
        let (tx, mut ticks) = mpsc::unbounded_channel();
        let mut scheduler = TokioScheduler::new(tx);
        let mut slot = TimerSlot::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = self.interactive;

        self.draw(out)?;
        loop {
            slot.reconcile(self.session.timer_plan(), &mut scheduler)?;
            if !stdin_open && slot.plan().is_none() {
                break;
            }
            tokio::select! {
                Some(epoch) = ticks.recv() => {
                    match self.session.tick(epoch) {
                        TickOutcome::Advanced(_) | TickOutcome::Finished => self.draw(out)?,
                        TickOutcome::Ignored => {}
                    }
                }
                line = lines.next_line(), if stdin_open => match line? {
                    None => stdin_open = false,
                    Some(l) => match Command::parse(&l) {
                        Some(Command::Quit) => break,
                        Some(Command::History) => {
                            write!(out, "{}", render_history(self.session.ledger().iter()))?;
                        }
                        Some(cmd) => match self.apply(cmd) {
                            Ok(()) => self.draw(out)?,
                            Err(e) => writeln!(out, "error: {e}")?,
                        },
                        None => writeln!(out, "{HELP}")?,
                    },
                },
            }
        }
        slot.clear(&mut scheduler);
        Ok(())
    }
}

/// One lane's request and the states the backend answered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLane {
    #[serde(flatten)]
    pub request: SimulationRequest,
    pub states: Vec<Snapshot>,
}

/// A `run` written to disk for offline `play`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedReplay {
    pub lanes: Vec<SavedLane>,
}

impl SavedReplay {
    /// Reconfigure `session` to match the file and feed the saved states
    /// through the normal load path.
    pub fn load_into(&self, session: &mut Session) -> Result<LoadProgress, SlitherError> {
        let first = match self.lanes.as_slice() {
            [first] | [first, _] => first,
            _ => {
                return Err(SlitherError::Shape(format!(
                    "expected one or two lanes, found {}",
                    self.lanes.len()
                )))
            }
        };

        session.set_grid(first.request.grid()?);
        if !session.set_seed(&first.request.seed) {
            return Err(SlitherError::Shape(format!(
                "invalid seed {:?}",
                first.request.seed
            )));
        }
        session.set_second_lane(self.lanes.len() == 2);
        for (id, lane) in LaneId::all().into_iter().zip(&self.lanes) {
            session.set_agent(id, lane.request.agent_kind()?);
            session.set_training(id, &lane.request.training)?;
        }

        let ticket = session.begin_load()?;
        let mut progress = LoadProgress::Pending;
        for (id, lane) in LaneId::all().into_iter().zip(&self.lanes) {
            progress = session.finish_lane(ticket.generation, id, Ok(lane.states.clone()));
            if progress == LoadProgress::Failed {
                break;
            }
        }
        match (progress, session.error()) {
            (LoadProgress::Failed, Some(e)) => Err(e.clone()),
            _ => Ok(progress),
        }
    }
}
