//! Slither terminal client.
//!
//! Fetches snake-agent replays from the simulation backend and plays them
//! back in the terminal, one or two lanes side by side.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use slither::prelude::*;
use slither::wire::DEFAULT_API_BASE;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod client;
mod player;
mod term;

use client::ApiClient;
use player::{Player, SavedLane, SavedReplay};
use term::TermStyle;

#[derive(Parser, Debug)]
#[command(
    name = "slither-cli",
    version,
    about = "Watch snake agents play, straight from the simulation backend"
)]
struct Cli {
    /// Base URL of the simulation backend.
    #[arg(long, env = "SLITHER_API_URL", default_value = DEFAULT_API_BASE)]
    api_url: String,

    /// Request timeout in seconds. No timeout unless given.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Draw grids with ASCII glyphs instead of colour blocks.
    #[arg(long)]
    plain: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one run (or two, with --compare) and play it back.
    Run {
        /// Agent code: a*, q, sarsa, dqn, ddqn.
        #[arg(short, long, default_value = "a*")]
        agent: String,
        /// Training episodes. Defaults to the agent's first option.
        #[arg(short, long)]
        training: Option<String>,
        /// Interior grid size: 3, 6 or 10.
        #[arg(short, long, default_value_t = 6)]
        grid: u32,
        /// Up to three digits; empty for an unseeded run.
        #[arg(short, long, default_value = "")]
        seed: String,
        /// Agent code for a second lane.
        #[arg(long)]
        compare: Option<String>,
        /// Training episodes for the second lane.
        #[arg(long, requires = "compare")]
        compare_training: Option<String>,
        /// Playback speed multiplier: 1, 2 or 4.
        #[arg(long, default_value_t = 1)]
        speed: u32,
        /// Write the fetched runs to a file for `play`.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Ask the backend whether it is awake.
    Ping,
    /// Play back a file written by `run --save`.
    Play {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        speed: u32,
    },
}

fn parse_speed(multiplier: u32) -> Result<Speed> {
    match Speed::from_multiplier(multiplier) {
        Some(s) => Ok(s),
        None => bail!("speed must be 1, 2 or 4, got {multiplier}"),
    }
}

fn configure_lane(session: &mut Session, id: LaneId, agent: &str, training: Option<&str>) -> Result<()> {
    session.set_agent(id, AgentKind::parse(agent)?);
    if let Some(t) = training {
        session.set_training(id, t)?;
    }
    Ok(())
}

fn style(cli: &Cli) -> TermStyle {
    if cli.plain {
        TermStyle::Plain
    } else {
        TermStyle::Ansi
    }
}

async fn fetch(client: &ApiClient, session: &mut Session) -> Result<SavedReplay> {
    let ticket = session.begin_load()?;
    let grid = session.grid();
    let started = Instant::now();

    let handles: Vec<_> = ticket
        .requests
        .iter()
        .map(|(id, req)| {
            let client = client.clone();
            let req = req.clone();
            (*id, req.clone(), tokio::spawn(async move { client.simulate(&req, grid).await }))
        })
        .collect();

    let mut saved = SavedReplay::default();
    for (id, request, handle) in handles {
        let result = handle
            .await
            .map_err(|e| SlitherError::Transport(e.to_string()))
            .and_then(|r| r);
        if let Ok(states) = &result {
            saved.lanes.push(SavedLane {
                request,
                states: states.clone(),
            });
        }
        if session.finish_lane(ticket.generation, id, result) == LoadProgress::Failed {
            break;
        }
    }

    if let Some(e) = session.error() {
        return Err(e.clone()).context("loading runs");
    }
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "runs loaded");
    Ok(saved)
}

async fn play(session: Session, style: TermStyle) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let mut player = Player::new(session, style, interactive);
    let mut stdout = std::io::stdout();
    player.run(&mut stdout).await?;
    print!("{}", term::render_history(player.session().ledger().iter()));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let style = style(&cli);
    let client = ApiClient::new(&cli.api_url, cli.timeout_secs.map(Duration::from_secs))?;

    match cli.command {
        Command::Ping => {
            let status = ServerStatus::from_ping(&client.ping().await);
            match status {
                ServerStatus::Awake => println!("{} {}", client.base(), status.label().green()),
                _ => println!("{} {}", client.base(), status.label().red()),
            }
        }
        Command::Run {
            agent,
            training,
            grid,
            seed,
            compare,
            compare_training,
            speed,
            save,
        } => {
            let mut session = Session::new();
            session.set_grid(GridSize::from_interior(grid)?);
            if !session.set_seed(&seed) {
                bail!("seed must be empty or a number from 0 to 999 without leading zeros");
            }
            configure_lane(&mut session, LaneId::One, &agent, training.as_deref())?;
            if let Some(other) = &compare {
                session.set_second_lane(true);
                configure_lane(&mut session, LaneId::Two, other, compare_training.as_deref())?;
            }
            session.set_speed(parse_speed(speed)?);

            let saved = fetch(&client, &mut session).await?;
            if let Some(path) = save {
                let text = serde_json::to_string_pretty(&saved)?;
                std::fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "replay saved");
            }
            play(session, style).await?;
        }
        Command::Play { file, speed } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let saved: SavedReplay = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;
            let mut session = Session::new();
            session.set_speed(parse_speed(speed)?);
            if let Err(e) = saved.load_into(&mut session) {
                warn!(error = %e, "saved replay rejected");
                return Err(e.into());
            }
            play(session, style).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults_match_the_web_controls() {
        let cli = Cli::try_parse_from(["slither-cli", "run"]).unwrap();
        assert_eq!(cli.api_url, DEFAULT_API_BASE);
        match cli.command {
            Command::Run {
                agent, grid, seed, speed, compare, ..
            } => {
                assert_eq!(agent, "a*");
                assert_eq!(grid, 6);
                assert_eq!(seed, "");
                assert_eq!(speed, 1);
                assert!(compare.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn compare_training_needs_compare() {
        assert!(Cli::try_parse_from(["slither-cli", "run", "--compare-training", "500"]).is_err());
        assert!(Cli::try_parse_from([
            "slither-cli", "run", "--compare", "dqn", "--compare-training", "500"
        ])
        .is_ok());
    }

    #[test]
    fn play_takes_a_file() {
        let cli = Cli::try_parse_from(["slither-cli", "--plain", "play", "run.json", "--speed", "4"]).unwrap();
        assert!(cli.plain);
        match cli.command {
            Command::Play { file, speed } => {
                assert_eq!(file, PathBuf::from("run.json"));
                assert_eq!(parse_speed(speed).unwrap(), Speed::X4);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lane_configuration_rejects_foreign_budgets() {
        let mut s = Session::new();
        configure_lane(&mut s, LaneId::One, "dqn", Some("500")).unwrap();
        assert!(configure_lane(&mut s, LaneId::One, "q", Some("500")).is_err());
        assert!(configure_lane(&mut s, LaneId::One, "nope", None).is_err());
        assert!(parse_speed(3).is_err());
    }
}
