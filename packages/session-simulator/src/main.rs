//! Session simulator CLI - plays complete sessions headlessly.
//!
//! The human seat is taken by an autopilot that answers every prompt, so a
//! run exercises the same controller, runner and event stream a real client
//! would see.

mod autopilot;
mod metrics;
mod output;
mod simulator;

use std::time::Instant;

use clap::{Parser, ValueEnum};
use metrics::{build_game_record, Summary};
use nightfall_backend::ai::registry;
use nightfall_backend::config::{DecisionBackend, GameConfig, LlmConfig};
use output::OutputWriter;
use simulator::{ProviderSource, Simulator};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "session-simulator")]
#[command(about = "Plays complete sessions with an autopilot in the human seat")]
struct Args {
    /// Number of sessions to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Base seed; game N uses seed + N. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Decision provider for autonomous seats
    #[arg(long, default_value = "random")]
    provider: ProviderKind,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write one JSONL record per game into this directory
    #[arg(long)]
    output_dir: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
enum ProviderKind {
    Random,
    Scripted,
    Llm,
}

fn provider_source(kind: &ProviderKind) -> Result<ProviderSource, Box<dyn std::error::Error>> {
    let name = match kind {
        ProviderKind::Random => "random",
        ProviderKind::Scripted => "scripted",
        ProviderKind::Llm => {
            return match LlmConfig::from_env()? {
                Some(config) => Ok(ProviderSource::Configured(DecisionBackend::Llm(config))),
                None => Err("--provider llm needs LLM_API_KEY".into()),
            };
        }
    };
    registry::by_name(name)
        .map(ProviderSource::Registered)
        .ok_or_else(|| format!("provider {name} is not registered").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Silent by default, only warnings and errors
    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Game settings follow the server's NIGHTFALL_* variables.
    let config = GameConfig::from_env()?;
    let source = provider_source(&args.provider)?;
    let provider = source.name();
    info!(games = args.games, provider, players = config.player_count, "Starting session simulator");

    let simulator = Simulator::new(config, source);
    let mut output = match &args.output_dir {
        Some(dir) => Some(OutputWriter::new(dir)?),
        None => None,
    };
    let base_seed = args.seed.unwrap_or_else(rand::random);

    let start = Instant::now();
    let mut summary = Summary::default();
    let mut errors = 0;

    for game_num in 1..=args.games {
        let seed = base_seed.wrapping_add(u64::from(game_num));
        match simulator.simulate_game(seed).await {
            Ok(outcome) => {
                let record = build_game_record(game_num, seed, provider, &outcome);
                if let Some(writer) = output.as_mut() {
                    if let Err(e) = writer.write_game(&record) {
                        warn!(game = game_num, error = %e, "Failed to write game record");
                    }
                }
                info!(
                    game = game_num,
                    result = ?record.result,
                    rounds = record.rounds,
                    "Game completed"
                );
                summary.record(&record);
            }
            Err(e) => {
                errors += 1;
                warn!(game = game_num, seed, error = %e, "Game failed");
            }
        }
    }

    if let Some(writer) = output {
        let path = writer.finish()?;
        println!("Results written to: {}", path.display());
    }
    summary.print(errors, start.elapsed(), args.games);

    if errors > 0 {
        return Err(format!("{errors} of {} games did not finish", args.games).into());
    }
    Ok(())
}
