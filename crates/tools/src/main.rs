use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::{CommandOutcome, ReplayResult, run_script};
use skirmish_tools::{init_tracing, load_config, load_script};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the command script JSON file to replay
    #[arg(short, long)]
    script: PathBuf,
    /// TOML config overriding the one embedded in the script
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the full final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut script = load_script(&args.script)?;
    if let Some(path) = &args.config {
        script.config = load_config(path)?;
    }

    let result: ReplayResult = run_script(&script).context("replay failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.snapshot).context("failed to encode snapshot")?
        );
        return Ok(());
    }

    let count = |pred: fn(&CommandOutcome) -> bool| {
        result.outcomes.iter().filter(|outcome| pred(outcome)).count()
    };
    println!("Replay complete.");
    println!("Commands: {}", result.outcomes.len());
    println!("Applied: {}", count(|o| matches!(o, CommandOutcome::Applied)));
    println!("Ignored: {}", count(|o| matches!(o, CommandOutcome::Ignored)));
    println!("Rejected: {}", count(|o| matches!(o, CommandOutcome::Rejected(_))));
    println!("Faulted: {}", count(|o| matches!(o, CommandOutcome::Faulted(_))));
    println!("Round: {}", result.snapshot.round);
    println!("Mode: {}", result.snapshot.mode);
    println!("Snapshot Hash: {:016x}", result.final_hash);

    Ok(())
}
