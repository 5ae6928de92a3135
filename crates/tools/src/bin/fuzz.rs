use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use skirmish_core::{Command, CommandOutcome, Direction, EntityId, Game, Pos, SimConfig, TileId};
use skirmish_tools::{init_tracing, load_config};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    steps: u32,
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> Option<T> {
    if slice.is_empty() {
        return None;
    }
    Some(slice[rng.next_u64() as usize % slice.len()])
}

fn random_command(rng: &mut ChaCha8Rng, game: &Game) -> Command {
    let map = &game.state().map;
    let pos = Pos::new(
        (rng.next_u64() % map.width as u64) as i32,
        (rng.next_u64() % map.height as u64) as i32,
        (rng.next_u64() % map.depth as u64) as i32,
    );
    let tile = map.tile_id(pos).unwrap_or(TileId(0));
    let entities: Vec<EntityId> = game.state().entities.keys().collect();
    let entity = choose(rng, &entities).unwrap_or_default();
    let pending: Vec<_> =
        game.shots().iter().filter(|shot| !shot.done).map(|shot| shot.id).collect();

    // Bias towards hovering and clicking; those drive most transitions.
    match rng.next_u64() % 20 {
        0 | 1 => Command::SpawnEntity {
            pos,
            facing: Direction::from_index((rng.next_u64() % 8) as i32),
        },
        2 => Command::SelectEntity { entity },
        3..=5 => Command::HoverTile { tile },
        6 => Command::HoverEntity { entity },
        7 => Command::UnhoverEntity,
        8 | 9 => Command::ClickTile { tile },
        10 | 11 => Command::ClickEntity { entity },
        12 => Command::ClickBoard,
        13 => Command::ToggleMove,
        14 => Command::ToggleTurn,
        15 => Command::ToggleAim,
        16 => Command::Cancel,
        17 => Command::StepCompleted,
        18 => Command::AddWall { tile },
        _ => match choose(rng, &pending) {
            Some(shot) => Command::ShotLanded { shot },
            None => Command::AdvanceTurn,
        },
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    println!("Starting fuzz harness on seed {} for {} commands...", args.seed, args.steps);
    let mut game = Game::new(args.seed, config);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut applied = 0_u32;

    for step in 0..args.steps {
        let command = random_command(&mut rng, &game);
        match game.dispatch(command) {
            CommandOutcome::Applied => applied += 1,
            CommandOutcome::Faulted(violation) => {
                bail!("step {step}: {command:?} faulted: {violation}");
            }
            CommandOutcome::Ignored | CommandOutcome::Rejected(_) => {}
        }
        if let Err(violation) = game.check_invariants() {
            bail!("step {step}: invariant broken after {command:?}: {violation}");
        }
    }

    info!(applied, round = game.round(), "fuzz run finished");
    println!(
        "Fuzzing completed: {} applied, round {}, hash {:016x}",
        applied,
        game.round(),
        game.snapshot_hash()
    );
    Ok(())
}
