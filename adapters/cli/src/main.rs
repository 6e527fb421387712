#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates and inspects Snake Escape levels.
//!
//! Plays the Game Controller role for tooling purposes: it asks the systems
//! for layouts, re-checks the solvability invariant, prints summaries, and
//! optionally drives the prefetch pipeline the way an interactive frontend
//! would, falling back to inline generation on every cache miss.

mod level_transfer;

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use snake_escape_core::{rank_title, LevelIndex, LevelLayout};
use snake_escape_pipeline::Prefetcher;
use snake_escape_system_difficulty as difficulty;
use snake_escape_system_generation::{Generator, GeneratorConfig};
use snake_escape_system_solvability::is_solvable;

use crate::level_transfer::LevelSnapshot;

/// Stand-in for the time a player spends solving before advancing, giving
/// the worker a window to fill the look-ahead buffer in play mode.
const PLAY_PAUSE: Duration = Duration::from_millis(150);

#[derive(Debug, Parser)]
#[command(name = "snake-escape", about = "Generate and inspect Snake Escape levels")]
struct Args {
    /// First level index to generate.
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Number of consecutive levels to process.
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Global seed for reproducible layouts; omit for fresh entropy.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the difficulty profile for each level before its summary.
    #[arg(long)]
    profile: bool,

    /// Print a shareable transfer string for each layout.
    #[arg(long)]
    export: bool,

    /// Advance through levels via the prefetch pipeline, as a frontend would.
    #[arg(long)]
    play: bool,

    /// Decode and summarise a transfer string instead of generating.
    #[arg(long, value_name = "STRING")]
    decode: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(code) = &args.decode {
        let snapshot =
            LevelSnapshot::decode(code).context("could not decode the transfer string")?;
        return summarize(&snapshot.into_layout(), "decoded", false);
    }

    if args.level == 0 {
        bail!("level indices start at 1");
    }

    let config = GeneratorConfig::default();
    let generator = match args.seed {
        Some(seed) => Generator::new(config, seed),
        None => Generator::from_entropy(config),
    };

    if args.play {
        play_through(generator, &args)
    } else {
        generate_inline(generator, &args)
    }
}

/// Generates every requested level synchronously on the calling thread.
fn generate_inline(generator: Generator, args: &Args) -> Result<()> {
    for step in 0..args.count {
        let level = LevelIndex::new(args.level + step);
        if args.profile {
            print_profile(level);
        }
        let layout = generator.generate(level);
        summarize(&layout, "synchronous", args.export)?;
    }
    Ok(())
}

/// Advances through levels the way an interactive controller would: check
/// the buffer first, fall back to inline generation on a miss, then schedule
/// the next look-ahead window.
fn play_through(generator: Generator, args: &Args) -> Result<()> {
    let mut prefetcher = Prefetcher::spawn(generator);
    let mut rescued: u32 = 0;

    for step in 0..args.count {
        let level = LevelIndex::new(args.level + step);
        if args.profile {
            print_profile(level);
        }

        let (layout, source) = match prefetcher.try_get(level) {
            Some(layout) => (layout, "buffered"),
            None => (generator.generate(level), "synchronous"),
        };
        prefetcher.preload(level);
        summarize(&layout, source, args.export)?;

        rescued += layout.snakes.len() as u32;
        thread::sleep(PLAY_PAUSE);
    }

    println!("rescued {rescued} snakes, rank: {}", rank_title(rescued));
    Ok(())
}

fn print_profile(level: LevelIndex) {
    let profile = difficulty::profile(level);
    println!(
        "profile {:>4}: grid {:>2} len {}-{} turn {:.2} obstacles {:>2} buffer {}{}",
        level.get(),
        profile.grid.get(),
        profile.min_len,
        profile.max_len,
        profile.turn_chance,
        profile.obstacles,
        profile.move_buffer,
        if profile.challenge { " challenge" } else { "" },
    );
}

fn summarize(layout: &LevelLayout, source: &str, export: bool) -> Result<()> {
    if !is_solvable(&layout.snakes, &layout.obstacles, layout.grid) {
        bail!(
            "level {} failed the solvability re-check",
            layout.level.get()
        );
    }

    let density =
        layout.occupied_cell_count() as f64 / f64::from(layout.grid.cell_count()) * 100.0;
    println!(
        "level {:>4} [{source}] grid {side}x{side} snakes {snakes:>2} obstacles {obstacles:>2} moves {moves:>2} density {density:>3.0}%{challenge}",
        layout.level.get(),
        side = layout.grid.get(),
        snakes = layout.snakes.len(),
        obstacles = layout.obstacles.len(),
        moves = layout.move_allowance(),
        challenge = if layout.challenge { " challenge" } else { "" },
    );

    if export {
        println!("  {}", LevelSnapshot::from_layout(layout).encode());
    }
    Ok(())
}
