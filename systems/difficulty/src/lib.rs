#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure difficulty profiler mapping level indices to generation parameters.
//!
//! The curve is banded: each band raises the grid size, snake length range,
//! turn chance, and obstacle count while shrinking the player's move buffer.
//! The exact band boundaries and constants are load-bearing for perceived
//! difficulty and existing player progression, so they are reproduced here
//! verbatim rather than re-derived.

use snake_escape_core::{DifficultyProfile, GridSize, LevelIndex};

/// Every `CHALLENGE_PERIOD`-th level uses the harder challenge perturbation.
pub const CHALLENGE_PERIOD: u32 = 4;

/// Obstacle counts never exceed this share of total grid cells.
const OBSTACLE_DENSITY_CAP: f64 = 0.15;

/// Derives the generation profile for the provided level index.
///
/// Total over all positive level indices, pure, and deterministic. The
/// challenge perturbation is applied after the obstacle-density cap, so
/// challenge levels may exceed the cap by their fixed bonus of two.
#[must_use]
pub fn profile(level: LevelIndex) -> DifficultyProfile {
    let lvl = level.get();
    let mut profile = base_profile(lvl);

    let cap = (f64::from(profile.grid.cell_count()) * OBSTACLE_DENSITY_CAP) as u32;
    profile.obstacles = profile.obstacles.min(cap);

    if lvl % CHALLENGE_PERIOD == 0 {
        profile.max_len += 2;
        profile.obstacles += 2;
        profile.move_buffer = 0;
        profile.turn_chance += 0.1;
        profile.challenge = true;
    }

    profile
}

fn base_profile(lvl: u32) -> DifficultyProfile {
    if lvl <= 5 {
        band(5, 2, 3, 0.05, 0, 5)
    } else if lvl <= 25 {
        band(6, 2, 4, 0.2, (lvl - 5) / 5 + 1, 4)
    } else if lvl <= 50 {
        band(7, 3, 5, 0.3, 3 + (lvl - 25) / 10, 3)
    } else if lvl <= 75 {
        band(8, 3, 6, 0.4, 4 + (lvl - 50) / 10, 2)
    } else if lvl <= 150 {
        band(10, 4, 8, 0.5, 6 + (lvl - 75) / 15, 2)
    } else if lvl <= 300 {
        band(12, 5, 10, 0.6, 8 + (lvl - 150) / 20, 1)
    } else if lvl <= 600 {
        band(14, 6, 12, 0.7, 10 + (lvl - 300) / 30, 1)
    } else {
        band(20, 8, 16, 0.8, 15 + (lvl - 600) / 50, 1)
    }
}

fn band(
    grid: u32,
    min_len: u32,
    max_len: u32,
    turn_chance: f64,
    obstacles: u32,
    move_buffer: u32,
) -> DifficultyProfile {
    DifficultyProfile {
        grid: GridSize::new(grid),
        min_len,
        max_len,
        turn_chance,
        obstacles,
        move_buffer,
        challenge: false,
    }
}
