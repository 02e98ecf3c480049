use std::collections::BTreeMap;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use twenty48_core::engine::{Board, Direction, Game, GameStatus, Rules, Score, legal_moves, shift};

/// Built-in move selection used for batch self-play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Uniform over the legal moves.
    Random,
    /// Legal move with the largest immediate merge score.
    #[default]
    Greedy,
    /// First legal move of Left, Down, Right, Up: keeps big tiles in a corner.
    Corner,
}

const GREEDY_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Right,
    Direction::Down,
];

const CORNER_ORDER: [Direction; 4] = [
    Direction::Left,
    Direction::Down,
    Direction::Right,
    Direction::Up,
];

impl Policy {
    /// Pick a move for `board`, or `None` when nothing is legal.
    pub fn select<R: Rng + ?Sized>(self, board: Board, rng: &mut R) -> Option<Direction> {
        let legal = legal_moves(board);
        let is_legal = |d: &Direction| legal[d.index()];
        match self {
            Policy::Random => {
                let candidates: Vec<Direction> =
                    Direction::ALL.into_iter().filter(is_legal).collect();
                candidates.choose(rng).copied()
            }
            Policy::Greedy => {
                let mut best: Option<(Direction, Score)> = None;
                for direction in GREEDY_ORDER.into_iter().filter(is_legal) {
                    let gained = shift(board, direction).gained;
                    if best.is_none_or(|(_, best_gain)| gained > best_gain) {
                        best = Some((direction, gained));
                    }
                }
                best.map(|(direction, _)| direction)
            }
            Policy::Corner => CORNER_ORDER.into_iter().find(is_legal),
        }
    }
}

pub struct SelfplayOptions {
    pub games: usize,
    pub base_seed: u64,
    pub policy: Policy,
    pub rules: Rules,
    pub max_moves: u64,
    pub workers: Option<usize>,
    pub show_progress: bool,
}

/// Outcome of one self-play game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub game_id: usize,
    pub seed: u64,
    pub moves: u64,
    pub score: Score,
    pub highest_tile: u32,
    pub status: GameStatus,
}

/// Aggregate over a batch of games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    /// Stopped by the move cap or with no legal move left.
    pub unfinished: usize,
    pub mean_score: f64,
    pub max_score: Score,
    pub best_tile: u32,
    /// Highest tile reached -> number of games.
    pub tile_histogram: BTreeMap<u32, usize>,
}

impl BatchSummary {
    pub fn from_results(results: &[GameResult]) -> Self {
        let count = |status: GameStatus| results.iter().filter(|r| r.status == status).count();
        let total_score: Score = results.iter().map(|r| r.score).sum();
        let mut tile_histogram = BTreeMap::new();
        for r in results {
            *tile_histogram.entry(r.highest_tile).or_insert(0) += 1;
        }
        Self {
            games: results.len(),
            wins: count(GameStatus::Won),
            losses: count(GameStatus::Lost),
            unfinished: count(GameStatus::InProgress),
            mean_score: if results.is_empty() {
                0.0
            } else {
                total_score as f64 / results.len() as f64
            },
            max_score: results.iter().map(|r| r.score).max().unwrap_or(0),
            best_tile: results.iter().map(|r| r.highest_tile).max().unwrap_or(0),
            tile_histogram,
        }
    }
}

/// Play a single seeded game until it ends, stalls, or hits `max_moves`.
pub fn play_one(game_id: usize, seed: u64, policy: Policy, rules: Rules, max_moves: u64) -> GameResult {
    let mut game = Game::seeded(rules, seed);
    // Separate stream so policy choices don't shift the spawn sequence.
    let mut policy_rng = StdRng::seed_from_u64(seed.rotate_left(32) ^ 0x2048);
    let mut moves = 0;

    while moves < max_moves && !game.status().is_terminal() {
        let Some(direction) = policy.select(game.board(), &mut policy_rng) else {
            break;
        };
        if game.make_move(direction).report().is_none() {
            break;
        }
        moves += 1;
    }

    GameResult {
        game_id,
        seed,
        moves,
        score: game.score(),
        highest_tile: game.board().highest_tile(),
        status: game.status(),
    }
}

/// Play `opts.games` independent games in parallel. Results come back in
/// game-id order.
pub fn run_selfplay(opts: &SelfplayOptions) -> Result<(Vec<GameResult>, BatchSummary)> {
    info!(
        "Playing {} games with {:?} policy (seeds {}..)",
        opts.games, opts.policy, opts.base_seed
    );
    let pb = if opts.show_progress {
        ProgressBar::new(opts.games as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})",
        )
        .context("invalid progress template")?
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );

    let process = || -> Vec<GameResult> {
        (0..opts.games)
            .into_par_iter()
            .map(|game_id| {
                let seed = opts.base_seed.wrapping_add(game_id as u64);
                let result = play_one(game_id, seed, opts.policy, opts.rules, opts.max_moves);
                pb.inc(1);
                result
            })
            .collect()
    };

    let results = if let Some(n) = opts.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("failed to build rayon thread pool")?
            .install(process)
    } else {
        process()
    };

    pb.finish_with_message("games played");

    let summary = BatchSummary::from_results(&results);
    info!(
        "Finished {} games: {} won, {} lost, {} unfinished, mean score {:.1}",
        summary.games, summary.wins, summary.losses, summary.unfinished, summary.mean_score
    );
    Ok((results, summary))
}
