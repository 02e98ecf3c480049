use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::info;
use twenty48_cli::input::LineInput;
use twenty48_cli::render::TextRenderer;
use twenty48_cli::{Config, Policy, SelfplayOptions, run_selfplay, run_session};
use twenty48_core::engine::Game;

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal or run batch self-play")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info", "debug" (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER", global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play interactively: one command per line (w/a/s/d, r to restart, q to quit)
    Play {
        /// Seed for tile spawns (defaults to config, then entropy)
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },
    /// Play many games with a built-in policy and report aggregate results
    Selfplay(SelfplayArgs),
}

#[derive(Debug, Args)]
struct SelfplayArgs {
    /// Number of games
    #[arg(long, value_name = "N")]
    games: Option<usize>,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Number of worker threads (defaults to Rayon default)
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Stop a game after this many accepted moves
    #[arg(long, value_name = "N")]
    max_moves: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.log.as_deref() {
        Some(filter) => env_logger::Builder::new().parse_filters(filter).init(),
        None => env_logger::Builder::from_env(Env::default().default_filter_or("info")).init(),
    }

    let config = match &cli.config {
        Some(path) => {
            info!("Using configuration file: {}", path.display());
            Config::from_toml(path)?
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Play { seed } => play(&config, seed),
        Commands::Selfplay(args) => selfplay(&config, args),
    }
}

fn play(config: &Config, seed: Option<u64>) -> Result<()> {
    let mut game = match seed.or(config.play.seed) {
        Some(seed) => {
            info!("Seeding spawns with {seed}");
            Game::seeded(config.rules, seed)
        }
        None => Game::from_entropy(config.rules),
    };

    println!("Moves: w/a/s/d (or h/j/k/l, up/down/left/right), r = restart, q = quit");
    let mut input = LineInput::new(io::stdin().lock());
    let mut renderer = TextRenderer::new(io::stdout().lock());
    let summary = run_session(&mut game, &mut input, &mut renderer)?;

    println!(
        "Final score {} (highest tile {}) after {} moves and {} restarts",
        summary.score, summary.highest_tile, summary.moves, summary.restarts
    );
    Ok(())
}

fn selfplay(config: &Config, args: SelfplayArgs) -> Result<()> {
    let defaults = &config.selfplay;
    let options = SelfplayOptions {
        games: args.games.unwrap_or(defaults.games),
        base_seed: args.seed.unwrap_or(defaults.seed),
        policy: args.policy.unwrap_or(defaults.policy),
        rules: config.rules,
        max_moves: args.max_moves.unwrap_or(defaults.max_moves),
        workers: args.workers.or(defaults.workers).filter(|&n| n > 0),
        show_progress: !args.quiet,
    };

    let (_results, summary) = run_selfplay(&options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("games       {}", summary.games);
    println!("won         {}", summary.wins);
    println!("lost        {}", summary.losses);
    println!("unfinished  {}", summary.unfinished);
    println!("mean score  {:.1}", summary.mean_score);
    println!("max score   {}", summary.max_score);
    println!("best tile   {}", summary.best_tile);
    for (tile, games) in &summary.tile_histogram {
        println!("  {tile:>6}  {games}");
    }
    Ok(())
}
