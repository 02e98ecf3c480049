//! Terminal front end for the 2048 grid engine: configuration, a line-based
//! input source, a text renderer, the interactive session loop, and batch
//! self-play.

pub mod config;
pub mod input;
pub mod render;
pub mod selfplay;
pub mod session;

pub use config::Config;
pub use selfplay::{BatchSummary, GameResult, Policy, SelfplayOptions, run_selfplay};
pub use session::{SessionSummary, run_session};
