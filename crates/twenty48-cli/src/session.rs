use anyhow::Result;
use log::{debug, info};
use rand::Rng;
use serde::Serialize;
use twenty48_core::engine::{Game, GameStatus, MoveOutcome, Score};

use crate::input::{Command, InputSource};
use crate::render::Renderer;

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Accepted moves across all games of the session.
    pub moves: u64,
    pub restarts: u64,
    pub score: Score,
    pub status: GameStatus,
    pub highest_tile: u32,
}

/// Feed commands from `input` into `game` until input ends or the player
/// quits, rendering after every accepted change. Moves arriving after the
/// game is over are dropped.
pub fn run_session<R, I, V>(game: &mut Game<R>, input: &mut I, renderer: &mut V) -> Result<SessionSummary>
where
    R: Rng,
    I: InputSource + ?Sized,
    V: Renderer + ?Sized,
{
    let mut moves = 0;
    let mut restarts = 0;
    renderer.render(&game.snapshot())?;

    while let Some(command) = input.next_command()? {
        match command {
            Command::Quit => {
                info!("Quit requested");
                break;
            }
            Command::Restart => {
                game.restart();
                restarts += 1;
                renderer.dismiss()?;
                renderer.render(&game.snapshot())?;
            }
            Command::Move(direction) => match game.make_move(direction) {
                MoveOutcome::Rejected => {
                    debug!("dropped {direction:?}: game is {:?}", game.status());
                }
                MoveOutcome::Applied(report) => {
                    moves += 1;
                    renderer.render(&game.snapshot())?;
                    if let Some(status) = report.finished {
                        info!("Game finished: {status:?}, score {}", game.score());
                        renderer.notify(status)?;
                    }
                }
            },
        }
    }

    Ok(SessionSummary {
        moves,
        restarts,
        score: game.score(),
        status: game.status(),
        highest_tile: game.board().highest_tile(),
    })
}
