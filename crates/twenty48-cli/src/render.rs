use std::io::Write;

use anyhow::{Context, Result};
use twenty48_core::engine::{GameStatus, Snapshot};

/// Displays game state. The session calls `render` after every start and
/// accepted move, `notify` once when a game ends and `dismiss` on restart.
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;
    fn notify(&mut self, status: GameStatus) -> Result<()>;
    fn dismiss(&mut self) -> Result<()>;
}

/// Plain-text renderer writing to any `io::Write`.
pub struct TextRenderer<W> {
    out: W,
    banner: Option<GameStatus>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, banner: None }
    }

    /// Notification currently on display, if any.
    pub fn banner(&self) -> Option<GameStatus> {
        self.banner
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_banner(&mut self, status: GameStatus) -> Result<()> {
        let text = match status {
            GameStatus::Won => "You win! Press r to play again.",
            GameStatus::Lost => "Game over! Press r to play again.",
            GameStatus::InProgress => return Ok(()),
        };
        writeln!(self.out, "*** {text} ***").context("failed to write banner")
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(self.out, "\nScore: {}", snapshot.score)
            .and_then(|_| write!(self.out, "{}", snapshot.board))
            .context("failed to write board")?;
        if let Some(status) = self.banner {
            self.write_banner(status)?;
        }
        self.out.flush().context("failed to flush output")
    }

    fn notify(&mut self, status: GameStatus) -> Result<()> {
        self.banner = Some(status);
        self.write_banner(status)?;
        self.out.flush().context("failed to flush output")
    }

    fn dismiss(&mut self) -> Result<()> {
        self.banner = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twenty48_core::engine::Board;

    fn snapshot(score: u64) -> Snapshot {
        Snapshot {
            board: Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]).unwrap(),
            score,
            status: GameStatus::InProgress,
        }
    }

    #[test]
    fn renders_score_and_grid() {
        let mut r = TextRenderer::new(Vec::new());
        r.render(&snapshot(12)).unwrap();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("Score: 12"));
        assert!(text.contains("   2   |"));
        assert!(text.contains("|   4   "));
    }

    #[test]
    fn banner_persists_until_dismissed() {
        let mut r = TextRenderer::new(Vec::new());
        r.notify(GameStatus::Lost).unwrap();
        r.render(&snapshot(0)).unwrap();
        assert_eq!(r.banner(), Some(GameStatus::Lost));
        r.dismiss().unwrap();
        r.render(&snapshot(0)).unwrap();
        assert_eq!(r.banner(), None);
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(text.matches("Game over!").count(), 2);
    }
}
