use std::io::BufRead;

use anyhow::{Context, Result};
use log::warn;
use twenty48_core::engine::Direction;

/// A single player instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
    Quit,
}

/// Parse one command word. Accepts WASD, vi-style HJKL, the direction names
/// and `r`/`restart`, `q`/`quit`, case-insensitively.
pub fn parse_command(word: &str) -> Option<Command> {
    let command = match word.trim().to_ascii_lowercase().as_str() {
        "w" | "k" | "up" => Command::Move(Direction::Up),
        "s" | "j" | "down" => Command::Move(Direction::Down),
        "a" | "h" | "left" => Command::Move(Direction::Left),
        "d" | "l" | "right" => Command::Move(Direction::Right),
        "r" | "restart" => Command::Restart,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Something that delivers player commands, one at a time.
pub trait InputSource {
    /// Next command, or `None` once input is exhausted.
    fn next_command(&mut self) -> Result<Option<Command>>;
}

/// Reads one command per line; blank and unrecognised lines are skipped.
pub struct LineInput<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn next_command(&mut self) -> Result<Option<Command>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("failed to read command")?;
            if read == 0 {
                return Ok(None);
            }
            let word = self.line.trim();
            if word.is_empty() {
                continue;
            }
            match parse_command(word) {
                Some(command) => return Ok(Some(command)),
                None => warn!("unrecognised command {word:?}; use w/a/s/d, r or q"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_aliases() {
        assert_eq!(parse_command("W"), Some(Command::Move(Direction::Up)));
        assert_eq!(parse_command("j"), Some(Command::Move(Direction::Down)));
        assert_eq!(parse_command("Left"), Some(Command::Move(Direction::Left)));
        assert_eq!(parse_command(" d "), Some(Command::Move(Direction::Right)));
        assert_eq!(parse_command("restart"), Some(Command::Restart));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("x"), None);
    }

    #[test]
    fn line_input_skips_noise() {
        let mut input = LineInput::new(Cursor::new("a\n\n  \nbogus\nR\n"));
        assert_eq!(
            input.next_command().unwrap(),
            Some(Command::Move(Direction::Left))
        );
        assert_eq!(input.next_command().unwrap(), Some(Command::Restart));
        assert_eq!(input.next_command().unwrap(), None);
        assert_eq!(input.next_command().unwrap(), None);
    }
}
