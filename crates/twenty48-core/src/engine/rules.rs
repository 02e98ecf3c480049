//! Edge-case policies where the classic web version of the game and the
//! standard rules disagree.

use serde::{Deserialize, Serialize};

/// When a tile is spawned after a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// After every accepted move, even one that changed nothing.
    Always,
    /// Only after a move that slid or merged at least one tile.
    #[default]
    OnChange,
}

/// When a full board ends the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossRule {
    /// Any full board is a loss, even if two neighbours could still merge.
    BoardFull,
    /// A full board is a loss only when no direction changes it.
    #[default]
    NoMoves,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub spawn: SpawnPolicy,
    #[serde(default)]
    pub loss: LossRule,
}

impl Rules {
    /// The behaviour of the classic browser game: spawn after every move and
    /// lose as soon as the board fills up.
    pub fn classic() -> Self {
        Self {
            spawn: SpawnPolicy::Always,
            loss: LossRule::BoardFull,
        }
    }
}
