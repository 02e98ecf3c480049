use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use twenty48_core::engine::Rules;

use crate::selfplay::Policy;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Edge-case policies shared by interactive play and self-play.
    #[serde(default)]
    pub rules: Rules,

    #[serde(default)]
    pub play: Play,

    #[serde(default)]
    pub selfplay: Selfplay,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Play {
    /// Seed for the spawn RNG. Omit to seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Selfplay {
    #[serde(default = "defaults::games")]
    pub games: usize,
    /// Game `i` is seeded with `seed + i`.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub policy: Policy,
    /// Upper bound on accepted moves per game.
    #[serde(default = "defaults::max_moves")]
    pub max_moves: u64,
    /// Worker threads; defaults to Rayon's global pool.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for Selfplay {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            seed: 0,
            policy: Policy::default(),
            max_moves: defaults::max_moves(),
            workers: None,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        Ok(cfg)
    }
}

mod defaults {
    pub fn games() -> usize { 100 }
    pub fn max_moves() -> u64 { 100_000 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use twenty48_core::engine::{LossRule, SpawnPolicy};

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rules.spawn, SpawnPolicy::OnChange);
        assert_eq!(cfg.rules.loss, LossRule::NoMoves);
        assert_eq!(cfg.selfplay.games, 100);
        assert_eq!(cfg.play.seed, None);
    }

    #[test]
    fn parses_all_sections() {
        let cfg = Config::from_toml_str(
            r#"
            [rules]
            spawn = "always"
            loss = "board_full"

            [play]
            seed = 42

            [selfplay]
            games = 8
            seed = 1000
            policy = "corner"
            max_moves = 500
            workers = 2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rules, Rules::classic());
        assert_eq!(cfg.play.seed, Some(42));
        assert_eq!(cfg.selfplay.games, 8);
        assert_eq!(cfg.selfplay.seed, 1000);
        assert_eq!(cfg.selfplay.policy, Policy::Corner);
        assert_eq!(cfg.selfplay.max_moves, 500);
        assert_eq!(cfg.selfplay.workers, Some(2));
    }

    #[test]
    fn partial_rules_keep_other_default() {
        let cfg = Config::from_toml_str("[rules]\nspawn = \"always\"\n").unwrap();
        assert_eq!(cfg.rules.spawn, SpawnPolicy::Always);
        assert_eq!(cfg.rules.loss, LossRule::NoMoves);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = Config::from_toml_str("[rules]\nloss = \"sometimes\"\n").unwrap_err();
        assert!(err.to_string().contains("sometimes"), "{err}");
    }

    #[test]
    fn reads_from_file() {
        let td = tempdir().unwrap();
        let path = td.path().join("twenty48.toml");
        std::fs::write(&path, "[selfplay]\npolicy = \"random\"\n").unwrap();
        let cfg = Config::from_toml(&path).unwrap();
        assert_eq!(cfg.selfplay.policy, Policy::Random);

        let missing = td.path().join("missing.toml");
        let err = Config::from_toml(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
