//! Tournament and runner configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// One player entry in a tournament.
///
/// `endpoint` is either an `http(s)://` base URL for a remote player, a
/// built-in strategy tag (`random`, `naive-money`, `action-heavy`), or a
/// `registry:<name>` reference to a locally registered player factory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    /// Wrap the player with an artificial network-latency decorator.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub delay_wrap: bool,
}

impl PlayerConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let name = name.into();
        PlayerConfig {
            id: name.to_lowercase(),
            name,
            endpoint: endpoint.into(),
            delay_wrap: false,
        }
    }
}

/// Immutable description of a whole tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    pub name: String,
    pub rounds: usize,
    pub games_per_player: usize,
    pub max_turns: u32,
    pub players: Vec<PlayerConfig>,
}

impl TournamentConfig {
    /// Admission check. A config that fails here is rejected synchronously;
    /// the tournament never enters the registry.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            bail!("tournament name must match [a-z0-9-]+, got {:?}", self.name);
        }
        if self.rounds < 1 {
            bail!("rounds must be at least 1");
        }
        if self.games_per_player < 1 {
            bail!("games per player must be at least 1");
        }
        if self.max_turns < 1 {
            bail!("max turns must be at least 1");
        }
        if self.players.len() < 4 {
            bail!(
                "need at least 4 players for 4-seat games, got {}",
                self.players.len()
            );
        }
        for (i, player) in self.players.iter().enumerate() {
            if player.id.is_empty()
                || !player
                    .id
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            {
                bail!("player id must be a lowercase slug, got {:?}", player.id);
            }
            if self.players[..i].iter().any(|p| p.id == player.id) {
                bail!("duplicate player id {:?}", player.id);
            }
        }
        Ok(())
    }
}

/// Execution parameters of the runner itself, builder style.
///
/// The worker pool default is large relative to core counts because games
/// spend most of their time blocked on remote player I/O.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) pool_size: usize,
    pub(crate) submit_stagger: Duration,
}

impl RunnerConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        RunnerConfig {
            data_dir: data_dir.into(),
            pool_size: 32,
            submit_stagger: Duration::from_millis(50),
        }
    }

    /// Number of worker threads per tournament.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size.max(1);
        self
    }

    /// Delay between the first `pool_size` submissions, so completions
    /// arrive smoothly instead of bunched.
    pub fn with_submit_stagger(mut self, stagger: Duration) -> Self {
        self.submit_stagger = stagger;
        self
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_players() -> Vec<PlayerConfig> {
        ["P1", "P2", "P3", "P4"]
            .into_iter()
            .map(|n| PlayerConfig::new(n, "random"))
            .collect()
    }

    fn valid() -> TournamentConfig {
        TournamentConfig {
            name: "practice-1".into(),
            rounds: 2,
            games_per_player: 2,
            max_turns: 100,
            players: four_players(),
        }
    }

    #[test]
    fn accepts_valid_config() {
        valid().validate().unwrap();
    }

    #[test]
    fn rejects_bad_name() {
        for name in ["", "Has Caps", "under_score", "semi;colon"] {
            let mut config = valid();
            config.name = name.into();
            assert!(config.validate().is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn rejects_too_few_players() {
        let mut config = valid();
        config.players.truncate(3);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut config = valid();
        config.players[3].id = config.players[0].id.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_rounds() {
        let mut config = valid();
        config.rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn player_config_omits_default_delay_wrap() {
        let json = serde_json::to_string(&PlayerConfig::new("Alice", "random")).unwrap();
        assert!(!json.contains("delayWrap"));
    }
}
