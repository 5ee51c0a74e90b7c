//! Player construction: resolves a [`PlayerConfig`] endpoint to a concrete
//! [`Player`] at game-materialization time.
//!
//! Endpoint forms:
//! - `http://…` / `https://…` — remote player, spoken to over HTTP;
//! - `random`, `naive-money`, `action-heavy` — built-in strategies;
//! - `registry:<name>` — a locally registered player factory.
//!
//! `delay_wrap` additionally wraps the player with the latency decorator.

mod delay;
mod remote;
mod strategy;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context};
use engine_interface::Player;

use crate::config::PlayerConfig;

pub use delay::DelayedPlayer;
pub use remote::RemotePlayer;
pub use strategy::{ActionHeavyStrategy, NaiveBigMoneyStrategy, RandomStrategy};

/// Constructs players for table execution. Injected into the executor so
/// tests (and the artificial-delay feature) swap construction, not behavior.
pub trait PlayerProvider: Send + Sync {
    fn create(&self, config: &PlayerConfig) -> anyhow::Result<Box<dyn Player>>;
}

/// Factory for locally registered player implementations, looked up through
/// `registry:<name>` endpoints.
pub trait LocalPlayerFactory: Send + Sync {
    fn create(&self, name: &str) -> Box<dyn Player>;
}

/// The default [`PlayerProvider`].
#[derive(Default)]
pub struct PlayerFactory {
    registry: Mutex<HashMap<String, Arc<dyn LocalPlayerFactory>>>,
}

impl PlayerFactory {
    pub fn new() -> Self {
        PlayerFactory::default()
    }

    /// Register a named local player factory.
    pub fn register(&self, name: impl Into<String>, factory: Arc<dyn LocalPlayerFactory>) {
        let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        registry.insert(name.into(), factory);
    }

    fn resolve(&self, config: &PlayerConfig) -> anyhow::Result<Box<dyn Player>> {
        let endpoint = config.endpoint.as_str();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Box::new(RemotePlayer::new(&config.name, endpoint)?));
        }
        if let Some(name) = endpoint.strip_prefix("registry:") {
            let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            let factory = registry
                .get(name)
                .with_context(|| format!("no registered player factory named {name:?}"))?;
            return Ok(factory.create(&config.name));
        }
        match endpoint {
            "random" => Ok(Box::new(RandomStrategy::new(&config.name))),
            "naive-money" => Ok(Box::new(NaiveBigMoneyStrategy::new(&config.name))),
            "action-heavy" => Ok(Box::new(ActionHeavyStrategy::new(&config.name))),
            other => bail!("unknown player endpoint {other:?}"),
        }
    }
}

impl PlayerProvider for PlayerFactory {
    fn create(&self, config: &PlayerConfig) -> anyhow::Result<Box<dyn Player>> {
        let player = self.resolve(config)?;
        if config.delay_wrap {
            Ok(Box::new(DelayedPlayer::new(player, 2, 5)))
        } else {
            Ok(player)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_strategies() {
        let factory = PlayerFactory::new();
        for endpoint in ["random", "naive-money", "action-heavy"] {
            let player = factory.create(&PlayerConfig::new("Bot", endpoint)).unwrap();
            assert_eq!(player.name(), "Bot");
        }
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let factory = PlayerFactory::new();
        assert!(factory.create(&PlayerConfig::new("Bot", "chess-master")).is_err());
        assert!(factory
            .create(&PlayerConfig::new("Bot", "registry:missing"))
            .is_err());
    }

    #[test]
    fn resolves_registered_factories() {
        struct Fixed;
        impl LocalPlayerFactory for Fixed {
            fn create(&self, name: &str) -> Box<dyn Player> {
                Box::new(RandomStrategy::new(name))
            }
        }

        let factory = PlayerFactory::new();
        factory.register("house-bot", Arc::new(Fixed));
        let player = factory
            .create(&PlayerConfig::new("Housey", "registry:house-bot"))
            .unwrap();
        assert_eq!(player.name(), "Housey");
    }
}
