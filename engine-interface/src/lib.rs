//! # Game Engine Interface
//!
//! The contract between the tournament core and a pluggable game engine.
//!
//! A tournament is played by `Player`s seated at 4-seat tables. The engine
//! module is supplied by the user: given the seated players and the round's
//! kingdom cards it plays exactly one game and reports per-player scores and
//! final decks. The tournament core never looks inside a game; it only
//! depends on the two traits defined here ([`Engine`] and [`EngineFactory`])
//! plus the [`Player`] capability it hands to the engine.
//!
//! `Player::decide` is the only blocking seam: remote players resolve it over
//! HTTP, built-in strategies resolve it in-process. Engines must call it once
//! per decision point and may deliver events to `Player::observe`, which is
//! required to be infallible (observers never break a game).

pub use anyhow;

mod cards;
mod state;

pub use cards::{CardType, Category};
pub use state::{Decision, Event, GameState, Phase};

/// The capability set of a seat at the table.
pub trait Player: Send {
    /// Display name, unique within one game.
    fn name(&self) -> &str;

    /// Pick one of `options`. `reason` is the event that triggered the
    /// decision point, when there is one.
    fn decide(
        &mut self,
        state: &GameState,
        options: &[Decision],
        reason: Option<&Event>,
    ) -> anyhow::Result<Decision>;

    /// Observation hook for game events. Default is to ignore them.
    fn observe(&mut self, _state: &GameState, _event: &Event) {}
}

/// Final standing of one player after a game.
#[derive(Clone, Debug)]
pub struct PlayerResult {
    pub name: String,
    pub score: u32,
    pub deck: Vec<CardType>,
}

/// What one game produced.
#[derive(Clone, Debug)]
pub struct GameResult {
    pub player_results: Vec<PlayerResult>,
}

/// One playable game, already set up with players and kingdom.
pub trait Engine {
    /// Play the game to completion.
    fn play(&mut self) -> anyhow::Result<GameResult>;
}

/// Constructs engine instances. This is the opaque module handle the core
/// receives; how the factory came to exist (registry lookup, linked-in
/// implementation, test stub) is not its concern.
pub trait EngineFactory: Send + Sync {
    fn create(
        &self,
        players: Vec<Box<dyn Player>>,
        kingdom: &[CardType],
        max_turns: u32,
    ) -> anyhow::Result<Box<dyn Engine>>;
}
