//! # Card Tournament Runner
//!
//! Schedules and executes practice tournaments for a 4-seat card game:
//! balanced per-round pairings, a bounded worker pool with
//! stream-on-completion progress, an online TrueSkill rating tracker,
//! atomic per-round result files with resume support, and a compiled
//! playback tape.
//!
//! The game itself is pluggable: the runner only depends on the
//! `engine-interface` traits. Players are resolved per game from their
//! configured endpoint — remote HTTP services, the built-in practice
//! strategies, or locally registered factories.
//!
//! # Usage
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use tournament_runner::{CardType, Engine, EngineFactory, GameResult, Player, PlayerResult};
//! # struct MyEngine { names: Vec<String> }
//! # impl Engine for MyEngine {
//! #     fn play(&mut self) -> anyhow::Result<GameResult> {
//! #         Ok(GameResult {
//! #             player_results: self.names.iter().map(|n| PlayerResult {
//! #                 name: n.clone(), score: 10, deck: vec![],
//! #             }).collect(),
//! #         })
//! #     }
//! # }
//! # struct MyEngineFactory;
//! # impl EngineFactory for MyEngineFactory {
//! #     fn create(&self, players: Vec<Box<dyn Player>>, _kingdom: &[CardType], _max_turns: u32)
//! #         -> anyhow::Result<Box<dyn Engine>>
//! #     {
//! #         Ok(Box::new(MyEngine { names: players.iter().map(|p| p.name().to_string()).collect() }))
//! #     }
//! # }
//! use tournament_runner::config::{PlayerConfig, RunnerConfig, TournamentConfig};
//! use tournament_runner::player::PlayerFactory;
//! use tournament_runner::runner::TournamentService;
//!
//! fn main() -> anyhow::Result<()> {
//!     let service = TournamentService::new(
//!         RunnerConfig::new("./data"),
//!         Arc::new(MyEngineFactory),
//!         Arc::new(PlayerFactory::new()),
//!     );
//!
//!     let config = TournamentConfig {
//!         name: "spring-practice".into(),
//!         rounds: 3,
//!         games_per_player: 4,
//!         max_turns: 100,
//!         players: vec![
//!             PlayerConfig::new("Alice", "https://alice.example.com"),
//!             PlayerConfig::new("NaiveMoney", "naive-money"),
//!             PlayerConfig::new("ActionHeavy", "action-heavy"),
//!             PlayerConfig::new("Random", "random"),
//!         ],
//!     };
//!
//!     let id = service.submit(config)?;
//!     let updates = service.broadcaster().subscribe(&id);
//!     for status in updates.iter() {
//!         println!("{}/{} games", status.completed_games, status.total_games);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod logger;
pub mod player;
pub mod pool;
pub mod rating;
pub mod results;
pub mod rounds;
pub mod runner;
pub mod status;
pub mod store;
pub mod table;

pub use engine_interface::{
    anyhow, CardType, Category, Decision, Engine, EngineFactory, Event, GameResult, GameState,
    Phase, Player, PlayerResult,
};
