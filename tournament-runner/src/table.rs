//! Plays the games of a single table and maps engine results back to
//! tournament placements.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use engine_interface::{CardType, EngineFactory, GameResult};
use tracing::{instrument, warn};

use crate::player::PlayerProvider;
use crate::results::{GameOutcome, MatchResult, Placement};
use crate::rounds::GameAssignment;

/// Stateless game executor, safe to call from any number of workers at once.
///
/// Any fault while materializing players, building the engine or playing the
/// game produces an all-zero outcome for every seat: the game still counts,
/// it just decides nothing.
pub struct TableExecutor {
    engines: Arc<dyn EngineFactory>,
    players: Arc<dyn PlayerProvider>,
}

impl TableExecutor {
    pub fn new(engines: Arc<dyn EngineFactory>, players: Arc<dyn PlayerProvider>) -> Self {
        TableExecutor { engines, players }
    }

    /// Play `games_per_table` games with this seating and return the table's
    /// match result. Never fails; failed games become zero outcomes.
    #[instrument(skip_all, fields(table = table_number))]
    pub fn execute_table(
        &self,
        table_number: usize,
        seats: &GameAssignment,
        kingdom: &[CardType],
        games_per_table: usize,
        max_turns: u32,
    ) -> MatchResult {
        let player_ids: Vec<String> = seats.iter().map(|p| p.id.clone()).collect();

        let mut outcomes = Vec::with_capacity(games_per_table);
        for game_index in 0..games_per_table {
            let placements = match self.play_one(seats, kingdom, max_turns) {
                Ok(placements) => placements,
                Err(e) => {
                    warn!(table = table_number, error = %e, "game failed, recording zero outcome");
                    player_ids.iter().map(|id| Placement::new(id.clone(), 0)).collect()
                }
            };
            outcomes.push(GameOutcome {
                game_index,
                placements,
            });
        }

        MatchResult {
            table_number,
            player_ids,
            outcomes,
        }
    }

    fn play_one(
        &self,
        seats: &GameAssignment,
        kingdom: &[CardType],
        max_turns: u32,
    ) -> anyhow::Result<Vec<Placement>> {
        let mut players = Vec::with_capacity(seats.len());
        let mut name_to_id = HashMap::new();
        for config in seats.iter() {
            let player = self.players.create(config)?;
            // The engine reports results by display name.
            name_to_id.insert(player.name().to_string(), config.id.clone());
            players.push(player);
        }

        let mut engine = self.engines.create(players, kingdom, max_turns)?;
        let result: GameResult = catch_unwind(AssertUnwindSafe(|| engine.play()))
            .map_err(|_| anyhow::anyhow!("engine panicked during play"))??;

        Ok(result
            .player_results
            .into_iter()
            .map(|pr| {
                let id = name_to_id
                    .get(&pr.name)
                    .cloned()
                    .unwrap_or_else(|| pr.name.to_lowercase());
                Placement {
                    player_id: id,
                    score: pr.score,
                    deck: pr.deck,
                }
            })
            .collect())
    }
}
