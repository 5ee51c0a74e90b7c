//! The tournament scheduler: plans every round upfront, pushes all games
//! through a bounded worker pool, and consumes completions in whatever order
//! they finish.
//!
//! One control thread per tournament owns the tracker, the round buffers and
//! all status emission, so rating snapshots always reflect a consistent
//! prefix of the completion stream.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::Context;
use engine_interface::{CardType, EngineFactory};
use skillratings::trueskill::TrueSkillConfig;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{RunnerConfig, TournamentConfig};
use crate::player::PlayerProvider;
use crate::pool::WorkerPool;
use crate::rating::Tracker;
use crate::results::{MatchResult, RoundResult};
use crate::rounds::{adjust_games_per_player, generate_balanced_games, select_kingdom, GameAssignment};
use crate::status::{Broadcaster, TournamentStatus};
use crate::store::ResultStore;
use crate::table::TableExecutor;

struct PlannedRound {
    number: usize,
    kingdom: Vec<CardType>,
    games: Vec<GameAssignment>,
}

/// A finished game, tagged with the round it belongs to. Completions arrive
/// first-finished-first-served, not in submission order.
struct Completion {
    round: usize,
    result: MatchResult,
}

/// `(games_per_player, games_per_round, total_games)` after the balanced
/// schedule adjustment.
fn planned_totals(config: &TournamentConfig) -> (usize, usize, usize) {
    let games_per_player = adjust_games_per_player(config.players.len(), config.games_per_player);
    let games_per_round = config.players.len() * games_per_player / 4;
    (games_per_player, games_per_round, config.rounds * games_per_round)
}

/// Executes one tournament to completion on the calling thread.
pub struct Runner {
    config: RunnerConfig,
    engines: Arc<dyn EngineFactory>,
    players: Arc<dyn PlayerProvider>,
    broadcaster: Arc<Broadcaster>,
}

impl Runner {
    pub fn new(
        config: RunnerConfig,
        engines: Arc<dyn EngineFactory>,
        players: Arc<dyn PlayerProvider>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Runner {
            config,
            engines,
            players,
            broadcaster,
        }
    }

    /// Run the whole tournament: plan, dispatch, drain, persist, tape.
    ///
    /// Game-level faults never surface here; an error return means the
    /// tournament itself failed (planning or artifact I/O) and the caller
    /// should publish the terminal FAILED status.
    #[instrument(skip_all, fields(tournament = %tournament_id, name = %config.name))]
    pub fn run(&self, tournament_id: &str, config: &TournamentConfig) -> anyhow::Result<()> {
        config.validate()?;
        let (games_per_player, games_per_round, total_games) = planned_totals(config);
        if games_per_player != config.games_per_player {
            info!(
                requested = config.games_per_player,
                adjusted = games_per_player,
                "adjusted games per player for a balanced 4-seat schedule"
            );
        }

        let store = ResultStore::new(self.config.data_dir.join(&config.name));
        store.write_metadata(config)?;

        let mut tracker = Tracker::new(
            config.players.iter().map(|p| p.id.clone()),
            TrueSkillConfig::new(),
        );

        // Plan everything before the first dispatch. Rounds whose file is
        // already on disk are resumed: counters advance, no work scheduled.
        let mut planned = Vec::new();
        let mut completed_games = 0usize;
        let mut current_round = 0usize;
        for number in 1..=config.rounds {
            if store.round_exists(number) {
                info!(round = number, "round file present, resuming past it");
                completed_games += games_per_round;
                current_round = current_round.max(number);
            } else {
                planned.push(PlannedRound {
                    number,
                    kingdom: select_kingdom(),
                    games: generate_balanced_games(&config.players, games_per_player)?,
                });
            }
        }

        let expected: HashMap<usize, usize> =
            planned.iter().map(|r| (r.number, r.games.len())).collect();
        let kingdoms: HashMap<usize, Vec<CardType>> = planned
            .iter()
            .map(|r| (r.number, r.kingdom.clone()))
            .collect();
        let mut buffers: HashMap<usize, Vec<MatchResult>> = planned
            .iter()
            .map(|r| (r.number, Vec::with_capacity(r.games.len())))
            .collect();

        self.broadcaster.publish(TournamentStatus::running(
            tournament_id,
            current_round,
            config.rounds,
            completed_games,
            total_games,
            tracker.display_ratings(),
        ));

        let pool = WorkerPool::new(self.config.pool_size);
        let executor = Arc::new(TableExecutor::new(
            Arc::clone(&self.engines),
            Arc::clone(&self.players),
        ));
        let (completions_tx, completions) = mpsc::channel::<Completion>();

        // Single submission burst. The first pool_size submissions are
        // staggered so downstream completions arrive smoothly.
        let mut submitted = 0usize;
        for round in &planned {
            for (index, seats) in round.games.iter().enumerate() {
                let executor = Arc::clone(&executor);
                let tx = completions_tx.clone();
                let seats = seats.clone();
                let kingdom = round.kingdom.clone();
                let number = round.number;
                let table_number = index + 1;
                let max_turns = config.max_turns;
                pool.execute(move || {
                    let result = executor.execute_table(table_number, &seats, &kingdom, 1, max_turns);
                    // Fails only on fatal teardown, when nobody is draining.
                    let _ = tx.send(Completion { round: number, result });
                })?;
                submitted += 1;
                if submitted < self.config.pool_size {
                    thread::sleep(self.config.submit_stagger);
                }
            }
        }
        drop(completions_tx);

        // Drain exactly one completion per submitted game. A closed channel
        // before that means workers died without reporting: fatal.
        for _ in 0..submitted {
            let completion = completions
                .recv()
                .context("worker pool stopped before all games completed")?;
            let number = completion.round;

            for outcome in &completion.result.outcomes {
                tracker.process_game(&outcome.placements);
            }
            let round_full = {
                let buffer = buffers
                    .get_mut(&number)
                    .context("completion tagged with an unplanned round")?;
                buffer.push(completion.result);
                buffer.len() == expected[&number]
            };
            completed_games += 1;
            current_round = current_round.max(number);

            self.broadcaster.publish(TournamentStatus::running(
                tournament_id,
                current_round,
                config.rounds,
                completed_games,
                total_games,
                tracker.display_ratings(),
            ));

            if round_full {
                if let Some(mut matches) = buffers.remove(&number) {
                    matches.sort_by_key(|m| m.table_number);
                    store.write_round(&RoundResult::new(number, &kingdoms[&number], matches))?;
                    info!(round = number, "round complete");
                }
            }
        }

        pool.shutdown();

        // The tape aggregates round files, resumed rounds included; its
        // failure is reported but does not fail a finished tournament.
        if let Err(e) = store.build_tape(TrueSkillConfig::new()) {
            warn!(error = %e, "failed to build playback tape");
        }

        self.broadcaster.publish(TournamentStatus::completed(
            tournament_id,
            config.rounds,
            total_games,
            tracker.display_ratings(),
        ));
        info!(games = total_games, "tournament complete");
        Ok(())
    }
}

/// Front door for running tournaments asynchronously: admission checks,
/// id assignment, one control thread per tournament, shared status registry.
pub struct TournamentService {
    runner: Arc<Runner>,
    broadcaster: Arc<Broadcaster>,
    handles: Mutex<HashMap<String, thread::JoinHandle<()>>>,
}

impl TournamentService {
    pub fn new(
        config: RunnerConfig,
        engines: Arc<dyn EngineFactory>,
        players: Arc<dyn PlayerProvider>,
    ) -> Self {
        let broadcaster = Arc::new(Broadcaster::new());
        TournamentService {
            runner: Arc::new(Runner::new(
                config,
                engines,
                players,
                Arc::clone(&broadcaster),
            )),
            broadcaster,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Validate and start a tournament. Rejection happens here,
    /// synchronously; an accepted tournament is QUEUED and runs on its own
    /// control thread. Returns the tournament id.
    pub fn submit(&self, config: TournamentConfig) -> anyhow::Result<String> {
        config.validate()?;
        let (_, _, total_games) = planned_totals(&config);

        let id = Uuid::new_v4().to_string();
        self.broadcaster
            .publish(TournamentStatus::queued(&id, config.rounds, total_games));

        let runner = Arc::clone(&self.runner);
        let broadcaster = Arc::clone(&self.broadcaster);
        let thread_id = id.clone();
        let handle = thread::Builder::new()
            .name(format!("tournament-{}", config.name))
            .spawn(move || {
                if let Err(e) = runner.run(&thread_id, &config) {
                    error!(tournament = %thread_id, error = %e, "tournament failed");
                    let last = broadcaster
                        .status(&thread_id)
                        .unwrap_or_else(|| TournamentStatus::queued(&thread_id, 0, 0));
                    broadcaster.publish(TournamentStatus::failed(&last, e.to_string()));
                }
            })
            .context("spawning tournament control thread")?;
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), handle);
        Ok(id)
    }

    pub fn status(&self, tournament_id: &str) -> Option<TournamentStatus> {
        self.broadcaster.status(tournament_id)
    }

    pub fn all(&self) -> HashMap<String, TournamentStatus> {
        self.broadcaster.all()
    }

    /// Block until the tournament's control thread has finished.
    pub fn wait(&self, tournament_id: &str) {
        let handle = self
            .handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(tournament_id);
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}
