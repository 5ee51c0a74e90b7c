//! Tournament status registry and fan-out to subscribers.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

/// Lifecycle of a tournament. `Failed` is terminal and reachable from any
/// non-terminal state; the others only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentState {
    Queued,
    Running,
    Completed,
    Failed,
}

/// Full status snapshot published on every progress delta.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentStatus {
    pub id: String,
    pub state: TournamentState,
    pub current_round: usize,
    pub total_rounds: usize,
    pub completed_games: usize,
    pub total_games: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TournamentStatus {
    pub fn queued(id: impl Into<String>, total_rounds: usize, total_games: usize) -> Self {
        TournamentStatus {
            id: id.into(),
            state: TournamentState::Queued,
            current_round: 0,
            total_rounds,
            completed_games: 0,
            total_games,
            ratings: None,
            error: None,
        }
    }

    pub fn running(
        id: impl Into<String>,
        current_round: usize,
        total_rounds: usize,
        completed_games: usize,
        total_games: usize,
        ratings: BTreeMap<String, f64>,
    ) -> Self {
        TournamentStatus {
            id: id.into(),
            state: TournamentState::Running,
            current_round,
            total_rounds,
            completed_games,
            total_games,
            ratings: Some(ratings),
            error: None,
        }
    }

    pub fn completed(
        id: impl Into<String>,
        total_rounds: usize,
        total_games: usize,
        ratings: BTreeMap<String, f64>,
    ) -> Self {
        TournamentStatus {
            id: id.into(),
            state: TournamentState::Completed,
            current_round: total_rounds,
            total_rounds,
            completed_games: total_games,
            total_games,
            ratings: Some(ratings),
            error: None,
        }
    }

    /// Terminal failure, carrying over whatever progress was last known.
    pub fn failed(previous: &TournamentStatus, error: impl Into<String>) -> Self {
        TournamentStatus {
            state: TournamentState::Failed,
            error: Some(error.into()),
            ..previous.clone()
        }
    }
}

#[derive(Default)]
struct Registry {
    statuses: HashMap<String, TournamentStatus>,
    subscribers: HashMap<String, Vec<Sender<TournamentStatus>>>,
}

/// In-memory registry of tournament states with push delivery.
///
/// Latest status wins; subscriber churn never affects tournament execution.
#[derive(Default)]
pub struct Broadcaster {
    registry: Mutex<Registry>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Broadcaster::default()
    }

    /// Replace the registry entry and deliver to all current subscribers.
    /// Delivery failures drop the subscriber, nothing more.
    pub fn publish(&self, status: TournamentStatus) {
        let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(subscribers) = registry.subscribers.get_mut(&status.id) {
            subscribers.retain(|tx| {
                let delivered = tx.send(status.clone()).is_ok();
                if !delivered {
                    debug!(tournament = %status.id, "dropping disconnected status subscriber");
                }
                delivered
            });
        }
        registry.statuses.insert(status.id.clone(), status);
    }

    /// Subscribe to one tournament's status stream. The current status, if
    /// any, is delivered immediately so late subscribers are never empty.
    pub fn subscribe(&self, tournament_id: &str) -> Receiver<TournamentStatus> {
        let (tx, rx) = mpsc::channel();
        let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = registry.statuses.get(tournament_id) {
            let _ = tx.send(current.clone());
        }
        registry
            .subscribers
            .entry(tournament_id.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Latest known status for one tournament.
    pub fn status(&self, tournament_id: &str) -> Option<TournamentStatus> {
        let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        registry.statuses.get(tournament_id).cloned()
    }

    /// Snapshot of every tracked tournament.
    pub fn all(&self) -> HashMap<String, TournamentStatus> {
        let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        registry.statuses.clone()
    }
}
