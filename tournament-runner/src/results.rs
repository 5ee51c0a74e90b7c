//! Result records shared between the executor, the runner, the result store
//! and the rating tracker. These types define the round-file JSON shape.

use std::collections::BTreeSet;

use engine_interface::CardType;
use serde::{Deserialize, Serialize};

/// A single player's result in one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub player_id: String,
    pub score: u32,
    /// Final deck contents. Empty (and omitted on disk) for failed games.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deck: Vec<CardType>,
}

impl Placement {
    pub fn new(player_id: impl Into<String>, score: u32) -> Self {
        Placement {
            player_id: player_id.into(),
            score,
            deck: Vec::new(),
        }
    }
}

/// Outcome of a single game at a table. Failed games are still represented,
/// with every score zero and every deck empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub game_index: usize,
    pub placements: Vec<Placement>,
}

/// Result of all games played at one table in a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub table_number: usize,
    pub player_ids: Vec<String>,
    pub outcomes: Vec<GameOutcome>,
}

/// A full round: the kingdom in play and one match per table.
///
/// The kingdom is stored as a sorted set so round files (and everything
/// replayed from them) serialize deterministically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub round_number: usize,
    pub kingdom_cards: BTreeSet<String>,
    pub matches: Vec<MatchResult>,
}

impl RoundResult {
    pub fn new(round_number: usize, kingdom: &[CardType], matches: Vec<MatchResult>) -> Self {
        RoundResult {
            round_number,
            kingdom_cards: kingdom.iter().map(|c| c.as_str().to_string()).collect(),
            matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_placement_omits_deck() {
        let json = serde_json::to_string(&Placement::new("p1", 0)).unwrap();
        assert_eq!(json, r#"{"playerId":"p1","score":0}"#);
    }

    #[test]
    fn round_result_roundtrips() {
        let round = RoundResult::new(
            3,
            &[CardType::Hack, CardType::Backlog],
            vec![MatchResult {
                table_number: 1,
                player_ids: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                outcomes: vec![GameOutcome {
                    game_index: 0,
                    placements: vec![Placement::new("a", 12), Placement::new("b", 7)],
                }],
            }],
        );
        let json = serde_json::to_string(&round).unwrap();
        let back: RoundResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, round);
        // sorted set ordering
        assert!(json.find("BACKLOG").unwrap() < json.find("HACK").unwrap());
    }
}
