use serde::{Deserialize, Serialize};

use crate::cards::CardType;

/// Turn phase, in the order phases occur within a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Action,
    Money,
    Buy,
    Gain,
    Cleanup,
}

/// The view of the game a player receives at a decision point.
///
/// The engine owns the full game state; this is the serializable slice it
/// exposes to players (and over the wire to remote players).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub phase: Phase,
    pub turn: u32,
    pub current_player: String,
    pub actions: u32,
    pub buys: u32,
    pub money: u32,
}

/// One selectable option at a decision point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Decision {
    PlayCard { card: CardType },
    BuyCard { card: CardType },
    GainCard { card: CardType },
    DiscardCard { card: CardType },
    TrashCard { card: CardType },
    EndPhase,
}

/// Something that happened in the game, delivered to observers and attached
/// to decision requests as the triggering reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    TurnStarted { player: String, turn: u32 },
    CardPlayed { player: String, card: CardType },
    CardBought { player: String, card: CardType },
    CardGained { player: String, card: CardType },
    GameEnded { turns: u32 },
}
