//! Round planning: kingdom selection and the balanced 4-seat schedule.
//!
//! Fairness rules the schedule upholds:
//! - every game seats exactly 4 distinct players;
//! - every player appears in exactly `games_per_player` games per round;
//! - within a round, repeat opponents are avoided when possible.

use std::collections::HashSet;

use anyhow::bail;
use engine_interface::CardType;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::PlayerConfig;

/// Seats for one game. Order is the seating order handed to the engine.
pub type GameAssignment = [PlayerConfig; 4];

/// A uniformly random 10-subset of the 15 action card types, ordered as
/// sampled.
pub fn select_kingdom() -> Vec<CardType> {
    let mut deck = CardType::ACTION_CARDS.to_vec();
    deck.shuffle(&mut rand::thread_rng());
    deck.truncate(10);
    deck
}

/// Smallest `g >= 1` for which `n * g` is divisible by 4.
pub fn recommended_games_per_player(num_players: usize) -> usize {
    4 / gcd(num_players, 4)
}

/// Largest multiple of `4 / gcd(n, 4)` that is `<= target`, clamped so at
/// least one valid value remains. Guarantees `n * result` divisible by 4.
pub fn adjust_games_per_player(num_players: usize, target: usize) -> usize {
    let step = 4 / gcd(num_players, 4);
    ((target / step) * step).max(step)
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Generate `n * games_per_player / 4` 4-seat assignments in which every
/// player appears exactly `games_per_player` times.
///
/// Greedy, one pass: each game is seeded with the least-scheduled player,
/// then filled preferring players the seated ones have not met this round.
/// Not an optimal block design, just a documented best effort.
pub fn generate_balanced_games(
    players: &[PlayerConfig],
    games_per_player: usize,
) -> anyhow::Result<Vec<GameAssignment>> {
    let n = players.len();
    if n < 4 {
        bail!("need at least 4 players for 4-seat games, got {n}");
    }
    if (n * games_per_player) % 4 != 0 {
        bail!("{n} players x {games_per_player} games is not divisible by 4");
    }

    let total_games = n * games_per_player / 4;
    let mut rng = rand::thread_rng();
    let mut appearances = vec![0usize; n];
    let mut paired_with: Vec<HashSet<usize>> = vec![HashSet::new(); n];

    let mut games = Vec::with_capacity(total_games);
    for _ in 0..total_games {
        let seats = pick_seats(&appearances, &paired_with, games_per_player, &mut rng)?;
        for &p in &seats {
            appearances[p] += 1;
            for &other in &seats {
                if other != p {
                    paired_with[p].insert(other);
                }
            }
        }
        games.push([
            players[seats[0]].clone(),
            players[seats[1]].clone(),
            players[seats[2]].clone(),
            players[seats[3]].clone(),
        ]);
    }

    // Round order should not reveal scheduling order.
    games.shuffle(&mut rng);
    Ok(games)
}

/// Pick 4 seats: fewest appearances first, preferring candidates that have
/// met none of the already seated players this round. Seats are shuffled so
/// seating position is uncorrelated with selection order.
fn pick_seats(
    appearances: &[usize],
    paired_with: &[HashSet<usize>],
    cap: usize,
    rng: &mut impl Rng,
) -> anyhow::Result<Vec<usize>> {
    let mut eligible: Vec<usize> = (0..appearances.len())
        .filter(|&p| appearances[p] < cap)
        .collect();
    if eligible.len() < 4 {
        bail!("not enough eligible players for a game, scheduling invariant broken");
    }
    let tiebreak: Vec<u32> = (0..appearances.len()).map(|_| rng.gen()).collect();
    eligible.sort_by_key(|&p| (appearances[p], tiebreak[p]));

    let mut seats = vec![eligible[0]];
    // First pass: only candidates with zero prior co-appearances.
    for &candidate in &eligible[1..] {
        if seats.len() == 4 {
            break;
        }
        if seats.iter().all(|&s| !paired_with[candidate].contains(&s)) {
            seats.push(candidate);
        }
    }
    // Second pass: fill from remaining eligibles in sorted order.
    for &candidate in &eligible[1..] {
        if seats.len() == 4 {
            break;
        }
        if !seats.contains(&candidate) {
            seats.push(candidate);
        }
    }

    seats.shuffle(rng);
    Ok(seats)
}
