//! Online multiplayer skill ratings.
//!
//! Each player is modeled as a one-person team in a free-for-all TrueSkill
//! update. The user-visible number is the conservative estimate `mu - 3*sigma`
//! rounded to one decimal.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use skillratings::trueskill::{trueskill_multi_team, TrueSkillConfig, TrueSkillRating};
use skillratings::MultiTeamOutcome;
use tracing::warn;

use crate::results::Placement;

/// A player's current skill estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    /// Conservative display value, rounded to one decimal.
    pub fn display(&self) -> f64 {
        round1(self.mu - 3.0 * self.sigma)
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Tracks ratings and ordinal points across the games of one tournament.
///
/// Single-writer: the tournament control thread is the only caller of
/// [`Tracker::process_game`], so successive snapshots always reflect a
/// consistent prefix of applied games.
pub struct Tracker {
    ratings: BTreeMap<String, TrueSkillRating>,
    points: BTreeMap<String, u64>,
    config: TrueSkillConfig,
    convergence_failures: u32,
}

impl Tracker {
    pub fn new<I, S>(player_ids: I, config: TrueSkillConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ratings = BTreeMap::new();
        let mut points = BTreeMap::new();
        for id in player_ids {
            let id = id.into();
            ratings.insert(id.clone(), TrueSkillRating::new());
            points.insert(id, 0);
        }
        Tracker {
            ratings,
            points,
            config,
            convergence_failures: 0,
        }
    }

    /// Apply one game's placements: update ratings, then award ordinal
    /// points (`N + 1 - rank`).
    ///
    /// If the numerical update degenerates the prior ratings are kept for
    /// every participant; points are still awarded and the failure counted.
    pub fn process_game(&mut self, placements: &[Placement]) {
        if placements.is_empty() {
            return;
        }
        let ranks = compute_ranks(placements);

        // A fully tied game (the shape every failed game has) carries no
        // ordering signal; the model cannot converge on it. Prior ratings
        // stay, points are still awarded below.
        let fully_tied =
            placements.len() > 1 && placements.iter().all(|p| p.score == placements[0].score);
        if fully_tied {
            self.record_failure();
        } else {
            let current: Vec<[TrueSkillRating; 1]> = placements
                .iter()
                .map(|p| [self.ratings.get(&p.player_id).copied().unwrap_or(TrueSkillRating::new())])
                .collect();
            let teams_and_ranks: Vec<(&[TrueSkillRating], MultiTeamOutcome)> = current
                .iter()
                .zip(&ranks)
                .map(|(team, &rank)| (team.as_slice(), MultiTeamOutcome::new(rank)))
                .collect();

            let updated = trueskill_multi_team(&teams_and_ranks, &self.config);
            if updated.len() == placements.len() && updated.iter().all(|t| is_sane(&t[0])) {
                for (placement, team) in placements.iter().zip(&updated) {
                    self.ratings.insert(placement.player_id.clone(), team[0]);
                }
            } else {
                self.record_failure();
            }
        }

        let n = placements.len() as u64;
        for (placement, &rank) in placements.iter().zip(&ranks) {
            let earned = n + 1 - rank as u64;
            *self.points.entry(placement.player_id.clone()).or_insert(0) += earned;
        }
    }

    fn record_failure(&mut self) {
        self.convergence_failures += 1;
        if self.convergence_failures <= 5 {
            warn!("rating update did not converge, keeping prior ratings");
        } else if self.convergence_failures == 6 {
            warn!("suppressing further rating convergence warnings");
        }
    }

    /// Snapshot of all current ratings.
    pub fn ratings(&self) -> BTreeMap<String, Rating> {
        self.ratings
            .iter()
            .map(|(id, r)| {
                (
                    id.clone(),
                    Rating {
                        mu: r.rating,
                        sigma: r.uncertainty,
                    },
                )
            })
            .collect()
    }

    /// Snapshot of display ratings keyed by player id.
    pub fn display_ratings(&self) -> BTreeMap<String, f64> {
        self.ratings().into_iter().map(|(id, r)| (id, r.display())).collect()
    }

    /// Cumulative ordinal points per player.
    pub fn points(&self) -> &BTreeMap<String, u64> {
        &self.points
    }

    pub fn display(&self, player_id: &str) -> Option<f64> {
        self.ratings.get(player_id).map(|r| {
            Rating {
                mu: r.rating,
                sigma: r.uncertainty,
            }
            .display()
        })
    }

    /// Number of games whose rating update was discarded as degenerate.
    pub fn convergence_failures(&self) -> u32 {
        self.convergence_failures
    }

    #[cfg(test)]
    fn force_rating(&mut self, player_id: &str, rating: TrueSkillRating) {
        self.ratings.insert(player_id.to_string(), rating);
    }
}

fn is_sane(rating: &TrueSkillRating) -> bool {
    rating.rating.is_finite() && rating.uncertainty.is_finite() && rating.uncertainty > 0.0
}

/// Strictly ordered 1-based ranks, aligned with `placements`.
///
/// Ties are broken by a pseudorandom permutation seeded from the game's
/// `(playerId, score)` pairs, so the same game always ranks the same way and
/// the rating model never sees a true tie.
pub fn compute_ranks(placements: &[Placement]) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(game_seed(placements));

    let mut by_score: Vec<usize> = (0..placements.len()).collect();
    by_score.sort_by(|&a, &b| placements[b].score.cmp(&placements[a].score));

    // Shuffle within each group of equal scores, keeping groups in order.
    let mut ordered = Vec::with_capacity(placements.len());
    let mut i = 0;
    while i < by_score.len() {
        let score = placements[by_score[i]].score;
        let mut tied = Vec::new();
        while i < by_score.len() && placements[by_score[i]].score == score {
            tied.push(by_score[i]);
            i += 1;
        }
        tied.shuffle(&mut rng);
        ordered.extend(tied);
    }

    let mut ranks = vec![0; placements.len()];
    for (rank, &idx) in ordered.iter().enumerate() {
        ranks[idx] = rank + 1;
    }
    ranks
}

fn game_seed(placements: &[Placement]) -> u64 {
    let mut seed: u64 = 0;
    for p in placements {
        let mut id_hash: u64 = 0;
        for byte in p.player_id.bytes() {
            id_hash = id_hash.wrapping_mul(31).wrapping_add(u64::from(byte));
        }
        seed = seed.wrapping_mul(31).wrapping_add(id_hash);
        seed = seed.wrapping_mul(31).wrapping_add(u64::from(p.score));
    }
    seed
}
