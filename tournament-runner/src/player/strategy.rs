//! Built-in practice strategies. Deliberately simple: they exist as sparring
//! partners and baselines, not as competitive bots.

use anyhow::bail;
use engine_interface::{CardType, Category, Decision, Event, GameState, Phase, Player};
use rand::seq::SliceRandom;

/// Picks uniformly at random among the offered options.
pub struct RandomStrategy {
    name: String,
}

impl RandomStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        RandomStrategy { name: name.into() }
    }
}

impl Player for RandomStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(
        &mut self,
        _state: &GameState,
        options: &[Decision],
        _reason: Option<&Event>,
    ) -> anyhow::Result<Decision> {
        match options.choose(&mut rand::thread_rng()) {
            Some(decision) => Ok(decision.clone()),
            None => bail!("no decisions available"),
        }
    }
}

/// Buys the most expensive money card it can afford, then Framework.
/// Plays only the small money-producing actions.
pub struct NaiveBigMoneyStrategy {
    name: String,
}

impl NaiveBigMoneyStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        NaiveBigMoneyStrategy { name: name.into() }
    }
}

impl Player for NaiveBigMoneyStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(
        &mut self,
        state: &GameState,
        options: &[Decision],
        _reason: Option<&Event>,
    ) -> anyhow::Result<Decision> {
        let decision = match state.phase {
            Phase::Action => options
                .iter()
                .find(|option| {
                    matches!(option, Decision::PlayCard { card }
                        if matches!(card, CardType::UnitTest | CardType::CodeReview | CardType::DailyScrum))
                })
                .cloned()
                .or_else(|| end_phase(options)),
            Phase::Money => play_any(options, Category::Money).or_else(|| end_phase(options)),
            Phase::Buy => best_buy(options, Category::Money)
                .or_else(|| framework_buy(options))
                .or_else(|| end_phase(options)),
            Phase::Gain => gain_highest_cost(options),
            _ => end_phase(options),
        };
        fallback(decision, options)
    }
}

/// Prefers buying and playing action cards over everything else.
pub struct ActionHeavyStrategy {
    name: String,
}

impl ActionHeavyStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        ActionHeavyStrategy { name: name.into() }
    }
}

impl Player for ActionHeavyStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(
        &mut self,
        state: &GameState,
        options: &[Decision],
        _reason: Option<&Event>,
    ) -> anyhow::Result<Decision> {
        let decision = match state.phase {
            Phase::Action => play_any(options, Category::Action).or_else(|| end_phase(options)),
            Phase::Money => play_any(options, Category::Money).or_else(|| end_phase(options)),
            Phase::Buy => best_buy(options, Category::Action)
                .or_else(|| best_buy(options, Category::Money))
                .or_else(|| framework_buy(options))
                .or_else(|| end_phase(options)),
            Phase::Gain => gain_preferring_action(options),
            _ => end_phase(options),
        };
        fallback(decision, options)
    }
}

fn fallback(decision: Option<Decision>, options: &[Decision]) -> anyhow::Result<Decision> {
    match decision.or_else(|| options.first().cloned()) {
        Some(decision) => Ok(decision),
        None => bail!("no decisions available"),
    }
}

fn end_phase(options: &[Decision]) -> Option<Decision> {
    options.iter().find(|o| matches!(o, Decision::EndPhase)).cloned()
}

/// First playable card of the given category.
fn play_any(options: &[Decision], category: Category) -> Option<Decision> {
    options
        .iter()
        .find(|option| matches!(option, Decision::PlayCard { card } if card.category() == category))
        .cloned()
}

/// Most expensive buyable card of the given category.
fn best_buy(options: &[Decision], category: Category) -> Option<Decision> {
    options
        .iter()
        .filter_map(|option| match option {
            Decision::BuyCard { card } if card.category() == category => {
                Some((card.cost(), option))
            }
            _ => None,
        })
        .max_by_key(|(cost, _)| *cost)
        .map(|(_, option)| option.clone())
}

fn framework_buy(options: &[Decision]) -> Option<Decision> {
    options
        .iter()
        .find(|option| matches!(option, Decision::BuyCard { card: CardType::Framework }))
        .cloned()
}

/// Highest-cost gain on offer, whatever the category.
fn gain_highest_cost(options: &[Decision]) -> Option<Decision> {
    options
        .iter()
        .filter_map(|option| match option {
            Decision::GainCard { card } => Some((card.cost(), option)),
            _ => None,
        })
        .max_by_key(|(cost, _)| *cost)
        .map(|(_, option)| option.clone())
}

/// Highest-cost action-category gain; only when no action is on offer, the
/// highest-cost gain of any other category.
fn gain_preferring_action(options: &[Decision]) -> Option<Decision> {
    let mut best_action: Option<(u32, &Decision)> = None;
    let mut best_other: Option<(u32, &Decision)> = None;
    for option in options {
        if let Decision::GainCard { card } = option {
            let slot = if card.category() == Category::Action {
                &mut best_action
            } else {
                &mut best_other
            };
            if slot.map_or(true, |(cost, _)| card.cost() > cost) {
                *slot = Some((card.cost(), option));
            }
        }
    }
    best_action.or(best_other).map(|(_, option)| option.clone())
}
