use serde::{Deserialize, Serialize};

/// Broad card groups the buy/gain heuristics reason about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Money,
    Victory,
    Action,
}

/// Every card type in the game, money and victory piles included.
///
/// Serialized names (SCREAMING_SNAKE_CASE) are the on-disk and on-wire
/// identifiers used in round files, tapes and remote-player payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    // money
    Bitcoin,
    Ethereum,
    Dogecoin,
    // victory
    Method,
    Module,
    Framework,
    // action
    Refactor,
    CodeReview,
    EvergreenTest,
    SprintPlanning,
    Ipo,
    Parallelization,
    Hack,
    Ransomware,
    Monitoring,
    Backlog,
    TechDebt,
    DailyScrum,
    DeploymentPipeline,
    UnitTest,
    MergeConflict,
}

impl CardType {
    /// The 15 action card types a round's kingdom is drawn from.
    pub const ACTION_CARDS: [CardType; 15] = [
        CardType::Refactor,
        CardType::CodeReview,
        CardType::EvergreenTest,
        CardType::SprintPlanning,
        CardType::Ipo,
        CardType::Parallelization,
        CardType::Hack,
        CardType::Ransomware,
        CardType::Monitoring,
        CardType::Backlog,
        CardType::TechDebt,
        CardType::DailyScrum,
        CardType::DeploymentPipeline,
        CardType::UnitTest,
        CardType::MergeConflict,
    ];

    pub fn category(&self) -> Category {
        match self {
            CardType::Bitcoin | CardType::Ethereum | CardType::Dogecoin => Category::Money,
            CardType::Method | CardType::Module | CardType::Framework => Category::Victory,
            _ => Category::Action,
        }
    }

    /// Cost in money to buy the card.
    pub fn cost(&self) -> u32 {
        match self {
            CardType::Bitcoin => 0,
            CardType::Ethereum => 3,
            CardType::Dogecoin => 6,
            CardType::Method => 2,
            CardType::Module => 5,
            CardType::Framework => 8,
            CardType::Refactor | CardType::UnitTest | CardType::DailyScrum => 3,
            CardType::CodeReview | CardType::Backlog | CardType::Monitoring => 4,
            CardType::EvergreenTest | CardType::SprintPlanning | CardType::TechDebt => 4,
            CardType::Hack | CardType::Ransomware | CardType::MergeConflict => 5,
            CardType::Parallelization | CardType::DeploymentPipeline => 5,
            CardType::Ipo => 6,
        }
    }

    /// The serialized identifier, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Bitcoin => "BITCOIN",
            CardType::Ethereum => "ETHEREUM",
            CardType::Dogecoin => "DOGECOIN",
            CardType::Method => "METHOD",
            CardType::Module => "MODULE",
            CardType::Framework => "FRAMEWORK",
            CardType::Refactor => "REFACTOR",
            CardType::CodeReview => "CODE_REVIEW",
            CardType::EvergreenTest => "EVERGREEN_TEST",
            CardType::SprintPlanning => "SPRINT_PLANNING",
            CardType::Ipo => "IPO",
            CardType::Parallelization => "PARALLELIZATION",
            CardType::Hack => "HACK",
            CardType::Ransomware => "RANSOMWARE",
            CardType::Monitoring => "MONITORING",
            CardType::Backlog => "BACKLOG",
            CardType::TechDebt => "TECH_DEBT",
            CardType::DailyScrum => "DAILY_SCRUM",
            CardType::DeploymentPipeline => "DEPLOYMENT_PIPELINE",
            CardType::UnitTest => "UNIT_TEST",
            CardType::MergeConflict => "MERGE_CONFLICT",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_cards_are_all_actions() {
        for card in CardType::ACTION_CARDS {
            assert_eq!(card.category(), Category::Action, "{card} should be an action");
        }
    }

    #[test]
    fn serde_name_matches_as_str() {
        for card in [CardType::CodeReview, CardType::Ipo, CardType::Bitcoin] {
            let json = serde_json::to_string(&card).unwrap();
            assert_eq!(json, format!("\"{}\"", card.as_str()));
        }
    }
}
