use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Land,
    Creature,
    Planeswalker,
    Battle,
    Instant,
    Sorcery,
    Artifact,
    Enchantment,
}

impl CardType {
    /// Precedence order used to pick a card's primary type.
    pub const ORDERED: [CardType; 8] = [
        CardType::Land,
        CardType::Creature,
        CardType::Planeswalker,
        CardType::Battle,
        CardType::Instant,
        CardType::Sorcery,
        CardType::Artifact,
        CardType::Enchantment,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CardType::Land => "land",
            CardType::Creature => "creature",
            CardType::Planeswalker => "planeswalker",
            CardType::Battle => "battle",
            CardType::Instant => "instant",
            CardType::Sorcery => "sorcery",
            CardType::Artifact => "artifact",
            CardType::Enchantment => "enchantment",
        }
    }

    /// All types present in a type line, in precedence order.
    pub fn parse_type_line(type_line: &str) -> Vec<CardType> {
        let lowered = type_line.to_ascii_lowercase();
        let supertypes = lowered.split('—').next().unwrap_or("");
        CardType::ORDERED
            .iter()
            .copied()
            .filter(|ty| supertypes.split_whitespace().any(|word| word == ty.as_str()))
            .collect()
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown card type '{0}'")]
pub struct ParseCardTypeError(pub String);

impl FromStr for CardType {
    type Err = ParseCardTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        CardType::ORDERED
            .iter()
            .copied()
            .find(|ty| ty.as_str() == lowered)
            .ok_or_else(|| ParseCardTypeError(value.to_string()))
    }
}
