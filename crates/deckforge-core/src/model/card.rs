use crate::model::card_type::CardType;
use crate::model::color::Color;
use crate::model::rarity::Rarity;
use core::fmt;
use serde::{Deserialize, Serialize};

const ANY_NUMBER_CLAUSE: &str = "a deck can have any number of cards named";

/// Listed market prices for the printings of a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPrices {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_foil: Option<f64>,
    #[serde(default)]
    pub usd_etched: Option<f64>,
    /// Prices of alternate printings of the same card.
    #[serde(default)]
    pub alternates: Vec<f64>,
}

impl CardPrices {
    pub fn usd(price: f64) -> Self {
        Self {
            usd: Some(price),
            ..Self::default()
        }
    }

    /// Every listed price, primary printing first.
    pub fn listed(&self) -> impl Iterator<Item = f64> + '_ {
        [self.usd, self.usd_foil, self.usd_etched]
            .into_iter()
            .flatten()
            .chain(self.alternates.iter().copied())
            .filter(|price| price.is_finite() && *price >= 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub type_line: String,
    #[serde(default)]
    pub oracle_text: String,
    #[serde(default)]
    pub mana_value: f32,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub color_identity: Vec<Color>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub power: Option<i32>,
    #[serde(default)]
    pub toughness: Option<i32>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub prices: CardPrices,
}

impl Card {
    pub fn new(name: impl Into<String>, type_line: impl Into<String>, mana_value: f32) -> Self {
        Self {
            name: name.into(),
            type_line: type_line.into(),
            oracle_text: String::new(),
            mana_value,
            colors: Vec::new(),
            color_identity: Vec::new(),
            rarity: Rarity::Common,
            power: None,
            toughness: None,
            keywords: Vec::new(),
            prices: CardPrices::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = text.into();
        self
    }

    pub fn with_price(mut self, usd: f64) -> Self {
        self.prices = CardPrices::usd(usd);
        self
    }

    pub fn with_identity(mut self, identity: &[Color]) -> Self {
        self.color_identity = identity.to_vec();
        self.colors = identity.to_vec();
        self
    }

    pub fn with_stats(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn types(&self) -> Vec<CardType> {
        CardType::parse_type_line(&self.type_line)
    }

    /// First type in precedence order; typeless cards count as artifacts.
    pub fn primary_type(&self) -> CardType {
        self.types()
            .first()
            .copied()
            .unwrap_or(CardType::Artifact)
    }

    pub fn is_land(&self) -> bool {
        self.types().contains(&CardType::Land)
    }

    pub fn is_creature(&self) -> bool {
        self.types().contains(&CardType::Creature)
    }

    /// Basic lands and "any number" cards may appear more than once.
    pub fn is_fungible(&self) -> bool {
        let type_line = self.type_line.to_ascii_lowercase();
        (type_line.contains("basic") && type_line.contains("land"))
            || self.oracle_text.to_ascii_lowercase().contains(ANY_NUMBER_CLAUSE)
    }

    pub fn is_multicolor(&self) -> bool {
        self.color_identity.len() >= 2
    }

    pub fn text_lower(&self) -> String {
        self.oracle_text.to_ascii_lowercase()
    }

    /// Creature subtypes (lowercased), e.g. `["elf", "druid"]`.
    pub fn creature_types(&self) -> Vec<String> {
        if !self.is_creature() {
            return Vec::new();
        }
        match self.type_line.split_once('—') {
            Some((_, subtypes)) => subtypes
                .split_whitespace()
                .map(|word| word.to_ascii_lowercase())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn stat_total(&self) -> Option<i32> {
        Some(self.power? + self.toughness?)
    }

    /// Length of rules text, used as a complexity tie-break.
    pub fn text_complexity(&self) -> usize {
        self.oracle_text.chars().count()
    }

    pub fn identity_within(&self, identity: &[Color]) -> bool {
        self.color_identity.iter().all(|color| identity.contains(color))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardPrices};
    use crate::model::card_type::CardType;
    use crate::model::color::Color;

    #[test]
    fn basic_land_is_fungible() {
        let forest = Card::new("Forest", "Basic Land — Forest", 0.0);
        assert!(forest.is_fungible());
        assert!(forest.is_land());
        assert_eq!(forest.primary_type(), CardType::Land);
    }

    #[test]
    fn any_number_clause_is_fungible() {
        let rats = Card::new("Relentless Rats", "Creature — Rat", 3.0)
            .with_text("A deck can have any number of cards named Relentless Rats.");
        assert!(rats.is_fungible());
    }

    #[test]
    fn creature_types_come_from_subtypes() {
        let elf = Card::new("Llanowar Elves", "Creature — Elf Druid", 1.0);
        assert_eq!(elf.creature_types(), vec!["elf", "druid"]);
        let rock = Card::new("Mind Stone", "Artifact", 2.0);
        assert!(rock.creature_types().is_empty());
    }

    #[test]
    fn stat_total_requires_both_stats() {
        let bear = Card::new("Bear", "Creature — Bear", 2.0).with_stats(2, 2);
        assert_eq!(bear.stat_total(), Some(4));
        assert_eq!(Card::new("Ox", "Creature — Ox", 2.0).stat_total(), None);
    }

    #[test]
    fn listed_prices_skip_invalid_values() {
        let prices = CardPrices {
            usd: Some(2.0),
            usd_foil: Some(f64::NAN),
            usd_etched: Some(-1.0),
            alternates: vec![0.5],
        };
        assert_eq!(prices.listed().collect::<Vec<_>>(), vec![2.0, 0.5]);
    }

    #[test]
    fn identity_subset_check() {
        let card = Card::new("Golgari Signet", "Artifact", 2.0)
            .with_identity(&[Color::Black, Color::Green]);
        assert!(card.identity_within(&[Color::Black, Color::Green, Color::White]));
        assert!(!card.identity_within(&[Color::Green]));
    }
}
