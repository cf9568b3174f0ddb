//! Seeded candidate pools for benchmarks and scenario tests.

use std::fmt;

use crate::model::card::Card;
use crate::model::color::Color;
use crate::model::price::sanitize;
use crate::model::profile::{AnchorProfile, StaticProfile};
use crate::model::rarity::Rarity;
use crate::model::tag::{MechanicTag, TagIndex};
use crate::pipeline::StaticCandidates;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const MIN_PRICE: f64 = 0.1;
const MAX_PRICE: f64 = 60.0;
const FREE_SHARE: f64 = 0.12;
const LAND_SHARE: f64 = 0.38;
const REPRINT_SHARE: f64 = 0.04;
const THEME_TAG_CHANCE: f64 = 0.4;
const GENERIC_TAG_CHANCE: f64 = 0.3;
const ON_TRIBE_CHANCE: f64 = 0.35;

const ADJECTIVES: [&str; 12] = [
    "Ancient", "Blazing", "Crimson", "Drifting", "Emerald", "Feral", "Gilded", "Hollow",
    "Iron", "Jade", "Kindled", "Lunar",
];
const NOUNS: [&str; 12] = [
    "Oath", "Pact", "Relic", "Sigil", "Tide", "Vanguard", "Warden", "Echo", "Bloom", "Rite",
    "Herald", "Spire",
];
const OFF_TRIBES: [&str; 5] = ["human", "wizard", "beast", "soldier", "spirit"];

/// Rules text fragments paired with the roles they read as.
const ROLE_TEXTS: [&str; 12] = [
    "{T}: Add one mana of any color.",
    "Search your library for a basic land card, put it onto the battlefield tapped.",
    "Draw two cards.",
    "When this enters, draw a card.",
    "Destroy target creature or planeswalker.",
    "Counter target spell.",
    "Destroy all creatures. They can't be regenerated.",
    "Target creature you control gains hexproof and indestructible until end of turn.",
    "Search your library for a card, put it into your hand.",
    "Return target creature card from your graveyard to your hand.",
    "Exile target card from a graveyard.",
    "Creatures you control get +1/+1. Each opponent loses 1 life.",
];

const GENERIC_TAGS: [(&str, &str); 8] = [
    ("cantrip", "spellslinger"),
    ("treasure", "artifacts"),
    ("lifegain", "lifegain"),
    ("etb_trigger", "etb"),
    ("mana_rock", "ramp"),
    ("evasion_grant", "combat"),
    ("protection", "voltron"),
    ("x_spell", "big_mana"),
];

/// Strategy a synthetic anchor is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Tokens,
    Graveyard,
    Elves,
    Spellslinger,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Tokens, Theme::Graveyard, Theme::Elves, Theme::Spellslinger];

    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Tokens => "tokens",
            Theme::Graveyard => "graveyard",
            Theme::Elves => "elves",
            Theme::Spellslinger => "spellslinger",
        }
    }

    fn anchor_tags(self) -> &'static [&'static str] {
        match self {
            Theme::Tokens => &["tokens", "go_wide", "aristocrats"],
            Theme::Graveyard => &["graveyard", "reanimator", "self_mill"],
            Theme::Elves => &["tribal_elf", "elf_matters", "ramp"],
            Theme::Spellslinger => &["spellslinger", "instants_sorceries"],
        }
    }

    fn strategies(self) -> &'static [&'static str] {
        match self {
            Theme::Tokens => &["tokens", "sacrifice"],
            Theme::Graveyard => &["graveyard"],
            Theme::Elves => &["tribal", "ramp"],
            Theme::Spellslinger => &["spellslinger"],
        }
    }

    /// `(tag, category)` pairs that pay off for this theme.
    fn payoff_tags(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Theme::Tokens => &[
                ("token_generation", "tokens"),
                ("anthem", "tokens"),
                ("token_doubler", "tokens"),
                ("sacrifice_outlet", "sacrifice"),
                ("death_trigger", "sacrifice"),
            ],
            Theme::Graveyard => &[
                ("self_mill", "graveyard"),
                ("reanimation", "graveyard"),
                ("flashback", "graveyard"),
                ("graveyard_hate", "graveyard"),
            ],
            Theme::Elves => &[
                ("elf_payoff", "tribal"),
                ("tribal_support", "tribal"),
                ("mana_doubler", "ramp"),
                ("goblin_payoff", "tribal"),
            ],
            Theme::Spellslinger => &[
                ("cantrip", "spellslinger"),
                ("spell_copy", "spellslinger"),
                ("cost_reducer", "spellslinger"),
                ("prowess", "spellslinger"),
            ],
        }
    }

    fn tribe(self) -> &'static str {
        match self {
            Theme::Tokens => "soldier",
            Theme::Graveyard => "zombie",
            Theme::Elves => "elf",
            Theme::Spellslinger => "wizard",
        }
    }

    fn identity(self) -> [Color; 2] {
        match self {
            Theme::Tokens => [Color::White, Color::Black],
            Theme::Graveyard => [Color::Black, Color::Green],
            Theme::Elves => [Color::Green, Color::Black],
            Theme::Spellslinger => [Color::Blue, Color::Red],
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deterministic candidate universe: anchor, profile, cards and their tags.
#[derive(Debug, Clone)]
pub struct SyntheticPool {
    pub seed: u64,
    pub theme: Theme,
    pub anchor: Card,
    pub profile: AnchorProfile,
    pub cards: Vec<Card>,
    pub tags: TagIndex,
}

impl SyntheticPool {
    pub fn generate(seed: u64, size: usize, theme: Theme) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let identity = theme.identity();
        let anchor = Card::new(
            format!("{} Commander", capitalize(theme.tribe())),
            format!("Legendary Creature — {}", capitalize(theme.tribe())),
            4.0,
        )
        .with_identity(&identity)
        .with_rarity(Rarity::Mythic)
        .with_stats(4, 4);
        let profile = AnchorProfile::from_tags(
            theme.anchor_tags().iter().copied(),
            theme.strategies().iter().copied(),
        );

        let mut cards: Vec<Card> = Vec::with_capacity(size);
        let mut tags = TagIndex::new();
        for index in 0..size {
            if index > 0 && rng.gen_bool(REPRINT_SHARE) {
                if let Some(reprint) = reprint_of(&mut rng, &cards) {
                    cards.push(reprint);
                    continue;
                }
            }
            let card = if rng.gen_bool(LAND_SHARE) {
                land(&mut rng, index, &identity)
            } else {
                spell(&mut rng, index, theme, &identity)
            };
            tags.insert(card.name.clone(), card_tags(&mut rng, &card, theme));
            cards.push(card);
        }

        Self {
            seed,
            theme,
            anchor,
            profile,
            cards,
            tags,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn candidates(&self) -> StaticCandidates {
        StaticCandidates::new(self.cards.clone())
    }

    pub fn profile_source(&self) -> StaticProfile {
        StaticProfile(self.profile.clone())
    }
}

/// Log-uniform between the price bounds, with a share of free cards.
pub fn synthetic_price<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(FREE_SHARE) {
        return 0.0;
    }
    let exponent = rng.gen_range(MIN_PRICE.ln()..MAX_PRICE.ln());
    sanitize(exponent.exp()).max(MIN_PRICE)
}

fn card_name<R: Rng + ?Sized>(rng: &mut R, index: usize) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Plain");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Card");
    format!("{adjective} {noun} {index}")
}

fn land<R: Rng + ?Sized>(rng: &mut R, index: usize, identity: &[Color]) -> Card {
    let name = format!("{} Land {index}", ADJECTIVES.choose(rng).copied().unwrap_or("Plain"));
    let colors: Vec<Color> = identity
        .iter()
        .copied()
        .filter(|_| rng.gen_bool(0.6))
        .collect();
    Card::new(name, "Land", 0.0)
        .with_text("{T}: Add one mana of any color in your commander's color identity.")
        .with_identity(&colors)
        .with_price(sanitize(synthetic_price(rng) / 2.0))
}

fn spell<R: Rng + ?Sized>(rng: &mut R, index: usize, theme: Theme, identity: &[Color]) -> Card {
    let roll = rng.gen_range(0..100);
    let mana_value = if rng.gen_bool(0.08) {
        rng.gen_range(7..=9)
    } else {
        rng.gen_range(1..=6)
    };
    let text = ROLE_TEXTS.choose(rng).copied().unwrap_or_default();
    let colors: Vec<Color> = identity
        .iter()
        .copied()
        .filter(|_| rng.gen_bool(0.5))
        .collect();
    let rarity = match rng.gen_range(0..20) {
        0 => Rarity::Mythic,
        1..=4 => Rarity::Rare,
        5..=10 => Rarity::Uncommon,
        _ => Rarity::Common,
    };

    let name = card_name(rng, index);
    let card = if roll < 40 {
        let tribe = if rng.gen_bool(ON_TRIBE_CHANCE) {
            theme.tribe()
        } else {
            OFF_TRIBES.choose(rng).copied().unwrap_or("human")
        };
        let power = rng.gen_range(1..=mana_value + 2);
        let toughness = rng.gen_range(1..=mana_value + 2);
        Card::new(
            name,
            format!("Creature — {}", capitalize(tribe)),
            mana_value as f32,
        )
        .with_stats(power, toughness)
    } else {
        let type_line = match roll {
            40..=54 => "Instant",
            55..=69 => "Sorcery",
            70..=84 => "Artifact",
            _ => "Enchantment",
        };
        Card::new(name, type_line, mana_value as f32)
    };
    card.with_text(text)
        .with_identity(&colors)
        .with_rarity(rarity)
        .with_price(synthetic_price(rng))
}

fn card_tags<R: Rng + ?Sized>(rng: &mut R, card: &Card, theme: Theme) -> Vec<MechanicTag> {
    let mut tags = Vec::new();
    if card.is_land() {
        return tags;
    }
    if rng.gen_bool(THEME_TAG_CHANCE) {
        if let Some((name, category)) = theme.payoff_tags().choose(rng) {
            let priority = rng.gen_range(4..=9);
            tags.push(MechanicTag::new(*name, *category, priority));
        }
    }
    if rng.gen_bool(GENERIC_TAG_CHANCE) {
        if let Some((name, category)) = GENERIC_TAGS.choose(rng) {
            let priority = rng.gen_range(2..=7);
            tags.push(MechanicTag::new(*name, *category, priority).weighted(0.8));
        }
    }
    tags
}

/// Another printing of an earlier non-land card at a different price.
fn reprint_of<R: Rng + ?Sized>(rng: &mut R, cards: &[Card]) -> Option<Card> {
    let spells: Vec<&Card> = cards.iter().filter(|card| !card.is_land()).collect();
    let original = spells.choose(rng)?;
    Some((*original).clone().with_price(synthetic_price(rng)))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
