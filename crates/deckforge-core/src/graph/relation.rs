use std::fmt;

use serde::{Deserialize, Serialize};

/// How two cards reinforce each other. Declaration order breaks strength ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyKind {
    Combo,
    Amplifies,
    Enables,
    Protects,
    Recurses,
    Tutors,
    Tribal,
    Thematic,
    Curve,
    Utility,
}

impl SynergyKind {
    pub const ALL: [SynergyKind; 10] = [
        SynergyKind::Combo,
        SynergyKind::Amplifies,
        SynergyKind::Enables,
        SynergyKind::Protects,
        SynergyKind::Recurses,
        SynergyKind::Tutors,
        SynergyKind::Tribal,
        SynergyKind::Thematic,
        SynergyKind::Curve,
        SynergyKind::Utility,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SynergyKind::Combo => "combo",
            SynergyKind::Amplifies => "amplifies",
            SynergyKind::Enables => "enables",
            SynergyKind::Protects => "protects",
            SynergyKind::Recurses => "recurses",
            SynergyKind::Tutors => "tutors",
            SynergyKind::Tribal => "tribal",
            SynergyKind::Thematic => "thematic",
            SynergyKind::Curve => "curve",
            SynergyKind::Utility => "utility",
        }
    }

    /// Edge strength before tag priorities are considered.
    pub const fn base_strength(self) -> f32 {
        match self {
            SynergyKind::Combo => 8.0,
            SynergyKind::Amplifies => 6.5,
            SynergyKind::Tutors => 6.0,
            SynergyKind::Enables | SynergyKind::Recurses => 5.5,
            SynergyKind::Protects => 5.0,
            SynergyKind::Tribal => 4.0,
            SynergyKind::Thematic => 2.5,
            SynergyKind::Curve => 1.5,
            SynergyKind::Utility => 1.0,
        }
    }
}

impl fmt::Display for SynergyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complementary tag pair. Directed relations point from `source` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRelation {
    pub source: &'static str,
    pub target: &'static str,
    pub kind: SynergyKind,
    pub directed: bool,
}

const fn relation(
    source: &'static str,
    target: &'static str,
    kind: SynergyKind,
    directed: bool,
) -> TagRelation {
    TagRelation {
        source,
        target,
        kind,
        directed,
    }
}

pub const TAG_RELATIONS: [TagRelation; 16] = [
    relation("sacrifice_outlet", "death_trigger", SynergyKind::Combo, false),
    relation("sacrifice_outlet", "token_generation", SynergyKind::Combo, false),
    relation("flicker", "etb_trigger", SynergyKind::Combo, false),
    relation("wheel", "discard_payoff", SynergyKind::Combo, false),
    relation("anthem", "token_generation", SynergyKind::Amplifies, true),
    relation("token_doubler", "token_generation", SynergyKind::Amplifies, true),
    relation("proliferate", "counter_placement", SynergyKind::Amplifies, true),
    relation("counter_doubler", "counter_placement", SynergyKind::Amplifies, true),
    relation("lifegain", "lifegain_payoff", SynergyKind::Amplifies, false),
    relation("mana_rock", "x_spell", SynergyKind::Enables, true),
    relation("ritual", "x_spell", SynergyKind::Enables, true),
    relation("land_fetch", "landfall", SynergyKind::Enables, true),
    relation("protection", "win_condition", SynergyKind::Protects, true),
    relation("reanimation", "self_mill", SynergyKind::Recurses, false),
    relation("land_recursion", "landfall", SynergyKind::Recurses, true),
    relation("tutor", "combo_piece", SynergyKind::Tutors, true),
];

/// Relations linking a card carrying `left_tags` to one carrying
/// `right_tags`. The flag is true when the relation runs right to left.
pub fn matching_relations<'a>(
    left_tags: &'a [&'a str],
    right_tags: &'a [&'a str],
) -> impl Iterator<Item = (TagRelation, bool)> + 'a {
    TAG_RELATIONS.iter().filter_map(move |relation| {
        if left_tags.contains(&relation.source) && right_tags.contains(&relation.target) {
            Some((*relation, false))
        } else if right_tags.contains(&relation.source) && left_tags.contains(&relation.target) {
            Some((*relation, true))
        } else {
            None
        }
    })
}
