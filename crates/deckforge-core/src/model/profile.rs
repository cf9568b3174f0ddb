use std::collections::BTreeSet;

use crate::model::card::Card;
use serde::{Deserialize, Serialize};

/// Tags and strategies derived from the anchor card. Read-only during assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorProfile {
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub strategies: BTreeSet<String>,
}

impl AnchorProfile {
    pub fn from_tags<I, J, S, T>(tags: I, strategies: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            tags: tags.into_iter().map(|t| normalize(t.as_ref())).collect(),
            strategies: strategies.into_iter().map(|s| normalize(s.as_ref())).collect(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_strategy(&self, strategy: &str) -> bool {
        self.strategies.contains(strategy)
    }

    /// Tribes flagged through `tribal_<x>` or `<x>_matters` tags.
    pub fn tribes(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .filter_map(|tag| {
                tag.strip_prefix("tribal_")
                    .or_else(|| tag.strip_suffix("_matters"))
                    .filter(|tribe| !tribe.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }

    /// Number of independent ways (0..=2) the profile flags a tribe.
    pub fn tribe_flag_count(&self, tribe: &str) -> usize {
        usize::from(self.has_tag(&format!("tribal_{tribe}")))
            + usize::from(self.has_tag(&format!("{tribe}_matters")))
    }
}

/// Lowercase snake_case form used for every tag and strategy string.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Builds the anchor profile from the anchor card.
pub trait ProfileSource {
    fn profile_of(&self, anchor: &Card) -> AnchorProfile;
}

/// Returns a fixed profile regardless of the anchor.
#[derive(Debug, Clone, Default)]
pub struct StaticProfile(pub AnchorProfile);

impl ProfileSource for StaticProfile {
    fn profile_of(&self, _anchor: &Card) -> AnchorProfile {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{AnchorProfile, normalize};

    #[test]
    fn normalizes_to_snake_case() {
        assert_eq!(normalize("  Elf Matters "), "elf_matters");
        assert_eq!(normalize("+1/+1-counters"), "+1/+1_counters");
    }

    #[test]
    fn tribes_are_collected_from_both_flag_styles() {
        let profile = AnchorProfile::from_tags(
            ["tribal_elf", "elf_matters", "goblin_matters", "tokens"],
            ["tokens"],
        );
        let tribes: Vec<String> = profile.tribes().into_iter().collect();
        assert_eq!(tribes, vec!["elf", "goblin"]);
        assert_eq!(profile.tribe_flag_count("elf"), 2);
        assert_eq!(profile.tribe_flag_count("goblin"), 1);
        assert_eq!(profile.tribe_flag_count("zombie"), 0);
    }
}
