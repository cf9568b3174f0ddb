use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Functional category a card can fill in a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Land,
    Ramp,
    Draw,
    Removal,
    BoardWipe,
    Protection,
    Tutor,
    GraveyardRecursion,
    GraveyardHate,
    WinCondition,
    Synergy,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Land,
        Role::Ramp,
        Role::Draw,
        Role::Removal,
        Role::BoardWipe,
        Role::Protection,
        Role::Tutor,
        Role::GraveyardRecursion,
        Role::GraveyardHate,
        Role::WinCondition,
        Role::Synergy,
    ];

    /// Roles filled before anything else, in fill order.
    pub const ESSENTIAL: [Role; 5] = [
        Role::Land,
        Role::Ramp,
        Role::Draw,
        Role::Removal,
        Role::Protection,
    ];

    /// Roles counted towards a card being multi-purpose.
    pub const UTILITY: [Role; 4] = [Role::Draw, Role::Removal, Role::Ramp, Role::Tutor];

    /// Score at or above which a role is considered relevant for a card.
    pub const RELEVANCE_THRESHOLD: f32 = 5.0;

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Land => "land",
            Role::Ramp => "ramp",
            Role::Draw => "draw",
            Role::Removal => "removal",
            Role::BoardWipe => "board_wipe",
            Role::Protection => "protection",
            Role::Tutor => "tutor",
            Role::GraveyardRecursion => "graveyard_recursion",
            Role::GraveyardHate => "graveyard_hate",
            Role::WinCondition => "win_condition",
            Role::Synergy => "synergy",
        }
    }

    pub fn is_essential(self) -> bool {
        Role::ESSENTIAL.contains(&self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == lowered)
            .ok_or_else(|| ParseRoleError(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn essential_roles_follow_fill_order() {
        assert_eq!(Role::ESSENTIAL[0], Role::Land);
        assert!(Role::Protection.is_essential());
        assert!(!Role::Tutor.is_essential());
    }

    #[test]
    fn parses_hyphenated_names() {
        assert_eq!("board-wipe".parse::<Role>().unwrap(), Role::BoardWipe);
        assert_eq!(
            "Graveyard Recursion".parse::<Role>().unwrap(),
            Role::GraveyardRecursion
        );
        assert!("mana".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Role::WinCondition).unwrap();
        assert_eq!(json, "\"win_condition\"");
    }
}
