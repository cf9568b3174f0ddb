pub mod candidate;
pub mod card;
pub mod card_type;
pub mod color;
pub mod policy;
pub mod price;
pub mod profile;
pub mod rarity;
pub mod role;
pub mod tag;

pub use candidate::ScoredCandidate;
pub use card::{Card, CardPrices};
pub use card_type::CardType;
pub use color::Color;
pub use policy::{CurvePreference, CurveTargets, Policy, RankThresholds, RoleTarget};
pub use price::{ListedPriceOracle, PriceOracle};
pub use profile::{AnchorProfile, ProfileSource, StaticProfile};
pub use rarity::Rarity;
pub use role::Role;
pub use tag::{MechanicTag, TagIndex, TagSource};
