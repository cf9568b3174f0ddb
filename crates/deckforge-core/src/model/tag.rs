use std::collections::HashMap;

use crate::model::card::Card;
use serde::{Deserialize, Serialize};

/// A mechanic tag attached to a card by the upstream classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicTag {
    pub name: String,
    pub category: String,
    /// 1..=10
    pub priority: u8,
    #[serde(default = "default_synergy_weight")]
    pub synergy_weight: f32,
}

fn default_synergy_weight() -> f32 {
    1.0
}

impl MechanicTag {
    pub fn new(name: impl Into<String>, category: impl Into<String>, priority: u8) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            priority: priority.clamp(1, 10),
            synergy_weight: 1.0,
        }
    }

    pub fn weighted(mut self, synergy_weight: f32) -> Self {
        self.synergy_weight = synergy_weight.max(0.0);
        self
    }

    /// Tag naming a creature type, e.g. `type_elf`.
    pub fn creature_type(tribe: &str) -> Self {
        Self::new(format!("type_{tribe}"), "tribal", 5)
    }
}

/// Source of mechanic tags for a card. Must be a pure function of card identity.
pub trait TagSource {
    fn mechanics_of(&self, card: &Card) -> Vec<MechanicTag>;
}

/// In-memory tag lookup keyed by card name.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_name: HashMap<String, Vec<MechanicTag>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tags: Vec<MechanicTag>) {
        self.by_name.insert(name.into(), tags);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl TagSource for TagIndex {
    fn mechanics_of(&self, card: &Card) -> Vec<MechanicTag> {
        self.by_name.get(&card.name).cloned().unwrap_or_default()
    }
}

/// Adds `type_<tribe>` tags for each creature subtype the classifier did not
/// already report, and collapses duplicate tag names keeping the heaviest.
pub fn enrich_with_type_tags(card: &Card, tags: Vec<MechanicTag>) -> Vec<MechanicTag> {
    let mut merged: Vec<MechanicTag> = Vec::with_capacity(tags.len());
    for tag in tags {
        match merged.iter_mut().find(|existing| existing.name == tag.name) {
            Some(existing) if existing.synergy_weight < tag.synergy_weight => *existing = tag,
            Some(_) => {}
            None => merged.push(tag),
        }
    }

    for tribe in card.creature_types() {
        let tag = MechanicTag::creature_type(&tribe);
        if !merged.iter().any(|existing| existing.name == tag.name) {
            merged.push(tag);
        }
    }
    merged
}
