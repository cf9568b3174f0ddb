use std::collections::{BTreeMap, HashSet};

use deckforge_core::model::card::Card;
use deckforge_core::model::color::Color;
use deckforge_core::model::policy::{Policy, RoleTarget};
use deckforge_core::model::price::ListedPriceOracle;
use deckforge_core::model::profile::{AnchorProfile, StaticProfile};
use deckforge_core::model::role::Role;
use deckforge_core::model::tag::TagIndex;
use deckforge_core::optimizer::{AssemblyResult, AssemblyWarning};
use deckforge_core::pipeline::{DeckPipeline, GeneratedDeck, StaticCandidates};
use deckforge_core::synthetic::{SyntheticPool, Theme};

fn anchor() -> Card {
    Card::new("Test Commander", "Legendary Creature — Bear", 3.0)
        .with_identity(&[Color::Green, Color::White])
}

fn bear(name: &str, price: Option<f64>) -> Card {
    let card = Card::new(name, "Creature — Bear", 2.0)
        .with_identity(&[Color::Green])
        .with_stats(2, 2);
    match price {
        Some(price) => card.with_price(price),
        None => card,
    }
}

fn land(name: &str, price: f64) -> Card {
    Card::new(name, "Land", 0.0)
        .with_identity(&[Color::Green, Color::White])
        .with_price(price)
}

fn generate(cards: Vec<Card>, policy: &Policy) -> GeneratedDeck {
    let source = StaticCandidates::new(cards);
    let tags = TagIndex::new();
    let profiles = StaticProfile(AnchorProfile::default());
    let pipeline = DeckPipeline::new(&source, &tags, &profiles, &ListedPriceOracle).unwrap();
    pipeline.generate(&anchor(), policy).unwrap()
}

fn composition(roles: &[(Role, RoleTarget)]) -> BTreeMap<Role, RoleTarget> {
    roles.iter().copied().collect()
}

fn assert_consistent(result: &AssemblyResult) {
    let summed: f64 = result.final_deck.iter().map(|entry| entry.price_used).sum();
    assert_eq!(result.total_cost, summed);

    let mut seen = HashSet::new();
    for entry in &result.final_deck {
        if entry.candidate.is_fungible() {
            continue;
        }
        assert!(seen.insert(entry.name()), "duplicate {}", entry.name());
    }

    for quota in &result.role_quotas {
        assert!(quota.current <= quota.target + 1, "{:?}", quota);
    }
}

#[test]
fn exact_pool_within_budget_is_taken_whole() {
    let mut cards: Vec<Card> = (0..4).map(|i| land(&format!("Grove {i}"), 0.5)).collect();
    cards.extend((0..6).map(|i| bear(&format!("Bear {i}"), Some(1.0 + i as f64 * 0.25))));
    let policy = Policy::new(100.0, 10.0, 10).with_composition(composition(&[
        (Role::Land, RoleTarget::bounded(4, 0, 4)),
        (Role::Synergy, RoleTarget::bounded(6, 0, 6)),
    ]));

    let deck = generate(cards.clone(), &policy);
    let result = &deck.result;
    assert_eq!(result.len(), 10);
    assert!(result.replacements.is_empty());
    assert!(result.warnings.is_empty(), "{:?}", result.warning_messages());
    let names: HashSet<&str> = result.names().collect();
    for card in &cards {
        assert!(names.contains(card.name.as_str()), "missing {}", card.name);
    }
    assert_consistent(result);
}

#[test]
fn zero_budget_fills_from_free_cards() {
    let mut cards: Vec<Card> = (0..20).map(|i| land(&format!("Free Grove {i}"), 0.0)).collect();
    cards.extend((0..30).map(|i| bear(&format!("Free Bear {i}"), None)));
    let policy = Policy::new(0.0, 0.0, 20);

    let deck = generate(cards, &policy);
    let result = &deck.result;
    assert_eq!(result.len(), 20);
    assert_eq!(result.total_cost, 0.0);
    assert!(!result.has_warning("size_mismatch"));
    assert!(!result.has_warning("forced_over_budget"));
    assert_consistent(result);
}

#[test]
fn short_pool_reports_exact_deficit() {
    let cards: Vec<Card> = (0..9).map(|i| bear(&format!("Bear {i}"), Some(0.5))).collect();
    let policy = Policy::new(50.0, 5.0, 10).with_composition(composition(&[(
        Role::Synergy,
        RoleTarget::bounded(10, 0, 10),
    )]));

    let deck = generate(cards, &policy);
    let result = &deck.result;
    assert_eq!(result.len(), 9);
    assert!(
        result
            .warnings
            .contains(&AssemblyWarning::PoolExhausted { missing: 1 })
    );
    assert!(result.warnings.contains(&AssemblyWarning::SizeMismatch {
        expected: 10,
        actual: 9,
    }));
    assert_consistent(result);
}

#[test]
fn unreachable_role_minimum_degrades_to_warning() {
    let cards: Vec<Card> = (0..15).map(|i| bear(&format!("Bear {i}"), Some(0.5))).collect();
    let policy = Policy::new(50.0, 5.0, 10).with_composition(composition(&[
        (Role::Removal, RoleTarget::bounded(3, 2, 3)),
        (Role::Synergy, RoleTarget::bounded(7, 0, 7)),
    ]));

    let deck = generate(cards, &policy);
    let result = &deck.result;
    assert_eq!(result.len(), 10);
    assert!(result.warnings.contains(&AssemblyWarning::RoleShortfall {
        role: Role::Removal,
        current: 0,
        minimum: 2,
        target: 3,
    }));
    assert!(
        result
            .warning_messages()
            .iter()
            .any(|message| message.starts_with("removal"))
    );
    assert!(deck.report.unmet_roles().next().is_some());
    assert_consistent(result);
}

#[test]
fn equal_candidates_resolve_in_input_order() {
    let cards = vec![bear("Twin A", Some(1.0)), bear("Twin B", Some(1.0))];
    let policy = Policy::new(10.0, 5.0, 1).with_composition(composition(&[(
        Role::Synergy,
        RoleTarget::bounded(1, 0, 1),
    )]));
    let deck = generate(cards, &policy);
    let names: Vec<&str> = deck.result.names().collect();
    assert_eq!(names, vec!["Twin A"]);
}

fn synthetic_deck(seed: u64, theme: Theme, policy: &Policy) -> GeneratedDeck {
    let pool = SyntheticPool::generate(seed, 600, theme);
    let source = pool.candidates();
    let profiles = pool.profile_source();
    let pipeline = DeckPipeline::new(&source, &pool.tags, &profiles, &ListedPriceOracle).unwrap();
    pipeline.generate(&pool.anchor, policy).unwrap()
}

#[test]
fn identical_inputs_give_identical_results() {
    let policy = Policy::new(120.0, 10.0, 99);
    for seed in [1u64, 2, 42] {
        let first = synthetic_deck(seed, Theme::Elves, &policy);
        let second = synthetic_deck(seed, Theme::Elves, &policy);
        let a = serde_json::to_string(&first.result).unwrap();
        let b = serde_json::to_string(&second.result).unwrap();
        assert_eq!(a, b, "seed {seed}");
    }
}

#[test]
fn synthetic_decks_hold_invariants() {
    for (seed, theme) in [
        (3u64, Theme::Tokens),
        (5, Theme::Graveyard),
        (8, Theme::Elves),
        (13, Theme::Spellslinger),
    ] {
        for budget in [40.0, 150.0, 600.0] {
            let policy = Policy::new(budget, 12.0, 99);
            let deck = synthetic_deck(seed, theme, &policy);
            let result = &deck.result;
            assert_consistent(result);

            if !result.has_warning("pool_exhausted") {
                assert_eq!(result.len(), 99, "seed {seed} budget {budget}");
            }
            let forced: HashSet<&str> = result
                .warnings
                .iter()
                .filter_map(|warning| match warning {
                    AssemblyWarning::ForcedOverBudget { name, .. } => Some(name.as_str()),
                    _ => None,
                })
                .collect();
            if forced.is_empty() && !result.has_warning("over_budget") {
                assert!(result.total_cost <= budget + 1e-6, "seed {seed} budget {budget}");
            }
            let over_cap: HashSet<&str> = result
                .warnings
                .iter()
                .filter_map(|warning| match warning {
                    AssemblyWarning::ForcedOverCap { name, .. } => Some(name.as_str()),
                    _ => None,
                })
                .collect();
            for entry in &result.final_deck {
                if entry.price_used > policy.per_item_cap {
                    assert!(over_cap.contains(entry.name()), "{} over cap", entry.name());
                }
                if entry.assigned_role == Role::Land {
                    assert!(entry.candidate.card.is_land(), "{} counted as land", entry.name());
                }
            }
            assert_eq!(deck.report.size, result.len());
        }
    }
}
