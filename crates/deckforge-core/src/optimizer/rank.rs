use std::cmp::Ordering;

use crate::model::candidate::ScoredCandidate;
use crate::model::policy::Policy;

/// Composite ranking comparator. `Less` means `a` ranks ahead of `b`.
///
/// Evaluated strictly in order: within the per-card cap, synergy (only when
/// the gap reaches `synergy_gap`), known staple, type-weighted synergy (gap
/// above `weighted_synergy_gap`), cheaper when both are within the cap and the
/// price gap exceeds `price_gap`, cheaper, then longer rules text.
pub fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate, policy: &Policy) -> Ordering {
    let thresholds = &policy.thresholds;
    let cap = policy.per_item_cap;

    let a_within = a.price <= cap;
    let b_within = b.price <= cap;
    if a_within != b_within {
        return if a_within {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    let gap = a.synergy_score - b.synergy_score;
    if gap != 0.0 && gap.abs() >= thresholds.synergy_gap {
        return descending(gap);
    }

    if a.is_staple != b.is_staple {
        return if a.is_staple {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    let weighted_a = a.synergy_score * policy.type_multiplier(a.card.primary_type());
    let weighted_b = b.synergy_score * policy.type_multiplier(b.card.primary_type());
    let weighted_gap = weighted_a - weighted_b;
    if weighted_gap.abs() > thresholds.weighted_synergy_gap {
        return descending(weighted_gap);
    }

    if a_within && b_within {
        let price_gap = a.price - b.price;
        if price_gap.abs() > thresholds.price_gap {
            return a.price.total_cmp(&b.price);
        }
    }

    match a.price.total_cmp(&b.price) {
        Ordering::Equal => {}
        ordering => return ordering,
    }

    b.card.text_complexity().cmp(&a.card.text_complexity())
}

fn descending(gap: f32) -> Ordering {
    if gap > 0.0 {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Ranks candidate indices with [`compare_candidates`].
pub fn rank_candidates(
    candidates: &[ScoredCandidate],
    indices: &[usize],
    policy: &Policy,
) -> Vec<usize> {
    let mut ranked = indices.to_vec();
    stable_merge_sort(&mut ranked, &mut |a: &usize, b: &usize| {
        compare_candidates(&candidates[*a], &candidates[*b], policy)
    });
    ranked
}

/// Top-down merge sort. Equal elements keep their input order, and the sort
/// always terminates with a permutation even when the comparator is not
/// transitive, which threshold-based comparators are not.
pub fn stable_merge_sort<T, F>(items: &mut [T], compare: &mut F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    stable_merge_sort(&mut items[..mid], compare);
    stable_merge_sort(&mut items[mid..], compare);

    let mut merged = Vec::with_capacity(len);
    let (mut left, mut right) = (0, mid);
    while left < mid && right < len {
        if compare(&items[right], &items[left]) == Ordering::Less {
            merged.push(items[right].clone());
            right += 1;
        } else {
            merged.push(items[left].clone());
            left += 1;
        }
    }
    merged.extend_from_slice(&items[left..mid]);
    merged.extend_from_slice(&items[right..]);
    items.clone_from_slice(&merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::model::card_type::CardType;
    use std::collections::{BTreeMap, BTreeSet};

    fn candidate(name: &str, synergy: f32, price: f64) -> ScoredCandidate {
        ScoredCandidate {
            card: Card::new(name, "Sorcery", 2.0),
            tags: Vec::new(),
            role_scores: BTreeMap::new(),
            synergy_score: synergy,
            power_score: 5.0,
            budget_score: 5.0,
            curve_score: 5.0,
            total_score: 5.0,
            role_relevance: BTreeSet::new(),
            price,
            selection_priority: 5.0,
            is_staple: false,
            synergy_notes: Vec::new(),
        }
    }

    fn policy() -> Policy {
        Policy::new(100.0, 10.0, 99)
    }

    #[test]
    fn over_cap_ranks_last_regardless_of_synergy() {
        let policy = policy();
        let cheap = candidate("Cheap", 1.0, 2.0);
        let pricey = candidate("Pricey", 10.0, 25.0);
        assert_eq!(compare_candidates(&cheap, &pricey, &policy), Ordering::Less);
    }

    #[test]
    fn small_synergy_gaps_defer_to_staples() {
        let policy = policy();
        let mut staple = candidate("Staple", 5.0, 3.0);
        staple.is_staple = true;
        let synergistic = candidate("Synergy", 6.5, 1.0);
        assert_eq!(
            compare_candidates(&staple, &synergistic, &policy),
            Ordering::Less
        );
        let very_synergistic = candidate("Big Synergy", 8.0, 1.0);
        assert_eq!(
            compare_candidates(&staple, &very_synergistic, &policy),
            Ordering::Greater
        );
    }

    #[test]
    fn type_weight_breaks_moderate_synergy_gaps() {
        let mut policy = policy();
        policy.type_weights.insert(CardType::Creature, 10);
        let mut creature = candidate("Creature", 4.0, 5.0);
        creature.card = Card::new("Creature", "Creature — Elf", 2.0);
        let sorcery = candidate("Sorcery", 5.0, 1.0);
        assert_eq!(compare_candidates(&creature, &sorcery, &policy), Ordering::Less);
    }

    #[test]
    fn cheaper_then_wordier_break_remaining_ties() {
        let policy = policy();
        let cheap = candidate("Cheap", 5.0, 1.0);
        let dear = candidate("Dear", 5.0, 1.5);
        assert_eq!(compare_candidates(&cheap, &dear, &policy), Ordering::Less);

        let mut wordy = candidate("Wordy", 5.0, 1.0);
        wordy.card.oracle_text = "Draw a card.".to_string();
        assert_eq!(compare_candidates(&wordy, &cheap, &policy), Ordering::Less);
    }

    #[test]
    fn equal_candidates_keep_input_order() {
        let policy = policy();
        let candidates: Vec<ScoredCandidate> = (0..6)
            .map(|i| candidate(&format!("Twin {i}"), 5.0, 1.0))
            .collect();
        let indices: Vec<usize> = (0..6).collect();
        assert_eq!(rank_candidates(&candidates, &indices, &policy), indices);
    }

    #[test]
    fn merge_sort_is_stable() {
        let mut items = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd'), (1, 'e')];
        stable_merge_sort(&mut items, &mut |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(items, vec![(1, 'b'), (1, 'e'), (2, 'd'), (3, 'a'), (3, 'c')]);
    }
}
