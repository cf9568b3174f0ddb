use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::candidate::ScoredCandidate;

/// Collapses candidates sharing a name, keeping the cheapest, then the most
/// powerful, then the one with the longest text. Fungible cards are all kept.
/// Survivors are returned as indices in their original order.
pub fn dedup_candidates(candidates: &[ScoredCandidate]) -> Vec<usize> {
    let mut best_by_name: HashMap<&str, usize> = HashMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.is_fungible() {
            continue;
        }
        best_by_name
            .entry(candidate.name())
            .and_modify(|best| {
                if prefer(candidate, &candidates[*best]) == Ordering::Less {
                    *best = index;
                }
            })
            .or_insert(index);
    }

    candidates
        .iter()
        .enumerate()
        .filter(|(index, candidate)| {
            candidate.is_fungible() || best_by_name.get(candidate.name()) == Some(index)
        })
        .map(|(index, _)| index)
        .collect()
}

/// `Less` when `a` should be kept over `b`.
fn prefer(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    a.price
        .total_cmp(&b.price)
        .then_with(|| b.power_score.total_cmp(&a.power_score))
        .then_with(|| b.card.text_complexity().cmp(&a.card.text_complexity()))
}

#[cfg(test)]
mod tests {
    use super::dedup_candidates;
    use crate::model::candidate::ScoredCandidate;
    use crate::model::card::Card;
    use std::collections::{BTreeMap, BTreeSet};

    fn candidate(card: Card, price: f64, power: f32) -> ScoredCandidate {
        ScoredCandidate {
            card,
            tags: Vec::new(),
            role_scores: BTreeMap::new(),
            synergy_score: 0.0,
            power_score: power,
            budget_score: 0.0,
            curve_score: 0.0,
            total_score: 0.0,
            role_relevance: BTreeSet::new(),
            price,
            selection_priority: 0.0,
            is_staple: false,
            synergy_notes: Vec::new(),
        }
    }

    #[test]
    fn keeps_cheapest_printing() {
        let ring = || Card::new("Sol Ring", "Artifact", 1.0);
        let candidates = vec![
            candidate(ring(), 3.0, 9.0),
            candidate(Card::new("Mind Stone", "Artifact", 2.0), 0.5, 5.0),
            candidate(ring(), 1.5, 9.0),
        ];
        assert_eq!(dedup_candidates(&candidates), vec![1, 2]);
    }

    #[test]
    fn ties_fall_back_to_power_then_text() {
        let plain = Card::new("Twin", "Creature — Elf", 2.0);
        let wordy = Card::new("Twin", "Creature — Elf", 2.0).with_text("Reach.");
        let candidates = vec![
            candidate(plain.clone(), 1.0, 5.0),
            candidate(plain, 1.0, 6.0),
            candidate(wordy, 1.0, 6.0),
        ];
        assert_eq!(dedup_candidates(&candidates), vec![2]);
    }

    #[test]
    fn fungible_cards_are_never_collapsed() {
        let forest = || Card::new("Forest", "Basic Land — Forest", 0.0);
        let candidates = vec![
            candidate(forest(), 0.1, 5.0),
            candidate(forest(), 0.1, 5.0),
        ];
        assert_eq!(dedup_candidates(&candidates), vec![0, 1]);
    }
}
