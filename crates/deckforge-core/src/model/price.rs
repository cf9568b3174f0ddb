use crate::model::card::Card;

/// Resolves the price used for a card during one generation run.
///
/// Implementations must be deterministic for a given `(card, prefer_cheapest)`
/// pair for the lifetime of a run.
pub trait PriceOracle {
    fn price_of(&self, card: &Card, prefer_cheapest: bool) -> f64;
}

/// Reads the prices listed on the card itself.
///
/// With `prefer_cheapest` the cheapest listed printing wins; otherwise the
/// primary printing is used, falling back through foil, etched and alternate
/// printings. Cards with no usable price cost nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListedPriceOracle;

impl PriceOracle for ListedPriceOracle {
    fn price_of(&self, card: &Card, prefer_cheapest: bool) -> f64 {
        let mut listed = card.prices.listed();
        let price = if prefer_cheapest {
            listed.fold(None, |best: Option<f64>, price| match best {
                Some(current) if current <= price => Some(current),
                _ => Some(price),
            })
        } else {
            listed.next()
        };
        sanitize(price.unwrap_or(0.0))
    }
}

/// Rounds to cents so sums stay reproducible across platforms.
pub fn sanitize(price: f64) -> f64 {
    if !price.is_finite() || price <= 0.0 {
        return 0.0;
    }
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{ListedPriceOracle, PriceOracle, sanitize};
    use crate::model::card::{Card, CardPrices};

    fn card_with(prices: CardPrices) -> Card {
        let mut card = Card::new("Sol Ring", "Artifact", 1.0);
        card.prices = prices;
        card
    }

    #[test]
    fn prefer_cheapest_picks_lowest_printing() {
        let card = card_with(CardPrices {
            usd: Some(3.5),
            usd_foil: Some(12.0),
            usd_etched: None,
            alternates: vec![1.25, 2.0],
        });
        assert_eq!(ListedPriceOracle.price_of(&card, true), 1.25);
        assert_eq!(ListedPriceOracle.price_of(&card, false), 3.5);
    }

    #[test]
    fn primary_falls_back_to_foil() {
        let card = card_with(CardPrices {
            usd: None,
            usd_foil: Some(4.0),
            ..CardPrices::default()
        });
        assert_eq!(ListedPriceOracle.price_of(&card, false), 4.0);
    }

    #[test]
    fn missing_prices_cost_nothing() {
        let card = card_with(CardPrices::default());
        assert_eq!(ListedPriceOracle.price_of(&card, true), 0.0);
    }

    #[test]
    fn sanitize_rounds_to_cents() {
        assert_eq!(sanitize(1.006), 1.01);
        assert_eq!(sanitize(-3.0), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
    }
}
