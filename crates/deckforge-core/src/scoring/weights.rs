/// Relative weight of each sub-score in a candidate's total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub role: f32,
    pub synergy: f32,
    pub power: f32,
    pub budget: f32,
    pub curve: f32,
}

impl ScoreWeights {
    const ROLE: f32 = 0.30;
    const SYNERGY: f32 = 0.30;
    const POWER_FLOOR: f32 = 0.10;
    const BUDGET_CEILING: f32 = 0.20;
    /// Weight moved from budget to power across the power-level range.
    const POWER_SHIFT: f32 = 0.15;

    /// Power gains weight and budget loses the same amount as the target
    /// power level rises; curve takes the remainder so the sum is exactly 1.
    pub fn for_power_level(power_level: u8) -> Self {
        let t = (f32::from(power_level.clamp(1, 10)) - 1.0) / 9.0;
        let power = Self::POWER_FLOOR + Self::POWER_SHIFT * t;
        let budget = Self::BUDGET_CEILING - Self::POWER_SHIFT * t;
        let curve = 1.0 - (Self::ROLE + Self::SYNERGY + power + budget);
        Self {
            role: Self::ROLE,
            synergy: Self::SYNERGY,
            power,
            budget,
            curve,
        }
    }

    pub fn sum(&self) -> f32 {
        self.role + self.synergy + self.power + self.budget + self.curve
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreWeights;

    #[test]
    fn weights_sum_to_one_at_every_level() {
        for level in 1..=10u8 {
            let weights = ScoreWeights::for_power_level(level);
            assert!((weights.sum() - 1.0).abs() < 1e-6, "level {level}");
            assert!(weights.curve > 0.0);
        }
    }

    #[test]
    fn power_rises_and_budget_falls_with_level() {
        let casual = ScoreWeights::for_power_level(2);
        let cedh = ScoreWeights::for_power_level(10);
        assert!(cedh.power > casual.power);
        assert!(cedh.budget < casual.budget);
    }
}
