use cafe_shared::{WeightDelta, MAX_BASIS_POINTS};
use soroban_sdk::contracttype;

use crate::errors::RewarderError;

/// Per (pool, user) weight inputs.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolComponents {
    pub base_balance: i128,
    pub multiplier_bps: i128,
    pub bonus: i128,
}

/// Per user inputs shared by every pool.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalComponents {
    pub multiplier_bps: i128,
    pub bonus: i128,
}

impl PoolComponents {
    pub fn is_neutral(&self) -> bool {
        self.base_balance == 0 && self.multiplier_bps == 0 && self.bonus == 0
    }

    pub fn accumulate(&mut self, delta: &WeightDelta) -> Result<(), RewarderError> {
        self.multiplier_bps = self
            .multiplier_bps
            .checked_add(delta.multiplier_bps)
            .ok_or(RewarderError::ArithmeticError)?;
        self.bonus = self
            .bonus
            .checked_add(delta.bonus)
            .ok_or(RewarderError::ArithmeticError)?;
        Ok(())
    }
}

impl GlobalComponents {
    pub fn is_neutral(&self) -> bool {
        self.multiplier_bps == 0 && self.bonus == 0
    }

    pub fn accumulate(&mut self, delta: &WeightDelta) -> Result<(), RewarderError> {
        self.multiplier_bps = self
            .multiplier_bps
            .checked_add(delta.multiplier_bps)
            .ok_or(RewarderError::ArithmeticError)?;
        self.bonus = self
            .bonus
            .checked_add(delta.bonus)
            .ok_or(RewarderError::ArithmeticError)?;
        Ok(())
    }
}

/// Effective weight:
/// `max(0, floor(base * (10000 + local_mul + global_mul) / 10000) + local_bonus + global_bonus)`.
///
/// Negative scaled balances round towards negative infinity. Overflow of any
/// intermediate value is an error, never a wrap or a silent clamp.
pub fn total_weight(
    pool: &PoolComponents,
    global: &GlobalComponents,
) -> Result<i128, RewarderError> {
    let multiplier = MAX_BASIS_POINTS
        .checked_add(pool.multiplier_bps)
        .and_then(|m| m.checked_add(global.multiplier_bps))
        .ok_or(RewarderError::ArithmeticError)?;

    let scaled = pool
        .base_balance
        .checked_mul(multiplier)
        .ok_or(RewarderError::ArithmeticError)?
        .div_euclid(MAX_BASIS_POINTS);

    let total = scaled
        .checked_add(pool.bonus)
        .and_then(|t| t.checked_add(global.bonus))
        .ok_or(RewarderError::ArithmeticError)?;

    Ok(total.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(base_balance: i128, multiplier_bps: i128, bonus: i128) -> PoolComponents {
        PoolComponents {
            base_balance,
            multiplier_bps,
            bonus,
        }
    }

    fn global(multiplier_bps: i128, bonus: i128) -> GlobalComponents {
        GlobalComponents {
            multiplier_bps,
            bonus,
        }
    }

    #[test]
    fn test_neutral_components_give_base_balance() {
        assert_eq!(total_weight(&pool(0, 0, 0), &global(0, 0)), Ok(0));
        assert_eq!(total_weight(&pool(1234, 0, 0), &global(0, 0)), Ok(1234));
    }

    #[test]
    fn test_multipliers_add_up() {
        // 1% local, 2% global
        assert_eq!(total_weight(&pool(10_000, 100, 0), &global(200, 0)), Ok(10_300));
        // 10x property
        assert_eq!(total_weight(&pool(10, 90_000, 0), &global(0, 0)), Ok(100));
    }

    #[test]
    fn test_bonus_applies_without_balance() {
        assert_eq!(total_weight(&pool(0, 500, 200), &global(0, 0)), Ok(200));
        assert_eq!(total_weight(&pool(0, 0, 0), &global(300, 100)), Ok(100));
    }

    #[test]
    fn test_scaled_balance_floors() {
        // 1 * 1.0001 = 1
        assert_eq!(total_weight(&pool(1, 1, 0), &global(0, 0)), Ok(1));
        // 3 * -0.5 = -1.5 floors to -2, then +5
        assert_eq!(total_weight(&pool(3, -15_000, 5), &global(0, 0)), Ok(3));
    }

    #[test]
    fn test_total_clamps_at_zero() {
        assert_eq!(total_weight(&pool(10, 0, -50), &global(0, 0)), Ok(0));
        assert_eq!(total_weight(&pool(10, -20_000, 0), &global(0, 0)), Ok(0));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert_eq!(
            total_weight(&pool(i128::MAX / 2, 10_000, 0), &global(0, 0)),
            Err(RewarderError::ArithmeticError)
        );
        assert_eq!(
            total_weight(&pool(0, 0, i128::MAX), &global(0, 1)),
            Err(RewarderError::ArithmeticError)
        );
    }

    #[test]
    fn test_accumulate_and_neutral() {
        let mut components = GlobalComponents::default();
        components.accumulate(&WeightDelta::new(100, 10)).unwrap();
        assert!(!components.is_neutral());
        components.accumulate(&WeightDelta::new(-100, -10)).unwrap();
        assert!(components.is_neutral());

        let mut local = pool(0, i128::MAX, 0);
        assert_eq!(
            local.accumulate(&WeightDelta::new(1, 0)),
            Err(RewarderError::ArithmeticError)
        );
    }
}
