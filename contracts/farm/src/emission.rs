use cafe_shared::ACC_PRECISION;

use crate::errors::FarmError;
use crate::types::Emission;

/// Emission multiplier over `[from, to)`.
///
/// Seconds before `start_timestamp` earn nothing. Seconds before
/// `bonus_end_timestamp` earn `bonus_multiplier`, the rest earn 1. An interval
/// straddling the bonus end is split at the boundary.
pub fn reward_multiplier(from: u64, to: u64, emission: &Emission) -> Result<i128, FarmError> {
    let from = from.max(emission.start_timestamp);
    if to <= from {
        return Ok(0);
    }

    let bonus_end = emission.bonus_end_timestamp;
    let (bonus_seconds, plain_seconds) = if to <= bonus_end {
        (to - from, 0)
    } else if from >= bonus_end {
        (0, to - from)
    } else {
        (bonus_end - from, to - bonus_end)
    };

    (bonus_seconds as i128)
        .checked_mul(emission.bonus_multiplier)
        .and_then(|bonus| bonus.checked_add(plain_seconds as i128))
        .ok_or(FarmError::ArithmeticError)
}

/// Share of the global emission minted for one pool.
pub fn pool_reward(
    multiplier: i128,
    rate_per_second: i128,
    allocation: u32,
    total_allocation: u32,
) -> Result<i128, FarmError> {
    if total_allocation == 0 {
        return Ok(0);
    }

    multiplier
        .checked_mul(rate_per_second)
        .and_then(|reward| reward.checked_mul(allocation as i128))
        .map(|reward| reward / total_allocation as i128)
        .ok_or(FarmError::ArithmeticError)
}

/// Accumulator increase for `reward` spread over `total_weight`.
/// Zero weight distributes nothing.
pub fn accumulator_delta(reward: i128, total_weight: i128) -> Result<i128, FarmError> {
    if total_weight <= 0 {
        return Ok(0);
    }

    reward
        .checked_mul(ACC_PRECISION)
        .map(|scaled| scaled / total_weight)
        .ok_or(FarmError::ArithmeticError)
}

/// Reward credited to `weight` at accumulator value `acc`.
pub fn accrued(weight: i128, acc_reward_per_weight: i128) -> Result<i128, FarmError> {
    weight
        .checked_mul(acc_reward_per_weight)
        .map(|scaled| scaled / ACC_PRECISION)
        .ok_or(FarmError::ArithmeticError)
}

/// Reward owed beyond `reward_debt`. The debt is always taken at the weight
/// being settled, so a debt above the accrued amount is an error.
pub fn pending(weight: i128, acc_reward_per_weight: i128, reward_debt: i128) -> Result<i128, FarmError> {
    let pending = accrued(weight, acc_reward_per_weight)?
        .checked_sub(reward_debt)
        .ok_or(FarmError::ArithmeticError)?;
    if pending < 0 {
        return Err(FarmError::ArithmeticError);
    }
    Ok(pending)
}
