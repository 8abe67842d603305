//! Shared data types used across the Cafe contracts.
//! The farm reaches the rewarder and the RENT token only through the types
//! and client interfaces declared here.
#![no_std]
use soroban_sdk::{contractclient, contracttype, Address, Env, Vec};

pub mod access;

// ============================================================================
// Access Control
// ============================================================================

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// Emission rate, fee sink and propagation bound.
    Manager,
    /// Pool registry (add / patch).
    PoolManager,
    /// Weight updates coming from ownership effects.
    UserUpdater,
}

// ============================================================================
// Cross-Contract Communication Types
// ============================================================================

/// Signed change applied to a user's multiplier (basis points) and bonus.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeightDelta {
    pub multiplier_bps: i128,
    pub bonus: i128,
}

/// Recomputed total weight of a user in one pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolTotal {
    pub pool_id: u32,
    pub total: i128,
}

/// One bounded step of a global weight propagation, as returned by the
/// rewarder to the farm.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlobalSweep {
    pub complete: bool,
    pub cursor: u32,
    pub totals: Vec<PoolTotal>,
}

/// Progress reported by the farm to the caller of `update_user_all_pools`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Propagation {
    pub complete: bool,
    pub cursor: u32,
    pub processed: u32,
}

// ============================================================================
// Contract Interfaces
// ============================================================================

/// Weight engine as seen from the farm. Failures abort the calling
/// transaction unchanged.
#[contractclient(name = "WeightEngineClient")]
pub trait WeightEngineInterface {
    fn set_base_balance(env: Env, caller: Address, pool_id: u32, user: Address, balance: i128)
        -> i128;

    fn apply_local_delta(
        env: Env,
        caller: Address,
        pool_id: u32,
        user: Address,
        delta: WeightDelta,
    ) -> i128;

    fn apply_global_delta(
        env: Env,
        caller: Address,
        user: Address,
        delta: WeightDelta,
        max_pools: u32,
        pool_count: u32,
    ) -> GlobalSweep;

    fn user_pools(env: Env, user: Address) -> Vec<u32>;
}

/// Mintable, capped reward token as seen from the farm.
#[contractclient(name = "RewardTokenClient")]
pub trait RewardTokenInterface {
    fn mint(env: Env, to: Address, amount: i128);
}

// ============================================================================
// Utility Functions for Validation and Basis Points
// ============================================================================

/// Share of `amount` expressed in basis points, rounded down.
/// `None` on overflow.
pub fn apply_bps(amount: i128, bps: u32) -> Option<i128> {
    amount.checked_mul(i128::from(bps))?.checked_div(MAX_BASIS_POINTS)
}

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: i128) -> bool {
    amount > 0
}

/// Validate a pool withdraw fee against the protocol cap
pub fn validate_withdraw_fee(fee_bps: u32) -> bool {
    fee_bps <= MAX_WITHDRAW_FEE_BPS
}

impl WeightDelta {
    pub fn new(multiplier_bps: i128, bonus: i128) -> Self {
        Self {
            multiplier_bps,
            bonus,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.multiplier_bps == 0 && self.bonus == 0
    }
}

// ============================================================================
// Constants
// ============================================================================

/// Basis points representing 100% (10000 basis points = 100%)
pub const MAX_BASIS_POINTS: i128 = 10_000;

/// Fixed-point scale of the reward-per-weight accumulator
pub const ACC_PRECISION: i128 = 1_000_000_000_000;

/// Highest withdraw fee a pool may charge (5%)
pub const MAX_WITHDRAW_FEE_BPS: u32 = 500;

/// Emission multiplier applied before the bonus period ends
pub const DEFAULT_BONUS_MULTIPLIER: i128 = 10;

/// Developer share minted on top of every payout (10%)
pub const DEFAULT_DEV_SHARE_BPS: u32 = 1_000;

/// Pools touched per call when propagating a global weight change
pub const DEFAULT_MAX_POOLS_PER_CALL: u32 = 20;

/// RENT supply cap: 10M tokens with 7 decimals
pub const RENT_CAP: i128 = 10_000_000_0000000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_bps_rounds_down() {
        assert_eq!(apply_bps(1000, 500), Some(50));
        assert_eq!(apply_bps(999, 1), Some(0));
        assert_eq!(apply_bps(1000, 0), Some(0));
        assert_eq!(apply_bps(i128::MAX, 2), None);
        assert_eq!(apply_bps(10_000, u32::MAX), Some(i128::from(u32::MAX)));
    }

    #[test]
    fn test_withdraw_fee_cap() {
        assert!(validate_withdraw_fee(0));
        assert!(validate_withdraw_fee(500));
        assert!(!validate_withdraw_fee(501));
    }

    #[test]
    fn test_weight_delta_zero() {
        assert!(WeightDelta::new(0, 0).is_zero());
        assert!(!WeightDelta::new(0, -1).is_zero());
        assert!(!WeightDelta::new(100, 0).is_zero());
    }
}
