#![no_std]

mod errors;
mod storage;
mod weight;

use cafe_shared::{access, GlobalSweep, PoolTotal, Role, WeightDelta};
use soroban_sdk::{contract, contractimpl, contracttype, log, symbol_short, Address, Env, Vec};

pub use errors::RewarderError;
pub use weight::{GlobalComponents, PoolComponents};

// Events
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BalanceUpdatedEvent {
    pub pool_id: u32,
    pub user: Address,
    pub balance: i128,
    pub total: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalWeightUpdatedEvent {
    pub pool_id: u32,
    pub user: Address,
    pub multiplier_bps: i128,
    pub bonus: i128,
    pub total: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlobalWeightUpdatedEvent {
    pub user: Address,
    pub multiplier_bps: i128,
    pub bonus: i128,
    pub complete: bool,
    pub cursor: u32,
}

/// Weight engine: composes each user's effective weight per pool from the
/// staked base balance and the multipliers/bonuses granted by ownership
/// effects. The farm holds `Role::UserUpdater` here and is the only writer.
#[contract]
pub struct Rewarder;

#[contractimpl]
impl Rewarder {
    pub fn initialize(env: Env, admin: Address) -> Result<(), RewarderError> {
        if storage::is_initialized(&env) {
            return Err(RewarderError::AlreadyInitialized);
        }

        admin.require_auth();

        access::set_admin(&env, &admin);
        storage::set_initialized(&env);

        log!(&env, "Rewarder initialized by admin: {}", admin);

        Ok(())
    }

    pub fn grant_role(
        env: Env,
        admin: Address,
        role: Role,
        account: Address,
    ) -> Result<(), RewarderError> {
        Self::require_admin(&env, &admin)?;
        access::grant_role(&env, role, &account);
        log!(&env, "Role {:?} granted to {}", role, account);
        Ok(())
    }

    pub fn revoke_role(
        env: Env,
        admin: Address,
        role: Role,
        account: Address,
    ) -> Result<(), RewarderError> {
        Self::require_admin(&env, &admin)?;
        access::revoke_role(&env, role, &account);
        log!(&env, "Role {:?} revoked from {}", role, account);
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    /// Overwrite the staked base balance and return the new total for that
    /// pool only.
    pub fn set_base_balance(
        env: Env,
        caller: Address,
        pool_id: u32,
        user: Address,
        balance: i128,
    ) -> Result<i128, RewarderError> {
        Self::require_updater(&env, &caller)?;

        if balance < 0 {
            return Err(RewarderError::InvalidAmount);
        }

        let mut components = storage::get_pool_components(&env, pool_id, &user);
        components.base_balance = balance;

        let global = storage::get_global_components(&env, &user);
        let total = weight::total_weight(&components, &global)?;

        storage::set_pool_components(&env, pool_id, &user, &components);
        storage::touch_pool(&env, pool_id, &user);

        env.events().publish(
            (symbol_short!("balance"), pool_id),
            BalanceUpdatedEvent {
                pool_id,
                user,
                balance,
                total,
            },
        );

        Ok(total)
    }

    /// Accumulate a pool-local multiplier/bonus change and return the new
    /// total for that pool.
    pub fn apply_local_delta(
        env: Env,
        caller: Address,
        pool_id: u32,
        user: Address,
        delta: WeightDelta,
    ) -> Result<i128, RewarderError> {
        Self::require_updater(&env, &caller)?;

        let mut components = storage::get_pool_components(&env, pool_id, &user);
        components.accumulate(&delta)?;

        let global = storage::get_global_components(&env, &user);
        let total = weight::total_weight(&components, &global)?;

        storage::set_pool_components(&env, pool_id, &user, &components);
        storage::touch_pool(&env, pool_id, &user);

        env.events().publish(
            (symbol_short!("local"), pool_id),
            LocalWeightUpdatedEvent {
                pool_id,
                user,
                multiplier_bps: components.multiplier_bps,
                bonus: components.bonus,
                total,
            },
        );

        Ok(total)
    }

    /// Accumulate a global change once, then recompute at most `max_pools`
    /// totals starting from the user's cursor.
    ///
    /// While the user's global bonus is non-zero every pool below
    /// `pool_count` carries weight, so the sweep walks pool ids; otherwise it
    /// walks the touched-pool set. A non-zero delta restarts the sweep, a zero
    /// delta resumes it. The cursor is reset to 0 once the sweep completes.
    pub fn apply_global_delta(
        env: Env,
        caller: Address,
        user: Address,
        delta: WeightDelta,
        max_pools: u32,
        pool_count: u32,
    ) -> Result<GlobalSweep, RewarderError> {
        Self::require_updater(&env, &caller)?;

        if max_pools == 0 {
            return Err(RewarderError::InvalidBatchSize);
        }

        let mut global = storage::get_global_components(&env, &user);
        global.accumulate(&delta)?;
        storage::set_global_components(&env, &user, &global);

        let start = if delta.is_zero() {
            storage::get_cursor(&env, &user)
        } else {
            0
        };

        let footprint = storage::get_footprint(&env, &user);
        let every_pool = global.bonus != 0;
        let domain = if every_pool { pool_count } else { footprint.len() };
        let end = start.saturating_add(max_pools).min(domain);

        let mut totals = Vec::new(&env);
        for index in start..end {
            let pool_id = if every_pool {
                index
            } else {
                match footprint.get(index) {
                    Some(pool_id) => pool_id,
                    None => break,
                }
            };

            let components = storage::get_pool_components(&env, pool_id, &user);
            let total = weight::total_weight(&components, &global)?;
            storage::touch_pool(&env, pool_id, &user);

            totals.push_back(PoolTotal { pool_id, total });
        }

        let complete = end >= domain;
        let cursor = if complete { 0 } else { end };
        storage::set_cursor(&env, &user, cursor);

        env.events().publish(
            (symbol_short!("global"),),
            GlobalWeightUpdatedEvent {
                user: user.clone(),
                multiplier_bps: global.multiplier_bps,
                bonus: global.bonus,
                complete,
                cursor,
            },
        );

        log!(
            &env,
            "Global weight for {} swept {} pools, complete: {}",
            user,
            totals.len(),
            complete
        );

        Ok(GlobalSweep {
            complete,
            cursor,
            totals,
        })
    }

    // Getter functions
    pub fn total(env: Env, pool_id: u32, user: Address) -> Result<i128, RewarderError> {
        let components = storage::get_pool_components(&env, pool_id, &user);
        let global = storage::get_global_components(&env, &user);
        weight::total_weight(&components, &global)
    }

    pub fn pool_components(env: Env, pool_id: u32, user: Address) -> Option<PoolComponents> {
        storage::find_pool_components(&env, pool_id, &user)
    }

    pub fn global_components(env: Env, user: Address) -> GlobalComponents {
        storage::get_global_components(&env, &user)
    }

    pub fn user_pools(env: Env, user: Address) -> Vec<u32> {
        storage::get_footprint(&env, &user)
    }

    pub fn cursor(env: Env, user: Address) -> u32 {
        storage::get_cursor(&env, &user)
    }

    // Internal helper functions
    fn require_admin(env: &Env, admin: &Address) -> Result<(), RewarderError> {
        admin.require_auth();

        if !storage::is_initialized(env) {
            return Err(RewarderError::NotInitialized);
        }
        if !access::is_admin(env, admin) {
            return Err(RewarderError::PermissionDenied);
        }
        Ok(())
    }

    fn require_updater(env: &Env, caller: &Address) -> Result<(), RewarderError> {
        caller.require_auth();

        if !storage::is_initialized(env) {
            return Err(RewarderError::NotInitialized);
        }
        if !access::has_role(env, Role::UserUpdater, caller) {
            return Err(RewarderError::PermissionDenied);
        }
        Ok(())
    }
}

mod test;
