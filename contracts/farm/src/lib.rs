#![no_std]

mod emission;
mod errors;
mod events;
mod storage;
mod types;

use cafe_shared::{
    access, apply_bps, validate_positive_amount, validate_withdraw_fee, Propagation,
    RewardTokenClient, Role, WeightDelta, WeightEngineClient, DEFAULT_BONUS_MULTIPLIER,
    DEFAULT_DEV_SHARE_BPS,
};
use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Vec};

pub use errors::FarmError;
pub use events::{
    EmergencyWithdrawnEvent, HarvestedEvent, PoolAccruedEvent, PoolAddedEvent, PoolPatchedEvent,
    PropagationEvent, StakeChangedEvent, WithdrawEvent,
};
pub use types::{DataKey, Emission, FarmConfig, PoolInfo, UserPosition};

/// Pool ledger: stakes, lazily accrued RENT emission and payouts.
///
/// Rewards are split by weight, not by stake. Weights come from the weight
/// engine (`cafe-rewarder`), and the ledger caches the last value it received
/// per position. Every path that changes a cached weight settles the pool and
/// pays pending RENT at the old weight first.
#[contract]
pub struct Cafe;

#[contractimpl]
impl Cafe {
    /// Initialize the farm. The admin receives the manager roles.
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token: Address,
        weight_engine: Address,
        dev_address: Address,
        fee_address: Address,
        rate_per_second: i128,
        start_timestamp: u64,
        bonus_end_timestamp: u64,
    ) -> Result<(), FarmError> {
        if storage::is_initialized(&env) {
            return Err(FarmError::AlreadyInitialized);
        }

        if rate_per_second < 0 || bonus_end_timestamp < start_timestamp {
            return Err(FarmError::InvalidConfiguration);
        }

        admin.require_auth();

        let config = FarmConfig {
            admin: admin.clone(),
            reward_token,
            weight_engine,
            dev_address,
            fee_address,
        };
        let emission = Emission {
            rate_per_second,
            start_timestamp,
            bonus_end_timestamp,
            bonus_multiplier: DEFAULT_BONUS_MULTIPLIER,
            dev_share_bps: DEFAULT_DEV_SHARE_BPS,
        };

        storage::set_config(&env, &config);
        storage::set_emission(&env, &emission);
        storage::set_total_allocation(&env, 0);
        access::set_admin(&env, &admin);
        access::grant_role(&env, Role::Manager, &admin);
        access::grant_role(&env, Role::PoolManager, &admin);

        log!(&env, "Cafe initialized by admin: {}", admin);

        Ok(())
    }

    pub fn grant_role(
        env: Env,
        admin: Address,
        role: Role,
        account: Address,
    ) -> Result<(), FarmError> {
        Self::require_admin(&env, &admin)?;
        access::grant_role(&env, role, &account);

        events::role_changed(
            &env,
            events::RoleChangedEvent {
                role,
                account,
                granted: true,
            },
        );
        Ok(())
    }

    pub fn revoke_role(
        env: Env,
        admin: Address,
        role: Role,
        account: Address,
    ) -> Result<(), FarmError> {
        Self::require_admin(&env, &admin)?;
        access::revoke_role(&env, role, &account);

        events::role_changed(
            &env,
            events::RoleChangedEvent {
                role,
                account,
                granted: false,
            },
        );
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access::has_role(&env, role, &account)
    }

    // Pool registry

    /// Register a staking token as a new pool and return its id.
    pub fn add_pool(
        env: Env,
        caller: Address,
        allocation: u32,
        token: Address,
        withdraw_fee_bps: u32,
    ) -> Result<u32, FarmError> {
        Self::require_role(&env, &caller, Role::PoolManager)?;

        if storage::has_pool_token(&env, &token) {
            return Err(FarmError::DuplicateToken);
        }
        if !validate_withdraw_fee(withdraw_fee_bps) {
            return Err(FarmError::FeeTooHigh);
        }

        // Time accrued so far belongs to the current allocation mix
        Self::settle_all_pools(&env)?;

        let total_allocation = storage::get_total_allocation(&env)
            .checked_add(allocation)
            .ok_or(FarmError::ArithmeticError)?;

        let emission = storage::get_emission(&env)?;
        let pool = PoolInfo {
            token: token.clone(),
            allocation,
            last_reward_timestamp: env.ledger().timestamp().max(emission.start_timestamp),
            acc_reward_per_weight: 0,
            total_staked: 0,
            total_weight: 0,
            withdraw_fee_bps,
        };

        let pool_id = storage::push_pool(&env, &pool);
        storage::set_total_allocation(&env, total_allocation);

        events::pool_added(
            &env,
            PoolAddedEvent {
                pool_id,
                token: token.clone(),
                allocation,
                withdraw_fee_bps,
            },
        );

        log!(&env, "Pool {} added for token {} with allocation {}", pool_id, token, allocation);

        Ok(pool_id)
    }

    pub fn patch_pool(
        env: Env,
        caller: Address,
        pool_id: u32,
        allocation: u32,
        withdraw_fee_bps: u32,
    ) -> Result<(), FarmError> {
        Self::require_role(&env, &caller, Role::PoolManager)?;

        storage::get_pool(&env, pool_id)?;
        if !validate_withdraw_fee(withdraw_fee_bps) {
            return Err(FarmError::FeeTooHigh);
        }

        // Allocation is a share of the global emission, so every pool is affected
        Self::settle_all_pools(&env)?;

        let mut pool = storage::get_pool(&env, pool_id)?;
        let total_allocation = storage::get_total_allocation(&env)
            .checked_sub(pool.allocation)
            .and_then(|total| total.checked_add(allocation))
            .ok_or(FarmError::ArithmeticError)?;

        pool.allocation = allocation;
        pool.withdraw_fee_bps = withdraw_fee_bps;
        storage::set_pool(&env, pool_id, &pool);
        storage::set_total_allocation(&env, total_allocation);

        events::pool_patched(
            &env,
            PoolPatchedEvent {
                pool_id,
                allocation,
                withdraw_fee_bps,
            },
        );

        log!(&env, "Pool {} patched: allocation {}, fee {}", pool_id, allocation, withdraw_fee_bps);

        Ok(())
    }

    /// Bring a pool's accumulator up to the current timestamp.
    pub fn update_pool(env: Env, pool_id: u32) -> Result<PoolInfo, FarmError> {
        Self::settle_pool(&env, pool_id)
    }

    // Staking

    /// Stake `amount` tokens. A zero amount only harvests.
    pub fn deposit(env: Env, user: Address, pool_id: u32, amount: i128) -> Result<(), FarmError> {
        user.require_auth();

        if amount < 0 {
            return Err(FarmError::InvalidAmount);
        }

        let config = storage::get_config(&env)?;
        let pool = Self::checkpoint(&env, &config, &user, pool_id, amount)?;

        if validate_positive_amount(amount) {
            token::Client::new(&env, &pool.token).transfer(
                &user,
                &env.current_contract_address(),
                &amount,
            );

            events::deposited(
                &env,
                events::DepositEvent {
                    user: user.clone(),
                    pool_id,
                    amount,
                },
            );
        }

        Ok(())
    }

    /// Unstake `amount` tokens. The pool's withdraw fee goes to the fee
    /// address; the remainder is returned.
    pub fn withdraw(env: Env, user: Address, pool_id: u32, amount: i128) -> Result<i128, FarmError> {
        user.require_auth();

        if amount < 0 {
            return Err(FarmError::InvalidAmount);
        }

        let config = storage::get_config(&env)?;
        storage::get_pool(&env, pool_id)?;
        if amount > storage::get_position(&env, pool_id, &user).staked {
            return Err(FarmError::InsufficientBalance);
        }

        let pool = Self::checkpoint(&env, &config, &user, pool_id, -amount)?;

        let fee = apply_bps(amount, pool.withdraw_fee_bps).ok_or(FarmError::ArithmeticError)?;
        let returned = amount.checked_sub(fee).ok_or(FarmError::ArithmeticError)?;

        let stake_token = token::Client::new(&env, &pool.token);
        let farm = env.current_contract_address();
        if fee > 0 {
            stake_token.transfer(&farm, &config.fee_address, &fee);
        }
        if returned > 0 {
            stake_token.transfer(&farm, &user, &returned);
        }

        if amount > 0 {
            events::withdrawn(
                &env,
                WithdrawEvent {
                    user,
                    pool_id,
                    amount,
                    fee,
                },
            );
        }

        Ok(returned)
    }

    /// Pay out pending RENT for one pool and return the amount paid.
    pub fn harvest(env: Env, user: Address, pool_id: u32) -> Result<i128, FarmError> {
        user.require_auth();

        let config = storage::get_config(&env)?;
        let (pool, position, paid) = Self::settle_and_pay(&env, &config, &user, pool_id)?;
        Self::refresh_base_balance(&env, &config, &user, pool_id, pool, position)?;

        Ok(paid)
    }

    /// Harvest every pool the user ever touched.
    pub fn harvest_all(env: Env, user: Address) -> Result<i128, FarmError> {
        user.require_auth();

        let config = storage::get_config(&env)?;
        let engine = WeightEngineClient::new(&env, &config.weight_engine);

        let mut paid: i128 = 0;
        for pool_id in engine.user_pools(&user).iter() {
            let (pool, position, amount) = Self::settle_and_pay(&env, &config, &user, pool_id)?;
            Self::refresh_base_balance(&env, &config, &user, pool_id, pool, position)?;
            paid = paid.checked_add(amount).ok_or(FarmError::ArithmeticError)?;
        }

        log!(&env, "User {} harvested {} across all pools", user, paid);

        Ok(paid)
    }

    /// Return the whole stake without settling. Unpaid RENT is forfeited.
    pub fn emergency_withdraw(env: Env, user: Address, pool_id: u32) -> Result<i128, FarmError> {
        user.require_auth();

        let config = storage::get_config(&env)?;
        let mut pool = storage::get_pool(&env, pool_id)?;
        let position = storage::get_position(&env, pool_id, &user);

        // Informational only, the stored accumulator may be behind
        let forfeited = emission::pending(
            position.weight,
            pool.acc_reward_per_weight,
            position.reward_debt,
        )?;

        let amount = position.staked;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(FarmError::ArithmeticError)?;
        pool.total_weight = pool
            .total_weight
            .checked_sub(position.weight)
            .ok_or(FarmError::ArithmeticError)?;

        WeightEngineClient::new(&env, &config.weight_engine).set_base_balance(
            &env.current_contract_address(),
            &pool_id,
            &user,
            &0,
        );

        storage::set_pool(&env, pool_id, &pool);
        storage::set_position(&env, pool_id, &user, &UserPosition::default());

        if amount > 0 {
            token::Client::new(&env, &pool.token).transfer(
                &env.current_contract_address(),
                &user,
                &amount,
            );
        }

        events::emergency_withdrawn(
            &env,
            EmergencyWithdrawnEvent {
                user: user.clone(),
                pool_id,
                amount,
                forfeited,
            },
        );

        log!(&env, "Emergency withdraw of {} from pool {} by {}", amount, pool_id, user);

        Ok(amount)
    }

    // Weight updates

    /// Apply a pool-local weight change to each listed pool. A pool listed
    /// twice receives the change twice.
    pub fn update_user_pools(
        env: Env,
        caller: Address,
        user: Address,
        pool_ids: Vec<u32>,
        delta: WeightDelta,
    ) -> Result<(), FarmError> {
        Self::require_role(&env, &caller, Role::UserUpdater)?;

        if pool_ids.is_empty() {
            return Err(FarmError::EmptyPoolList);
        }
        for pool_id in pool_ids.iter() {
            storage::get_pool(&env, pool_id)?;
        }

        let config = storage::get_config(&env)?;
        let engine = WeightEngineClient::new(&env, &config.weight_engine);

        for pool_id in pool_ids.iter() {
            let (pool, position, _) = Self::settle_and_pay(&env, &config, &user, pool_id)?;
            let weight =
                engine.apply_local_delta(&env.current_contract_address(), &pool_id, &user, &delta);
            Self::commit_weight(&env, &user, pool_id, pool, position, weight)?;
        }

        Ok(())
    }

    /// Apply a global weight change and propagate it to at most
    /// `max_pools_per_call` pools. Call `resume_user_all_pools` until the
    /// returned progress is complete.
    pub fn update_user_all_pools(
        env: Env,
        caller: Address,
        user: Address,
        delta: WeightDelta,
    ) -> Result<Propagation, FarmError> {
        Self::require_role(&env, &caller, Role::UserUpdater)?;
        Self::propagate(&env, &user, &delta)
    }

    /// Continue an unfinished propagation from the stored cursor.
    pub fn resume_user_all_pools(
        env: Env,
        caller: Address,
        user: Address,
    ) -> Result<Propagation, FarmError> {
        Self::require_role(&env, &caller, Role::UserUpdater)?;
        Self::propagate(&env, &user, &WeightDelta::new(0, 0))
    }

    /// Pending RENT as if the pool were settled now.
    pub fn pending_rent(env: Env, pool_id: u32, user: Address) -> Result<i128, FarmError> {
        let pool = storage::get_pool(&env, pool_id)?;
        let position = storage::get_position(&env, pool_id, &user);

        let mut acc_reward_per_weight = pool.acc_reward_per_weight;
        let now = env.ledger().timestamp();
        if now > pool.last_reward_timestamp && pool.total_weight > 0 {
            let acc_delta = Self::accrual_since(&env, &pool, now)?;
            acc_reward_per_weight = acc_reward_per_weight
                .checked_add(acc_delta)
                .ok_or(FarmError::ArithmeticError)?;
        }

        emission::pending(position.weight, acc_reward_per_weight, position.reward_debt)
    }

    // Admin functions

    pub fn set_rate(env: Env, caller: Address, rate_per_second: i128) -> Result<(), FarmError> {
        Self::require_role(&env, &caller, Role::Manager)?;

        if rate_per_second < 0 {
            return Err(FarmError::InvalidAmount);
        }

        // Past time is paid at the old rate
        Self::settle_all_pools(&env)?;

        let mut emission = storage::get_emission(&env)?;
        emission.rate_per_second = rate_per_second;
        storage::set_emission(&env, &emission);

        events::rate_set(&env, rate_per_second);
        log!(&env, "Emission rate set to {} per second", rate_per_second);

        Ok(())
    }

    pub fn set_fee_address(env: Env, caller: Address, fee_address: Address) -> Result<(), FarmError> {
        Self::require_role(&env, &caller, Role::Manager)?;

        let mut config = storage::get_config(&env)?;
        config.fee_address = fee_address.clone();
        storage::set_config(&env, &config);

        events::fee_address_set(&env, fee_address);
        Ok(())
    }

    /// Only the current dev address may hand over its share.
    pub fn set_dev_address(env: Env, dev: Address, dev_address: Address) -> Result<(), FarmError> {
        dev.require_auth();

        let mut config = storage::get_config(&env)?;
        if config.dev_address != dev {
            return Err(FarmError::PermissionDenied);
        }

        config.dev_address = dev_address.clone();
        storage::set_config(&env, &config);

        events::dev_address_set(&env, dev_address.clone());
        log!(&env, "Dev address changed from {} to {}", dev, dev_address);

        Ok(())
    }

    pub fn set_max_pools_per_call(env: Env, caller: Address, max_pools: u32) -> Result<(), FarmError> {
        Self::require_role(&env, &caller, Role::Manager)?;

        if max_pools == 0 {
            return Err(FarmError::InvalidConfiguration);
        }

        storage::set_max_pools_per_call(&env, max_pools);
        events::max_pools_set(&env, max_pools);
        Ok(())
    }

    // Getter functions
    pub fn get_config(env: Env) -> Result<FarmConfig, FarmError> {
        storage::get_config(&env)
    }

    pub fn get_emission(env: Env) -> Result<Emission, FarmError> {
        storage::get_emission(&env)
    }

    pub fn pool_length(env: Env) -> u32 {
        storage::pool_count(&env)
    }

    pub fn total_allocation(env: Env) -> u32 {
        storage::get_total_allocation(&env)
    }

    pub fn get_pool(env: Env, pool_id: u32) -> Result<PoolInfo, FarmError> {
        storage::get_pool(&env, pool_id)
    }

    pub fn get_position(env: Env, pool_id: u32, user: Address) -> UserPosition {
        storage::get_position(&env, pool_id, &user)
    }

    /// True when every id refers to an existing pool.
    pub fn has_pools(env: Env, pool_ids: Vec<u32>) -> bool {
        let count = storage::pool_count(&env);
        pool_ids.iter().all(|pool_id| pool_id < count)
    }

    pub fn max_pools_per_call(env: Env) -> u32 {
        storage::get_max_pools_per_call(&env)
    }

    // Internal helper functions

    fn accrual_since(env: &Env, pool: &PoolInfo, now: u64) -> Result<i128, FarmError> {
        let emission = storage::get_emission(env)?;
        let multiplier = emission::reward_multiplier(pool.last_reward_timestamp, now, &emission)?;
        let reward = emission::pool_reward(
            multiplier,
            emission.rate_per_second,
            pool.allocation,
            storage::get_total_allocation(env),
        )?;
        emission::accumulator_delta(reward, pool.total_weight)
    }

    fn settle_pool(env: &Env, pool_id: u32) -> Result<PoolInfo, FarmError> {
        let mut pool = storage::get_pool(env, pool_id)?;

        let now = env.ledger().timestamp();
        if now <= pool.last_reward_timestamp {
            return Ok(pool);
        }

        // Zero weight: the interval's emission is dropped, only the clock moves
        let acc_delta = Self::accrual_since(env, &pool, now)?;
        pool.acc_reward_per_weight = pool
            .acc_reward_per_weight
            .checked_add(acc_delta)
            .ok_or(FarmError::ArithmeticError)?;
        pool.last_reward_timestamp = now;
        storage::set_pool(env, pool_id, &pool);

        events::pool_accrued(
            env,
            PoolAccruedEvent {
                pool_id,
                timestamp: now,
                total_staked: pool.total_staked,
                total_weight: pool.total_weight,
                acc_delta,
            },
        );

        Ok(pool)
    }

    fn settle_all_pools(env: &Env) -> Result<(), FarmError> {
        for pool_id in 0..storage::pool_count(env) {
            Self::settle_pool(env, pool_id)?;
        }
        Ok(())
    }

    /// Settle the pool and pay the user's pending RENT at the cached weight.
    fn settle_and_pay(
        env: &Env,
        config: &FarmConfig,
        user: &Address,
        pool_id: u32,
    ) -> Result<(PoolInfo, UserPosition, i128), FarmError> {
        let pool = Self::settle_pool(env, pool_id)?;
        let position = storage::get_position(env, pool_id, user);

        let amount = emission::pending(
            position.weight,
            pool.acc_reward_per_weight,
            position.reward_debt,
        )?;
        if amount > 0 {
            Self::pay(env, config, user, amount)?;
            events::harvested(
                env,
                HarvestedEvent {
                    user: user.clone(),
                    pool_id,
                    amount,
                },
            );
        }

        Ok((pool, position, amount))
    }

    fn pay(env: &Env, config: &FarmConfig, user: &Address, amount: i128) -> Result<(), FarmError> {
        let emission = storage::get_emission(env)?;
        let dev_share = apply_bps(amount, emission.dev_share_bps).ok_or(FarmError::ArithmeticError)?;

        let reward_token = RewardTokenClient::new(env, &config.reward_token);
        reward_token.mint(user, &amount);
        if dev_share > 0 {
            reward_token.mint(&config.dev_address, &dev_share);
        }
        Ok(())
    }

    /// Settle, pay, move the stake by `stake_delta` and store the weight the
    /// engine derives from the new stake.
    fn checkpoint(
        env: &Env,
        config: &FarmConfig,
        user: &Address,
        pool_id: u32,
        stake_delta: i128,
    ) -> Result<PoolInfo, FarmError> {
        let (mut pool, mut position, _) = Self::settle_and_pay(env, config, user, pool_id)?;

        position.staked = position
            .staked
            .checked_add(stake_delta)
            .ok_or(FarmError::ArithmeticError)?;
        if position.staked < 0 {
            return Err(FarmError::InsufficientBalance);
        }
        pool.total_staked = pool
            .total_staked
            .checked_add(stake_delta)
            .ok_or(FarmError::ArithmeticError)?;

        Self::refresh_base_balance(env, config, user, pool_id, pool, position)
    }

    fn refresh_base_balance(
        env: &Env,
        config: &FarmConfig,
        user: &Address,
        pool_id: u32,
        pool: PoolInfo,
        position: UserPosition,
    ) -> Result<PoolInfo, FarmError> {
        let weight = WeightEngineClient::new(env, &config.weight_engine).set_base_balance(
            &env.current_contract_address(),
            &pool_id,
            user,
            &position.staked,
        );
        Self::commit_weight(env, user, pool_id, pool, position, weight)
    }

    /// Swap the cached weight for `weight` and reset the debt against the
    /// current accumulator. The caller must have settled and paid first.
    fn commit_weight(
        env: &Env,
        user: &Address,
        pool_id: u32,
        mut pool: PoolInfo,
        mut position: UserPosition,
        weight: i128,
    ) -> Result<PoolInfo, FarmError> {
        pool.total_weight = pool
            .total_weight
            .checked_sub(position.weight)
            .and_then(|total| total.checked_add(weight))
            .ok_or(FarmError::ArithmeticError)?;
        position.weight = weight;
        position.reward_debt = emission::accrued(weight, pool.acc_reward_per_weight)?;

        storage::set_pool(env, pool_id, &pool);
        storage::set_position(env, pool_id, user, &position);

        events::stake_changed(
            env,
            StakeChangedEvent {
                user: user.clone(),
                pool_id,
                staked: position.staked,
                weight,
            },
        );

        Ok(pool)
    }

    fn propagate(env: &Env, user: &Address, delta: &WeightDelta) -> Result<Propagation, FarmError> {
        let config = storage::get_config(env)?;
        let engine = WeightEngineClient::new(env, &config.weight_engine);

        // The engine moves its weights first; the ledger still caches the old
        // ones, so each pool is settled and paid at the old weight below.
        let sweep = engine.apply_global_delta(
            &env.current_contract_address(),
            user,
            delta,
            &storage::get_max_pools_per_call(env),
            &storage::pool_count(env),
        );

        for pool_total in sweep.totals.iter() {
            let (pool, position, _) = Self::settle_and_pay(env, &config, user, pool_total.pool_id)?;
            Self::commit_weight(env, user, pool_total.pool_id, pool, position, pool_total.total)?;
        }

        let progress = Propagation {
            complete: sweep.complete,
            cursor: sweep.cursor,
            processed: sweep.totals.len(),
        };

        events::propagated(
            env,
            PropagationEvent {
                user: user.clone(),
                complete: progress.complete,
                cursor: progress.cursor,
                processed: progress.processed,
            },
        );

        log!(
            env,
            "Propagated weight for {} to {} pools, complete: {}",
            user,
            progress.processed,
            progress.complete
        );

        Ok(progress)
    }

    fn require_admin(env: &Env, admin: &Address) -> Result<(), FarmError> {
        admin.require_auth();

        if !storage::is_initialized(env) {
            return Err(FarmError::NotInitialized);
        }
        if !access::is_admin(env, admin) {
            return Err(FarmError::PermissionDenied);
        }
        Ok(())
    }

    fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), FarmError> {
        caller.require_auth();

        if !storage::is_initialized(env) {
            return Err(FarmError::NotInitialized);
        }
        if !access::has_role(env, role, caller) {
            return Err(FarmError::PermissionDenied);
        }
        Ok(())
    }
}
