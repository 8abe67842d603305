use cafe_shared::DEFAULT_MAX_POOLS_PER_CALL;
use soroban_sdk::{Address, Env};

use crate::errors::FarmError;
use crate::types::{DataKey, Emission, FarmConfig, PoolInfo, UserPosition};

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<FarmConfig, FarmError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(FarmError::NotInitialized)
}

pub fn set_config(env: &Env, config: &FarmConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn get_emission(env: &Env) -> Result<Emission, FarmError> {
    env.storage()
        .instance()
        .get(&DataKey::Emission)
        .ok_or(FarmError::NotInitialized)
}

pub fn set_emission(env: &Env, emission: &Emission) {
    env.storage().instance().set(&DataKey::Emission, emission);
}

pub fn get_total_allocation(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::TotalAllocation)
        .unwrap_or(0)
}

pub fn set_total_allocation(env: &Env, total: u32) {
    env.storage().instance().set(&DataKey::TotalAllocation, &total);
}

pub fn get_max_pools_per_call(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::MaxPoolsPerCall)
        .unwrap_or(DEFAULT_MAX_POOLS_PER_CALL)
}

pub fn set_max_pools_per_call(env: &Env, max_pools: u32) {
    env.storage()
        .instance()
        .set(&DataKey::MaxPoolsPerCall, &max_pools);
}

// Pools are append-only and addressed by their index.
pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&DataKey::PoolCount).unwrap_or(0)
}

pub fn push_pool(env: &Env, pool: &PoolInfo) -> u32 {
    let pool_id = pool_count(env);
    env.storage().persistent().set(&DataKey::Pool(pool_id), pool);
    env.storage()
        .persistent()
        .set(&DataKey::PoolToken(pool.token.clone()), &pool_id);
    env.storage()
        .instance()
        .set(&DataKey::PoolCount, &(pool_id + 1));
    pool_id
}

pub fn get_pool(env: &Env, pool_id: u32) -> Result<PoolInfo, FarmError> {
    env.storage()
        .persistent()
        .get(&DataKey::Pool(pool_id))
        .ok_or(FarmError::PoolNotFound)
}

pub fn set_pool(env: &Env, pool_id: u32, pool: &PoolInfo) {
    env.storage().persistent().set(&DataKey::Pool(pool_id), pool);
}

pub fn has_pool_token(env: &Env, token: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::PoolToken(token.clone()))
}

pub fn get_position(env: &Env, pool_id: u32, user: &Address) -> UserPosition {
    env.storage()
        .persistent()
        .get(&DataKey::Position(pool_id, user.clone()))
        .unwrap_or_default()
}

pub fn set_position(env: &Env, pool_id: u32, user: &Address, position: &UserPosition) {
    env.storage()
        .persistent()
        .set(&DataKey::Position(pool_id, user.clone()), position);
}
