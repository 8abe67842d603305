use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::weight::{GlobalComponents, PoolComponents};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Initialized,
    PoolWeight(u32, Address),
    GlobalWeight(Address),
    Footprint(Address),
    Member(u32, Address),
    Cursor(Address),
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Initialized)
}

pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
}

// Weight components. Neutral entries are removed instead of stored.
pub fn find_pool_components(env: &Env, pool_id: u32, user: &Address) -> Option<PoolComponents> {
    env.storage()
        .persistent()
        .get(&DataKey::PoolWeight(pool_id, user.clone()))
}

pub fn get_pool_components(env: &Env, pool_id: u32, user: &Address) -> PoolComponents {
    find_pool_components(env, pool_id, user).unwrap_or_default()
}

pub fn set_pool_components(env: &Env, pool_id: u32, user: &Address, components: &PoolComponents) {
    let key = DataKey::PoolWeight(pool_id, user.clone());
    if components.is_neutral() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, components);
    }
}

pub fn get_global_components(env: &Env, user: &Address) -> GlobalComponents {
    env.storage()
        .persistent()
        .get(&DataKey::GlobalWeight(user.clone()))
        .unwrap_or_default()
}

pub fn set_global_components(env: &Env, user: &Address, components: &GlobalComponents) {
    let key = DataKey::GlobalWeight(user.clone());
    if components.is_neutral() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, components);
    }
}

// Touched-pool set: append-only, deduplicated through a membership flag.
pub fn get_footprint(env: &Env, user: &Address) -> Vec<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::Footprint(user.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn touch_pool(env: &Env, pool_id: u32, user: &Address) {
    let member = DataKey::Member(pool_id, user.clone());
    if env.storage().persistent().has(&member) {
        return;
    }

    let mut footprint = get_footprint(env, user);
    footprint.push_back(pool_id);
    env.storage()
        .persistent()
        .set(&DataKey::Footprint(user.clone()), &footprint);
    env.storage().persistent().set(&member, &true);
}

pub fn get_cursor(env: &Env, user: &Address) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::Cursor(user.clone()))
        .unwrap_or(0)
}

pub fn set_cursor(env: &Env, user: &Address, cursor: u32) {
    let key = DataKey::Cursor(user.clone());
    if cursor == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &cursor);
    }
}
