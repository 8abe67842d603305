use cafe_shared::Role;
use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub pool_id: u32,
    pub token: Address,
    pub allocation: u32,
    pub withdraw_fee_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolPatchedEvent {
    pub pool_id: u32,
    pub allocation: u32,
    pub withdraw_fee_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAccruedEvent {
    pub pool_id: u32,
    pub timestamp: u64,
    pub total_staked: i128,
    pub total_weight: i128,
    pub acc_delta: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeChangedEvent {
    pub user: Address,
    pub pool_id: u32,
    pub staked: i128,
    pub weight: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HarvestedEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub forfeited: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawEvent {
    pub user: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub fee: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropagationEvent {
    pub user: Address,
    pub complete: bool,
    pub cursor: u32,
    pub processed: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChangedEvent {
    pub role: Role,
    pub account: Address,
    pub granted: bool,
}

pub fn pool_added(env: &Env, event: PoolAddedEvent) {
    env.events().publish((symbol_short!("pool_add"),), event);
}

pub fn pool_patched(env: &Env, event: PoolPatchedEvent) {
    env.events().publish((symbol_short!("pool_pat"),), event);
}

pub fn pool_accrued(env: &Env, event: PoolAccruedEvent) {
    env.events()
        .publish((symbol_short!("accrued"), event.pool_id), event);
}

pub fn stake_changed(env: &Env, event: StakeChangedEvent) {
    env.events()
        .publish((symbol_short!("stake_chg"), event.user.clone()), event);
}

pub fn harvested(env: &Env, event: HarvestedEvent) {
    env.events()
        .publish((symbol_short!("harvested"), event.user.clone()), event);
}

pub fn emergency_withdrawn(env: &Env, event: EmergencyWithdrawnEvent) {
    env.events()
        .publish((symbol_short!("emerg_wd"), event.user.clone()), event);
}

pub fn deposited(env: &Env, event: DepositEvent) {
    env.events()
        .publish((symbol_short!("deposit"), event.user.clone()), event);
}

pub fn withdrawn(env: &Env, event: WithdrawEvent) {
    env.events()
        .publish((symbol_short!("withdraw"), event.user.clone()), event);
}

pub fn propagated(env: &Env, event: PropagationEvent) {
    env.events()
        .publish((symbol_short!("propagate"), event.user.clone()), event);
}

pub fn role_changed(env: &Env, event: RoleChangedEvent) {
    env.events().publish((symbol_short!("role_set"),), event);
}

pub fn rate_set(env: &Env, rate_per_second: i128) {
    env.events()
        .publish((symbol_short!("rate_set"),), rate_per_second);
}

pub fn fee_address_set(env: &Env, fee_address: Address) {
    env.events().publish((symbol_short!("fee_addr"),), fee_address);
}

pub fn dev_address_set(env: &Env, dev_address: Address) {
    env.events().publish((symbol_short!("dev_addr"),), dev_address);
}

pub fn max_pools_set(env: &Env, max_pools: u32) {
    env.events().publish((symbol_short!("max_pools"),), max_pools);
}
