use soroban_sdk::{contracttype, Address};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    pub admin: Address,
    pub reward_token: Address,
    pub weight_engine: Address,
    pub dev_address: Address,
    pub fee_address: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Emission {
    pub rate_per_second: i128,
    pub start_timestamp: u64,
    pub bonus_end_timestamp: u64,
    pub bonus_multiplier: i128,
    pub dev_share_bps: u32, // Minted to the dev address on every payout
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolInfo {
    pub token: Address,
    pub allocation: u32,
    pub last_reward_timestamp: u64,
    pub acc_reward_per_weight: i128, // Scaled by ACC_PRECISION
    pub total_staked: i128,
    pub total_weight: i128,
    pub withdraw_fee_bps: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserPosition {
    pub staked: i128,
    pub weight: i128,
    pub reward_debt: i128,
}

// Storage Keys
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    Emission,
    TotalAllocation,
    PoolCount,
    MaxPoolsPerCall,
    Pool(u32),
    PoolToken(Address),
    Position(u32, Address),
}
