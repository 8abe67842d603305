use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FarmError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    PermissionDenied = 3,
    PoolNotFound = 4,
    DuplicateToken = 5,
    FeeTooHigh = 6,
    InvalidAmount = 7,
    InsufficientBalance = 8,
    EmptyPoolList = 9,
    ArithmeticError = 10,
    InvalidConfiguration = 11,

    // Weight engine failures, same codes as `RewarderError`
    EngineNotInitialized = 101,
    EnginePermissionDenied = 103,
    EngineInvalidAmount = 104,
    EngineInvalidBatchSize = 105,
    WeightArithmeticError = 106,

    // RENT token failures, same codes as `TokenError`
    RewardTokenNotInitialized = 201,
    RewardTokenUnauthorized = 203,
    RewardTokenInvalidAmount = 204,
    CapExceeded = 205,
}
