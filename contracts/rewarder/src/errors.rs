use soroban_sdk::contracterror;

// Codes start at 101 so they never collide with the farm's own codes when a
// failure passes through a farm call.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RewarderError {
    NotInitialized = 101,
    AlreadyInitialized = 102,
    PermissionDenied = 103,
    InvalidAmount = 104,
    InvalidBatchSize = 105,
    ArithmeticError = 106,
}
