#![no_std]
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, Address, Env, String,
};

// Data Types
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenConfig {
    pub admin: Address,
    pub minter: Address, // The farm in production
    pub cap: i128,
    pub decimals: u32,
    pub name: String,
    pub symbol: String,
}

// Storage Keys
#[contracttype]
pub enum DataKey {
    Config,
    TotalSupply,
    Balance(Address),
}

// Error Types
// Codes start at 201 so a failed mint keeps its meaning inside a farm call.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenError {
    NotInitialized = 201,
    AlreadyInitialized = 202,
    Unauthorized = 203,
    InvalidAmount = 204,
    CapExceeded = 205,
    InsufficientBalance = 206,
}

// Events
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintEvent {
    pub to: Address,
    pub amount: i128,
    pub total_supply: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BurnEvent {
    pub from: Address,
    pub amount: i128,
    pub total_supply: i128,
}

/// RENT, the farm's reward token. Only the minter can create supply and the
/// supply never exceeds the cap.
#[contract]
pub struct RentToken;

#[contractimpl]
impl RentToken {
    pub fn initialize(
        env: Env,
        admin: Address,
        minter: Address,
        cap: i128,
        decimals: u32,
        name: String,
        symbol: String,
    ) -> Result<(), TokenError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(TokenError::AlreadyInitialized);
        }

        if cap <= 0 {
            return Err(TokenError::InvalidAmount);
        }

        admin.require_auth();

        let config = TokenConfig {
            admin: admin.clone(),
            minter,
            cap,
            decimals,
            name,
            symbol,
        };

        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::TotalSupply, &0i128);

        log!(&env, "RENT initialized by admin: {} with cap {}", admin, cap);

        Ok(())
    }

    /// Mint `amount` to `to`. Fails rather than minting a partial amount
    /// when the cap would be exceeded.
    pub fn mint(env: Env, to: Address, amount: i128) -> Result<(), TokenError> {
        let config = Self::load_config(&env)?;
        config.minter.require_auth();

        if amount <= 0 {
            return Err(TokenError::InvalidAmount);
        }

        let total_supply = Self::total_supply(env.clone())
            .checked_add(amount)
            .ok_or(TokenError::CapExceeded)?;
        if total_supply > config.cap {
            return Err(TokenError::CapExceeded);
        }

        let balance = Self::balance(env.clone(), to.clone())
            .checked_add(amount)
            .ok_or(TokenError::CapExceeded)?;

        Self::write_balance(&env, &to, balance);
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &total_supply);

        env.events().publish(
            (symbol_short!("mint"), to.clone()),
            MintEvent {
                to,
                amount,
                total_supply,
            },
        );

        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        from.require_auth();
        Self::load_config(&env)?;

        if amount < 0 {
            return Err(TokenError::InvalidAmount);
        }

        let from_balance = Self::balance(env.clone(), from.clone());
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }

        Self::write_balance(&env, &from, from_balance - amount);
        let to_balance = Self::balance(env.clone(), to.clone())
            .checked_add(amount)
            .ok_or(TokenError::InvalidAmount)?;
        Self::write_balance(&env, &to, to_balance);

        env.events().publish(
            (symbol_short!("transfer"), from.clone(), to.clone()),
            TransferEvent { from, to, amount },
        );

        Ok(())
    }

    pub fn burn(env: Env, from: Address, amount: i128) -> Result<(), TokenError> {
        from.require_auth();
        Self::load_config(&env)?;

        if amount <= 0 {
            return Err(TokenError::InvalidAmount);
        }

        let balance = Self::balance(env.clone(), from.clone());
        if balance < amount {
            return Err(TokenError::InsufficientBalance);
        }

        let total_supply = Self::total_supply(env.clone()) - amount;
        Self::write_balance(&env, &from, balance - amount);
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &total_supply);

        env.events().publish(
            (symbol_short!("burn"), from.clone()),
            BurnEvent {
                from,
                amount,
                total_supply,
            },
        );

        Ok(())
    }

    pub fn set_minter(env: Env, admin: Address, minter: Address) -> Result<(), TokenError> {
        admin.require_auth();

        let mut config = Self::load_config(&env)?;
        if config.admin != admin {
            return Err(TokenError::Unauthorized);
        }

        config.minter = minter.clone();
        env.storage().instance().set(&DataKey::Config, &config);

        log!(&env, "RENT minter set to {}", minter);

        Ok(())
    }

    // Getter functions
    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(id))
            .unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    pub fn cap(env: Env) -> Result<i128, TokenError> {
        Ok(Self::load_config(&env)?.cap)
    }

    pub fn minter(env: Env) -> Result<Address, TokenError> {
        Ok(Self::load_config(&env)?.minter)
    }

    pub fn decimals(env: Env) -> Result<u32, TokenError> {
        Ok(Self::load_config(&env)?.decimals)
    }

    pub fn name(env: Env) -> Result<String, TokenError> {
        Ok(Self::load_config(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, TokenError> {
        Ok(Self::load_config(&env)?.symbol)
    }

    // Internal helper functions
    fn load_config(env: &Env) -> Result<TokenConfig, TokenError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(TokenError::NotInitialized)
    }

    fn write_balance(env: &Env, id: &Address, balance: i128) {
        let key = DataKey::Balance(id.clone());
        if balance == 0 {
            env.storage().persistent().remove(&key);
        } else {
            env.storage().persistent().set(&key, &balance);
        }
    }
}
