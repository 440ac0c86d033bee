#![no_std]

//! # Access Pass Contract
//!
//! The SigilVar pass that gates entry to the Varsyn lobby. Holding at least
//! one pass is what the game contract checks through `balance_of`.
//!
//! Passes are claimed by the receiving wallet, up to `max_per_wallet` each.
//! Payment for a claim is settled outside this contract.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env,
};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    MaxPerWallet,
    TotalSupply,
    /// Pass balance: DataKey::Balance(owner) → u32
    Balance(Address),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AccessPassError {
    AdminNotSet = 1,
    InvalidQuantity = 2,
    WalletLimitReached = 3,
}

#[contractevent]
pub struct EvPassClaimed {
    pub to: Address,
    pub quantity: u32,
    pub balance: u32,
}

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Balances live as long as player records (120 days)
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

#[contract]
pub struct AccessPass;

#[contractimpl]
impl AccessPass {
    pub fn __constructor(env: Env, admin: Address, max_per_wallet: u32) {
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage()
            .instance()
            .set(&DataKey::MaxPerWallet, &max_per_wallet);
        env.storage().instance().set(&DataKey::TotalSupply, &0u32);
    }

    /// Claim `quantity` passes for `to`. Returns the new balance.
    pub fn claim_to(env: Env, to: Address, quantity: u32) -> Result<u32, AccessPassError> {
        to.require_auth();

        if quantity == 0 {
            return Err(AccessPassError::InvalidQuantity);
        }

        let max_per_wallet: u32 = env
            .storage()
            .instance()
            .get(&DataKey::MaxPerWallet)
            .unwrap_or(1);
        let balance = Self::balance_of(env.clone(), to.clone());
        let new_balance = balance.saturating_add(quantity);
        if new_balance > max_per_wallet {
            return Err(AccessPassError::WalletLimitReached);
        }

        let key = DataKey::Balance(to.clone());
        env.storage().persistent().set(&key, &new_balance);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_LEDGERS, TTL_LEDGERS);

        let supply = Self::total_supply(env.clone()).saturating_add(quantity);
        env.storage().instance().set(&DataKey::TotalSupply, &supply);
        env.storage().instance().extend_ttl(TTL_LEDGERS, TTL_LEDGERS);

        EvPassClaimed {
            to,
            quantity,
            balance: new_balance,
        }
        .publish(&env);

        Ok(new_balance)
    }

    pub fn balance_of(env: Env, owner: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(owner))
            .unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    pub fn get_admin(env: Env) -> Result<Address, AccessPassError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(AccessPassError::AdminNotSet)
    }
}
