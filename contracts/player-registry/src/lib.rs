#![no_std]

//! # Player Registry Contract
//!
//! Durable player records for Varsyn. One `Player` row and one `Inventory`
//! row per wallet, written only by the admin or by authorized game contracts.
//!
//! ## Features
//! - Sequential player ids (the `player_id` inventories are keyed by)
//! - Monotonic `has_access` flag (set, never cleared)
//! - Saturating inventory credit, clamped inventory withdrawal
//! - Event emission for indexing

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub id: u32,
    pub wallet: Address,
    pub has_access: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Inventory {
    pub player_id: u32,
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

/// Per-counter amounts applied by `update_inventory` / `withdraw_inventory`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InventoryDelta {
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    /// Game contracts allowed to write records
    Writers,
    /// Number of players created so far; also the last assigned id
    PlayerCount,
    /// Player row: DataKey::Player(wallet) → Player
    Player(Address),
    /// Inventory row: DataKey::Inventory(player_id) → Inventory
    Inventory(u32),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    NotAdmin = 1,
    NotAuthorized = 2,
    PlayerExists = 3,
    PlayerNotFound = 4,
    InventoryExists = 5,
    InventoryNotFound = 6,
    AdminNotSet = 7,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvPlayerCreated {
    pub player_id: u32,
    pub wallet: Address,
    pub has_access: bool,
}

#[contractevent]
pub struct EvAccessSet {
    pub player_id: u32,
    pub wallet: Address,
}

#[contractevent]
pub struct EvInventoryChanged {
    pub player_id: u32,
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Player records are kept alive for 120 days after the last write
const TTL_SECONDS: u32 = 120 * 24 * 60 * 60;

/// TTL for player data in ledgers: 120 * 24 * 60 * 60 / 5 = 2,073,600 ledgers
const TTL_LEDGERS: u32 = TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct PlayerRegistry;

#[contractimpl]
impl PlayerRegistry {
    pub fn __constructor(env: Env, admin: Address) {
        env.storage().instance().set(&DataKey::Admin, &admin);
        let empty_writers: Vec<Address> = Vec::new(&env);
        env.storage().instance().set(&DataKey::Writers, &empty_writers);
        env.storage().instance().set(&DataKey::PlayerCount, &0u32);
    }

    /// Allow a game contract to create and update records.
    pub fn authorize_writer(
        env: Env,
        caller: Address,
        writer: Address,
    ) -> Result<(), RegistryError> {
        Self::require_admin(&env, &caller)?;
        let mut writers = Self::load_writers(&env);
        if !writers.contains(&writer) {
            writers.push_back(writer);
            env.storage().instance().set(&DataKey::Writers, &writers);
        }
        Ok(())
    }

    pub fn revoke_writer(
        env: Env,
        caller: Address,
        writer: Address,
    ) -> Result<(), RegistryError> {
        Self::require_admin(&env, &caller)?;
        let mut writers = Self::load_writers(&env);
        if let Some(idx) = writers.first_index_of(&writer) {
            writers.remove(idx);
            env.storage().instance().set(&DataKey::Writers, &writers);
        }
        Ok(())
    }

    pub fn is_writer(env: Env, writer: Address) -> bool {
        Self::load_writers(&env).contains(&writer)
    }

    // ─── Players ───────────────────────────────────────────────────────────

    pub fn get_player(env: Env, wallet: Address) -> Option<Player> {
        env.storage().persistent().get(&DataKey::Player(wallet))
    }

    /// Create the player row for `wallet`. Fails if the wallet is already known.
    pub fn create_player(
        env: Env,
        caller: Address,
        wallet: Address,
        has_access: bool,
    ) -> Result<Player, RegistryError> {
        Self::require_writer(&env, &caller)?;

        let key = DataKey::Player(wallet.clone());
        if env.storage().persistent().has(&key) {
            return Err(RegistryError::PlayerExists);
        }

        let count: u32 = env
            .storage()
            .instance()
            .get(&DataKey::PlayerCount)
            .unwrap_or(0);
        let id = count + 1;
        env.storage().instance().set(&DataKey::PlayerCount, &id);

        let player = Player {
            id,
            wallet,
            has_access,
        };
        Self::save_player(&env, &player);

        EvPlayerCreated {
            player_id: id,
            wallet: player.wallet.clone(),
            has_access,
        }
        .publish(&env);

        Ok(player)
    }

    /// Mark the wallet as entitled. Access is never revoked, so there is no
    /// way to write `false` here.
    pub fn set_has_access(
        env: Env,
        caller: Address,
        wallet: Address,
    ) -> Result<(), RegistryError> {
        Self::require_writer(&env, &caller)?;

        let mut player: Player = env
            .storage()
            .persistent()
            .get(&DataKey::Player(wallet))
            .ok_or(RegistryError::PlayerNotFound)?;
        if player.has_access {
            return Ok(());
        }

        player.has_access = true;
        Self::save_player(&env, &player);

        EvAccessSet {
            player_id: player.id,
            wallet: player.wallet,
        }
        .publish(&env);
        Ok(())
    }

    pub fn total_players(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::PlayerCount)
            .unwrap_or(0)
    }

    // ─── Inventories ───────────────────────────────────────────────────────

    pub fn create_inventory(
        env: Env,
        caller: Address,
        player_id: u32,
    ) -> Result<Inventory, RegistryError> {
        Self::require_writer(&env, &caller)?;

        let key = DataKey::Inventory(player_id);
        if env.storage().persistent().has(&key) {
            return Err(RegistryError::InventoryExists);
        }

        let inventory = Inventory {
            player_id,
            meat: 0,
            bone: 0,
            hide: 0,
            currency: 0,
        };
        Self::save_inventory(&env, &inventory);
        Ok(inventory)
    }

    pub fn get_inventory(env: Env, player_id: u32) -> Result<Inventory, RegistryError> {
        Self::read_inventory(&env, player_id)
    }

    /// Credit every counter by the matching delta field, saturating at `u32::MAX`.
    pub fn update_inventory(
        env: Env,
        caller: Address,
        player_id: u32,
        delta: InventoryDelta,
    ) -> Result<Inventory, RegistryError> {
        Self::require_writer(&env, &caller)?;

        let mut inventory = Self::read_inventory(&env, player_id)?;
        inventory.meat = inventory.meat.saturating_add(delta.meat);
        inventory.bone = inventory.bone.saturating_add(delta.bone);
        inventory.hide = inventory.hide.saturating_add(delta.hide);
        inventory.currency = inventory.currency.saturating_add(delta.currency);

        Self::save_inventory(&env, &inventory);
        Self::publish_inventory(&env, &inventory);
        Ok(inventory)
    }

    /// Debit every counter by the matching delta field, clamped at zero.
    pub fn withdraw_inventory(
        env: Env,
        caller: Address,
        player_id: u32,
        delta: InventoryDelta,
    ) -> Result<Inventory, RegistryError> {
        Self::require_writer(&env, &caller)?;

        let mut inventory = Self::read_inventory(&env, player_id)?;
        inventory.meat = inventory.meat.saturating_sub(delta.meat);
        inventory.bone = inventory.bone.saturating_sub(delta.bone);
        inventory.hide = inventory.hide.saturating_sub(delta.hide);
        inventory.currency = inventory.currency.saturating_sub(delta.currency);

        Self::save_inventory(&env, &inventory);
        Self::publish_inventory(&env, &inventory);
        Ok(inventory)
    }

    pub fn get_admin(env: Env) -> Result<Address, RegistryError> {
        Self::load_admin(&env)
    }

    // ─── Internal helpers ──────────────────────────────────────────────────

    fn require_admin(env: &Env, caller: &Address) -> Result<(), RegistryError> {
        caller.require_auth();
        let admin = Self::load_admin(env)?;
        if *caller != admin {
            return Err(RegistryError::NotAdmin);
        }
        Ok(())
    }

    /// Writes are accepted from the admin or any authorized game contract.
    fn require_writer(env: &Env, caller: &Address) -> Result<(), RegistryError> {
        caller.require_auth();
        let admin = Self::load_admin(env)?;
        if *caller != admin && !Self::load_writers(env).contains(caller) {
            return Err(RegistryError::NotAuthorized);
        }
        Ok(())
    }

    fn load_admin(env: &Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(RegistryError::AdminNotSet)
    }

    fn load_writers(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::Writers)
            .unwrap_or(Vec::new(env))
    }

    fn read_inventory(env: &Env, player_id: u32) -> Result<Inventory, RegistryError> {
        env.storage()
            .persistent()
            .get(&DataKey::Inventory(player_id))
            .ok_or(RegistryError::InventoryNotFound)
    }

    fn save_player(env: &Env, player: &Player) {
        let key = DataKey::Player(player.wallet.clone());
        env.storage().persistent().set(&key, player);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_LEDGERS, TTL_LEDGERS);
        env.storage().instance().extend_ttl(TTL_LEDGERS, TTL_LEDGERS);
    }

    fn save_inventory(env: &Env, inventory: &Inventory) {
        let key = DataKey::Inventory(inventory.player_id);
        env.storage().persistent().set(&key, inventory);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_LEDGERS, TTL_LEDGERS);
    }

    fn publish_inventory(env: &Env, inventory: &Inventory) {
        EvInventoryChanged {
            player_id: inventory.player_id,
            meat: inventory.meat,
            bone: inventory.bone,
            hide: inventory.hide,
            currency: inventory.currency,
        }
        .publish(env);
    }
}
