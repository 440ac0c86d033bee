#![no_std]

//! # Varsyn
//!
//! Access gating and hunt rewards for the Varsyn idle hunting game.
//!
//! ## Game flow
//! 1. A wallet connects and calls `resolve_access`. The gate reads the wallet's
//!    access pass balance and its player record, registers unseen wallets, and
//!    answers with a phase: `MintRequired` or `Lobby`.
//! 2. A wallet without a pass claims one on the access pass contract, then
//!    calls `confirm_mint`, which moves it to `Lobby` for good.
//! 3. From the lobby the player starts a hunt. The front end ticks the
//!    countdown once per second; at zero `resolve_hunt` rolls the loot table
//!    once and credits the inventory kept by the player registry.
//! 4. Materials can be donated to the shared mission, which levels up every
//!    `MISSION_TARGET_PER_LEVEL` contributed units.
//!
//! ## Sources of truth
//! The access pass contract owns the token; the player registry owns the
//! `has_access` flag and the inventory. The gate only ever upgrades the flag
//! from chain state, never downgrades it. A failed pass read counts as "no
//! pass" and never blocks the flow.
//!
//! ## Randomness
//! Loot samples are integers in `[0, LOOT_SCALE)` drawn from the host PRNG.
//! Thresholds are cumulative basis points, checked rarest first.

use soroban_sdk::{
    contract, contractclient, contracterror, contractevent, contractimpl, contracttype, log,
    Address, BytesN, Env,
};

pub mod gate;
pub mod hunt;
pub mod mission;
pub mod oracle;
pub mod store;

#[cfg(test)]
mod fakes;

use hunt::PrngRolls;
use oracle::PassOracle;
use store::{PlayerRecordStore, RegistryStore};

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvAccessResolved {
    pub wallet: Address,
    pub phase: u32,
}

#[contractevent]
pub struct EvMintConfirmed {
    pub wallet: Address,
}

/// Emitted when the access pass could not be read. The gate carries on as if
/// the wallet held no pass.
#[contractevent]
pub struct EvOwnershipCheckFailed {
    pub wallet: Address,
    pub access_pass: Address,
}

#[contractevent]
pub struct EvHuntStarted {
    pub player: Address,
    pub duration_secs: u32,
}

#[contractevent]
pub struct EvHuntResolved {
    pub player: Address,
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

/// Emitted when a resolved award could not be written to the registry. The
/// award stays pending on the session until `retry_inventory_sync` succeeds.
#[contractevent]
pub struct EvInventorySyncFailed {
    pub player: Address,
    pub player_id: u32,
}

#[contractevent]
pub struct EvMaterialDonated {
    pub player: Address,
    pub material: u32,
    pub quantity: u32,
}

#[contractevent]
pub struct EvMissionLevelUp {
    pub level: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  External trait interfaces
// ═══════════════════════════════════════════════════════════════════════════════

/// Access pass token. Any positive balance grants entry.
#[contractclient(name = "PassClient")]
pub trait AccessToken {
    fn balance_of(env: Env, owner: Address) -> u32;
}

/// Player registry. Writes are issued with this contract as `caller`, so the
/// registry admin must authorize this contract as a writer.
#[contractclient(name = "RegistryClient")]
pub trait RecordRegistry {
    fn get_player(env: Env, wallet: Address) -> Option<Player>;

    fn create_player(env: Env, caller: Address, wallet: Address, has_access: bool) -> Player;

    fn set_has_access(env: Env, caller: Address, wallet: Address);

    fn create_inventory(env: Env, caller: Address, player_id: u32) -> Inventory;

    fn get_inventory(env: Env, player_id: u32) -> Inventory;

    fn update_inventory(
        env: Env,
        caller: Address,
        player_id: u32,
        delta: InventoryDelta,
    ) -> Inventory;

    fn withdraw_inventory(
        env: Env,
        caller: Address,
        player_id: u32,
        delta: InventoryDelta,
    ) -> Inventory;
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VarsynError {
    StoreUnavailable = 1,
    AdminNotSet = 2,
    AccessPassNotSet = 3,
    RegistryNotSet = 4,
    AccessRequired = 5,
    HuntNotFound = 6,
    InvalidLootTable = 7,
    InvalidQuantity = 8,
    PendingAwardUnsynced = 9,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Records
// ═══════════════════════════════════════════════════════════════════════════════

/// Coarse UI state for a wallet.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Phase {
    Unidentified = 0,
    MintRequired = 1,
    Lobby = 2,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Material {
    Meat = 0,
    Bone = 1,
    Hide = 2,
    Currency = 3,
}

/// Registry player row.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub id: u32,
    pub wallet: Address,
    pub has_access: bool,
}

/// Registry inventory row.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Inventory {
    pub player_id: u32,
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InventoryDelta {
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LootAward {
    pub meat: u32,
    pub bone: u32,
    pub hide: u32,
    pub currency: u32,
}

/// Award credited by `resolve_hunt` but not yet written to the registry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PendingAward {
    None,
    Award(LootAward),
}

/// One timed hunt. Lives in temporary storage only.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HuntSession {
    pub remaining_seconds: u32,
    pub resolved: bool,
    pub pending_award: PendingAward,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HuntResult {
    pub award: LootAward,
    pub inventory: Inventory,
    /// False while the award is still waiting to be written to the registry.
    pub persisted: bool,
}

/// Cumulative loot thresholds in basis points of `LOOT_SCALE`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LootTable {
    pub currency_bps: u32,
    pub hide_bps: u32,
    pub bone_bps: u32,
    pub draws: u32,
}

/// Shared donation project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MissionProgress {
    pub level: u32,
    /// Units contributed toward the current level.
    pub contributed: u64,
    pub total_contributed: u64,
}

#[contracttype]
#[derive(Clone)]
enum StorageKey {
    Admin,
    AccessPassAddress,
    RegistryAddress,
    LootTable,
    Mission,
    Hunt(Address),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════════════

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Hunt sessions are short-lived; one day is plenty to finish or retry a sync
const HUNT_TTL_SECONDS: u32 = 24 * 60 * 60;
const HUNT_TTL_LEDGERS: u32 = HUNT_TTL_SECONDS / LEDGER_RATE_SECS; // 17,280 ledgers

// Contract configuration and mission progress: 120 days
const INSTANCE_TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
const INSTANCE_TTL_LEDGERS: u32 = INSTANCE_TTL_SECONDS / LEDGER_RATE_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct VarsynContract;

#[contractimpl]
impl VarsynContract {
    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Constructor
    // ───────────────────────────────────────────────────────────────────────────

    pub fn __constructor(env: Env, admin: Address, access_pass: Address, registry: Address) {
        let instance = env.storage().instance();
        instance.set(&StorageKey::Admin, &admin);
        instance.set(&StorageKey::AccessPassAddress, &access_pass);
        instance.set(&StorageKey::RegistryAddress, &registry);
        instance.set(&StorageKey::LootTable, &LootTable::standard());
        instance.set(&StorageKey::Mission, &MissionProgress::new());
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Access gate
    // ───────────────────────────────────────────────────────────────────────────

    /// Reconcile the wallet's pass ownership with its stored access flag and
    /// return the phase the front end should show. Registers unseen wallets.
    pub fn resolve_access(env: Env, wallet: Address) -> Result<Phase, VarsynError> {
        wallet.require_auth();

        let oracle = PassOracle::new(&env, &Self::load_access_pass(&env)?);
        let store = Self::store(&env)?;
        let phase = gate::resolve(&oracle, &store, &wallet)?;

        EvAccessResolved {
            wallet,
            phase: phase as u32,
        }
        .publish(&env);
        Self::bump_instance(&env);
        Ok(phase)
    }

    /// Record a confirmed pass mint for `wallet`.
    ///
    /// Trusts the caller: the pass balance is not checked here, so any wallet
    /// that signs this call reaches `Lobby`. `resolve_access` is the call that
    /// consults the access pass.
    pub fn confirm_mint(env: Env, wallet: Address) -> Result<(), VarsynError> {
        wallet.require_auth();

        let store = Self::store(&env)?;
        gate::confirm_mint(&store, &wallet)?;

        EvMintConfirmed { wallet }.publish(&env);
        Ok(())
    }

    /// Current phase without touching the access pass or writing anything.
    pub fn phase(env: Env, wallet: Address) -> Result<Phase, VarsynError> {
        gate::phase(&Self::store(&env)?, &wallet)
    }

    pub fn get_inventory(env: Env, wallet: Address) -> Result<Inventory, VarsynError> {
        let store = Self::store(&env)?;
        let player = store
            .get_player(&wallet)?
            .ok_or(VarsynError::AccessRequired)?;
        store.get_inventory(player.id)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Hunting
    // ───────────────────────────────────────────────────────────────────────────

    /// Start a fresh hunt for a lobby player, replacing any finished session.
    pub fn start_hunt(env: Env, player: Address) -> Result<HuntSession, VarsynError> {
        player.require_auth();

        let store = Self::store(&env)?;
        gate::require_lobby(&store, &player)?;

        if let Some(existing) = Self::find_hunt(&env, &player) {
            if existing.pending_award.is_pending() {
                return Err(VarsynError::PendingAwardUnsynced);
            }
        }

        let session = hunt::start();
        Self::write_hunt(&env, &player, &session);

        EvHuntStarted {
            player,
            duration_secs: session.remaining_seconds,
        }
        .publish(&env);
        Ok(session)
    }

    /// Advance the countdown by one second. A tick at zero changes nothing.
    pub fn tick_hunt(env: Env, player: Address) -> Result<HuntSession, VarsynError> {
        let session = hunt::tick(&Self::read_hunt(&env, &player)?);
        Self::write_hunt(&env, &player, &session);
        Ok(session)
    }

    /// Roll and credit the hunt's loot. Before the countdown ends, or after
    /// the session was already resolved, this returns a zero award and the
    /// inventory unchanged.
    ///
    /// If the registry write fails the award is still returned, the session
    /// keeps it as pending and `persisted` is false. Returning an error here
    /// would revert the resolution along with everything else.
    pub fn resolve_hunt(env: Env, player: Address) -> Result<HuntResult, VarsynError> {
        player.require_auth();

        let mut session = Self::read_hunt(&env, &player)?;
        let store = Self::store(&env)?;
        let record = gate::require_lobby(&store, &player)?;
        let mut inventory = store.get_inventory(record.id)?;
        let table = Self::load_loot_table(&env);

        let award = match hunt::settle(
            &mut session,
            &mut inventory,
            &table,
            &mut PrngRolls::new(&env),
            &store,
        ) {
            Ok(award) => award,
            Err(VarsynError::StoreUnavailable) => {
                log!(&env, "inventory write failed; award kept pending", record.id);
                EvInventorySyncFailed {
                    player: player.clone(),
                    player_id: record.id,
                }
                .publish(&env);
                session.pending_award.award().unwrap_or_default()
            }
            Err(err) => return Err(err),
        };

        if !award.is_zero() {
            EvHuntResolved {
                player: player.clone(),
                meat: award.meat,
                bone: award.bone,
                hide: award.hide,
                currency: award.currency,
            }
            .publish(&env);
        }

        let persisted = !session.pending_award.is_pending();
        Self::write_hunt(&env, &player, &session);
        Ok(HuntResult {
            award,
            inventory,
            persisted,
        })
    }

    /// Write a pending award to the registry. Returns the stored inventory.
    pub fn retry_inventory_sync(env: Env, player: Address) -> Result<Inventory, VarsynError> {
        player.require_auth();

        let mut session = Self::read_hunt(&env, &player)?;
        let store = Self::store(&env)?;
        let record = store
            .get_player(&player)?
            .ok_or(VarsynError::AccessRequired)?;

        let inventory = match hunt::sync_pending(&mut session, &store, record.id)? {
            Some(stored) => stored,
            None => store.get_inventory(record.id)?,
        };

        Self::write_hunt(&env, &player, &session);
        Ok(inventory)
    }

    /// Discard the player's hunt (back to lobby). Nothing to undo: loot is
    /// only credited on resolution.
    pub fn abandon_hunt(env: Env, player: Address) -> Result<(), VarsynError> {
        player.require_auth();

        if let Some(session) = Self::find_hunt(&env, &player) {
            if session.pending_award.is_pending() {
                return Err(VarsynError::PendingAwardUnsynced);
            }
            env.storage().temporary().remove(&StorageKey::Hunt(player));
        }
        Ok(())
    }

    pub fn get_hunt(env: Env, player: Address) -> Option<HuntSession> {
        Self::find_hunt(&env, &player)
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Mission
    // ───────────────────────────────────────────────────────────────────────────

    /// Donate up to `quantity` units of a material to the mission. Balances
    /// are clamped at zero; only what was actually held counts as donated.
    pub fn donate(
        env: Env,
        player: Address,
        material: Material,
        quantity: u32,
    ) -> Result<Inventory, VarsynError> {
        player.require_auth();

        if quantity == 0 {
            return Err(VarsynError::InvalidQuantity);
        }

        let store = Self::store(&env)?;
        let record = gate::require_lobby(&store, &player)?;
        let before = store.get_inventory(record.id)?;
        let after =
            store.withdraw_inventory(record.id, &InventoryDelta::single(material, quantity))?;
        let donated = before.count(material).saturating_sub(after.count(material));

        let mut mission = Self::load_mission(&env);
        let levels_gained = mission.contribute(donated as u64);
        env.storage().instance().set(&StorageKey::Mission, &mission);
        Self::bump_instance(&env);

        EvMaterialDonated {
            player,
            material: material as u32,
            quantity: donated,
        }
        .publish(&env);
        if levels_gained > 0 {
            EvMissionLevelUp {
                level: mission.level,
            }
            .publish(&env);
        }

        Ok(after)
    }

    pub fn get_mission(env: Env) -> MissionProgress {
        Self::load_mission(&env)
    }

    /// Progress toward the next mission level in basis points.
    pub fn mission_progress_bps(env: Env) -> u32 {
        Self::load_mission(&env).progress_bps()
    }

    // ───────────────────────────────────────────────────────────────────────────
    //  Public: Read & Admin
    // ───────────────────────────────────────────────────────────────────────────

    pub fn get_loot_table(env: Env) -> LootTable {
        Self::load_loot_table(&env)
    }

    pub fn set_loot_table(env: Env, table: LootTable) -> Result<(), VarsynError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        if !table.is_valid() {
            return Err(VarsynError::InvalidLootTable);
        }
        env.storage().instance().set(&StorageKey::LootTable, &table);
        Ok(())
    }

    pub fn get_admin(env: Env) -> Result<Address, VarsynError> {
        Self::load_admin(&env)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), VarsynError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage().instance().set(&StorageKey::Admin, &new_admin);
        Ok(())
    }

    pub fn get_access_pass(env: Env) -> Result<Address, VarsynError> {
        Self::load_access_pass(&env)
    }

    pub fn set_access_pass(env: Env, new_access_pass: Address) -> Result<(), VarsynError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage()
            .instance()
            .set(&StorageKey::AccessPassAddress, &new_access_pass);
        Ok(())
    }

    pub fn get_registry(env: Env) -> Result<Address, VarsynError> {
        Self::load_registry(&env)
    }

    pub fn set_registry(env: Env, new_registry: Address) -> Result<(), VarsynError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.storage()
            .instance()
            .set(&StorageKey::RegistryAddress, &new_registry);
        Ok(())
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), VarsynError> {
        let admin = Self::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    //  Internal
    // ═══════════════════════════════════════════════════════════════════════════

    fn store(env: &Env) -> Result<RegistryStore<'_>, VarsynError> {
        Ok(RegistryStore::new(env, &Self::load_registry(env)?))
    }

    fn find_hunt(env: &Env, player: &Address) -> Option<HuntSession> {
        env.storage()
            .temporary()
            .get(&StorageKey::Hunt(player.clone()))
    }

    fn read_hunt(env: &Env, player: &Address) -> Result<HuntSession, VarsynError> {
        Self::find_hunt(env, player).ok_or(VarsynError::HuntNotFound)
    }

    fn write_hunt(env: &Env, player: &Address, session: &HuntSession) {
        let key = StorageKey::Hunt(player.clone());
        env.storage().temporary().set(&key, session);
        env.storage()
            .temporary()
            .extend_ttl(&key, HUNT_TTL_LEDGERS, HUNT_TTL_LEDGERS);
        Self::bump_instance(env);
    }

    // Keep instance storage (admin, collaborators, loot table, mission) alive
    fn bump_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_LEDGERS, INSTANCE_TTL_LEDGERS);
    }

    fn load_loot_table(env: &Env) -> LootTable {
        env.storage()
            .instance()
            .get(&StorageKey::LootTable)
            .unwrap_or_else(LootTable::standard)
    }

    fn load_mission(env: &Env) -> MissionProgress {
        env.storage()
            .instance()
            .get(&StorageKey::Mission)
            .unwrap_or_else(MissionProgress::new)
    }

    fn load_admin(env: &Env) -> Result<Address, VarsynError> {
        env.storage()
            .instance()
            .get(&StorageKey::Admin)
            .ok_or(VarsynError::AdminNotSet)
    }

    fn load_access_pass(env: &Env) -> Result<Address, VarsynError> {
        env.storage()
            .instance()
            .get(&StorageKey::AccessPassAddress)
            .ok_or(VarsynError::AccessPassNotSet)
    }

    fn load_registry(env: &Env) -> Result<Address, VarsynError> {
        env.storage()
            .instance()
            .get(&StorageKey::RegistryAddress)
            .ok_or(VarsynError::RegistryNotSet)
    }
}
