//! In-memory collaborators for the gate and hunt unit tests.

use core::cell::{Cell, RefCell};

use soroban_sdk::{Address, Env, Map};

use crate::hunt::LootRoll;
use crate::oracle::{ChainReadFailure, OwnershipOracle};
use crate::store::PlayerRecordStore;
use crate::{Inventory, InventoryDelta, Player, VarsynError};

/// Oracle with a canned answer; `None` simulates a failed chain read.
pub struct FixedOracle(Option<bool>);

impl FixedOracle {
    pub fn owns(owns: bool) -> Self {
        Self(Some(owns))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

impl OwnershipOracle for FixedOracle {
    fn owns_token(&self, _wallet: &Address) -> Result<bool, ChainReadFailure> {
        self.0.ok_or(ChainReadFailure)
    }
}

/// Store that counts successful writes and can be switched offline.
pub struct FakeStore {
    players: RefCell<Map<Address, Player>>,
    inventories: RefCell<Map<u32, Inventory>>,
    writes: Cell<u32>,
    offline: Cell<bool>,
}

impl FakeStore {
    pub fn new(env: &Env) -> Self {
        Self {
            players: RefCell::new(Map::new(env)),
            inventories: RefCell::new(Map::new(env)),
            writes: Cell::new(0),
            offline: Cell::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    pub fn player(&self, wallet: &Address) -> Option<Player> {
        self.players.borrow().get(wallet.clone())
    }

    pub fn player_count(&self) -> u32 {
        self.players.borrow().len()
    }

    pub fn inventory_count(&self) -> u32 {
        self.inventories.borrow().len()
    }

    fn online(&self) -> Result<(), VarsynError> {
        if self.offline.get() {
            Err(VarsynError::StoreUnavailable)
        } else {
            Ok(())
        }
    }

    fn save_inventory(&self, inventory: &Inventory) {
        self.inventories
            .borrow_mut()
            .set(inventory.player_id, inventory.clone());
        self.writes.set(self.writes.get() + 1);
    }
}

impl PlayerRecordStore for FakeStore {
    fn get_player(&self, wallet: &Address) -> Result<Option<Player>, VarsynError> {
        self.online()?;
        Ok(self.player(wallet))
    }

    fn create_player(&self, wallet: &Address, has_access: bool) -> Result<Player, VarsynError> {
        self.online()?;
        let player = Player {
            id: self.player_count() + 1,
            wallet: wallet.clone(),
            has_access,
        };
        self.players.borrow_mut().set(wallet.clone(), player.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(player)
    }

    fn set_has_access(&self, wallet: &Address) -> Result<(), VarsynError> {
        self.online()?;
        let mut player = self.player(wallet).ok_or(VarsynError::StoreUnavailable)?;
        player.has_access = true;
        self.players.borrow_mut().set(wallet.clone(), player);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn create_inventory(&self, player_id: u32) -> Result<Inventory, VarsynError> {
        self.online()?;
        let inventory = Inventory {
            player_id,
            meat: 0,
            bone: 0,
            hide: 0,
            currency: 0,
        };
        self.save_inventory(&inventory);
        Ok(inventory)
    }

    fn get_inventory(&self, player_id: u32) -> Result<Inventory, VarsynError> {
        self.online()?;
        self.inventories
            .borrow()
            .get(player_id)
            .ok_or(VarsynError::StoreUnavailable)
    }

    fn update_inventory(
        &self,
        player_id: u32,
        delta: &InventoryDelta,
    ) -> Result<Inventory, VarsynError> {
        let mut inventory = self.get_inventory(player_id)?;
        inventory.meat += delta.meat;
        inventory.bone += delta.bone;
        inventory.hide += delta.hide;
        inventory.currency += delta.currency;
        self.save_inventory(&inventory);
        Ok(inventory)
    }

    fn withdraw_inventory(
        &self,
        player_id: u32,
        delta: &InventoryDelta,
    ) -> Result<Inventory, VarsynError> {
        let mut inventory = self.get_inventory(player_id)?;
        inventory.meat = inventory.meat.saturating_sub(delta.meat);
        inventory.bone = inventory.bone.saturating_sub(delta.bone);
        inventory.hide = inventory.hide.saturating_sub(delta.hide);
        inventory.currency = inventory.currency.saturating_sub(delta.currency);
        self.save_inventory(&inventory);
        Ok(inventory)
    }
}

/// Replays a fixed sample sequence, cycling when it runs out.
pub struct FixedRolls<'a> {
    samples: &'a [u32],
    next: usize,
}

impl<'a> FixedRolls<'a> {
    pub fn new(samples: &'a [u32]) -> Self {
        Self { samples, next: 0 }
    }
}

impl LootRoll for FixedRolls<'_> {
    fn roll(&mut self) -> u32 {
        let sample = self.samples[self.next % self.samples.len()];
        self.next += 1;
        sample
    }
}

/// Small deterministic generator (splitmix64) for distribution checks.
pub struct SplitMix(pub u64);

impl LootRoll for SplitMix {
    fn roll(&mut self) -> u32 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z % crate::hunt::LOOT_SCALE as u64) as u32
    }
}
