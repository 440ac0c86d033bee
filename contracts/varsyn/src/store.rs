//! Player record persistence.
//!
//! The game never touches player rows directly; everything goes through
//! [`PlayerRecordStore`]. On chain that is the player registry contract, called
//! with `try_*` so a failing registry surfaces as `StoreUnavailable` instead of
//! aborting the whole invocation.

use soroban_sdk::{Address, Env};

use crate::{Inventory, InventoryDelta, Player, RegistryClient, VarsynError};

pub trait PlayerRecordStore {
    fn get_player(&self, wallet: &Address) -> Result<Option<Player>, VarsynError>;

    fn create_player(&self, wallet: &Address, has_access: bool) -> Result<Player, VarsynError>;

    /// Set `has_access` to true. There is no way to clear it.
    fn set_has_access(&self, wallet: &Address) -> Result<(), VarsynError>;

    /// Create the all-zero inventory owned by `player_id`.
    fn create_inventory(&self, player_id: u32) -> Result<Inventory, VarsynError>;

    fn get_inventory(&self, player_id: u32) -> Result<Inventory, VarsynError>;

    /// Add `delta` to the inventory and return the stored result.
    fn update_inventory(
        &self,
        player_id: u32,
        delta: &InventoryDelta,
    ) -> Result<Inventory, VarsynError>;

    /// Subtract `delta`, clamping each counter at zero.
    fn withdraw_inventory(
        &self,
        player_id: u32,
        delta: &InventoryDelta,
    ) -> Result<Inventory, VarsynError>;
}

/// [`PlayerRecordStore`] backed by the player registry contract. Writes are
/// signed by the current contract, which must be an authorized writer.
pub struct RegistryStore<'a> {
    client: RegistryClient<'a>,
    writer: Address,
}

impl<'a> RegistryStore<'a> {
    pub fn new(env: &'a Env, registry: &Address) -> Self {
        Self {
            client: RegistryClient::new(env, registry),
            writer: env.current_contract_address(),
        }
    }
}

/// Collapse a `try_*` client result: any invoke, contract or conversion error
/// means the store could not serve the request.
fn available<T, C, E>(result: Result<Result<T, C>, E>) -> Result<T, VarsynError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        _ => Err(VarsynError::StoreUnavailable),
    }
}

impl PlayerRecordStore for RegistryStore<'_> {
    fn get_player(&self, wallet: &Address) -> Result<Option<Player>, VarsynError> {
        available(self.client.try_get_player(wallet))
    }

    fn create_player(&self, wallet: &Address, has_access: bool) -> Result<Player, VarsynError> {
        available(
            self.client
                .try_create_player(&self.writer, wallet, &has_access),
        )
    }

    fn set_has_access(&self, wallet: &Address) -> Result<(), VarsynError> {
        available(self.client.try_set_has_access(&self.writer, wallet))
    }

    fn create_inventory(&self, player_id: u32) -> Result<Inventory, VarsynError> {
        available(self.client.try_create_inventory(&self.writer, &player_id))
    }

    fn get_inventory(&self, player_id: u32) -> Result<Inventory, VarsynError> {
        available(self.client.try_get_inventory(&player_id))
    }

    fn update_inventory(
        &self,
        player_id: u32,
        delta: &InventoryDelta,
    ) -> Result<Inventory, VarsynError> {
        available(
            self.client
                .try_update_inventory(&self.writer, &player_id, delta),
        )
    }

    fn withdraw_inventory(
        &self,
        player_id: u32,
        delta: &InventoryDelta,
    ) -> Result<Inventory, VarsynError> {
        available(
            self.client
                .try_withdraw_inventory(&self.writer, &player_id, delta),
        )
    }
}
