//! Access gate.
//!
//! Decides which phase a wallet is in and keeps the stored `has_access` flag in
//! step with pass ownership. Chain state may upgrade the flag, never downgrade
//! it. Every call reads the player row before writing anything, and a call
//! with unchanged chain state writes nothing at all.

use soroban_sdk::Address;

use crate::oracle::OwnershipOracle;
use crate::store::PlayerRecordStore;
use crate::{Phase, Player, VarsynError};

/// Reconcile `wallet` and return its phase.
///
/// A failed ownership read is treated as "no pass". Unknown wallets get a
/// player row (with `has_access` set from the pass check) and an empty
/// inventory.
pub fn resolve<O, S>(oracle: &O, store: &S, wallet: &Address) -> Result<Phase, VarsynError>
where
    O: OwnershipOracle,
    S: PlayerRecordStore,
{
    let owns_token = oracle.owns_token(wallet).unwrap_or(false);

    let has_access = match store.get_player(wallet)? {
        None => register(store, wallet, owns_token)?.has_access,
        Some(player) if owns_token && !player.has_access => {
            store.set_has_access(wallet)?;
            true
        }
        Some(player) => player.has_access,
    };

    Ok(phase_for(has_access))
}

/// Grant access after a confirmed mint. A wallet that was never resolved is
/// registered on the spot so the mint is not lost.
pub fn confirm_mint<S: PlayerRecordStore>(store: &S, wallet: &Address) -> Result<(), VarsynError> {
    match store.get_player(wallet)? {
        None => {
            register(store, wallet, true)?;
        }
        Some(player) if !player.has_access => store.set_has_access(wallet)?,
        Some(_) => {}
    }
    Ok(())
}

/// Read-only phase lookup. Unknown wallets are `Unidentified`.
pub fn phase<S: PlayerRecordStore>(store: &S, wallet: &Address) -> Result<Phase, VarsynError> {
    Ok(match store.get_player(wallet)? {
        None => Phase::Unidentified,
        Some(player) => phase_for(player.has_access),
    })
}

/// The player record of a lobby wallet, or `AccessRequired`.
pub fn require_lobby<S: PlayerRecordStore>(
    store: &S,
    wallet: &Address,
) -> Result<Player, VarsynError> {
    match store.get_player(wallet)? {
        Some(player) if player.has_access => Ok(player),
        _ => Err(VarsynError::AccessRequired),
    }
}

fn register<S: PlayerRecordStore>(
    store: &S,
    wallet: &Address,
    has_access: bool,
) -> Result<Player, VarsynError> {
    let player = store.create_player(wallet, has_access)?;
    store.create_inventory(player.id)?;
    Ok(player)
}

fn phase_for(has_access: bool) -> Phase {
    if has_access {
        Phase::Lobby
    } else {
        Phase::MintRequired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeStore, FixedOracle};
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::Env;

    #[test]
    fn unseen_wallet_without_pass_needs_mint() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        let phase = resolve(&FixedOracle::owns(false), &store, &wallet).unwrap();

        assert_eq!(phase, Phase::MintRequired);
        assert_eq!(store.player_count(), 1);
        assert_eq!(store.inventory_count(), 1);
        let player = store.player(&wallet).unwrap();
        assert!(!player.has_access);
        let inventory = store.get_inventory(player.id).unwrap();
        assert_eq!(
            (inventory.meat, inventory.bone, inventory.hide, inventory.currency),
            (0, 0, 0, 0)
        );
    }

    #[test]
    fn unseen_wallet_with_pass_enters_lobby() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        let phase = resolve(&FixedOracle::owns(true), &store, &wallet).unwrap();

        assert_eq!(phase, Phase::Lobby);
        assert!(store.player(&wallet).unwrap().has_access);
        assert_eq!(store.writes(), 2); // player + inventory
    }

    #[test]
    fn repeated_resolve_writes_nothing() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        for owns in [false, true] {
            let oracle = FixedOracle::owns(owns);
            let first = resolve(&oracle, &store, &wallet).unwrap();
            let writes = store.writes();
            let second = resolve(&oracle, &store, &wallet).unwrap();
            assert_eq!(first, second);
            assert_eq!(store.writes(), writes);
        }
        assert_eq!(store.player_count(), 1);
        assert_eq!(store.inventory_count(), 1);
    }

    #[test]
    fn detected_pass_upgrades_stored_flag_once() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);
        resolve(&FixedOracle::owns(false), &store, &wallet).unwrap();
        let writes = store.writes();

        let phase = resolve(&FixedOracle::owns(true), &store, &wallet).unwrap();

        assert_eq!(phase, Phase::Lobby);
        assert!(store.player(&wallet).unwrap().has_access);
        assert_eq!(store.writes(), writes + 1);
    }

    #[test]
    fn access_never_downgrades() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);
        resolve(&FixedOracle::owns(true), &store, &wallet).unwrap();

        for oracle in [FixedOracle::owns(false), FixedOracle::failing()] {
            let phase = resolve(&oracle, &store, &wallet).unwrap();
            assert_eq!(phase, Phase::Lobby);
            assert!(store.player(&wallet).unwrap().has_access);
        }
    }

    #[test]
    fn oracle_failure_counts_as_no_pass() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        let phase = resolve(&FixedOracle::failing(), &store, &wallet).unwrap();

        assert_eq!(phase, Phase::MintRequired);
        assert_eq!(store.player_count(), 1);
    }

    #[test]
    fn store_outage_is_surfaced() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        store.set_offline(true);

        let result = resolve(&FixedOracle::owns(true), &store, &Address::generate(&env));
        assert_eq!(result, Err(VarsynError::StoreUnavailable));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn mint_then_resolve_reaches_lobby() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);
        let oracle = FixedOracle::owns(false);

        assert_eq!(resolve(&oracle, &store, &wallet), Ok(Phase::MintRequired));
        confirm_mint(&store, &wallet).unwrap();
        assert_eq!(resolve(&oracle, &store, &wallet), Ok(Phase::Lobby));
    }

    #[test]
    fn confirm_mint_is_idempotent() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);
        resolve(&FixedOracle::owns(false), &store, &wallet).unwrap();

        confirm_mint(&store, &wallet).unwrap();
        let writes = store.writes();
        confirm_mint(&store, &wallet).unwrap();

        assert_eq!(store.writes(), writes);
        assert!(store.player(&wallet).unwrap().has_access);
    }

    #[test]
    fn confirm_mint_registers_unknown_wallet() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        confirm_mint(&store, &wallet).unwrap();

        assert_eq!(phase(&store, &wallet), Ok(Phase::Lobby));
        assert_eq!(store.inventory_count(), 1);
    }

    #[test]
    fn phase_of_unknown_wallet_is_unidentified() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        assert_eq!(phase(&store, &wallet), Ok(Phase::Unidentified));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn require_lobby_rejects_mint_required() {
        let env = Env::default();
        let store = FakeStore::new(&env);
        let wallet = Address::generate(&env);

        assert_eq!(
            require_lobby(&store, &wallet),
            Err(VarsynError::AccessRequired)
        );
        resolve(&FixedOracle::owns(false), &store, &wallet).unwrap();
        assert_eq!(
            require_lobby(&store, &wallet),
            Err(VarsynError::AccessRequired)
        );
        confirm_mint(&store, &wallet).unwrap();
        assert!(require_lobby(&store, &wallet).is_ok());
    }
}
