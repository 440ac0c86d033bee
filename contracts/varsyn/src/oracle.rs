//! Pass ownership checks.

use soroban_sdk::{log, Address, Env};

use crate::{EvOwnershipCheckFailed, PassClient};

/// The ledger could not answer an ownership question.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChainReadFailure;

pub trait OwnershipOracle {
    /// Does `wallet` currently hold the access token?
    fn owns_token(&self, wallet: &Address) -> Result<bool, ChainReadFailure>;
}

/// Ownership read against the access pass contract's `balance_of`.
pub struct PassOracle<'a> {
    env: &'a Env,
    client: PassClient<'a>,
}

impl<'a> PassOracle<'a> {
    pub fn new(env: &'a Env, access_pass: &Address) -> Self {
        Self {
            env,
            client: PassClient::new(env, access_pass),
        }
    }
}

impl OwnershipOracle for PassOracle<'_> {
    fn owns_token(&self, wallet: &Address) -> Result<bool, ChainReadFailure> {
        match self.client.try_balance_of(wallet) {
            Ok(Ok(balance)) => Ok(balance > 0),
            _ => {
                log!(self.env, "access pass read failed", wallet.clone());
                EvOwnershipCheckFailed {
                    wallet: wallet.clone(),
                    access_pass: self.client.address.clone(),
                }
                .publish(self.env);
                Err(ChainReadFailure)
            }
        }
    }
}
