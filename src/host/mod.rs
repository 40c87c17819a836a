//! Host runtime capabilities.
//!
//! The engine runs inside a sandboxed host that owns all ambient state:
//! the key/value store, the caller identity, the block clock, token custody,
//! and the event log. Everything the engine needs is expressed as the
//! [`HostEnv`] trait so entry points stay pure over their inputs and tests
//! can substitute [`MockHost`].

mod mock;

pub use mock::MockHost;

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tokens the engine accepts for wagers. A closed set; anything else in a
/// `transfer.allow` intent aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum Asset {
    /// The HIVE liquid token.
    Hive,
    /// The HBD backed token.
    Hbd,
}

impl Asset {
    /// Wire symbol used in intents, records and events.
    pub fn symbol(self) -> &'static str {
        match self {
            Asset::Hive => "HIVE",
            Asset::Hbd => "HBD",
        }
    }

    /// Parses a wire symbol, rejecting anything outside the accepted set.
    pub fn from_symbol(s: &str) -> Result<Self> {
        match s {
            "HIVE" => Ok(Asset::Hive),
            "HBD" => Ok(Asset::Hbd),
            _ => Err(EngineError::InvalidIntentToken),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An intent attached to the current call by the sender.
///
/// The engine only recognizes `transfer.allow` intents carrying `token` and
/// `limit` args; everything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Intent {
    /// Intent type discriminator, e.g. `transfer.allow`.
    pub intent_type: String,
    /// Free-form string arguments.
    pub args: BTreeMap<String, String>,
}

impl Intent {
    /// Convenience constructor for a `transfer.allow` intent.
    pub fn transfer_allow(token: &str, limit: &str) -> Self {
        let mut args = BTreeMap::new();
        args.insert("token".to_string(), token.to_string());
        args.insert("limit".to_string(), limit.to_string());
        Self::new("transfer.allow".to_string(), args)
    }
}

/// The capability surface the host runtime provides to the engine.
///
/// Each entry point executes as one atomic host call: on an `Err` return the
/// host discards every `state_set`, `draw` and `transfer` issued during the
/// call, so implementations need no rollback of their own.
pub trait HostEnv {
    /// Reads a value from contract state.
    fn state_get(&self, key: &str) -> Option<Vec<u8>>;

    /// Writes a value into contract state. Writing an empty value clears
    /// the key; loaders treat empty as absent.
    fn state_set(&mut self, key: &str, value: &[u8]);

    /// Address of the current caller.
    fn sender(&self) -> String;

    /// Current block timestamp as the 19-byte ISO-8601 UTC form.
    fn block_time(&self) -> String;

    /// Intents the caller attached to this call, in order.
    fn intents(&self) -> Vec<Intent>;

    /// Escrows `amount` (fixed-point-3 units) of `asset` from the sender
    /// into contract custody.
    fn draw(&mut self, amount: u64, asset: Asset);

    /// Pays out `amount` of `asset` from contract custody to `to`.
    fn transfer(&mut self, to: &str, amount: u64, asset: Asset);

    /// Appends one event line to the transaction log.
    fn log(&mut self, line: &str);
}
