//! In-memory host for tests and local harnesses.

use super::{Asset, HostEnv, Intent};
use std::collections::HashMap;
use tracing::debug;

/// An in-memory [`HostEnv`] with full observability.
///
/// Besides the key/value store it keeps ledgers of every draw, transfer and
/// logged event so tests can assert the accounting properties of a scenario
/// end to end. Sender, clock and intents are plain fields the test mutates
/// between calls.
#[derive(Debug, Default)]
pub struct MockHost {
    state: HashMap<String, Vec<u8>>,
    /// Address returned by [`HostEnv::sender`].
    pub sender: String,
    /// ISO-8601 timestamp returned by [`HostEnv::block_time`].
    pub block_time: String,
    /// Intents attached to the next call.
    pub intents: Vec<Intent>,
    /// Every `(sender, amount, asset)` drawn into custody, in order.
    pub draws: Vec<(String, u64, Asset)>,
    /// Every `(to, amount, asset)` paid out of custody, in order.
    pub transfers: Vec<(String, u64, Asset)>,
    /// Every event line logged, in order.
    pub events: Vec<String>,
}

impl MockHost {
    /// Creates an empty host with a zeroed clock and no sender.
    pub fn new() -> Self {
        Self {
            block_time: "1970-01-01T00:00:00".to_string(),
            ..Self::default()
        }
    }

    /// Sets the caller for subsequent calls.
    pub fn set_sender(&mut self, sender: &str) {
        self.sender = sender.to_string();
    }

    /// Sets the block clock for subsequent calls.
    pub fn set_block_time(&mut self, iso: &str) {
        self.block_time = iso.to_string();
    }

    /// Replaces the attached intents for the next call.
    pub fn set_intents(&mut self, intents: Vec<Intent>) {
        self.intents = intents;
    }

    /// Total amount drawn from `who` in `asset`.
    pub fn drawn_from(&self, who: &str, asset: Asset) -> u64 {
        self.draws
            .iter()
            .filter(|(s, _, a)| s == who && *a == asset)
            .map(|(_, amt, _)| amt)
            .sum()
    }

    /// Total amount transferred to `who` in `asset`.
    pub fn transferred_to(&self, who: &str, asset: Asset) -> u64 {
        self.transfers
            .iter()
            .filter(|(t, _, a)| t == who && *a == asset)
            .map(|(_, amt, _)| amt)
            .sum()
    }

    /// Event lines whose code equals `code`.
    pub fn events_with_code(&self, code: &str) -> Vec<&String> {
        let prefix = format!("{code}|");
        self.events.iter().filter(|e| e.starts_with(&prefix)).collect()
    }
}

impl HostEnv for MockHost {
    fn state_get(&self, key: &str) -> Option<Vec<u8>> {
        self.state.get(key).cloned()
    }

    fn state_set(&mut self, key: &str, value: &[u8]) {
        debug!(key, len = value.len(), "state_set");
        self.state.insert(key.to_string(), value.to_vec());
    }

    fn sender(&self) -> String {
        self.sender.clone()
    }

    fn block_time(&self) -> String {
        self.block_time.clone()
    }

    fn intents(&self) -> Vec<Intent> {
        self.intents.clone()
    }

    fn draw(&mut self, amount: u64, asset: Asset) {
        self.draws.push((self.sender.clone(), amount, asset));
    }

    fn transfer(&mut self, to: &str, amount: u64, asset: Asset) {
        self.transfers.push((to.to_string(), amount, asset));
    }

    fn log(&mut self, line: &str) {
        self.events.push(line.to_string());
    }
}
