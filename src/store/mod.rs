//! Typed access to the host key/value store.
//!
//! One module owns every key string and record format so the storage layout
//! stays auditable in one place. Games persist as independent records —
//! meta, mutable state, per-move entries, a move counter, the Swap2 opening
//! record — plus two global structures: the game counter and the flat
//! waiting list.

pub mod records;

pub use records::{GameState, GameStatus, Meta, MoveRecord};

use crate::codec;
use crate::error::{EngineError, Result};
use crate::host::HostEnv;
use crate::opening::Swap2State;
use tracing::debug;

const GAME_COUNT_KEY: &str = "g_count";
const WAIT_COUNT_KEY: &str = "g_wait_count";

fn meta_key(id: u64) -> String {
    format!("g_{id}_meta")
}

fn state_key(id: u64) -> String {
    format!("g_{id}_state")
}

fn move_count_key(id: u64) -> String {
    format!("g_{id}_moves")
}

fn move_key(id: u64, n: u64) -> String {
    format!("g_{id}_move_{n}")
}

fn swap2_key(id: u64) -> String {
    format!("g_{id}_swap2")
}

fn wait_key(i: u64) -> String {
    format!("g_wait_{i}")
}

/// Reads a key, treating an empty value the same as an absent one:
/// clearing a record writes empty bytes because the host has no delete.
fn get_nonempty<H: HostEnv>(host: &H, key: &str) -> Option<Vec<u8>> {
    host.state_get(key).filter(|v| !v.is_empty())
}

fn get_counter<H: HostEnv>(host: &H, key: &str) -> Result<u64> {
    match get_nonempty(host, key) {
        Some(bytes) => {
            let text = String::from_utf8(bytes).map_err(|_| EngineError::InvalidNumber)?;
            codec::parse_u64(&text)
        }
        None => Ok(0),
    }
}

fn set_counter<H: HostEnv>(host: &mut H, key: &str, n: u64) {
    host.state_set(key, codec::decimal_string(n).as_bytes());
}

/// Next free game id; also the number of games ever created.
pub fn game_count<H: HostEnv>(host: &H) -> Result<u64> {
    get_counter(host, GAME_COUNT_KEY)
}

/// Updates the global game counter.
pub fn set_game_count<H: HostEnv>(host: &mut H, n: u64) {
    set_counter(host, GAME_COUNT_KEY, n);
}

/// Loads the immutable meta record. `game not found` when the id was never
/// allocated, `meta missing` when the record itself is gone.
pub fn load_meta<H: HostEnv>(host: &H, id: u64) -> Result<Meta> {
    if id >= game_count(host)? {
        return Err(EngineError::GameNotFound);
    }
    let bytes = get_nonempty(host, &meta_key(id)).ok_or(EngineError::MetaMissing)?;
    Meta::decode(&bytes)
}

/// Writes the meta record.
pub fn save_meta<H: HostEnv>(host: &mut H, id: u64, meta: &Meta) -> Result<()> {
    let bytes = meta.encode()?;
    debug!(id, len = bytes.len(), "saving meta record");
    host.state_set(&meta_key(id), &bytes);
    Ok(())
}

/// Loads the mutable state record.
pub fn load_state<H: HostEnv>(host: &H, id: u64) -> Result<GameState> {
    let bytes = get_nonempty(host, &state_key(id)).ok_or(EngineError::StateMissing)?;
    GameState::decode(&bytes)
}

/// Writes the mutable state record.
pub fn save_state<H: HostEnv>(host: &mut H, id: u64, state: &GameState) -> Result<()> {
    let bytes = state.encode()?;
    host.state_set(&state_key(id), &bytes);
    Ok(())
}

/// Number of stored moves for a game; zero before the first move.
pub fn move_count<H: HostEnv>(host: &H, id: u64) -> Result<u64> {
    get_counter(host, &move_count_key(id))
}

/// Updates the stored move counter.
pub fn set_move_count<H: HostEnv>(host: &mut H, id: u64, n: u64) {
    set_counter(host, &move_count_key(id), n);
}

/// Loads the 1-based move `n`.
pub fn load_move<H: HostEnv>(host: &H, id: u64, n: u64) -> Result<MoveRecord> {
    let bytes = get_nonempty(host, &move_key(id, n)).ok_or(EngineError::MoveMissing(n))?;
    MoveRecord::decode(&bytes)
}

/// Writes move `n`. Move records are append-only; nothing rewrites them.
pub fn save_move<H: HostEnv>(host: &mut H, id: u64, n: u64, rec: &MoveRecord) {
    host.state_set(&move_key(id, n), &rec.encode());
}

/// Loads the whole move log in order.
pub fn load_moves<H: HostEnv>(host: &H, id: u64) -> Result<Vec<MoveRecord>> {
    let count = move_count(host, id)?;
    let mut moves = Vec::with_capacity(count as usize);
    for n in 1..=count {
        moves.push(load_move(host, id, n)?);
    }
    Ok(moves)
}

/// Unix time of the latest activity: creation, or the last recorded move.
pub fn last_move_at<H: HostEnv>(host: &H, id: u64, created_at: u64) -> Result<u64> {
    let count = move_count(host, id)?;
    if count == 0 {
        return Ok(created_at);
    }
    let last = load_move(host, id, count)?;
    Ok(created_at + u64::from(last.dts))
}

/// Loads the Swap2 opening record, `None` once the opening completed.
pub fn load_swap2<H: HostEnv>(host: &H, id: u64) -> Result<Option<Swap2State>> {
    match get_nonempty(host, &swap2_key(id)) {
        Some(bytes) => Ok(Some(Swap2State::decode(&bytes)?)),
        None => Ok(None),
    }
}

/// Writes the Swap2 opening record.
pub fn save_swap2<H: HostEnv>(host: &mut H, id: u64, st: &Swap2State) {
    host.state_set(&swap2_key(id), &st.encode());
}

/// Clears the Swap2 opening record once the opening is over.
pub fn clear_swap2<H: HostEnv>(host: &mut H, id: u64) {
    host.state_set(&swap2_key(id), &[]);
}

/// Appends a game to the waiting list.
pub fn add_waiting<H: HostEnv>(host: &mut H, id: u64) -> Result<()> {
    let count = get_counter(host, WAIT_COUNT_KEY)?;
    host.state_set(&wait_key(count), codec::decimal_string(id).as_bytes());
    set_counter(host, WAIT_COUNT_KEY, count + 1);
    Ok(())
}

/// Removes a game from the waiting list by swapping the last entry into
/// its slot and shrinking. Order is not preserved.
pub fn remove_waiting<H: HostEnv>(host: &mut H, id: u64) -> Result<()> {
    let count = get_counter(host, WAIT_COUNT_KEY)?;
    let wanted = codec::decimal_string(id);

    let idx = (0..count)
        .find(|&i| {
            get_nonempty(host, &wait_key(i)).is_some_and(|v| v == wanted.as_bytes())
        })
        .ok_or(EngineError::GameNotFound)?;

    let last = count - 1;
    if idx != last {
        if let Some(val) = get_nonempty(host, &wait_key(last)) {
            host.state_set(&wait_key(idx), &val);
        }
    }
    host.state_set(&wait_key(last), &[]);
    set_counter(host, WAIT_COUNT_KEY, last);
    Ok(())
}

/// Ids of all games currently waiting for an opponent, in list order.
pub fn waiting_ids<H: HostEnv>(host: &H) -> Result<Vec<u64>> {
    let count = get_counter(host, WAIT_COUNT_KEY)?;
    let mut ids = Vec::with_capacity(count as usize);
    for i in 0..count {
        if let Some(bytes) = get_nonempty(host, &wait_key(i)) {
            let text = String::from_utf8(bytes).map_err(|_| EngineError::InvalidNumber)?;
            ids.push(codec::parse_u64(&text)?);
        }
    }
    Ok(ids)
}
