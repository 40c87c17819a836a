//! Binary record formats.
//!
//! Each game persists as a handful of independent keyed records so an
//! operation only touches the bytes it needs: immutable meta, a small
//! mutable state record, one record per move, and counters stored as ASCII
//! decimal. All integers are big-endian; optional fields carry a one-byte
//! presence flag. Layouts are fixed — hosts replaying old state must read
//! identical bytes.

use crate::codec::{self, Reader};
use crate::error::{EngineError, Result};
use crate::games::{GameKind, Player};
use crate::host::Asset;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a game. Transitions are one-way:
/// Waiting → InProgress → Finished, with Waiting → Finished permitted only
/// for a creator resigning an unjoined game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameStatus {
    /// Created, waiting for an opponent.
    Waiting = 0,
    /// Both players joined; moves are being made.
    InProgress = 1,
    /// Ended by win, draw, resignation or timeout.
    Finished = 2,
}

impl GameStatus {
    /// Wire code of this status.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parses a wire code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(GameStatus::Waiting),
            1 => Ok(GameStatus::InProgress),
            2 => Ok(GameStatus::Finished),
            _ => Err(EngineError::DecodeOverflow),
        }
    }
}

/// Immutable game metadata, written at create and touched once more at
/// join (to record the opponent identity).
///
/// Layout: `type:u8 | name:LP8 | creator:LP8 | opt(opponent:LP8) |
/// opt(asset:LP8) | opt(bet:u64) | opt(fmc:u64) | created_at:u64`.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct Meta {
    /// Game variant.
    kind: GameKind,
    /// Human-readable name; at most 255 bytes, no `|`.
    name: String,
    /// Address that created the game.
    creator: String,
    /// Address that joined, once someone has.
    opponent: Option<String>,
    /// Wager token, present iff a bet was escrowed at create.
    asset: Option<Asset>,
    /// Wager amount in fixed-point-3 units.
    bet: Option<u64>,
    /// Optional fee a joiner may pay to buy the first move.
    first_move_cost: Option<u64>,
    /// Creation block time, unix seconds. Move timestamps are deltas
    /// against this.
    created_at: u64,
}

impl Meta {
    /// Records the joined opponent's identity.
    pub fn set_opponent(&mut self, addr: String) {
        self.opponent = Some(addr);
    }

    /// Attaches the escrowed wager.
    pub fn set_wager(&mut self, asset: Asset, bet: u64) {
        self.asset = Some(asset);
        self.bet = Some(bet);
    }

    /// Whether a non-zero wager is attached.
    pub fn has_wager(&self) -> bool {
        self.asset.is_some() && self.bet.is_some_and(|b| b > 0)
    }

    /// Serializes into the fixed binary layout.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(64 + self.name.len());
        out.push(self.kind.code());
        codec::append_str8(&mut out, &self.name)?;
        codec::append_str8(&mut out, &self.creator)?;

        match &self.opponent {
            Some(addr) => {
                out.push(1);
                codec::append_str8(&mut out, addr)?;
            }
            None => out.push(0),
        }
        match self.asset {
            Some(asset) => {
                out.push(1);
                codec::append_str8(&mut out, asset.symbol())?;
            }
            None => out.push(0),
        }
        match self.bet {
            Some(bet) => {
                out.push(1);
                codec::append_u64(&mut out, bet);
            }
            None => out.push(0),
        }
        match self.first_move_cost {
            Some(fmc) => {
                out.push(1);
                codec::append_u64(&mut out, fmc);
            }
            None => out.push(0),
        }
        codec::append_u64(&mut out, self.created_at);
        Ok(out)
    }

    /// Deserializes a record, requiring exact consumption.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let kind = GameKind::from_code(r.u8()?)?;
        let name = r.str8()?;
        let creator = r.str8()?;

        let opponent = if r.u8()? == 1 { Some(r.str8()?) } else { None };
        let asset = if r.u8()? == 1 {
            let symbol = r.str8()?;
            Some(Asset::from_symbol(&symbol).map_err(|_| EngineError::DecodeOverflow)?)
        } else {
            None
        };
        let bet = if r.u8()? == 1 { Some(r.u64()?) } else { None };
        let first_move_cost = if r.u8()? == 1 { Some(r.u64()?) } else { None };
        let created_at = r.u64()?;
        r.finish()?;

        Ok(Self {
            kind,
            name,
            creator,
            opponent,
            asset,
            bet,
            first_move_cost,
            created_at,
        })
    }
}

/// Mutable game state: the lifecycle status, the winner once decided, and
/// the role assignment. Roles start as `(creator, joiner)` and may flip at
/// join (first-move purchase) or during the Swap2 opening.
///
/// Layout: `status:u8 | opt(winner:LP16) | player_x:LP16 |
/// opt(player_o:LP16)`.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameState {
    /// Lifecycle stage.
    status: GameStatus,
    /// Winning address, set only for games finished by win.
    winner: Option<String>,
    /// Address currently playing the X mark.
    player_x: String,
    /// Address currently playing the O mark, once joined.
    player_o: Option<String>,
}

impl GameState {
    /// State of a freshly created game: waiting, creator on X.
    pub fn waiting(creator: String) -> Self {
        Self {
            status: GameStatus::Waiting,
            winner: None,
            player_x: creator,
            player_o: None,
        }
    }

    /// Assigns both roles at join time.
    pub fn assign_roles(&mut self, player_x: String, player_o: String) {
        self.player_x = player_x;
        self.player_o = Some(player_o);
    }

    /// Swaps the X and O role holders. No-op until an opponent joined.
    pub fn swap_roles(&mut self) {
        if let Some(o) = self.player_o.take() {
            self.player_o = Some(std::mem::replace(&mut self.player_x, o));
        }
    }

    /// Marks the game started.
    pub fn start(&mut self) {
        self.status = GameStatus::InProgress;
    }

    /// Marks the game finished, with a winner when one exists.
    pub fn finish(&mut self, winner: Option<String>) {
        self.status = GameStatus::Finished;
        self.winner = winner;
    }

    /// Whether `addr` holds either role.
    pub fn is_player(&self, addr: &str) -> bool {
        addr == self.player_x || self.player_o.as_deref() == Some(addr)
    }

    /// Role held by `addr`, when it holds one.
    pub fn role_of(&self, addr: &str) -> Option<Player> {
        if addr == self.player_x {
            Some(Player::X)
        } else if self.player_o.as_deref() == Some(addr) {
            Some(Player::O)
        } else {
            None
        }
    }

    /// Address holding the given role; `None` for O before a join.
    pub fn address_of(&self, role: Player) -> Option<&str> {
        match role {
            Player::X => Some(self.player_x.as_str()),
            Player::O => self.player_o.as_deref(),
        }
    }

    /// Serializes into the fixed binary layout.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(64);
        out.push(self.status.code());
        match &self.winner {
            Some(w) => {
                out.push(1);
                codec::append_str16(&mut out, w)?;
            }
            None => out.push(0),
        }
        codec::append_str16(&mut out, &self.player_x)?;
        match &self.player_o {
            Some(o) => {
                out.push(1);
                codec::append_str16(&mut out, o)?;
            }
            None => out.push(0),
        }
        Ok(out)
    }

    /// Deserializes a record, requiring exact consumption.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let status = GameStatus::from_code(r.u8()?)?;
        let winner = if r.u8()? == 1 { Some(r.str16()?) } else { None };
        let player_x = r.str16()?;
        let player_o = if r.u8()? == 1 { Some(r.str16()?) } else { None };
        r.finish()?;
        Ok(Self {
            status,
            winner,
            player_x,
            player_o,
        })
    }
}

/// One move: target cell and seconds elapsed since game creation. The mark
/// is never stored — it follows from the move's index parity.
///
/// Layout: exactly 6 bytes, `row:u8 | col:u8 | Δts:u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct MoveRecord {
    /// Target row (for gravity games, the row the piece landed on).
    pub row: u8,
    /// Target column.
    pub col: u8,
    /// Seconds since the game's `created_at`.
    pub dts: u32,
}

impl MoveRecord {
    /// Serializes to the 6-byte form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6);
        out.push(self.row);
        out.push(self.col);
        codec::append_u32(&mut out, self.dts);
        out
    }

    /// Deserializes, rejecting any size but 6 bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 6 {
            return Err(EngineError::CorruptMoveData);
        }
        let mut r = Reader::new(bytes);
        let row = r.u8()?;
        let col = r.u8()?;
        let dts = r.u32()?;
        Ok(Self { row, col, dts })
    }
}
