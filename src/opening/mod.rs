//! Swap2 fair-opening protocol for the 15×15 five-in-a-row variant.
//!
//! The opening balances the first-move advantage: the X-role places a trio
//! (two X, one O), then the O-role either keeps colors, swaps them, or
//! places two extra stones and hands the color choice back to the X-role.
//!
//! ```text
//! Opening ──trio placed──▶ SwapChoice ──stay/swap──▶ (complete)
//!                              │
//!                             add
//!                              ▼
//!                         ExtraPlace ──both placed──▶ ColorChoice ──▶ (complete)
//! ```
//!
//! The state machine here is pure; the engine owns board placement, move
//! records and role swaps. On completion the stored record is cleared, so
//! "no record" is the resting state of every non-opening game.

use crate::error::{EngineError, Result};
use crate::games::Player;
use serde::{Deserialize, Serialize};

/// Phase of an active opening. `None` is never stored — completion deletes
/// the record instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// X-role placing the initial trio: two X stones and one O stone.
    Opening = 1,
    /// O-role choosing `swap`, `stay` or `add`.
    SwapChoice = 2,
    /// O-role placing one extra X and one extra O stone.
    ExtraPlace = 3,
    /// X-role picking the final color.
    ColorChoice = 4,
}

impl Phase {
    fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Phase::Opening),
            2 => Ok(Phase::SwapChoice),
            3 => Ok(Phase::ExtraPlace),
            4 => Ok(Phase::ColorChoice),
            _ => Err(EngineError::DecodeOverflow),
        }
    }
}

/// Decision taken at the `SwapChoice` phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapChoice {
    /// Swap role holders and end the opening.
    Swap,
    /// Keep role holders and end the opening.
    Stay,
    /// Continue with two extra stones.
    Add,
}

/// Persistent opening state: the phase, the role expected to act, and the
/// per-color stone counters.
///
/// Stored as exactly 6 bytes:
/// `phase:u8 | next_actor:u8 | init_x:u8 | init_o:u8 | extra_x:u8 | extra_o:u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap2State {
    phase: Phase,
    next_actor: Player,
    init_x: u8,
    init_o: u8,
    extra_x: u8,
    extra_o: u8,
}

impl Swap2State {
    /// Fresh opening, created at join: the X-role acts first.
    pub fn init() -> Self {
        Self {
            phase: Phase::Opening,
            next_actor: Player::X,
            init_x: 0,
            init_o: 0,
            extra_x: 0,
            extra_o: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Role whose action is due.
    pub fn next_actor(&self) -> Player {
        self.next_actor
    }

    /// Serializes to the 6-byte record.
    pub fn encode(&self) -> [u8; 6] {
        [
            self.phase as u8,
            self.next_actor.code(),
            self.init_x,
            self.init_o,
            self.extra_x,
            self.extra_o,
        ]
    }

    /// Deserializes the 6-byte record.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 6 {
            return Err(EngineError::DecodeOverflow);
        }
        Ok(Self {
            phase: Phase::from_code(bytes[0])?,
            next_actor: Player::from_code(bytes[1]).ok_or(EngineError::DecodeOverflow)?,
            init_x: bytes[2],
            init_o: bytes[3],
            extra_x: bytes[4],
            extra_o: bytes[5],
        })
    }

    /// Accounts one trio stone of the given color. Returns `true` when the
    /// trio is complete and the machine advanced to `SwapChoice`.
    pub fn place_opening(&mut self, color: Player) -> Result<bool> {
        if self.phase != Phase::Opening {
            return Err(EngineError::WrongPhase);
        }
        match color {
            Player::X => {
                if self.init_x >= 2 {
                    return Err(EngineError::TooManyXInOpening);
                }
                self.init_x += 1;
            }
            Player::O => {
                if self.init_o >= 1 {
                    return Err(EngineError::TooManyOInOpening);
                }
                self.init_o += 1;
            }
        }
        if self.init_x == 2 && self.init_o == 1 {
            self.phase = Phase::SwapChoice;
            self.next_actor = Player::O;
            return Ok(true);
        }
        Ok(false)
    }

    /// Running trio counters `(x, o)`, for event attributes.
    pub fn opening_counts(&self) -> (u8, u8) {
        (self.init_x, self.init_o)
    }

    /// Running extra-stone counters `(x, o)`, for event attributes.
    pub fn extra_counts(&self) -> (u8, u8) {
        (self.extra_x, self.extra_o)
    }

    /// Applies the `SwapChoice` decision. `Add` advances to `ExtraPlace`;
    /// the terminal choices leave completion (record deletion, role swap)
    /// to the caller.
    pub fn choose(&mut self, choice: &str) -> Result<SwapChoice> {
        if self.phase != Phase::SwapChoice {
            return Err(EngineError::WrongPhase);
        }
        match choice {
            "swap" => Ok(SwapChoice::Swap),
            "stay" => Ok(SwapChoice::Stay),
            "add" => {
                self.phase = Phase::ExtraPlace;
                self.next_actor = Player::O;
                self.extra_x = 0;
                self.extra_o = 0;
                Ok(SwapChoice::Add)
            }
            _ => Err(EngineError::InvalidChoice),
        }
    }

    /// Accounts one extra stone. Returns `true` when both extras are down
    /// and the machine advanced to `ColorChoice`.
    pub fn place_extra(&mut self, color: Player) -> Result<bool> {
        if self.phase != Phase::ExtraPlace {
            return Err(EngineError::WrongPhase);
        }
        match color {
            Player::X => {
                if self.extra_x >= 1 {
                    return Err(EngineError::ExtraXAlreadyPlaced);
                }
                self.extra_x += 1;
            }
            Player::O => {
                if self.extra_o >= 1 {
                    return Err(EngineError::ExtraOAlreadyPlaced);
                }
                self.extra_o += 1;
            }
        }
        if self.extra_x == 1 && self.extra_o == 1 {
            self.phase = Phase::ColorChoice;
            self.next_actor = Player::X;
            return Ok(true);
        }
        Ok(false)
    }

    /// Applies the final color choice. Returns `true` when the roles must
    /// swap (the X-role chose to play O).
    pub fn choose_color(&mut self, code: u8) -> Result<bool> {
        if self.phase != Phase::ColorChoice {
            return Err(EngineError::WrongPhase);
        }
        match code {
            1 => Ok(false),
            2 => Ok(true),
            _ => Err(EngineError::InvalidColor),
        }
    }
}
