//! Game variants and their rules.
//!
//! Five two-player grid games share one framework; a [`GameKind`] carries
//! everything variant-specific: the board dimensions and the line length
//! (and exactness) required to win. Board storage lives in [`board`], the
//! pure rule functions in [`rules`].

pub mod board;
pub mod rules;

pub use board::{Cell, Grid, Player};
pub use rules::{check_pattern, evaluate_placement, Placement};

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// A supported game variant. The discriminants are the wire codes used at
/// the boundary and in the meta record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[repr(u8)]
pub enum GameKind {
    /// 3×3, three in a row wins.
    TicTacToe = 1,
    /// 6×7 gravity drop, four in a row wins.
    ConnectFour = 2,
    /// 15×15, exactly five in a row wins (overlines do not count).
    Gomoku = 3,
    /// 5×5, four in a row wins.
    TicTacToe5 = 4,
    /// 5×5 misère variant: four in a row wins, but making a bare three loses.
    Squava = 5,
}

impl GameKind {
    /// Parses a wire code into a variant.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(GameKind::TicTacToe),
            2 => Ok(GameKind::ConnectFour),
            3 => Ok(GameKind::Gomoku),
            4 => Ok(GameKind::TicTacToe5),
            5 => Ok(GameKind::Squava),
            _ => Err(EngineError::InvalidType),
        }
    }

    /// Wire code of this variant.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Board dimensions as `(rows, cols)`.
    pub fn dims(self) -> (usize, usize) {
        match self {
            GameKind::TicTacToe => (3, 3),
            GameKind::TicTacToe5 => (5, 5),
            GameKind::Squava => (5, 5),
            GameKind::ConnectFour => (6, 7),
            GameKind::Gomoku => (15, 15),
        }
    }

    /// Line length required to win and whether the line must be exactly
    /// that long (the Gomoku overline rule).
    pub fn win_rule(self) -> (usize, bool) {
        match self {
            GameKind::TicTacToe => (3, false),
            GameKind::TicTacToe5 => (4, false),
            GameKind::Squava => (4, false),
            GameKind::ConnectFour => (4, false),
            GameKind::Gomoku => (5, true),
        }
    }

    /// Whether pieces fall to the lowest empty row of the chosen column
    /// instead of landing on the addressed cell.
    pub fn is_gravity(self) -> bool {
        matches!(self, GameKind::ConnectFour)
    }
}
