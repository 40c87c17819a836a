//! Board storage and move-log reconstruction.

use super::GameKind;
use serde::{Deserialize, Serialize};

/// A player role: which mark a participant plays. Roles are assigned at
/// join and may move between addresses (first-move purchase, Swap2); the
/// mark sequence itself never changes — X plays every odd-indexed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// The X mark, wire code 1. Moves first.
    X,
    /// The O mark, wire code 2. Moves second.
    O,
}

impl Player {
    /// Returns the other role.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Wire code: 1 for X, 2 for O.
    pub fn code(self) -> u8 {
        match self {
            Player::X => 1,
            Player::O => 2,
        }
    }

    /// Parses a wire code; anything but 1 or 2 is `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Player::X),
            2 => Some(Player::O),
            _ => None,
        }
    }

    /// Mark of the 1-based move `n`: X plays odd moves, O even ones.
    pub fn for_move(n: u64) -> Self {
        if n % 2 == 1 { Player::X } else { Player::O }
    }

    /// Role expected to act when `count` moves have been played.
    pub fn next_to_play(count: u64) -> Self {
        Self::for_move(count + 1)
    }
}

/// Occupancy of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No mark yet.
    Empty,
    /// Occupied by the given role's mark.
    Occupied(Player),
}

impl Cell {
    /// ASCII digit used in the `g_get` board rendering.
    pub fn ascii(self) -> u8 {
        match self {
            Cell::Empty => b'0',
            Cell::Occupied(Player::X) => b'1',
            Cell::Occupied(Player::O) => b'2',
        }
    }
}

/// An in-memory `rows × cols` grid, reconstructed per call from the move
/// log and discarded afterwards. Nothing here touches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid sized for the game variant.
    pub fn new(kind: GameKind) -> Self {
        let (rows, cols) = kind.dims();
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    /// Rebuilds the board from the ordered move positions. The mark of each
    /// move is derived from its 1-based index parity, never stored.
    pub fn replay<I>(kind: GameKind, positions: I) -> Self
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut grid = Self::new(kind);
        for (n, (row, col)) in positions.into_iter().enumerate() {
            let mark = Player::for_move(n as u64 + 1);
            grid.set(usize::from(row), usize::from(col), Cell::Occupied(mark));
        }
        grid
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `(row, col)` lies on the board.
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Cell at `(row, col)`. Out-of-range reads count as empty; callers
    /// bounds-check before mutating.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        if self.in_bounds(row, col) {
            self.cells[row * self.cols + col]
        } else {
            Cell::Empty
        }
    }

    /// Writes a cell.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.in_bounds(row, col) {
            self.cells[row * self.cols + col] = cell;
        }
    }

    /// Whether the cell at `(row, col)` is empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Cell::Empty
    }

    /// Lowest empty row in `col`, for gravity games. `None` when the
    /// column is full.
    pub fn drop_row(&self, col: usize) -> Option<usize> {
        (0..self.rows).rev().find(|&r| self.is_empty(r, col))
    }

    /// Row-major ASCII rendering: `'0'` empty, `'1'` X, `'2'` O.
    pub fn ascii(&self) -> String {
        let bytes: Vec<u8> = self.cells.iter().map(|c| c.ascii()).collect();
        // cells render to ASCII digits only
        String::from_utf8(bytes).unwrap_or_default()
    }
}
