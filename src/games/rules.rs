//! Win detection.
//!
//! Pure functions over a reconstructed grid. Rules are separated from board
//! storage so the engine can evaluate a placement without re-reading state.

use super::board::{Cell, Grid, Player};
use super::GameKind;
use tracing::instrument;

/// Outcome of a single placement, before considering draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The placed mark completed a winning line.
    Wins,
    /// The placed mark triggered the misère rule; the placer loses.
    Loses,
    /// The game continues.
    Neutral,
}

const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Checks whether the mark at `(row, col)` sits in a line of `win_len`
/// equal marks along any of the four directions.
///
/// With `exact_len` false, any run of at least `win_len` counts. With
/// `exact_len` true, the run must be exactly `win_len` long and bounded on
/// both ends by something other than the same mark — the Gomoku overline
/// rule.
#[instrument(skip(grid), level = "debug")]
pub fn check_pattern(grid: &Grid, row: usize, col: usize, win_len: usize, exact_len: bool) -> bool {
    let mark = match grid.get(row, col) {
        Cell::Occupied(p) => p,
        Cell::Empty => return false,
    };

    for (dr, dc) in DIRECTIONS {
        let mut count = 1;

        // walk forward until the run breaks, remembering where it ended
        let (mut fr, mut fc) = (row as isize + dr, col as isize + dc);
        while cell_is(grid, fr, fc, mark) {
            count += 1;
            fr += dr;
            fc += dc;
        }

        let (mut br, mut bc) = (row as isize - dr, col as isize - dc);
        while cell_is(grid, br, bc, mark) {
            count += 1;
            br -= dr;
            bc -= dc;
        }

        if !exact_len {
            if count >= win_len {
                return true;
            }
        } else if count == win_len {
            // both cells beyond the run must not extend it
            if cell_is(grid, fr, fc, mark) || cell_is(grid, br, bc, mark) {
                continue;
            }
            return true;
        }
    }

    false
}

fn cell_is(grid: &Grid, row: isize, col: isize, mark: Player) -> bool {
    row >= 0
        && col >= 0
        && grid.get(row as usize, col as usize) == Cell::Occupied(mark)
}

/// Evaluates the placement just made at `(row, col)` under the variant's
/// rules. The win check runs before the Squava misère check, so a move
/// completing a four (which necessarily contains a three) wins.
#[instrument(skip(grid), level = "debug")]
pub fn evaluate_placement(kind: GameKind, grid: &Grid, row: usize, col: usize) -> Placement {
    let (win_len, exact) = kind.win_rule();
    if check_pattern(grid, row, col, win_len, exact) {
        return Placement::Wins;
    }
    if kind == GameKind::Squava && check_pattern(grid, row, col, 3, exact) {
        return Placement::Loses;
    }
    Placement::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::board::Player;

    fn place(grid: &mut Grid, mark: Player, cells: &[(usize, usize)]) {
        for &(r, c) in cells {
            grid.set(r, c, Cell::Occupied(mark));
        }
    }

    #[test]
    fn test_no_win_on_empty_cell() {
        let grid = Grid::new(GameKind::TicTacToe);
        assert!(!check_pattern(&grid, 1, 1, 3, false));
    }

    #[test]
    fn test_three_in_a_row_all_directions() {
        for cells in [
            [(0, 0), (0, 1), (0, 2)], // row
            [(0, 0), (1, 0), (2, 0)], // column
            [(0, 0), (1, 1), (2, 2)], // diagonal
            [(0, 2), (1, 1), (2, 0)], // anti-diagonal
        ] {
            let mut grid = Grid::new(GameKind::TicTacToe);
            place(&mut grid, Player::X, &cells);
            assert!(check_pattern(&grid, cells[1].0, cells[1].1, 3, false));
        }
    }

    #[test]
    fn test_inexact_counts_longer_runs() {
        let mut grid = Grid::new(GameKind::ConnectFour);
        place(&mut grid, Player::O, &[(5, 0), (5, 1), (5, 2), (5, 3), (5, 4)]);
        assert!(check_pattern(&grid, 5, 2, 4, false));
    }

    #[test]
    fn test_gomoku_overline_does_not_win() {
        let mut grid = Grid::new(GameKind::Gomoku);
        // six in a row: no cell of the run is an exact five
        place(&mut grid, Player::X, &[(7, 3), (7, 4), (7, 5), (7, 6), (7, 7), (7, 8)]);
        for c in 3..=8 {
            assert!(!check_pattern(&grid, 7, c, 5, true), "overline won at col {c}");
        }
        // trimming one end leaves an exact five
        grid.set(7, 8, Cell::Empty);
        assert!(check_pattern(&grid, 7, 5, 5, true));
    }

    #[test]
    fn test_gomoku_five_bounded_by_opponent_wins() {
        let mut grid = Grid::new(GameKind::Gomoku);
        place(&mut grid, Player::X, &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
        place(&mut grid, Player::O, &[(0, 5)]);
        assert!(check_pattern(&grid, 0, 2, 5, true));
    }

    #[test]
    fn test_squava_three_loses_four_wins() {
        let mut grid = Grid::new(GameKind::Squava);
        place(&mut grid, Player::X, &[(2, 0), (2, 1), (2, 2)]);
        assert_eq!(evaluate_placement(GameKind::Squava, &grid, 2, 2), Placement::Loses);

        place(&mut grid, Player::X, &[(2, 3)]);
        assert_eq!(evaluate_placement(GameKind::Squava, &grid, 2, 3), Placement::Wins);
    }

    #[test]
    fn test_squava_two_is_neutral() {
        let mut grid = Grid::new(GameKind::Squava);
        place(&mut grid, Player::O, &[(0, 0), (0, 1)]);
        assert_eq!(evaluate_placement(GameKind::Squava, &grid, 0, 1), Placement::Neutral);
    }
}
