/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

#![warn(missing_docs)]

//! Minesweeper game logic.
//!
//! This is the environment a Minesweeper agent plays in: where the mines are, how many mines
//! surround a cell, and whether the game has been won or lost.

use rand::Rng as _;
use serde::{Deserialize, Serialize};

/// Random number generator used to place mines.
pub type Rng = rand_pcg::Pcg64;

/// Set type used for revealed and flagged positions.
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// Minesweeper error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MinesweeperError {
    /// Position is outside the board.
    #[error("position {position} is outside the {height}x{width} board")]
    OutOfBounds {
        /// The offending position.
        position: Position,

        /// Board height.
        height: usize,

        /// Board width.
        width: usize,
    },

    /// More mines were requested than the board has cells.
    #[error("cannot place {mines} mines on a board with {cells} cells")]
    TooManyMines {
        /// Requested mines.
        mines: usize,

        /// Cells on the board.
        cells: usize,
    },

    /// A mine has already been revealed.
    #[error("game is over")]
    GameOver,
}

/// Board position, 0-indexed from the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Row.
    pub row: usize,

    /// Column.
    pub col: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Where the mines are. This is the ground truth that the player cannot see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Whether each cell holds a mine, row-major.
    pub mines: Vec<bool>,

    /// Width of the board.
    pub width: usize,

    /// Height of the board.
    pub height: usize,
}

// print out cells, with X for mines, and row and column numbers which start at 0.
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity((self.width * 2 + 3) * (self.height + 1));

        s.push_str("  ");
        for col in 0..self.width {
            s.push_str(&format!("{}", col % 10));
            if col == self.width - 1 {
                s.push('\n');
            } else {
                s.push(' ');
            }
        }

        for row in 0..self.height {
            s.push_str(&format!("{} ", row % 10));
            for col in 0..self.width {
                let c = if self.mines[row * self.width + col] {
                    'X'
                } else {
                    '.'
                };
                s.push(c);
                if col < self.width - 1 {
                    s.push(' ');
                }
            }
            if row < self.height - 1 {
                s.push('\n');
            }
        }
        write!(f, "{}", s)
    }
}

impl Board {
    /// Create a board with `mine_count` mines placed uniformly at random.
    pub fn new(
        height: usize,
        width: usize,
        mine_count: usize,
        rng: &mut Rng,
    ) -> Result<Self, MinesweeperError> {
        let cells = height * width;
        if mine_count > cells {
            return Err(MinesweeperError::TooManyMines {
                mines: mine_count,
                cells,
            });
        }

        let mut mines = vec![false; cells];
        let mut placed = 0;
        while placed != mine_count {
            let i = rng.gen_range(0..cells);
            if !mines[i] {
                mines[i] = true;
                placed += 1;
            }
        }
        Ok(Self {
            mines,
            width,
            height,
        })
    }

    /// Create a board with mines at exactly the given positions.
    pub fn with_mines<I>(
        height: usize,
        width: usize,
        positions: I,
    ) -> Result<Self, MinesweeperError>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut board = Self {
            mines: vec![false; height * width],
            width,
            height,
        };
        for position in positions {
            let i = board.index(position)?;
            board.mines[i] = true;
        }
        Ok(board)
    }

    fn index(&self, position: Position) -> Result<usize, MinesweeperError> {
        if position.row >= self.height || position.col >= self.width {
            return Err(MinesweeperError::OutOfBounds {
                position,
                height: self.height,
                width: self.width,
            });
        }
        Ok(position.row * self.width + position.col)
    }

    /// Whether `position` is on the board.
    pub fn contains(&self, position: Position) -> bool {
        position.row < self.height && position.col < self.width
    }

    /// Whether there is a mine at `position`.
    pub fn is_mine(&self, position: Position) -> Result<bool, MinesweeperError> {
        Ok(self.mines[self.index(position)?])
    }

    /// Number of mines within one row and column of `position`, not including `position` itself.
    pub fn nearby_mines(&self, position: Position) -> Result<usize, MinesweeperError> {
        self.index(position)?;
        let rows = position.row.saturating_sub(1)..(position.row + 2).min(self.height);
        let cols = position.col.saturating_sub(1)..(position.col + 2).min(self.width);
        let mut count = 0;
        for row in rows {
            for col in cols.clone() {
                if (row, col) == (position.row, position.col) {
                    continue;
                }
                if self.mines[row * self.width + col] {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Total number of mines.
    pub fn mine_count(&self) -> usize {
        self.mines.iter().filter(|&&mine| mine).count()
    }

    /// Positions of all mines, row-major.
    pub fn mine_positions(&self) -> Vec<Position> {
        self.mines
            .iter()
            .enumerate()
            .filter(|(_, mine)| **mine)
            .map(|(i, _)| Position::new(i / self.width, i % self.width))
            .collect()
    }
}

/// What probing a cell revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reveal {
    /// The cell was a mine. The game is lost.
    Mine,

    /// The cell was safe and has this many mines around it.
    Safe(usize),
}

/// Whether the game is over, and if so, how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Still playing.
    InProgress,

    /// Every mine has been flagged and nothing else has.
    Won,

    /// A mine was revealed.
    Lost,
}

/// A game in progress: the hidden board plus what the player has revealed and flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minesweeper {
    board: Board,
    revealed: HashSet<Position>,
    flagged: HashSet<Position>,
    exploded: Option<Position>,
}

impl Minesweeper {
    /// Start a game on `board`.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            revealed: HashSet::default(),
            flagged: HashSet::default(),
            exploded: None,
        }
    }

    /// The hidden board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Positions revealed so far.
    pub fn revealed(&self) -> &HashSet<Position> {
        &self.revealed
    }

    /// Positions flagged as mines so far.
    pub fn flagged(&self) -> &HashSet<Position> {
        &self.flagged
    }

    /// Probe `position`.
    pub fn reveal(&mut self, position: Position) -> Result<Reveal, MinesweeperError> {
        if self.exploded.is_some() {
            return Err(MinesweeperError::GameOver);
        }
        if self.board.is_mine(position)? {
            self.exploded = Some(position);
            return Ok(Reveal::Mine);
        }
        self.revealed.insert(position);
        Ok(Reveal::Safe(self.board.nearby_mines(position)?))
    }

    /// Flag `position` as a mine.
    pub fn flag(&mut self, position: Position) -> Result<(), MinesweeperError> {
        if !self.board.contains(position) {
            return Err(MinesweeperError::OutOfBounds {
                position,
                height: self.board.height,
                width: self.board.width,
            });
        }
        self.flagged.insert(position);
        Ok(())
    }

    /// Whether the flags are exactly the mines.
    pub fn won(&self) -> bool {
        self.exploded.is_none()
            && self.flagged.len() == self.board.mine_count()
            && self
                .flagged
                .iter()
                .all(|&position| self.board.is_mine(position).unwrap_or(false))
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        if self.exploded.is_some() {
            GameStatus::Lost
        } else if self.won() {
            GameStatus::Won
        } else {
            GameStatus::InProgress
        }
    }
}

impl std::fmt::Display for Minesweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.board.height {
            for col in 0..self.board.width {
                let position = Position::new(row, col);
                let c = if self.exploded == Some(position) {
                    '*'
                } else if self.flagged.contains(&position) {
                    'F'
                } else if self.revealed.contains(&position) {
                    match self.board.nearby_mines(position) {
                        Ok(0) => ' ',
                        Ok(n) => char::from_digit(n as u32, 10).unwrap_or('?'),
                        Err(_) => '?',
                    }
                } else {
                    '-'
                };
                write!(f, "|{}", c)?;
            }
            write!(f, "|")?;
            if row < self.board.height - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;

    use super::*;
    use super::Rng;

    fn positions(coords: &[(usize, usize)]) -> Vec<Position> {
        coords.iter().map(|&(r, c)| Position::new(r, c)).collect()
    }

    #[test]
    fn test_board_with_mines() {
        let board = Board::with_mines(3, 3, positions(&[(0, 0), (1, 1)])).expect("board");
        assert_eq!(board.is_mine(Position::new(0, 0)), Ok(true));
        assert_eq!(board.is_mine(Position::new(0, 1)), Ok(false));
        assert_eq!(board.mine_count(), 2);
        assert_eq!(board.mine_positions(), positions(&[(0, 0), (1, 1)]));
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::with_mines(3, 3, positions(&[(0, 0), (1, 0), (1, 1)])).expect("board");
        assert_eq!(board.nearby_mines(Position::new(0, 1)), Ok(3));
        assert_eq!(board.nearby_mines(Position::new(1, 1)), Ok(2));
        assert_eq!(board.nearby_mines(Position::new(2, 2)), Ok(1));
        assert_eq!(board.nearby_mines(Position::new(0, 2)), Ok(1));
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::with_mines(2, 3, Vec::new()).expect("board");
        assert_eq!(
            board.is_mine(Position::new(2, 0)),
            Err(MinesweeperError::OutOfBounds {
                position: Position::new(2, 0),
                height: 2,
                width: 3,
            })
        );
        assert!(Board::with_mines(2, 3, positions(&[(0, 3)])).is_err());
    }

    #[test]
    fn test_too_many_mines() {
        let mut rng = Rng::seed_from_u64(42);
        assert_eq!(
            Board::new(2, 2, 5, &mut rng),
            Err(MinesweeperError::TooManyMines { mines: 5, cells: 4 })
        );
    }

    #[test]
    fn test_board_display() {
        let board = Board::with_mines(2, 3, positions(&[(0, 1)])).expect("board");
        assert_eq!(board.to_string(), "  0 1 2\n0 . X .\n1 . . .");
    }

    #[test]
    fn test_reveal_safe_then_mine() {
        let board = Board::with_mines(2, 2, positions(&[(1, 1)])).expect("board");
        let mut game = Minesweeper::new(board);
        assert_eq!(game.reveal(Position::new(0, 0)), Ok(Reveal::Safe(1)));
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.reveal(Position::new(1, 1)), Ok(Reveal::Mine));
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(
            game.reveal(Position::new(0, 1)),
            Err(MinesweeperError::GameOver)
        );
    }

    #[test]
    fn test_won_when_flags_match_mines() {
        let board = Board::with_mines(2, 2, positions(&[(1, 1)])).expect("board");
        let mut game = Minesweeper::new(board);
        game.flag(Position::new(0, 0)).expect("flag");
        assert!(!game.won());

        let board = Board::with_mines(2, 2, positions(&[(1, 1)])).expect("board");
        let mut game = Minesweeper::new(board);
        game.flag(Position::new(1, 1)).expect("flag");
        assert!(game.won());
        assert_eq!(game.status(), GameStatus::Won);
    }

    #[test]
    fn test_game_display() {
        let board = Board::with_mines(2, 2, positions(&[(1, 1)])).expect("board");
        let mut game = Minesweeper::new(board);
        game.reveal(Position::new(0, 0)).expect("reveal");
        game.flag(Position::new(1, 1)).expect("flag");
        assert_eq!(game.to_string(), "|1|-|\n|-|F|");
    }

    proptest! {
        #[test]
        fn test_random_board_has_exact_mine_count(
            height in 1..10usize,
            width in 1..10usize,
            seed in any::<u64>(),
            fraction in 0.0..1.0f64,
        ) {
            let mines = ((height * width) as f64 * fraction) as usize;
            let mut rng = Rng::seed_from_u64(seed);
            let board = Board::new(height, width, mines, &mut rng).expect("board");
            prop_assert_eq!(board.mine_count(), mines);
        }

        #[test]
        fn test_nearby_mines_at_most_eight(
            height in 1..10usize,
            width in 1..10usize,
            seed in any::<u64>(),
        ) {
            let mut rng = Rng::seed_from_u64(seed);
            let board = Board::new(height, width, height * width / 2, &mut rng).expect("board");
            for row in 0..height {
                for col in 0..width {
                    let count = board.nearby_mines(Position::new(row, col)).expect("in bounds");
                    prop_assert!(count <= 8);
                }
            }
        }
    }
}
