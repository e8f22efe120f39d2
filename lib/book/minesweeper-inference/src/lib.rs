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

//! Knowledge-based Minesweeper agent.
//!
//! The agent keeps a knowledge base of propositional sentences of the form "exactly `count` of
//! these cells are mines". Every time the environment reveals a safe cell together with the number
//! of mines around it, the agent adds a sentence and then runs inference to a fixpoint, learning
//! which cells are certainly safe and which are certainly mines.
//!
//! See Chapter 7: Logical Agents. The Minesweeper world is a close relative of the wumpus world,
//! and subset inference here is a specialised form of resolution over cardinality constraints.

use serde::{Deserialize, Serialize};

mod agent;
mod knowledge;
mod sentence;

pub use agent::{KnowledgeSnapshot, MinesweeperAgent, Move, MoveKind, PropagationStats};
pub use knowledge::{KnowledgeBase, SentenceKey};
pub use sentence::Sentence;

/// Random number generator used for move selection. Seed it for reproducible games.
pub type Rng = rand_pcg::Pcg64;

/// Set type used throughout the agent. Fx hashing is deterministic across runs.
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

/// A board coordinate, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row, counted from the top.
    pub row: usize,

    /// Column, counted from the left.
    pub col: usize,
}

impl Cell {
    /// Create a new cell.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// A logical contradiction in the knowledge base. This can only happen if the environment reported
/// a mine count that does not match the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Contradiction {
    /// Cell was proven to be both safe and a mine.
    #[error("cell {0} is known to be both safe and a mine")]
    SafeAndMine(Cell),

    /// Sentence claims more mines than it has cells.
    #[error("sentence {0} claims more mines than it has cells")]
    TooManyMines(Sentence),

    /// Removing a mine from the sentence would leave a negative count.
    #[error("sentence {0} cannot account for another mine")]
    NegativeCount(Sentence),

    /// Probe reported fewer mines than the agent already knows surround the cell.
    #[error("cell {cell} reported {count} nearby mines but {known} are already known")]
    FewerThanKnownMines {
        /// The probed cell.
        cell: Cell,

        /// Reported count.
        count: usize,

        /// Mines already known among the neighbors.
        known: usize,
    },
}

/// Agent error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    /// Cell is outside the board the agent was built for.
    #[error("cell {cell} is outside the {height}x{width} board")]
    InvalidInput {
        /// The offending cell.
        cell: Cell,

        /// Board height.
        height: usize,

        /// Board width.
        width: usize,
    },

    /// Knowledge base became inconsistent. The agent should be discarded.
    #[error("inconsistent knowledge: {0}")]
    Inconsistent(#[from] Contradiction),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::new(2, 7).to_string(), "(2, 7)");
    }

    #[test]
    fn test_cell_from_tuple() {
        assert_eq!(Cell::from((1, 3)), Cell { row: 1, col: 3 });
    }

    #[test]
    fn test_cells_order_row_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]);
    }

    #[test]
    fn test_inconsistent_error_message() {
        let err: InferenceError = Contradiction::SafeAndMine(Cell::new(0, 0)).into();
        assert_eq!(
            err.to_string(),
            "inconsistent knowledge: cell (0, 0) is known to be both safe and a mine"
        );
    }
}
