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

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{Cell, Contradiction, HashSet, InferenceError, KnowledgeBase, Rng, Sentence};

/// How the agent arrived at a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// The cell is known to be safe.
    Safe,

    /// Nothing is known to be safe, so this is a guess among cells not known to be mines.
    Random,
}

/// A cell to probe next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The cell.
    pub cell: Cell,

    /// Whether the cell is known safe or a guess.
    pub kind: MoveKind,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MoveKind::Safe => write!(f, "Safe{}", self.cell),
            MoveKind::Random => write!(f, "Random{}", self.cell),
        }
    }
}

/// What one run of inference to a fixpoint did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationStats {
    /// Full passes over the knowledge base, including the final pass that made no progress.
    pub passes: usize,

    /// New cells classified as safe or mine.
    pub facts_learned: usize,

    /// New sentences added by subset inference.
    pub sentences_derived: usize,

    /// Empty or duplicate sentences removed.
    pub sentences_pruned: usize,
}

/// Everything the agent knows, sorted so that two agents with the same knowledge produce the same
/// snapshot and the same JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    /// Cells already probed.
    pub moves_made: Vec<Cell>,

    /// Cells known to be safe.
    pub safes: Vec<Cell>,

    /// Cells known to be mines.
    pub mines: Vec<Cell>,

    /// Live sentences.
    pub knowledge: Vec<Sentence>,
}

fn sorted(cells: &HashSet<Cell>) -> Vec<Cell> {
    let mut cells: Vec<Cell> = cells.iter().copied().collect();
    cells.sort_unstable();
    cells
}

/// Minesweeper player that reasons with a knowledge base.
///
/// Protocol for the caller, once per turn:
///
/// 1. Ask for [`MinesweeperAgent::next_move`]. `None` means there is nothing left to probe.
/// 2. Probe the cell on the real board. If it is a mine the game is over.
/// 3. Otherwise tell the agent the number of nearby mines with
///    [`MinesweeperAgent::add_knowledge`].
#[derive(Debug, Clone)]
pub struct MinesweeperAgent {
    height: usize,
    width: usize,

    /// Cells already probed.
    moves_made: HashSet<Cell>,

    /// Cells known to be safe. Only ever grows.
    safes: HashSet<Cell>,

    /// Cells known to be mines. Only ever grows.
    mines: HashSet<Cell>,

    knowledge: KnowledgeBase,
}

impl MinesweeperAgent {
    /// Create an agent for a `height` x `width` board that knows nothing yet.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            moves_made: HashSet::default(),
            safes: HashSet::default(),
            mines: HashSet::default(),
            knowledge: KnowledgeBase::new(),
        }
    }

    /// Board height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Board width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cells already probed.
    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    /// Cells known to be safe.
    pub fn safes(&self) -> &HashSet<Cell> {
        &self.safes
    }

    /// Cells known to be mines.
    pub fn mines(&self) -> &HashSet<Cell> {
        &self.mines
    }

    /// The live knowledge base.
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Whether `cell` is known to be a mine.
    pub fn is_known_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Whether `cell` is known to be safe.
    pub fn is_known_safe(&self, cell: Cell) -> bool {
        self.safes.contains(&cell)
    }

    /// Whether `cell` is on the board.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// All on-board cells within one row and column of `cell`, not including `cell` itself, in
    /// row-major order.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let rows = cell.row.saturating_sub(1)..cell.row.saturating_add(2).min(self.height);
        let cols = cell.col.saturating_sub(1)..cell.col.saturating_add(2).min(self.width);
        rows.flat_map(|row| cols.clone().map(move |col| Cell::new(row, col)))
            .filter(|&neighbor| neighbor != cell)
            .collect()
    }

    /// Mark `cell` as a mine and remove it from every sentence. Returns whether this was new.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        if self.safes.contains(&cell) {
            return Err(Contradiction::SafeAndMine(cell).into());
        }
        let learned = self.mines.insert(cell);
        self.knowledge.mark_mine(cell)?;
        Ok(learned)
    }

    /// Mark `cell` as safe and remove it from every sentence. Returns whether this was new.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool, InferenceError> {
        if self.mines.contains(&cell) {
            return Err(Contradiction::SafeAndMine(cell).into());
        }
        let learned = self.safes.insert(cell);
        self.knowledge.mark_safe(cell);
        Ok(learned)
    }

    /// Called when the board reveals that the safe cell `cell` has `count` mines around it.
    ///
    /// Records the move, marks the cell safe, adds a sentence about the neighbors whose state is
    /// still unknown and then runs inference until nothing more can be learned.
    pub fn add_knowledge(
        &mut self,
        cell: Cell,
        count: usize,
    ) -> Result<PropagationStats, InferenceError> {
        if !self.contains(cell) {
            return Err(InferenceError::InvalidInput {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        tracing::debug!(%cell, count, "probe");

        self.moves_made.insert(cell);
        self.mark_safe(cell)?;

        let mut known = 0;
        let mut unknown = Vec::with_capacity(8);
        for neighbor in self.neighbors(cell) {
            if self.safes.contains(&neighbor) {
                continue;
            }
            if self.mines.contains(&neighbor) {
                known += 1;
                continue;
            }
            unknown.push(neighbor);
        }
        let remaining = count
            .checked_sub(known)
            .ok_or(Contradiction::FewerThanKnownMines { cell, count, known })?;

        // Empty sentences are left for pruning.
        self.knowledge.push(Sentence::new(unknown, remaining));

        let stats = self.propagate()?;
        tracing::debug!(
            passes = stats.passes,
            facts_learned = stats.facts_learned,
            sentences_derived = stats.sentences_derived,
            sentences_pruned = stats.sentences_pruned,
            sentences = self.knowledge.len(),
            safes = self.safes.len(),
            mines = self.mines.len(),
            "fixpoint"
        );
        for sentence in self.knowledge.sentences() {
            tracing::trace!(%sentence, "knowledge");
        }
        Ok(stats)
    }

    /// Run inference until a full pass learns nothing new.
    ///
    /// Each pass:
    /// 1. classifies every cell some sentence proves to be safe or a mine, and marks it in every
    ///    sentence,
    /// 2. prunes empty and duplicate sentences,
    /// 3. adds every new sentence subset inference can derive.
    ///
    /// Facts only accumulate and sentences range over subsets of a finite board, so this always
    /// terminates.
    pub fn propagate(&mut self) -> Result<PropagationStats, InferenceError> {
        let mut stats = PropagationStats::default();
        loop {
            stats.passes += 1;
            let mut progress = false;

            let (mines, safes) = self.knowledge.known_facts()?;
            for cell in mines {
                if self.mark_mine(cell)? {
                    stats.facts_learned += 1;
                    progress = true;
                }
            }
            for cell in safes {
                if self.mark_safe(cell)? {
                    stats.facts_learned += 1;
                    progress = true;
                }
            }

            let pruned = self.knowledge.prune();
            if pruned > 0 {
                stats.sentences_pruned += pruned;
                progress = true;
            }

            for sentence in self.knowledge.subset_inferences()? {
                if self.knowledge.insert_if_absent(sentence).is_some() {
                    stats.sentences_derived += 1;
                    progress = true;
                }
            }

            if !progress {
                return Ok(stats);
            }
        }
    }

    /// A cell known to be safe that has not been probed yet, chosen at random. Does not change any
    /// knowledge.
    pub fn safe_move(&self, rng: &mut Rng) -> Option<Cell> {
        let mut choices: Vec<Cell> = self.safes.difference(&self.moves_made).copied().collect();
        choices.sort_unstable();
        choices.choose(rng).copied()
    }

    /// A random cell that has not been probed and is not known to be a mine. Does not change any
    /// knowledge.
    pub fn random_move(&self, rng: &mut Rng) -> Option<Cell> {
        let choices: Vec<Cell> = (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| Cell::new(row, col)))
            .filter(|cell| !self.moves_made.contains(cell) && !self.mines.contains(cell))
            .collect();
        choices.choose(rng).copied()
    }

    /// Prefer a safe move, fall back to a random one. `None` means every cell has been probed or is
    /// a known mine.
    pub fn next_move(&self, rng: &mut Rng) -> Option<Move> {
        if let Some(cell) = self.safe_move(rng) {
            return Some(Move {
                cell,
                kind: MoveKind::Safe,
            });
        }
        self.random_move(rng).map(|cell| Move {
            cell,
            kind: MoveKind::Random,
        })
    }

    /// Sorted copy of everything the agent knows.
    pub fn snapshot(&self) -> KnowledgeSnapshot {
        let mut knowledge: Vec<Sentence> = self.knowledge.sentences().cloned().collect();
        knowledge.sort_by_cached_key(|sentence| (sentence.sorted_cells(), sentence.count()));
        KnowledgeSnapshot {
            moves_made: sorted(&self.moves_made),
            safes: sorted(&self.safes),
            mines: sorted(&self.mines),
            knowledge,
        }
    }

    /// Pretty JSON dump of [`MinesweeperAgent::snapshot`].
    pub fn serialize_knowledge(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
