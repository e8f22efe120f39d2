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

use serde::{Deserialize, Serialize, Serializer};

use crate::{Cell, Contradiction, HashSet};

/// Logical statement about a Minesweeper game: exactly `count` of `cells` are mines.
///
/// Two sentences are equal if they have the same set of cells and the same count, regardless of
/// the order the cells were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(serialize_with = "serialize_sorted")]
    cells: HashSet<Cell>,
    count: usize,
}

// Row-major order, so equal sentences serialize to the same text.
fn serialize_sorted<S>(cells: &HashSet<Cell>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut sorted: Vec<&Cell> = cells.iter().collect();
    sorted.sort_unstable();
    serializer.collect_seq(sorted)
}

impl Sentence {
    /// Create a new sentence. Duplicate cells are collapsed.
    pub fn new<I>(cells: I, count: usize) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        Self {
            cells: cells.into_iter().collect(),
            count,
        }
    }

    /// Cells this sentence talks about.
    pub fn cells(&self) -> &HashSet<Cell> {
        &self.cells
    }

    /// Number of mines among the cells.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// An empty sentence carries no information.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells known to be mines. If there are as many mines as cells then every cell is a mine.
    pub fn known_mines(&self) -> HashSet<Cell> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            HashSet::default()
        }
    }

    /// All cells known to be safe. If there are no mines then every cell is safe.
    pub fn known_safes(&self) -> HashSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            HashSet::default()
        }
    }

    /// Update the sentence given that `cell` is a mine. The cell is removed and the count drops by
    /// one, since one of the mines is now accounted for. Returns whether the sentence changed.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool, Contradiction> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(Contradiction::NegativeCount(self.clone()));
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Update the sentence given that `cell` is safe. The cell is removed and the count stays the
    /// same. Returns whether the sentence changed.
    pub fn mark_safe(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// Whether this sentence's cells are a proper subset of `other`'s cells.
    pub fn is_proper_subset(&self, other: &Sentence) -> bool {
        self.cells.len() < other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// Subset inference. If `self` is contained in `superset` then the cells only in `superset`
    /// hold `superset.count - self.count` mines.
    ///
    /// The caller must check [`Sentence::is_proper_subset`] first.
    pub fn difference_from(&self, superset: &Sentence) -> Result<Sentence, Contradiction> {
        let count = superset
            .count
            .checked_sub(self.count)
            .ok_or_else(|| Contradiction::NegativeCount(superset.clone()))?;
        let cells = superset.cells.difference(&self.cells).copied();
        Ok(Sentence::new(cells, count))
    }

    /// Cells in row-major order, for display and snapshots.
    pub fn sorted_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cells.iter().copied().collect();
        cells.sort_unstable();
        cells
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self
            .sorted_cells()
            .iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{{}}} = {}", cells, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().map(|&c| Cell::from(c)).collect()
    }

    fn set(coords: &[(usize, usize)]) -> HashSet<Cell> {
        cells(coords).into_iter().collect()
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = Sentence::new(cells(&[(0, 0), (0, 1), (1, 1)]), 1);
        let b = Sentence::new(cells(&[(1, 1), (0, 0), (0, 1)]), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_inequality_on_count_or_cells() {
        let a = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        assert_ne!(a, Sentence::new(cells(&[(0, 0), (0, 1)]), 2));
        assert_ne!(a, Sentence::new(cells(&[(0, 0), (1, 1)]), 1));
    }

    #[test]
    fn test_known_mines_when_count_equals_cells() {
        let sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 2);
        assert_eq!(sentence.known_mines(), set(&[(0, 0), (0, 1)]));
        assert!(sentence.known_safes().is_empty());
    }

    #[test]
    fn test_no_known_mines_when_count_below_cells() {
        let sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        assert!(sentence.known_mines().is_empty());
        assert!(sentence.known_safes().is_empty());
    }

    #[test]
    fn test_known_safes_when_count_zero() {
        let sentence = Sentence::new(cells(&[(0, 0), (0, 1)]), 0);
        assert_eq!(sentence.known_safes(), set(&[(0, 0), (0, 1)]));
        assert!(sentence.known_mines().is_empty());
    }

    #[test]
    fn test_empty_sentence_knows_nothing() {
        let sentence = Sentence::new(Vec::new(), 0);
        assert!(sentence.is_empty());
        assert!(sentence.known_mines().is_empty());
        assert!(sentence.known_safes().is_empty());
    }

    #[test]
    fn test_mark_mine_decrements() {
        let mut sentence = Sentence::new(cells(&[(1, 1), (1, 2)]), 1);
        assert_eq!(sentence.mark_mine(Cell::new(1, 1)), Ok(true));
        assert_eq!(sentence, Sentence::new(cells(&[(1, 2)]), 0));
    }

    #[test]
    fn test_mark_mine_absent_cell_is_noop() {
        let mut sentence = Sentence::new(cells(&[(1, 1), (1, 2)]), 1);
        assert_eq!(sentence.mark_mine(Cell::new(5, 5)), Ok(false));
        assert_eq!(sentence, Sentence::new(cells(&[(1, 1), (1, 2)]), 1));
    }

    #[test]
    fn test_mark_mine_on_zero_count_is_contradiction() {
        let mut sentence = Sentence::new(cells(&[(1, 1)]), 0);
        assert_eq!(
            sentence.mark_mine(Cell::new(1, 1)),
            Err(Contradiction::NegativeCount(Sentence::new(cells(&[(1, 1)]), 0)))
        );
    }

    #[test]
    fn test_mark_safe_preserves_count() {
        let mut sentence = Sentence::new(cells(&[(1, 1), (1, 2)]), 1);
        assert!(sentence.mark_safe(Cell::new(1, 2)));
        assert_eq!(sentence, Sentence::new(cells(&[(1, 1)]), 1));
        assert!(!sentence.mark_safe(Cell::new(1, 2)));
    }

    #[test]
    fn test_proper_subset() {
        let small = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        let big = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1);
        assert!(small.is_proper_subset(&big));
        assert!(!big.is_proper_subset(&small));
        assert!(!small.is_proper_subset(&small.clone()));
    }

    #[test]
    fn test_difference_from_superset() {
        let small = Sentence::new(cells(&[(0, 0), (0, 1)]), 1);
        let big = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1);
        assert_eq!(
            small.difference_from(&big),
            Ok(Sentence::new(cells(&[(0, 2)]), 0))
        );
    }

    #[test]
    fn test_difference_with_larger_subset_count_is_contradiction() {
        let small = Sentence::new(cells(&[(0, 0), (0, 1)]), 2);
        let big = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 1);
        assert!(matches!(
            small.difference_from(&big),
            Err(Contradiction::NegativeCount(_))
        ));
    }

    #[test]
    fn test_serialize_sorts_cells() {
        let forward = Sentence::new(cells(&[(0, 0), (0, 1), (1, 0), (2, 2)]), 1);
        let mut backward = Sentence::new(cells(&[(5, 5), (2, 2), (1, 0), (0, 1), (0, 0)]), 1);
        backward.mark_safe(Cell::new(5, 5));
        assert_eq!(forward, backward);

        let forward = serde_json::to_string(&forward).expect("serialize failed");
        let backward = serde_json::to_string(&backward).expect("serialize failed");
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            r#"{"cells":[{"row":0,"col":0},{"row":0,"col":1},{"row":1,"col":0},{"row":2,"col":2}],"count":1}"#
        );

        let parsed: Sentence = serde_json::from_str(&forward).expect("parse failed");
        assert_eq!(parsed, backward);
    }

    #[test]
    fn test_display_sorts_cells() {
        let sentence = Sentence::new(cells(&[(1, 0), (0, 1)]), 1);
        assert_eq!(sentence.to_string(), "{(0, 1), (1, 0)} = 1");
    }
}
