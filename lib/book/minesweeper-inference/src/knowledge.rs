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

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::{Cell, Contradiction, HashSet, Sentence};

new_key_type! {
    /// Stable handle to a sentence in a [`KnowledgeBase`].
    pub struct SentenceKey;
}

/// The live collection of sentences known to be true.
///
/// Sentences live in an arena so that the fan-out marks, pruning and the subset inference double
/// loop can all work off stable keys instead of mutating a collection while iterating it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    sentences: slotmap::SlotMap<SentenceKey, Sentence>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new() -> Self {
        Self {
            sentences: slotmap::SlotMap::with_key(),
        }
    }

    /// Number of live sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether there are no live sentences.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Get a sentence by key. Returns None if it has been pruned.
    pub fn get(&self, key: SentenceKey) -> Option<&Sentence> {
        self.sentences.get(key)
    }

    /// Iterate over live sentences along with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (SentenceKey, &Sentence)> {
        self.sentences.iter()
    }

    /// Iterate over live sentences.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.values()
    }

    /// Whether an equal sentence is already present.
    pub fn contains(&self, sentence: &Sentence) -> bool {
        self.sentences.values().any(|s| s == sentence)
    }

    /// Add a sentence unconditionally.
    pub fn push(&mut self, sentence: Sentence) -> SentenceKey {
        self.sentences.insert(sentence)
    }

    /// Add a sentence unless an equal one is already present.
    pub fn insert_if_absent(&mut self, sentence: Sentence) -> Option<SentenceKey> {
        if self.contains(&sentence) {
            None
        } else {
            Some(self.sentences.insert(sentence))
        }
    }

    /// Mark `cell` as a mine in every sentence. Returns how many sentences changed.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<usize, Contradiction> {
        let mut changed = 0;
        for sentence in self.sentences.values_mut() {
            if sentence.mark_mine(cell)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Mark `cell` as safe in every sentence. Returns how many sentences changed.
    pub fn mark_safe(&mut self, cell: Cell) -> usize {
        self.sentences
            .values_mut()
            .filter_map(|sentence| sentence.mark_safe(cell).then_some(()))
            .count()
    }

    /// Collect every cell some sentence proves to be a mine, and every cell some sentence proves
    /// to be safe, as `(mines, safes)`.
    pub fn known_facts(&self) -> Result<(HashSet<Cell>, HashSet<Cell>), Contradiction> {
        let mut mines = HashSet::default();
        let mut safes = HashSet::default();
        for sentence in self.sentences.values() {
            if sentence.count() > sentence.len() {
                return Err(Contradiction::TooManyMines(sentence.clone()));
            }
            mines.extend(sentence.known_mines());
            safes.extend(sentence.known_safes());
        }
        if let Some(cell) = mines.intersection(&safes).next() {
            return Err(Contradiction::SafeAndMine(*cell));
        }
        Ok((mines, safes))
    }

    /// Remove sentences that carry no information: empty ones, and exact duplicates of a sentence
    /// that comes earlier in iteration order. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let keys: Vec<SentenceKey> = self.sentences.keys().collect();
        let mut doomed = Vec::new();
        for (i, &key) in keys.iter().enumerate() {
            let sentence = &self.sentences[key];
            let duplicate = keys[..i]
                .iter()
                .any(|&earlier| self.sentences[earlier] == *sentence);
            if sentence.is_empty() || duplicate {
                doomed.push(key);
            }
        }
        for key in &doomed {
            self.sentences.remove(*key);
        }
        doomed.len()
    }

    /// Subset inference over every ordered pair of sentences `(a, b)` where `a.cells` is a proper
    /// subset of `b.cells`. Returns the derived sentences that are not already known, without
    /// adding them.
    pub fn subset_inferences(&self) -> Result<Vec<Sentence>, Contradiction> {
        let sentences: Vec<&Sentence> = self.sentences.values().collect();
        let mut derived: Vec<Sentence> = Vec::new();
        for subset in &sentences {
            for superset in &sentences {
                if !subset.is_proper_subset(superset) {
                    continue;
                }
                let sentence = subset.difference_from(superset)?;
                if !self.contains(&sentence) && !derived.contains(&sentence) {
                    derived.push(sentence);
                }
            }
        }
        Ok(derived)
    }
}
