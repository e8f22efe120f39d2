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

use std::path::{Path, PathBuf};

use minesweeper_inference::{Cell, InferenceError, MinesweeperAgent, Move, MoveKind};
use minesweeper_logic::{Board, GameStatus, Minesweeper, MinesweeperError, Position, Reveal};
use serde::{Deserialize, Serialize};

pub type Rng = rand_pcg::Pcg64;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("board error: {0}")]
    Board(#[from] MinesweeperError),

    #[error("agent error: {0}")]
    Agent(#[from] InferenceError),

    #[error("failed to write knowledge dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize knowledge: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn to_cell(position: Position) -> Cell {
    Cell::new(position.row, position.col)
}

pub fn to_position(cell: Cell) -> Position {
    Position::new(cell.row, cell.col)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Won,
    Lost,

    /// The agent ran out of moves, or hit the move limit, without winning.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub result: GameResult,
    pub moves: usize,
    pub safe_moves: usize,
    pub random_moves: usize,
    pub mines_found: usize,
}

pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
    pub max_moves: usize,
    pub knowledge_dump_dir: Option<PathBuf>,
}

impl GameConfig {
    fn new(
        height: usize,
        width: usize,
        mines: usize,
        knowledge_dump_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            height,
            width,
            mines,
            max_moves: height * width,
            knowledge_dump_dir,
        }
    }

    pub fn get_knowledge_dump_dir(&self) -> Option<PathBuf> {
        self.knowledge_dump_dir.clone()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(8, 8, 8, None)
    }
}

/// One game in progress: the board, and the agent playing it. The agent never sees the board
/// directly, only the counts revealed by probing it.
pub struct GameSession {
    game: Minesweeper,
    agent: MinesweeperAgent,
    moves: usize,
    safe_moves: usize,
    random_moves: usize,
}

impl GameSession {
    pub fn new(board: Board) -> Self {
        let agent = MinesweeperAgent::new(board.height, board.width);
        Self {
            game: Minesweeper::new(board),
            agent,
            moves: 0,
            safe_moves: 0,
            random_moves: 0,
        }
    }

    pub fn game(&self) -> &Minesweeper {
        &self.game
    }

    pub fn agent(&self) -> &MinesweeperAgent {
        &self.agent
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Let the agent make one move. Returns None if the game is over or the agent has nothing
    /// left to probe.
    pub fn step(&mut self, rng: &mut Rng) -> Result<Option<Move>, GameError> {
        if self.game.status() != GameStatus::InProgress {
            return Ok(None);
        }
        let next = match self.agent.next_move(rng) {
            Some(next) => next,
            None => return Ok(None),
        };
        self.moves += 1;
        match next.kind {
            MoveKind::Safe => self.safe_moves += 1,
            MoveKind::Random => self.random_moves += 1,
        }
        tracing::debug!(%next, "move");

        match self.game.reveal(to_position(next.cell))? {
            Reveal::Mine => {
                tracing::debug!(cell = %next.cell, "hit a mine");
            }
            Reveal::Safe(count) => {
                self.agent.add_knowledge(next.cell, count)?;
                for &mine in self.agent.mines() {
                    self.game.flag(to_position(mine))?;
                }
            }
        }
        Ok(Some(next))
    }

    pub fn outcome(&self) -> GameOutcome {
        let result = match self.game.status() {
            GameStatus::Won => GameResult::Won,
            GameStatus::Lost => GameResult::Lost,
            GameStatus::InProgress => GameResult::Exhausted,
        };
        GameOutcome {
            result,
            moves: self.moves,
            safe_moves: self.safe_moves,
            random_moves: self.random_moves,
            mines_found: self.agent.mines().len(),
        }
    }
}

/// Play one game on a freshly generated board.
pub fn play_game(config: &GameConfig, rng: &mut Rng) -> Result<GameOutcome, GameError> {
    let board = Board::new(config.height, config.width, config.mines, rng)?;
    play_on_board(board, config, rng)
}

/// Play one game on the given board.
pub fn play_on_board(
    board: Board,
    config: &GameConfig,
    rng: &mut Rng,
) -> Result<GameOutcome, GameError> {
    let mut session = GameSession::new(board);
    while session.moves() < config.max_moves {
        if session.step(rng)?.is_none() {
            break;
        }
    }

    let outcome = session.outcome();
    if let Some(dir) = &config.knowledge_dump_dir {
        dump_knowledge(session.agent(), dir)?;
    }
    tracing::debug!(result = ?outcome.result, moves = outcome.moves, "game over");
    Ok(outcome)
}

fn dump_knowledge(agent: &MinesweeperAgent, dir: &Path) -> Result<(), GameError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join("knowledge.json");
    std::fs::write(&path, agent.serialize_knowledge()?)?;
    tracing::debug!(path = %path.display(), "wrote knowledge dump");
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub exhausted: usize,
    pub random_moves: usize,
}

impl Evaluation {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games as f64
    }

    fn record(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        self.random_moves += outcome.random_moves;
        match outcome.result {
            GameResult::Won => self.wins += 1,
            GameResult::Lost => self.losses += 1,
            GameResult::Exhausted => self.exhausted += 1,
        }
    }
}

/// Play `games` games one after another, each on a new board.
pub fn evaluate(config: &GameConfig, games: usize, rng: &mut Rng) -> Result<Evaluation, GameError> {
    let mut evaluation = Evaluation::default();
    for _ in 0..games {
        let outcome = play_game(config, rng)?;
        evaluation.record(&outcome);
    }
    Ok(evaluation)
}
