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

use minesweeper_ai::{GameConfig, GameError, GameResult, GameSession, Rng};
use minesweeper_logic::Board;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

const SEED: u64 = 42;
const EVALUATION_GAMES: usize = 1000;

// Play a single game, printing the board after every move.
fn play_verbose(config: &GameConfig, rng: &mut Rng) -> Result<GameResult, GameError> {
    let board = Board::new(config.height, config.width, config.mines, rng)?;
    println!("{}", board);
    println!();

    let mut session = GameSession::new(board);
    while session.moves() < config.max_moves {
        match session.step(rng)? {
            Some(next) => {
                println!("move: {}", next);
                println!("{}", session.game());
                println!();
            }
            None => break,
        }
    }
    for mine in session.agent().mines() {
        tracing::debug!(position = %minesweeper_ai::to_position(*mine), "known mine");
    }
    Ok(session.outcome().result)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(seed = SEED, "starting");
    let config = GameConfig::default();
    let mut rng = Rng::seed_from_u64(SEED);

    match play_verbose(&config, &mut rng) {
        Ok(result) => println!("result: {:?}", result),
        Err(e) => {
            tracing::error!(error = %e, "game failed");
            std::process::exit(1);
        }
    }

    match minesweeper_ai::evaluate(&config, EVALUATION_GAMES, &mut rng) {
        Ok(evaluation) => {
            tracing::info!(
                games = evaluation.games,
                wins = evaluation.wins,
                losses = evaluation.losses,
                "evaluation finished"
            );
            println!("win rate: {:.3}", evaluation.win_rate());
        }
        Err(e) => {
            tracing::error!(error = %e, "evaluation failed");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_game_on_empty_board_is_won() {
        let config = GameConfig {
            height: 3,
            width: 3,
            mines: 0,
            max_moves: 9,
            knowledge_dump_dir: None,
        };
        let mut rng = Rng::seed_from_u64(SEED);
        let result = play_verbose(&config, &mut rng).expect("game failed");
        assert_eq!(result, GameResult::Won);
    }

    #[test]
    fn test_verbose_game_finishes() {
        let config = GameConfig::default();
        let mut rng = Rng::seed_from_u64(SEED);
        let result = play_verbose(&config, &mut rng).expect("game failed");
        assert_ne!(result, GameResult::Exhausted);
    }
}
