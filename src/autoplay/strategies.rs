//! 自動プレイ用の手選択戦略
//! ランダム・貪欲の戦略を統一したインターフェースで提供する。

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::game::{Coord, GameEngine, GameState, Move};

/// 戦略の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// 合法手からランダムに選ぶ
    Random,
    /// 直後の得点が最大になる手を選ぶ
    Greedy,
}

/// 手選択戦略の共通インターフェース
pub trait MoveStrategy: Send {
    /// 現在の状態から次の手を選ぶ
    fn choose_move(&mut self, engine: &GameEngine, state: &GameState) -> Result<Move, StrategyError>;

    /// 戦略の名前を返す
    fn name(&self) -> &'static str;
}

/// 全ての合法手を列挙する
/// 移動元ごとに一度だけ到達範囲を求める
pub fn legal_moves(engine: &GameEngine, state: &GameState) -> Vec<Move> {
    let board = &state.board;
    let empty = board.empty_cells();
    let mut moves = Vec::new();

    for from in board.coords() {
        if board.ball_at(from).is_none() {
            continue;
        }

        let unreachable: HashSet<Coord> = engine.find_unreachable_cells(board, from).into_iter().collect();
        moves.extend(
            empty
                .iter()
                .filter(|to| !unreachable.contains(to))
                .map(|&to| Move::new(from, to)),
        );
    }

    moves
}

/// ランダムに手を選ぶ戦略
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: ChaCha8Rng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl MoveStrategy for RandomStrategy {
    fn choose_move(&mut self, engine: &GameEngine, state: &GameState) -> Result<Move, StrategyError> {
        if state.game_over {
            return Err(StrategyError::StrategyFailed {
                message: "Cannot choose a move for a finished game".to_string(),
            });
        }

        legal_moves(engine, state)
            .choose(&mut self.rng)
            .copied()
            .ok_or(StrategyError::NoValidMoves)
    }

    fn name(&self) -> &'static str {
        "RandomStrategy"
    }
}

/// 直後に得られる得点が最大の手を選ぶ戦略
/// 得点できる手がなければランダムに選ぶ
#[derive(Debug, Clone)]
pub struct GreedyStrategy {
    fallback: RandomStrategy,
}

impl GreedyStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            fallback: RandomStrategy::new(seed),
        }
    }

    fn immediate_score(engine: &GameEngine, state: &GameState, mv: Move) -> u32 {
        engine
            .move_ball(state, mv.from, mv.to)
            .ok()
            .and_then(|outcome| engine.detect_lines(&outcome.new_state, mv.to))
            .map_or(0, |result| result.score)
    }
}

impl MoveStrategy for GreedyStrategy {
    fn choose_move(&mut self, engine: &GameEngine, state: &GameState) -> Result<Move, StrategyError> {
        if state.game_over {
            return Err(StrategyError::StrategyFailed {
                message: "Cannot choose a move for a finished game".to_string(),
            });
        }

        let best = legal_moves(engine, state)
            .into_iter()
            .map(|mv| (Self::immediate_score(engine, state, mv), mv))
            .filter(|(score, _)| *score > 0)
            .max_by_key(|(score, _)| *score);

        match best {
            Some((score, mv)) => {
                tracing::trace!(score, ?mv, "greedy move");
                Ok(mv)
            }
            None => self.fallback.choose_move(engine, state),
        }
    }

    fn name(&self) -> &'static str {
        "GreedyStrategy"
    }
}

/// 種類に応じた戦略を生成する
pub fn create_strategy(kind: StrategyKind, seed: u64) -> Box<dyn MoveStrategy> {
    match kind {
        StrategyKind::Random => Box::new(RandomStrategy::new(seed)),
        StrategyKind::Greedy => Box::new(GreedyStrategy::new(seed)),
    }
}
