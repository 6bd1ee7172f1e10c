//! 手の妥当性チェックモジュール
//! 経路探索の前に行う構造的な前提条件（移動元にボールがある、
//! 移動先に実ボールがない、同一マスでない）を判定する。

use super::board::Board;
use super::types::Coord;
use crate::error::{GameError, Result};

/// 手の前提条件を検証し、違反内容を説明付きのエラーで返す
pub fn check_move(board: &Board, from: Coord, to: Coord) -> Result<()> {
    if !board.contains(from) {
        return Err(GameError::invalid_move(format!(
            "source cell [{}, {}] is out of bounds",
            from.x, from.y
        )));
    }
    if board.ball_at(from).is_none() {
        return Err(GameError::invalid_move(format!(
            "source cell [{}, {}] has no ball",
            from.x, from.y
        )));
    }

    if !board.contains(to) {
        return Err(GameError::invalid_move(format!(
            "target cell [{}, {}] is out of bounds",
            to.x, to.y
        )));
    }

    if from == to {
        return Err(GameError::invalid_move("same cell"));
    }

    // 予告ボールの上には移動できる
    if board.ball_at(to).is_some() {
        return Err(GameError::invalid_move(format!(
            "target cell [{}, {}] is occupied by a ball",
            to.x, to.y
        )));
    }

    Ok(())
}

/// 手が構造的に合法かどうか
pub fn validate_move(board: &Board, from: Coord, to: Coord) -> bool {
    check_move(board, from, to).is_ok()
}
