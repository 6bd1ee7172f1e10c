//! ゲーム状態管理モジュール
//! 盤面、スコア、ハイスコア、予告色、タイマー、統計など
//! 1ゲームの全体的な状態を保持する。状態はターンごとに丸ごと置き換える。

use super::board::Board;
use super::types::BallColor;
use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ゲーム中の統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub turns_count: u32,
    pub lines_popped: u32,
    pub longest_line_popped: usize,
    /// 消去されたボールの総数（交差セルは1回だけ数える）
    pub balls_popped: u32,
}

/// 統計の差分
/// 最長ラインは加算ではなく最大値で更新される
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsDelta {
    pub turns_count: u32,
    pub lines_popped: u32,
    pub longest_line_popped: usize,
    pub balls_popped: u32,
}

impl GameStatistics {
    /// 差分を適用した新しい統計を返す
    pub fn apply(&self, delta: StatisticsDelta) -> GameStatistics {
        GameStatistics {
            turns_count: self.turns_count + delta.turns_count,
            lines_popped: self.lines_popped + delta.lines_popped,
            longest_line_popped: self.longest_line_popped.max(delta.longest_line_popped),
            balls_popped: self.balls_popped + delta.balls_popped,
        }
    }
}

/// 1ゲームの全体状態を保持する構造体
/// 永続化層はこの構造体をそのままシリアライズ・復元する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub id: Uuid,
    pub board: Board,
    pub score: u32,
    pub high_score: u32,
    /// 直近のスコア更新でハイスコアを超えたか
    pub is_new_high_score: bool,
    /// このゲーム中に一度でもハイスコアを超えたか
    pub current_game_beat_high_score: bool,
    pub game_over: bool,
    pub next_balls: Vec<BallColor>,
    /// 経過秒数
    pub timer: u64,
    pub timer_active: bool,
    pub statistics: GameStatistics,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl GameState {
    /// 盤面と予告色から新しいゲーム状態を作成する
    pub fn new(board: Board, next_balls: Vec<BallColor>, high_score: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board,
            score: 0,
            high_score,
            is_new_high_score: false,
            current_game_beat_high_score: false,
            game_over: false,
            next_balls,
            timer: 0,
            timer_active: false,
            statistics: GameStatistics::default(),
            created_at: now,
            last_updated: now,
        }
    }

    /// 最終更新時刻を現在時刻にする
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// タイマーを開始する
    /// ゲームオーバー後は開始しない
    pub fn start_timer(&mut self) {
        if !self.game_over {
            self.timer_active = true;
        }
    }

    pub fn pause_timer(&mut self) {
        self.timer_active = false;
    }

    /// タイマーを進める
    /// 動作中かつゲーム継続中のみ加算する
    pub fn tick_timer(&mut self, seconds: u64) {
        if self.timer_active && !self.game_over {
            self.timer += seconds;
        }
    }

    /// ゲームオーバーにする
    /// タイマーも同時に停止する
    pub fn finish(&mut self) {
        self.game_over = true;
        self.timer_active = false;
        self.touch();
    }

    /// 状態をJSON文字列に変換する
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON文字列から状態を復元する
    /// 盤面の形がsizeと一致しない場合はエラー
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let state: GameState = serde_json::from_str(json)?;
        if !state.board.is_well_formed() {
            return Err(PersistenceError::SerializationError {
                message: format!("board does not match size {}", state.board.size()),
            });
        }
        Ok(state)
    }
}
