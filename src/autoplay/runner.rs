//! ヘッドレス自動プレイ
//! 戦略が選んだ手をTurnFlowControllerで1ターンずつ実行し、ゲームの結果を集計する。

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::strategies::MoveStrategy;
use crate::config::AnimationConfig;
use crate::error::{Result, StrategyError};
use crate::game::GameState;
use crate::turn::{TurnCallbacks, TurnFlowController, TurnPhase, UiUpdate};

/// ゲームが終わった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    GameOver,
    TurnLimit,
    /// 動かせるボールがない
    NoValidMoves,
}

/// 1ゲームの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: Uuid,
    pub strategy: String,
    pub score: u32,
    pub high_score: u32,
    pub beat_high_score: bool,
    pub turns: u32,
    pub lines_popped: u32,
    pub longest_line: usize,
    pub balls_popped: u32,
    pub reason: StopReason,
    /// 実行にかかった時間（ミリ秒）
    pub elapsed_ms: u64,
}

impl GameSummary {
    fn from_state(state: &GameState, strategy: &str, reason: StopReason, elapsed_ms: u64) -> Self {
        Self {
            game_id: state.id,
            strategy: strategy.to_string(),
            score: state.score,
            high_score: state.high_score,
            beat_high_score: state.current_game_beat_high_score,
            turns: state.statistics.turns_count,
            lines_popped: state.statistics.lines_popped,
            longest_line: state.statistics.longest_line_popped,
            balls_popped: state.statistics.balls_popped,
            reason,
            elapsed_ms,
        }
    }
}

/// 戦略とコントローラを組み合わせてゲームを自動で進める
pub struct AutoPlayer {
    controller: TurnFlowController,
    strategy: Box<dyn MoveStrategy>,
    max_turns: usize,
}

impl AutoPlayer {
    pub fn new(controller: TurnFlowController, strategy: Box<dyn MoveStrategy>, max_turns: usize) -> Self {
        Self {
            controller,
            strategy,
            max_turns,
        }
    }

    pub fn controller(&self) -> &TurnFlowController {
        &self.controller
    }

    /// ハイスコアを引き継いで1ゲームを最後まで遊ぶ
    pub async fn play_game(&mut self, high_score: u32, callbacks: &dyn TurnCallbacks) -> Result<GameSummary> {
        let started = Instant::now();
        let mut state = self.controller.engine_mut().reset_game(high_score);
        state.start_timer();
        callbacks.on_game_state_update(&state);

        let reason = loop {
            if state.game_over {
                break StopReason::GameOver;
            }
            if state.statistics.turns_count as usize >= self.max_turns {
                break StopReason::TurnLimit;
            }

            let mv = match self.strategy.choose_move(self.controller.engine(), &state) {
                Ok(mv) => mv,
                Err(StrategyError::NoValidMoves) => break StopReason::NoValidMoves,
                Err(err) => return Err(err.into()),
            };

            let outcome = self.controller.execute_turn(&state, mv, callbacks).await;
            if !outcome.completed {
                return Err(StrategyError::StrategyFailed {
                    message: format!("turn was not applied: {:?}", mv),
                }
                .into());
            }
            state = outcome.state;
        };

        let elapsed = started.elapsed();
        state.tick_timer(elapsed.as_secs());
        state.pause_timer();

        let summary = GameSummary::from_state(&state, self.strategy.name(), reason, elapsed.as_millis() as u64);
        tracing::info!(
            game_id = %summary.game_id,
            score = summary.score,
            turns = summary.turns,
            reason = ?summary.reason,
            "game finished"
        );
        Ok(summary)
    }
}

/// アニメーション時間だけ待機する通知先
#[derive(Debug, Clone)]
pub struct PacedCallbacks {
    animation: AnimationConfig,
}

impl PacedCallbacks {
    pub fn new(animation: AnimationConfig) -> Self {
        Self { animation }
    }
}

#[async_trait]
impl TurnCallbacks for PacedCallbacks {
    fn on_phase_change(&self, phase: TurnPhase) {
        tracing::trace!(?phase, "phase");
    }

    fn on_game_state_update(&self, state: &GameState) {
        tracing::trace!(score = state.score, "state\n{}", state.board.display());
    }

    fn on_ui_update(&self, update: UiUpdate) {
        if let UiUpdate::FloatingScore { score, x, y } = update {
            tracing::debug!(score, x, y, "lines cleared");
        }
    }

    async fn on_animation_complete(&self, phase: TurnPhase) {
        let duration = match phase {
            TurnPhase::Moving => self.animation.move_step,
            TurnPhase::Popping | TurnPhase::PoppingAfterGrow => self.animation.pop,
            TurnPhase::Growing => self.animation.grow,
            _ => return,
        };
        tokio::time::sleep(duration).await;
    }
}
