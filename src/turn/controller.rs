//! ターン進行コントローラ
//! ステートマシンを1フェーズずつ進め、通知先に結果を伝える。
//! 演出の待機は通知先のon_animation_complete以外では行わない。

use super::callbacks::TurnCallbacks;
use super::machine::TurnMachine;
use super::phase::TurnPhase;
use crate::game::{GameEngine, GameState, Move};

/// 1ターンの実行結果
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// 最後に確定した状態
    pub state: GameState,
    /// 到達した最後のフェーズ
    pub final_phase: TurnPhase,
    /// 最後まで進んだか（途中で失敗した場合はfalse）
    pub completed: bool,
}

impl TurnOutcome {
    pub fn is_game_over(&self) -> bool {
        self.final_phase == TurnPhase::GameOver
    }
}

/// ゲームエンジンを所有し、ターンを順に実行する
#[derive(Debug, Clone)]
pub struct TurnFlowController {
    engine: GameEngine,
}

impl TurnFlowController {
    pub fn new(engine: GameEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    /// 1ターンを実行する
    ///
    /// 各フェーズで フェーズ通知 → 演出更新 → 演出完了待ち → 状態公開 の順に通知する。
    /// 途中で失敗した場合はエラーを記録し、TurnCompleteを通知したうえで
    /// 失敗直前に確定していた状態を返す。
    pub async fn execute_turn(&mut self, state: &GameState, mv: Move, callbacks: &dyn TurnCallbacks) -> TurnOutcome {
        let mut machine = TurnMachine::new(state.clone(), mv);

        loop {
            match machine.advance(&mut self.engine) {
                Ok(Some(transition)) => {
                    callbacks.on_phase_change(transition.phase);
                    for update in transition.updates {
                        callbacks.on_ui_update(update);
                    }
                    if transition.animate {
                        callbacks.on_animation_complete(transition.phase).await;
                    }
                    if transition.publish_state {
                        callbacks.on_game_state_update(machine.state());
                    }
                }
                Ok(None) => {
                    let final_phase = machine.phase();
                    return TurnOutcome {
                        state: machine.into_state(),
                        final_phase,
                        completed: true,
                    };
                }
                Err(err) => {
                    let final_phase = machine.phase();
                    tracing::error!(error = %err, phase = ?final_phase, "turn aborted");
                    callbacks.on_phase_change(TurnPhase::TurnComplete);
                    return TurnOutcome {
                        state: machine.into_state(),
                        final_phase,
                        completed: false,
                    };
                }
            }
        }
    }
}
