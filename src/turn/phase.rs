//! ターンのフェーズと演出イベントの型定義

use serde::{Deserialize, Serialize};

use crate::game::{Coord, GameState, LineDetectionResult, PlacedBall};

/// 1ターン内のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnPhase {
    Idle,
    Moving,
    CheckingLines,
    Popping,
    CheckingBlocked,
    Growing,
    CheckingLinesAfterGrow,
    PoppingAfterGrow,
    TurnComplete,
    GameOver,
}

impl TurnPhase {
    /// ターンが終わったフェーズか
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnPhase::TurnComplete | TurnPhase::GameOver)
    }
}

/// 呼び出し側に渡す演出用の更新
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum UiUpdate {
    /// 消去されるボール
    Pop { balls: Vec<Coord> },
    /// 実ボールになったボールと新しい予告
    Grow {
        transitioning: Vec<PlacedBall>,
        new: Vec<PlacedBall>,
    },
    /// 消去位置の中心に表示する得点
    FloatingScore { score: u32, x: usize, y: usize },
}

impl UiUpdate {
    /// ライン消去の演出（消去アニメーションと得点表示）
    pub fn for_clear(result: &LineDetectionResult) -> Vec<UiUpdate> {
        let mut updates = vec![UiUpdate::Pop {
            balls: result.balls_to_remove.clone(),
        }];

        let count = result.balls_to_remove.len();
        if count > 0 {
            let sum_x: usize = result.balls_to_remove.iter().map(|c| c.x).sum();
            let sum_y: usize = result.balls_to_remove.iter().map(|c| c.y).sum();
            updates.push(UiUpdate::FloatingScore {
                score: result.score,
                x: (sum_x as f64 / count as f64).round() as usize,
                y: (sum_y as f64 / count as f64).round() as usize,
            });
        }

        updates
    }
}

/// ステートマシンが1フェーズ進んだときの出力
///
/// 呼び出し側は次の順で処理する:
/// フェーズ変更の通知 → updatesの送出 → (animateなら)演出完了を待つ → (publish_stateなら)状態の公開
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub phase: TurnPhase,
    pub updates: Vec<UiUpdate>,
    pub publish_state: bool,
    pub animate: bool,
}

impl Transition {
    pub(crate) fn new(phase: TurnPhase) -> Self {
        Self {
            phase,
            updates: Vec::new(),
            publish_state: false,
            animate: false,
        }
    }

    pub(crate) fn publish(mut self) -> Self {
        self.publish_state = true;
        self
    }

    pub(crate) fn animate(mut self) -> Self {
        self.animate = true;
        self
    }

    pub(crate) fn with_updates(mut self, updates: Vec<UiUpdate>) -> Self {
        self.updates = updates;
        self
    }
}

/// チャネル経由で呼び出し側に送るイベント
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    PhaseChanged(TurnPhase),
    StateUpdated(Box<GameState>),
    Ui(UiUpdate),
    /// 演出の完了待ち（ackを使う場合は呼び出し側の応答まで進まない）
    AnimationPending(TurnPhase),
}
