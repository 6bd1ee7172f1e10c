//! ターン進行の通知先
//! 表示層はこのtraitを実装してフェーズ変更・状態更新・演出を受け取る。

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use super::phase::{TurnEvent, TurnPhase, UiUpdate};
use crate::game::GameState;

/// ターン進行の通知を受け取るインターフェース
#[async_trait]
pub trait TurnCallbacks: Send + Sync {
    /// フェーズが変わった
    fn on_phase_change(&self, phase: TurnPhase);

    /// 確定した状態が更新された
    fn on_game_state_update(&self, state: &GameState);

    /// 演出用の更新
    fn on_ui_update(&self, update: UiUpdate);

    /// 演出の完了を待つ
    /// 戻るまで次のフェーズには進まない
    async fn on_animation_complete(&self, phase: TurnPhase);
}

/// 何もしない通知先
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallbacks;

#[async_trait]
impl TurnCallbacks for NoopCallbacks {
    fn on_phase_change(&self, _phase: TurnPhase) {}

    fn on_game_state_update(&self, _state: &GameState) {}

    fn on_ui_update(&self, _update: UiUpdate) {}

    async fn on_animation_complete(&self, _phase: TurnPhase) {}
}

/// 通知をチャネルに流す通知先
/// ackチャネルを持つ場合、演出の完了は受信側からの応答で決まる
#[derive(Debug)]
pub struct ChannelCallbacks {
    sender: mpsc::UnboundedSender<TurnEvent>,
    acks: Option<Mutex<mpsc::UnboundedReceiver<TurnPhase>>>,
}

impl ChannelCallbacks {
    /// 演出を待たない通知先とイベント受信側を作成する
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TurnEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, acks: None }, receiver)
    }

    /// 演出の完了を受信側からの応答で待つ通知先を作成する
    pub fn with_acks() -> (
        Self,
        mpsc::UnboundedReceiver<TurnEvent>,
        mpsc::UnboundedSender<TurnPhase>,
    ) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (ack_sender, ack_receiver) = mpsc::unbounded_channel();
        let callbacks = Self {
            sender,
            acks: Some(Mutex::new(ack_receiver)),
        };
        (callbacks, receiver, ack_sender)
    }

    fn send(&self, event: TurnEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("turn event receiver dropped");
        }
    }
}

#[async_trait]
impl TurnCallbacks for ChannelCallbacks {
    fn on_phase_change(&self, phase: TurnPhase) {
        self.send(TurnEvent::PhaseChanged(phase));
    }

    fn on_game_state_update(&self, state: &GameState) {
        self.send(TurnEvent::StateUpdated(Box::new(state.clone())));
    }

    fn on_ui_update(&self, update: UiUpdate) {
        self.send(TurnEvent::Ui(update));
    }

    async fn on_animation_complete(&self, phase: TurnPhase) {
        self.send(TurnEvent::AnimationPending(phase));

        if let Some(acks) = &self.acks {
            // 応答側が閉じていれば待たずに進む
            if acks.lock().await.recv().await.is_none() {
                tracing::debug!(?phase, "animation ack channel closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_callbacks_forward_events() {
        let (callbacks, mut events) = ChannelCallbacks::channel();

        callbacks.on_phase_change(TurnPhase::Moving);
        callbacks.on_animation_complete(TurnPhase::Moving).await;

        assert_eq!(events.recv().await, Some(TurnEvent::PhaseChanged(TurnPhase::Moving)));
        assert_eq!(events.recv().await, Some(TurnEvent::AnimationPending(TurnPhase::Moving)));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_ignored() {
        let (callbacks, events) = ChannelCallbacks::channel();
        drop(events);

        callbacks.on_phase_change(TurnPhase::Growing);
        callbacks.on_animation_complete(TurnPhase::Growing).await;
    }

    #[tokio::test]
    async fn test_closed_ack_channel_does_not_block() {
        let (callbacks, _events, acks) = ChannelCallbacks::with_acks();
        drop(acks);

        callbacks.on_animation_complete(TurnPhase::Popping).await;
    }
}
