//! ターン進行のステートマシン
//! 移動 → ライン判定 → (消去 | 変換・出現 → 再判定 → 再消去) → 終了 の順序を
//! 明示的なフェーズ遷移として表現する。待機や演出は一切行わず、
//! 各遷移で確定した状態だけを保持するので、失敗した遷移は状態を汚さない。

use super::phase::{Transition, TurnPhase, UiUpdate};
use crate::error::{GameError, Result};
use crate::game::{
    validation, BallColor, ConversionResult, GameEngine, GameState, LineDetectionResult, Move, StatisticsDelta,
};

/// 1ターン分の進行状態
#[derive(Debug, Clone)]
pub struct TurnMachine {
    phase: TurnPhase,
    mv: Move,
    state: GameState,
    stepped_on: Option<BallColor>,
    move_clear: Option<LineDetectionResult>,
    scored: bool,
    conversion: Option<ConversionResult>,
}

impl TurnMachine {
    pub fn new(state: GameState, mv: Move) -> Self {
        Self {
            phase: TurnPhase::Idle,
            mv,
            state,
            stepped_on: None,
            move_clear: None,
            scored: false,
            conversion: None,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// 最後に確定した状態
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// 次のフェーズへ進み、そのフェーズの処理を行う
    /// 終了済みならNone
    pub fn advance(&mut self, engine: &mut GameEngine) -> Result<Option<Transition>> {
        let transition = match self.phase {
            TurnPhase::Idle => self.start()?,
            TurnPhase::Moving => self.apply_move(engine)?,
            TurnPhase::CheckingLines => match self.move_clear.take() {
                Some(result) => self.pop_move_lines(engine, result),
                None => self.check_blocked(engine),
            },
            TurnPhase::Popping => self.check_blocked(engine),
            TurnPhase::CheckingBlocked if self.scored => self.finish(engine),
            TurnPhase::CheckingBlocked => self.grow(engine),
            TurnPhase::Growing if self.spawned_lines().is_some() => Transition::new(TurnPhase::CheckingLinesAfterGrow),
            TurnPhase::Growing => self.finish(engine),
            TurnPhase::CheckingLinesAfterGrow => self.pop_spawned_lines(engine),
            TurnPhase::PoppingAfterGrow => self.finish(engine),
            TurnPhase::TurnComplete | TurnPhase::GameOver => return Ok(None),
        };

        tracing::debug!(from = ?self.phase, to = ?transition.phase, "turn phase transition");
        self.phase = transition.phase;
        Ok(Some(transition))
    }

    /// 演出なしで最後まで進める
    /// 途中で失敗した場合はエラーを返す
    pub fn run_to_end(mut self, engine: &mut GameEngine) -> Result<(GameState, Vec<Transition>)> {
        let mut transitions = Vec::new();
        while let Some(transition) = self.advance(engine)? {
            transitions.push(transition);
        }
        Ok((self.state, transitions))
    }

    fn spawned_lines(&self) -> Option<&LineDetectionResult> {
        self.conversion.as_ref()?.spawn_clear.as_ref()
    }

    fn start(&mut self) -> Result<Transition> {
        if self.state.game_over {
            return Err(GameError::GameFinished);
        }
        validation::check_move(&self.state.board, self.mv.from, self.mv.to)?;
        Ok(Transition::new(TurnPhase::Moving).animate())
    }

    fn apply_move(&mut self, engine: &GameEngine) -> Result<Transition> {
        let outcome = engine.move_ball(&self.state, self.mv.from, self.mv.to)?;
        self.state = outcome.new_state;
        self.stepped_on = outcome.stepped_on_incoming_ball;
        self.move_clear = engine.detect_lines(&self.state, self.mv.to);
        Ok(Transition::new(TurnPhase::CheckingLines).publish())
    }

    /// 手で完成したラインを消去する
    /// このターンは予告ボールの変換を行わない
    fn pop_move_lines(&mut self, engine: &GameEngine, result: LineDetectionResult) -> Transition {
        let updates = UiUpdate::for_clear(&result);

        let state = engine.update_score(&self.state, result.score);
        let state = engine.remove_lines(&state, &result.lines);
        self.state = engine.update_statistics(&state, clear_delta(&result));
        self.scored = true;

        Transition::new(TurnPhase::Popping)
            .with_updates(updates)
            .animate()
            .publish()
    }

    fn check_blocked(&mut self, engine: &mut GameEngine) -> Transition {
        let transition = Transition::new(TurnPhase::CheckingBlocked);
        match engine.check_blocked_preview_balls(&self.state) {
            Some(state) => {
                self.state = state;
                transition.publish()
            }
            None => transition,
        }
    }

    fn grow(&mut self, engine: &mut GameEngine) -> Transition {
        let conversion = engine.convert_preview_to_real(&self.state, self.stepped_on);

        self.state.board = conversion.new_board.clone();
        self.state.next_balls = conversion.next_balls.clone();
        self.state.touch();

        let updates = vec![UiUpdate::Grow {
            transitioning: conversion.spawned.clone(),
            new: conversion.new_previews.clone(),
        }];
        self.conversion = Some(conversion);

        Transition::new(TurnPhase::Growing)
            .with_updates(updates)
            .animate()
            .publish()
    }

    /// 出現で完成したラインの得点と統計を反映する
    /// 盤面からの消去は変換時に済んでいる
    fn pop_spawned_lines(&mut self, engine: &GameEngine) -> Transition {
        let Some(result) = self.spawned_lines().cloned() else {
            return Transition::new(TurnPhase::PoppingAfterGrow);
        };

        let state = engine.update_score(&self.state, result.score);
        self.state = engine.update_statistics(&state, clear_delta(&result));

        Transition::new(TurnPhase::PoppingAfterGrow)
            .with_updates(UiUpdate::for_clear(&result))
            .animate()
            .publish()
    }

    fn finish(&mut self, engine: &GameEngine) -> Transition {
        let game_over = if self.scored {
            // 予告ボールが全て実ボールになったと仮定して判定する
            engine.check_game_over_with_incoming(&self.state)
        } else {
            self.conversion.as_ref().is_some_and(|c| c.game_over) || engine.check_game_over(&self.state)
        };

        self.state = engine.update_statistics(
            &self.state,
            StatisticsDelta {
                turns_count: 1,
                ..Default::default()
            },
        );

        if game_over {
            self.state.finish();
            tracing::info!(score = self.state.score, turns = self.state.statistics.turns_count, "game over");
            Transition::new(TurnPhase::GameOver).publish()
        } else {
            Transition::new(TurnPhase::TurnComplete).publish()
        }
    }
}

fn clear_delta(result: &LineDetectionResult) -> StatisticsDelta {
    StatisticsDelta {
        lines_popped: result.lines.len() as u32,
        longest_line_popped: result.longest_line(),
        balls_popped: result.balls_to_remove.len() as u32,
        ..Default::default()
    }
}
