//! ゲームエンジンモジュール
//! 盤面管理・経路探索・ライン検出・得点計算をまとめた純粋なゲームロジックの窓口。
//! 全ての操作は状態を受け取って新しい状態を返し、呼び出し側の状態を書き換えない。
//! 乱数は注入されたChaCha8Rngのみを使用する。

use std::collections::{BTreeSet, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::board::Board;
use super::board_manager::{self, BoardManager, ConversionResult};
use super::lines::LineDetector;
use super::pathfinding;
use super::state::{GameState, StatisticsDelta};
use super::types::{BallColor, Coord, Line, LineDetectionResult};
use super::validation;
use crate::config::GameConfig;
use crate::error::Result;

/// ボール移動の結果
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub new_state: GameState,
    /// 移動先にあった予告ボールの色
    pub stepped_on_incoming_ball: Option<BallColor>,
}

/// 純粋なゲームロジックを提供する構造体
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: GameConfig,
    detector: LineDetector,
    manager: BoardManager,
    rng: ChaCha8Rng,
}

impl GameEngine {
    /// OSのエントロピーから生成したシードでエンジンを作成する
    pub fn new(config: GameConfig) -> Self {
        let seed: u64 = rand::random();
        tracing::debug!(seed, "seeding game engine");
        Self::with_seed(config, seed)
    }

    /// 固定シードでエンジンを作成する
    /// 同じシードと同じ手順からは同じゲームが再現される
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            detector: LineDetector::from_config(&config),
            manager: BoardManager::new(&config),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn detector(&self) -> &LineDetector {
        &self.detector
    }

    /// 初期ボールと最初の予告を置いた新しいゲームを作成する
    pub fn create_new_game(&mut self) -> GameState {
        self.new_game_with_high_score(0)
    }

    /// ハイスコアを引き継いで新しいゲームを始める
    pub fn reset_game(&mut self, preserved_high_score: u32) -> GameState {
        self.new_game_with_high_score(preserved_high_score)
    }

    fn new_game_with_high_score(&mut self, high_score: u32) -> GameState {
        let no_exclude = HashSet::new();
        let palette = self.manager.palette().to_vec();

        let board = Board::new(self.config.board_size);
        let initial = board_manager::random_colors(&mut self.rng, &palette, self.config.initial_balls);
        let board = board_manager::place_real_balls(&board, &initial, &no_exclude, &mut self.rng);
        let next_balls = self.manager.next_colors(&mut self.rng);
        let board = board_manager::place_preview_balls(&board, &next_balls, &no_exclude, &mut self.rng);

        tracing::info!(size = self.config.board_size, high_score, "new game created");
        GameState::new(board, next_balls, high_score)
    }

    /// ボールを移動する
    /// 移動先の予告ボールは取り除き、その色を返す
    pub fn move_ball(&self, state: &GameState, from: Coord, to: Coord) -> Result<MoveOutcome> {
        validation::check_move(&state.board, from, to)?;

        let color = state.board.ball_at(from);
        let stepped_on = state.board.incoming_at(to);

        let mut new_state = state.clone();
        new_state.board.set_ball(from, None);
        new_state.board.set_ball(to, color);
        new_state.board.set_incoming(to, None);
        new_state.touch();

        Ok(MoveOutcome {
            new_state,
            stepped_on_incoming_ball: stepped_on,
        })
    }

    /// 指定した位置を通るラインを検出する
    pub fn detect_lines(&self, state: &GameState, position: Coord) -> Option<LineDetectionResult> {
        self.detector.detect_at_position(&state.board, position)
    }

    /// 複数の位置を通るラインを重複なしで検出する
    pub fn detect_lines_at_positions(&self, state: &GameState, positions: &[Coord]) -> Option<LineDetectionResult> {
        self.detector.detect_at_positions(&state.board, positions)
    }

    /// ラインに含まれる全てのボールを取り除く
    pub fn remove_lines(&self, state: &GameState, lines: &[Line]) -> GameState {
        let cells: BTreeSet<Coord> = lines.iter().flat_map(|line| line.cells.iter().copied()).collect();

        let mut new_state = state.clone();
        for coord in cells {
            new_state.board.set_ball(coord, None);
        }
        new_state.touch();
        new_state
    }

    /// スコアを加算し、ハイスコアを更新する
    pub fn update_score(&self, state: &GameState, points: u32) -> GameState {
        let score = state.score + points;
        let is_new_high_score = score > state.high_score;

        let mut new_state = state.clone();
        new_state.score = score;
        new_state.high_score = state.high_score.max(score);
        new_state.is_new_high_score = is_new_high_score;
        new_state.current_game_beat_high_score = state.current_game_beat_high_score || is_new_high_score;
        new_state.touch();
        new_state
    }

    /// 統計に差分を適用する
    pub fn update_statistics(&self, state: &GameState, delta: StatisticsDelta) -> GameState {
        let mut new_state = state.clone();
        new_state.statistics = state.statistics.apply(delta);
        new_state
    }

    /// 盤面が実ボールで埋まっているか
    pub fn check_game_over(&self, state: &GameState) -> bool {
        board_manager::is_board_full(&state.board)
    }

    /// 予告ボールを実ボールとみなしても盤面が埋まるか
    pub fn check_game_over_with_incoming(&self, state: &GameState) -> bool {
        board_manager::is_board_full(&state.board.with_incoming_as_real())
    }

    /// 実ボールに塞がれた予告ボールがあれば、予告全体を置き直す
    /// 置き直しが不要ならNone
    pub fn check_blocked_preview_balls(&mut self, state: &GameState) -> Option<GameState> {
        if !state.board.has_blocked_incoming() {
            return None;
        }

        tracing::debug!("recalculating blocked preview balls");
        let mut new_state = state.clone();
        new_state.board = board_manager::recalculate_incoming_positions(&state.board, &state.next_balls, &mut self.rng);
        new_state.touch();
        Some(new_state)
    }

    /// 予告ボールを実ボールに変換し、次の予告を置く
    pub fn convert_preview_to_real(&mut self, state: &GameState, stepped_on: Option<BallColor>) -> ConversionResult {
        self.manager
            .handle_incoming_ball_conversion(&state.board, stepped_on, &mut self.rng)
    }

    /// ラインの合計得点
    pub fn calculate_score(&self, lines: &[Line]) -> u32 {
        self.detector.total_score(lines)
    }

    pub fn find_path(&self, board: &Board, from: Coord, to: Coord) -> Option<Vec<Coord>> {
        pathfinding::find_path(board, from, to)
    }

    pub fn find_unreachable_cells(&self, board: &Board, from: Coord) -> Vec<Coord> {
        pathfinding::find_unreachable_cells(board, from)
    }

    pub fn validate_move(&self, board: &Board, from: Coord, to: Coord) -> bool {
        validation::validate_move(board, from, to)
    }
}
