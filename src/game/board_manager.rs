//! 盤面管理モジュール
//! ボールのランダム配置、予告ボールの実ボール化、新しい予告の生成、
//! 出現したボールによるラインの即時消去を担当する。

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::lines::LineDetector;
use super::types::{BallColor, Coord, LineDetectionResult, PlacedBall};
use crate::config::GameConfig;

/// 予告ボール変換の結果
/// 手によるライン消去とは別に、出現によるライン消去を保持する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub new_board: Board,
    pub next_balls: Vec<BallColor>,
    pub game_over: bool,
    /// 実ボールになったマス（変換された予告と踏まれたボールの再配置）
    pub spawned: Vec<PlacedBall>,
    /// 新しく置かれた予告ボール
    pub new_previews: Vec<PlacedBall>,
    /// 出現によって完成し、既に消去済みのライン
    pub spawn_clear: Option<LineDetectionResult>,
}

impl ConversionResult {
    pub fn lines_formed(&self) -> bool {
        self.spawn_clear.is_some()
    }

    pub fn points_earned(&self) -> u32 {
        self.spawn_clear.as_ref().map_or(0, |result| result.score)
    }

    pub fn balls_removed(&self) -> &[Coord] {
        self.spawn_clear
            .as_ref()
            .map(|result| result.balls_to_remove.as_slice())
            .unwrap_or(&[])
    }
}

/// 指定数のランダムな色を生成する
pub fn random_colors<R: Rng>(rng: &mut R, palette: &[BallColor], count: usize) -> Vec<BallColor> {
    if palette.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|_| palette[rng.random_range(0..palette.len())])
        .collect()
}

/// 実ボールのない、除外されていないマスからランダムに最大count個選ぶ
/// 空きが足りない場合は選べる分だけ返す
pub fn random_empty_cells<R: Rng>(
    board: &Board,
    count: usize,
    exclude: &HashSet<Coord>,
    rng: &mut R,
) -> Vec<Coord> {
    let mut candidates: Vec<Coord> = board
        .empty_cells()
        .into_iter()
        .filter(|coord| !exclude.contains(coord))
        .collect();

    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates
}

/// 空きマスに実ボールを置いた新しい盤面と、置いた位置を返す
fn place_real<R: Rng>(
    board: &Board,
    colors: &[BallColor],
    exclude: &HashSet<Coord>,
    rng: &mut R,
) -> (Board, Vec<PlacedBall>) {
    let mut new_board = board.clone();
    let positions = random_empty_cells(&new_board, colors.len(), exclude, rng);
    if positions.len() < colors.len() {
        tracing::debug!(requested = colors.len(), placed = positions.len(), "not enough empty cells for real balls");
    }

    let placed: Vec<PlacedBall> = positions
        .into_iter()
        .zip(colors.iter().copied())
        .map(|(coord, color)| {
            new_board.set_ball(coord, Some(color));
            PlacedBall::new(coord, color)
        })
        .collect();

    (new_board, placed)
}

/// 空きマスに予告ボールを置いた新しい盤面と、置いた位置を返す
fn place_preview<R: Rng>(
    board: &Board,
    colors: &[BallColor],
    exclude: &HashSet<Coord>,
    rng: &mut R,
) -> (Board, Vec<PlacedBall>) {
    let mut new_board = board.clone();
    let positions = random_empty_cells(&new_board, colors.len(), exclude, rng);
    if positions.len() < colors.len() {
        tracing::debug!(requested = colors.len(), placed = positions.len(), "not enough empty cells for preview balls");
    }

    let placed: Vec<PlacedBall> = positions
        .into_iter()
        .zip(colors.iter().copied())
        .map(|(coord, color)| {
            new_board.set_incoming(coord, Some(color));
            PlacedBall::new(coord, color)
        })
        .collect();

    (new_board, placed)
}

/// 実ボールをランダムな空きマスに置く
pub fn place_real_balls<R: Rng>(
    board: &Board,
    colors: &[BallColor],
    exclude: &HashSet<Coord>,
    rng: &mut R,
) -> Board {
    place_real(board, colors, exclude, rng).0
}

/// 予告ボールをランダムな空きマスに置く
pub fn place_preview_balls<R: Rng>(
    board: &Board,
    colors: &[BallColor],
    exclude: &HashSet<Coord>,
    rng: &mut R,
) -> Board {
    place_preview(board, colors, exclude, rng).0
}

/// 既存の予告ボールを全て取り除き、指定した色で置き直す
pub fn recalculate_incoming_positions<R: Rng>(board: &Board, colors: &[BallColor], rng: &mut R) -> Board {
    place_preview_balls(&board.without_incoming(), colors, &HashSet::new(), rng)
}

/// 全マスに実ボールがあるか
pub fn is_board_full(board: &Board) -> bool {
    board.is_full()
}

/// 予告ボールの変換と次の予告生成を担当する構造体
#[derive(Debug, Clone)]
pub struct BoardManager {
    palette: Vec<BallColor>,
    balls_per_turn: usize,
    detector: LineDetector,
}

impl BoardManager {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            palette: config.palette().to_vec(),
            balls_per_turn: config.balls_per_turn,
            detector: LineDetector::from_config(config),
        }
    }

    pub fn palette(&self) -> &[BallColor] {
        &self.palette
    }

    /// 1ターン分の予告色を生成する
    pub fn next_colors<R: Rng>(&self, rng: &mut R) -> Vec<BallColor> {
        random_colors(rng, &self.palette, self.balls_per_turn)
    }

    /// 予告ボールを実ボールに変換し、次の予告を配置する
    ///
    /// 1. 全ての予告ボールを実ボールにする（盤面が埋まればその時点でゲームオーバー）
    /// 2. 踏まれた予告の色があれば、別の空きマスに実ボールとして置く
    /// 3. 新しい予告を1ターン分生成して空きマスに置く（盤面が埋まっていれば生成しない）
    /// 4. 実ボールになったマスを起点にラインを検出し、あれば即座に消去する
    pub fn handle_incoming_ball_conversion<R: Rng>(
        &self,
        board: &Board,
        stepped_on: Option<BallColor>,
        rng: &mut R,
    ) -> ConversionResult {
        let mut converted = board.clone();
        let mut spawned = Vec::new();

        for cell in board.cells() {
            let Some(incoming) = cell.incoming_ball else {
                continue;
            };
            converted.set_incoming(cell.coord(), None);
            // 実ボールに塞がれた予告は消えるだけ
            if cell.ball.is_none() {
                converted.set_ball(cell.coord(), Some(incoming.color));
                spawned.push(PlacedBall::new(cell.coord(), incoming.color));
            }
        }

        if converted.is_full() {
            tracing::debug!("board filled by preview conversion");
            return ConversionResult {
                new_board: converted,
                next_balls: Vec::new(),
                game_over: true,
                spawned,
                new_previews: Vec::new(),
                spawn_clear: None,
            };
        }

        let mut working = converted;
        if let Some(color) = stepped_on {
            let (board, placed) = place_real(&working, &[color], &HashSet::new(), rng);
            working = board;
            spawned.extend(placed);
        }

        // 踏まれた色で埋まった場合は次の予告を作らない
        let (after_balls, next_balls, new_previews) = if working.is_full() {
            (working, Vec::new(), Vec::new())
        } else {
            let next_balls = self.next_colors(rng);
            let (board, placed) = place_preview(&working, &next_balls, &HashSet::new(), rng);
            (board, next_balls, placed)
        };

        let positions: Vec<Coord> = spawned.iter().map(PlacedBall::coord).collect();
        match self.detector.detect_at_positions(&after_balls, &positions) {
            Some(result) => {
                let mut cleared = after_balls;
                for &coord in &result.balls_to_remove {
                    cleared.set_ball(coord, None);
                }
                tracing::debug!(lines = result.lines.len(), score = result.score, "spawned balls completed a line");

                ConversionResult {
                    game_over: cleared.is_full(),
                    new_board: cleared,
                    next_balls,
                    spawned,
                    new_previews,
                    spawn_clear: Some(result),
                }
            }
            None => ConversionResult {
                game_over: after_balls.is_full(),
                new_board: after_balls,
                next_balls,
                spawned,
                new_previews,
                spawn_clear: None,
            },
        }
    }
}
