//! 盤面状態を管理するモジュール
//! N×Nグリッドの各マスの実ボール・予告ボールを保持し、盤面操作を提供する。
//! 盤面は値として扱い、更新は常にクローンに対して行う。

use super::types::{Ball, BallColor, Cell, Coord};
use serde::{Deserialize, Serialize};

/// N×Nの盤面を表現する構造体
/// cells[y][x]の行優先で保持する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    /// ボールのない空の盤面を作成する
    pub fn new(size: usize) -> Self {
        let cells = (0..size)
            .map(|y| (0..size).map(|x| Cell::new(x, y)).collect())
            .collect();
        Board { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// 座標が盤面の範囲内かチェックする
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.size && coord.y < self.size
    }

    /// 指定した位置のマスを取得する
    /// 範囲外の場合はNoneを返す
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(coord.y)?.get(coord.x)
    }

    fn get_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        self.cells.get_mut(coord.y)?.get_mut(coord.x)
    }

    /// 指定した位置の実ボールの色
    pub fn ball_at(&self, coord: Coord) -> Option<BallColor> {
        self.get(coord)?.ball.map(|ball| ball.color)
    }

    /// 指定した位置の予告ボールの色
    pub fn incoming_at(&self, coord: Coord) -> Option<BallColor> {
        self.get(coord)?.incoming_ball.map(|ball| ball.color)
    }

    /// 指定した位置に実ボールを設定する（Noneで除去）
    /// 範囲外の場合はfalseを返す
    pub fn set_ball(&mut self, coord: Coord, color: Option<BallColor>) -> bool {
        match self.get_mut(coord) {
            Some(cell) => {
                cell.ball = color.map(Ball::new);
                true
            }
            None => false,
        }
    }

    /// 指定した位置に予告ボールを設定する（Noneで除去）
    /// 範囲外の場合はfalseを返す
    pub fn set_incoming(&mut self, coord: Coord, color: Option<BallColor>) -> bool {
        match self.get_mut(coord) {
            Some(cell) => {
                cell.incoming_ball = color.map(Ball::new);
                true
            }
            None => false,
        }
    }

    /// 選択表示フラグを設定する
    pub fn set_active(&mut self, coord: Coord, active: bool) -> bool {
        match self.get_mut(coord) {
            Some(cell) => {
                cell.active = active;
                true
            }
            None => false,
        }
    }

    /// 実ボールがないマスかチェックする（予告ボールは無視）
    pub fn is_empty(&self, coord: Coord) -> bool {
        matches!(self.get(coord), Some(cell) if cell.ball.is_none())
    }

    /// 全マスを行優先で走査する
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// 全座標を行優先で走査する
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells().map(Cell::coord)
    }

    /// 実ボールのない座標一覧
    pub fn empty_cells(&self) -> Vec<Coord> {
        self.cells()
            .filter(|cell| cell.ball.is_none())
            .map(Cell::coord)
            .collect()
    }

    /// 盤面上の実ボール数を数える
    pub fn count_balls(&self) -> usize {
        self.cells().filter(|cell| cell.ball.is_some()).count()
    }

    /// 盤面上の予告ボール数を数える
    pub fn count_incoming(&self) -> usize {
        self.cells().filter(|cell| cell.incoming_ball.is_some()).count()
    }

    /// 全マスに実ボールがあるかチェックする
    pub fn is_full(&self) -> bool {
        self.cells().all(|cell| cell.ball.is_some())
    }

    /// 実ボールと予告ボールが重なっているマスがあるか
    pub fn has_blocked_incoming(&self) -> bool {
        self.cells()
            .any(|cell| cell.ball.is_some() && cell.incoming_ball.is_some())
    }

    /// すべての予告ボールを取り除いた盤面を返す
    pub fn without_incoming(&self) -> Board {
        let mut board = self.clone();
        for cell in board.cells.iter_mut().flatten() {
            cell.incoming_ball = None;
        }
        board
    }

    /// 予告ボールを実ボールとみなした盤面を返す
    /// 予告込みで盤面が埋まるかの判定に使う
    pub fn with_incoming_as_real(&self) -> Board {
        let mut board = self.clone();
        for cell in board.cells.iter_mut().flatten() {
            if let Some(incoming) = cell.incoming_ball {
                cell.ball = Some(incoming);
            }
        }
        board
    }

    /// 行数・列数・座標がsizeと整合しているか
    /// 外部から復元した盤面の検証に使う
    pub fn is_well_formed(&self) -> bool {
        self.cells.len() == self.size
            && self.cells.iter().enumerate().all(|(y, row)| {
                row.len() == self.size
                    && row.iter().enumerate().all(|(x, cell)| cell.x == x && cell.y == y)
            })
    }

    /// デバッグ用の盤面表示文字列を生成する
    /// 実ボールは色の大文字、予告ボールは小文字、空マスは.で表現
    pub fn display(&self) -> String {
        let mut result = String::new();

        for row in &self.cells {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match (cell.ball, cell.incoming_ball) {
                    (Some(ball), _) => ball.color.symbol().to_string(),
                    (None, Some(incoming)) => incoming.color.symbol().to_ascii_lowercase().to_string(),
                    (None, None) => ".".to_string(),
                })
                .collect();
            result.push_str(&line.join(" "));
            result.push('\n');
        }

        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(9)
    }
}
