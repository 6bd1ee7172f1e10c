//! ゲームの基本型定義モジュール
//! ボールの色、座標、マス、ライン、検出結果など、
//! エンジン全体で使用される基本的な型を定義する。

use serde::{Deserialize, Serialize};

/// ボールの色を表すenum
/// パレットは固定の7色で、設定の色数に応じて先頭から使用する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Pink,
    Black,
}

impl BallColor {
    /// パレット全体
    pub const ALL: [BallColor; 7] = [
        BallColor::Red,
        BallColor::Blue,
        BallColor::Green,
        BallColor::Yellow,
        BallColor::Purple,
        BallColor::Pink,
        BallColor::Black,
    ];

    /// デバッグ表示用の1文字
    pub fn symbol(self) -> char {
        match self {
            BallColor::Red => 'R',
            BallColor::Blue => 'B',
            BallColor::Green => 'G',
            BallColor::Yellow => 'Y',
            BallColor::Purple => 'P',
            BallColor::Pink => 'K',
            BallColor::Black => 'X',
        }
    }
}

/// 盤面上のボール
/// 色だけを持つ不変の値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ball {
    pub color: BallColor,
}

impl Ball {
    pub fn new(color: BallColor) -> Self {
        Self { color }
    }
}

/// 盤面上の座標を表す構造体
/// x, yともに0始まりで、範囲チェックは盤面側で行う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// 指定したベクトル分ずらした座標を返す
    /// 盤面サイズの範囲外になる場合はNoneを返す
    pub fn offset(self, dx: isize, dy: isize, size: usize) -> Option<Coord> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        if x < size && y < size {
            Some(Coord { x, y })
        } else {
            None
        }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Coord { x, y }
    }
}

/// 盤面の各マスの状態を表現する構造体
/// 実ボールと予告ボールを同時に持つ状態は一時的にのみ許される
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub ball: Option<Ball>,
    pub incoming_ball: Option<Ball>,
    /// 選択表示用のフラグ（エンジンは参照しない）
    #[serde(default)]
    pub active: bool,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            ball: None,
            incoming_ball: None,
            active: false,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// プレイヤーの1手（移動元と移動先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    pub fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

/// ラインの方向を表すenum
/// 4つの軸方向のみを扱い、逆向きは同じ方向とみなす
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineDirection {
    Horizontal,
    Vertical,
    DiagonalDown,
    DiagonalUp,
}

impl LineDirection {
    pub const ALL: [LineDirection; 4] = [
        LineDirection::Horizontal,
        LineDirection::Vertical,
        LineDirection::DiagonalDown,
        LineDirection::DiagonalUp,
    ];

    /// 方向ベクトル(dx, dy)を返す
    /// yは下向きが正
    pub fn vector(self) -> (isize, isize) {
        match self {
            LineDirection::Horizontal => (1, 0),
            LineDirection::Vertical => (0, 1),
            LineDirection::DiagonalDown => (1, 1),
            LineDirection::DiagonalUp => (1, -1),
        }
    }
}

/// 同色で連続したボールの並び
/// cellsは方向に沿って隙間なく並ぶ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub cells: Vec<Coord>,
    pub color: BallColor,
    pub length: usize,
    pub direction: LineDirection,
}

/// ライン検出の結果
/// scoreはライン単位の得点の合計で、消去セル数とは独立している
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDetectionResult {
    pub lines: Vec<Line>,
    pub balls_to_remove: Vec<Coord>,
    pub score: u32,
}

impl LineDetectionResult {
    /// 含まれるラインのうち最長のもの
    pub fn longest_line(&self) -> usize {
        self.lines.iter().map(|line| line.length).max().unwrap_or(0)
    }
}

/// 位置と色の組
/// 出現したボールをアニメーションに渡すために使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBall {
    pub x: usize,
    pub y: usize,
    pub color: BallColor,
}

impl PlacedBall {
    pub fn new(coord: Coord, color: BallColor) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            color,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}
