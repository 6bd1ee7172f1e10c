//! ライン得点表モジュール
//! ライン長から得点への単調な対応を提供する。
//! 表の最大長を超えるラインは表の最大値で頭打ちにする。

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// 標準の最小ライン長
pub const DEFAULT_MIN_LINE_LENGTH: usize = 5;

/// 標準の得点表（長さ5から9）
pub const DEFAULT_LINE_SCORES: [u32; 5] = [5, 8, 13, 21, 34];

/// ライン長と得点の対応表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringTable {
    min_length: usize,
    scores: Vec<u32>,
}

impl ScoringTable {
    /// scores[0]がmin_lengthの得点に対応する表を作成する
    pub fn new(min_length: usize, scores: Vec<u32>) -> Self {
        Self { min_length, scores }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.min_line_length, config.line_scores.clone())
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// 表に載っている最大のライン長
    pub fn max_tabulated_length(&self) -> usize {
        self.min_length + self.scores.len().saturating_sub(1)
    }

    /// ライン長に対する得点を返す
    /// 最小長未満は0、表を超える長さは表の最大値
    pub fn score(&self, length: usize) -> u32 {
        if length < self.min_length {
            return 0;
        }

        let cap = self.scores.iter().copied().max().unwrap_or(0);
        self.scores.get(length - self.min_length).copied().unwrap_or(cap)
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LINE_LENGTH, DEFAULT_LINE_SCORES.to_vec())
    }
}

/// 標準の得点表でライン長の得点を計算する
pub fn calculate_line_score(length: usize) -> u32 {
    ScoringTable::default().score(length)
}
