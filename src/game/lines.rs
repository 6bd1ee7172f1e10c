//! ライン検出モジュール
//! 起点のマスから4軸方向に同色の連続を辿り、最小長以上のラインを検出する。
//! 複数の起点から同じラインが見つかった場合はセル集合で重複を除く。

use std::collections::BTreeSet;

use super::board::Board;
use super::scoring::ScoringTable;
use super::types::{BallColor, Coord, Line, LineDetectionResult, LineDirection};
use crate::config::GameConfig;

/// ライン検出器
/// 最小長と得点表を保持し、盤面には状態を持たない
#[derive(Debug, Clone, Default)]
pub struct LineDetector {
    scoring: ScoringTable,
}

impl LineDetector {
    pub fn new(scoring: ScoringTable) -> Self {
        Self { scoring }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(ScoringTable::from_config(config))
    }

    pub fn min_length(&self) -> usize {
        self.scoring.min_length()
    }

    pub fn scoring(&self) -> &ScoringTable {
        &self.scoring
    }

    /// ラインが最小長を満たすか
    pub fn is_valid_line(&self, line: &Line) -> bool {
        line.length >= self.min_length()
    }

    /// 1本のラインの得点
    pub fn line_score(&self, line: &Line) -> u32 {
        if !self.is_valid_line(line) {
            return 0;
        }
        self.scoring.score(line.length)
    }

    /// ライン単位の得点の合計
    /// 交差するセルがあっても各ラインを別々に数える
    pub fn total_score(&self, lines: &[Line]) -> u32 {
        lines.iter().map(|line| self.line_score(line)).sum()
    }

    /// 指定した位置を通る全てのラインを検出する
    /// ラインがない場合はNone
    pub fn detect_at_position(&self, board: &Board, position: Coord) -> Option<LineDetectionResult> {
        self.detect_at_positions(board, &[position])
    }

    /// 複数の起点を通るラインをまとめて検出する
    /// 同じセル集合のラインは1本として扱う
    pub fn detect_at_positions(&self, board: &Board, positions: &[Coord]) -> Option<LineDetectionResult> {
        let mut seen: Vec<BTreeSet<Coord>> = Vec::new();
        let mut lines = Vec::new();
        let mut balls_to_remove = BTreeSet::new();

        for &position in positions {
            let Some(color) = board.ball_at(position) else {
                continue;
            };

            for line in self.find_lines(board, position, color) {
                let key: BTreeSet<Coord> = line.cells.iter().copied().collect();
                if seen.contains(&key) {
                    continue;
                }

                balls_to_remove.extend(key.iter().copied());
                seen.push(key);
                lines.push(line);
            }
        }

        if lines.is_empty() {
            return None;
        }

        let score = self.total_score(&lines);
        Some(LineDetectionResult {
            lines,
            balls_to_remove: balls_to_remove.into_iter().collect(),
            score,
        })
    }

    /// 起点から4方向それぞれについて最大の連続を求める
    fn find_lines(&self, board: &Board, origin: Coord, color: BallColor) -> Vec<Line> {
        let size = board.size();
        let mut lines = Vec::new();

        for direction in LineDirection::ALL {
            let (dx, dy) = direction.vector();

            // 後方へ辿り、連続の端を探す
            let mut start = origin;
            while let Some(prev) = start.offset(-dx, -dy, size) {
                if board.ball_at(prev) != Some(color) {
                    break;
                }
                start = prev;
            }

            // 端から前方へ辿ってセルを集める（空きマスや別色で必ず途切れる）
            let mut cells = vec![start];
            let mut current = start;
            while let Some(next) = current.offset(dx, dy, size) {
                if board.ball_at(next) != Some(color) {
                    break;
                }
                cells.push(next);
                current = next;
            }

            if cells.len() >= self.min_length() {
                lines.push(Line {
                    length: cells.len(),
                    cells,
                    color,
                    direction,
                });
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board, coords: &[(usize, usize)], color: BallColor) {
        for &(x, y) in coords {
            board.set_ball(Coord::new(x, y), Some(color));
        }
    }

    #[test]
    fn test_horizontal_line_of_five() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)], BallColor::Red);

        let result = LineDetector::default()
            .detect_at_position(&board, Coord::new(2, 0))
            .unwrap();

        assert_eq!(result.lines.len(), 1);
        let line = &result.lines[0];
        assert_eq!(line.direction, LineDirection::Horizontal);
        assert_eq!(line.length, 5);
        assert_eq!(line.color, BallColor::Red);
        assert_eq!(result.score, 5);
        assert_eq!(result.balls_to_remove.len(), 5);
    }

    #[test]
    fn test_run_of_four_is_ignored() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 3), (1, 3), (2, 3), (3, 3)], BallColor::Blue);

        assert!(LineDetector::default()
            .detect_at_position(&board, Coord::new(0, 3))
            .is_none());
    }

    #[test]
    fn test_gap_breaks_line() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 0), (1, 0), (2, 0), (4, 0), (5, 0), (6, 0)], BallColor::Red);

        assert!(LineDetector::default()
            .detect_at_position(&board, Coord::new(2, 0))
            .is_none());
    }

    #[test]
    fn test_other_color_breaks_line() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 0), (1, 0), (2, 0), (4, 0), (5, 0)], BallColor::Red);
        place(&mut board, &[(3, 0)], BallColor::Green);

        assert!(LineDetector::default()
            .detect_at_position(&board, Coord::new(4, 0))
            .is_none());
    }

    #[test]
    fn test_preview_balls_do_not_count() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 0), (1, 0), (2, 0), (3, 0)], BallColor::Red);
        board.set_incoming(Coord::new(4, 0), Some(BallColor::Red));

        assert!(LineDetector::default()
            .detect_at_position(&board, Coord::new(0, 0))
            .is_none());
    }

    #[test]
    fn test_diagonal_up_line() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 8), (1, 7), (2, 6), (3, 5), (4, 4), (5, 3)], BallColor::Yellow);

        let result = LineDetector::default()
            .detect_at_position(&board, Coord::new(3, 5))
            .unwrap();
        assert_eq!(result.lines[0].direction, LineDirection::DiagonalUp);
        assert_eq!(result.lines[0].length, 6);
        assert_eq!(result.score, 8);
    }

    #[test]
    fn test_crossing_lines_share_cell() {
        let mut board = Board::new(9);
        place(&mut board, &[(0, 4), (1, 4), (2, 4), (3, 4), (4, 4)], BallColor::Pink);
        place(&mut board, &[(4, 0), (4, 1), (4, 2), (4, 3)], BallColor::Pink);

        let result = LineDetector::default()
            .detect_at_position(&board, Coord::new(4, 4))
            .unwrap();

        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.balls_to_remove.len(), 9);
        assert_eq!(result.score, 10);
    }

    #[test]
    fn test_dedup_across_anchors() {
        let mut board = Board::new(9);
        place(&mut board, &[(2, 6), (3, 6), (4, 6), (5, 6), (6, 6)], BallColor::Purple);

        let result = LineDetector::default()
            .detect_at_positions(&board, &[Coord::new(2, 6), Coord::new(5, 6)])
            .unwrap();

        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.balls_to_remove.len(), 5);
        assert_eq!(result.score, 5);
    }

    #[test]
    fn test_anchor_without_ball_is_skipped() {
        let board = Board::new(9);
        assert!(LineDetector::default()
            .detect_at_positions(&board, &[Coord::new(0, 0), Coord::new(20, 20)])
            .is_none());
    }
}
