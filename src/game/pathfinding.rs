//! 経路探索モジュール
//! 実ボールのないマスを上下左右に辿る幅優先探索で、
//! 最短経路の取得と到達不能マスの列挙を行う。

use std::collections::VecDeque;

use super::board::Board;
use super::types::Coord;

/// 探索で近傍を調べる順序
/// 同じ長さの経路が複数ある場合の選択はこの順序に依存するが、
/// 呼び出し側はどの最短経路が返るかに依存してはならない
const NEIGHBORS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// fromから幅優先探索で到達できるマスを記録する
/// 戻り値はprev[y][x]（直前のマス）と到達フラグ
fn flood(board: &Board, from: Coord, target: Option<Coord>) -> (Vec<Vec<Option<Coord>>>, Vec<Vec<bool>>) {
    let size = board.size();
    let mut visited = vec![vec![false; size]; size];
    let mut prev = vec![vec![None; size]; size];
    let mut queue = VecDeque::new();

    visited[from.y][from.x] = true;
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for &(dx, dy) in &NEIGHBORS {
            let Some(next) = current.offset(dx, dy, size) else {
                continue;
            };
            if visited[next.y][next.x] || !board.is_empty(next) {
                continue;
            }

            visited[next.y][next.x] = true;
            prev[next.y][next.x] = Some(current);

            if Some(next) == target {
                return (prev, visited);
            }
            queue.push_back(next);
        }
    }

    (prev, visited)
}

/// fromからtoまでの最短経路を返す
/// 経路は両端を含み、from == to または到達不能の場合はNone
pub fn find_path(board: &Board, from: Coord, to: Coord) -> Option<Vec<Coord>> {
    if from == to || !board.contains(from) || !board.contains(to) {
        return None;
    }

    let (prev, visited) = flood(board, from, Some(to));
    if !visited[to.y][to.x] {
        return None;
    }

    let mut path = vec![to];
    let mut current = to;
    while let Some(previous) = prev[current.y][current.x] {
        path.push(previous);
        current = previous;
    }

    if current != from {
        return None;
    }

    path.reverse();
    Some(path)
}

/// fromから到達できない空きマスを全て返す
/// 移動先候補をグレーアウトするために使う
pub fn find_unreachable_cells(board: &Board, from: Coord) -> Vec<Coord> {
    if !board.contains(from) {
        return board.empty_cells();
    }

    let (_, visited) = flood(board, from, None);

    board
        .empty_cells()
        .into_iter()
        .filter(|coord| !visited[coord.y][coord.x])
        .collect()
}
