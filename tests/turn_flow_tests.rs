//! ターン進行の統合テスト
//! 得点時の予告据え置き、出現によるライン消去、失敗時の状態保持、通知順序を検証する。

use Lines::{
    config::GameConfig,
    game::{BallColor, Board, Coord, GameEngine, GameState, Move},
    turn::{ChannelCallbacks, NoopCallbacks, TurnEvent, TurnFlowController, TurnPhase, UiUpdate},
};

fn controller(config: GameConfig) -> TurnFlowController {
    TurnFlowController::new(GameEngine::with_seed(config, 17))
}

fn row(board: &mut Board, y: usize, xs: std::ops::Range<usize>, color: BallColor) {
    for x in xs {
        board.set_ball(Coord::new(x, y), Some(color));
    }
}

/// イベントを比較しやすいラベルに変換する
fn label(event: &TurnEvent) -> String {
    match event {
        TurnEvent::PhaseChanged(phase) => format!("phase:{:?}", phase),
        TurnEvent::StateUpdated(_) => "state".to_string(),
        TurnEvent::Ui(UiUpdate::Pop { .. }) => "ui:pop".to_string(),
        TurnEvent::Ui(UiUpdate::Grow { .. }) => "ui:grow".to_string(),
        TurnEvent::Ui(UiUpdate::FloatingScore { .. }) => "ui:score".to_string(),
        TurnEvent::AnimationPending(phase) => format!("wait:{:?}", phase),
    }
}

#[tokio::test]
async fn test_scoring_move_leaves_previews_untouched() {
    let mut board = Board::new(9);
    row(&mut board, 0, 0..4, BallColor::Red);
    board.set_ball(Coord::new(8, 8), Some(BallColor::Red));
    board.set_incoming(Coord::new(4, 0), Some(BallColor::Blue));
    // 変換が走れば緑のラインが完成する配置
    row(&mut board, 5, 0..4, BallColor::Green);
    board.set_incoming(Coord::new(4, 5), Some(BallColor::Green));
    board.set_incoming(Coord::new(6, 6), Some(BallColor::Yellow));
    let next_balls = vec![BallColor::Blue, BallColor::Green, BallColor::Yellow];
    let state = GameState::new(board, next_balls.clone(), 0);

    let outcome = controller(GameConfig::default())
        .execute_turn(&state, Move::new(Coord::new(8, 8), Coord::new(4, 0)), &NoopCallbacks)
        .await;

    assert!(outcome.completed);
    assert_eq!(outcome.final_phase, TurnPhase::TurnComplete);
    assert_eq!(outcome.state.score, 5);
    assert_eq!(outcome.state.next_balls, next_balls);

    // 踏まれた予告は捨てられ、他の予告はそのまま残る
    for coord in state.board.coords() {
        let expected = if coord == Coord::new(4, 0) {
            None
        } else {
            state.board.incoming_at(coord)
        };
        assert_eq!(outcome.state.board.incoming_at(coord), expected, "preview at {:?}", coord);
    }
    assert_eq!(outcome.state.board.count_balls(), 4);
    assert_eq!(outcome.state.board.ball_at(Coord::new(4, 5)), None);
}

#[tokio::test]
async fn test_spawned_preview_completes_line() {
    let mut board = Board::new(9);
    row(&mut board, 0, 0..4, BallColor::Red);
    board.set_incoming(Coord::new(4, 0), Some(BallColor::Red));
    board.set_ball(Coord::new(8, 8), Some(BallColor::Black));
    let state = GameState::new(board, vec![BallColor::Red], 0);

    let (callbacks, mut events) = ChannelCallbacks::channel();
    let outcome = controller(GameConfig::default())
        .execute_turn(&state, Move::new(Coord::new(8, 8), Coord::new(8, 7)), &callbacks)
        .await;

    assert!(outcome.completed);
    assert_eq!(outcome.state.score, 5);
    assert_eq!(outcome.state.statistics.lines_popped, 1);
    assert_eq!(outcome.state.statistics.longest_line_popped, 5);
    for x in 0..5 {
        assert_eq!(outcome.state.board.ball_at(Coord::new(x, 0)), None);
    }
    assert_eq!(outcome.state.board.ball_at(Coord::new(8, 7)), Some(BallColor::Black));
    assert_eq!(outcome.state.board.count_incoming(), 3);

    let mut phases = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let TurnEvent::PhaseChanged(phase) = event {
            phases.push(phase);
        }
    }
    assert_eq!(
        phases,
        vec![
            TurnPhase::Moving,
            TurnPhase::CheckingLines,
            TurnPhase::CheckingBlocked,
            TurnPhase::Growing,
            TurnPhase::CheckingLinesAfterGrow,
            TurnPhase::PoppingAfterGrow,
            TurnPhase::TurnComplete,
        ]
    );
}

#[tokio::test]
async fn test_quiet_turn_event_order() {
    let mut board = Board::new(9);
    board.set_ball(Coord::new(2, 2), Some(BallColor::Pink));
    board.set_incoming(Coord::new(7, 7), Some(BallColor::Blue));
    let state = GameState::new(board, vec![BallColor::Blue], 0);

    let (callbacks, mut events) = ChannelCallbacks::channel();
    controller(GameConfig::default())
        .execute_turn(&state, Move::new(Coord::new(2, 2), Coord::new(3, 2)), &callbacks)
        .await;

    let mut labels = Vec::new();
    while let Ok(event) = events.try_recv() {
        labels.push(label(&event));
    }

    assert_eq!(
        labels,
        vec![
            "phase:Moving",
            "wait:Moving",
            "phase:CheckingLines",
            "state",
            "phase:CheckingBlocked",
            "phase:Growing",
            "ui:grow",
            "wait:Growing",
            "state",
            "phase:TurnComplete",
            "state",
        ]
    );
}

#[tokio::test]
async fn test_animation_waits_for_ack() {
    let mut board = Board::new(9);
    row(&mut board, 3, 0..4, BallColor::Green);
    board.set_ball(Coord::new(8, 0), Some(BallColor::Green));
    let state = GameState::new(board, vec![BallColor::Green], 0);

    let (callbacks, mut events, acks) = ChannelCallbacks::with_acks();
    let mut controller = controller(GameConfig::default());

    let ui = async {
        let mut waited = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                TurnEvent::AnimationPending(phase) => {
                    waited.push(phase);
                    acks.send(phase).unwrap();
                }
                TurnEvent::PhaseChanged(phase) if phase.is_terminal() => break,
                _ => {}
            }
        }
        waited
    };

    let turn = controller.execute_turn(&state, Move::new(Coord::new(8, 0), Coord::new(4, 3)), &callbacks);
    let (outcome, waited) = tokio::join!(turn, ui);

    assert!(outcome.completed);
    assert_eq!(outcome.state.score, 5);
    assert_eq!(waited, vec![TurnPhase::Moving, TurnPhase::Popping]);
}

#[tokio::test]
async fn test_failed_turn_returns_previous_state() {
    let mut board = Board::new(9);
    board.set_ball(Coord::new(0, 0), Some(BallColor::Red));
    board.set_ball(Coord::new(1, 0), Some(BallColor::Blue));
    let state = GameState::new(board, vec![], 0);

    let (callbacks, mut events) = ChannelCallbacks::channel();
    let outcome = controller(GameConfig::default())
        .execute_turn(&state, Move::new(Coord::new(0, 0), Coord::new(1, 0)), &callbacks)
        .await;

    assert!(!outcome.completed);
    assert_eq!(outcome.state, state);
    assert_eq!(events.try_recv().ok(), Some(TurnEvent::PhaseChanged(TurnPhase::TurnComplete)));
}

#[tokio::test]
async fn test_stepped_preview_fills_board_and_ends_game() {
    let config = GameConfig {
        board_size: 3,
        ..GameConfig::default()
    };
    let colors = [BallColor::Red, BallColor::Blue, BallColor::Green, BallColor::Yellow];

    let mut board = Board::new(3);
    for (i, coord) in board.coords().collect::<Vec<_>>().into_iter().enumerate() {
        if coord != Coord::new(2, 2) {
            board.set_ball(coord, Some(colors[i % colors.len()]));
        }
    }
    board.set_incoming(Coord::new(2, 2), Some(BallColor::Purple));
    let state = GameState::new(board, vec![BallColor::Purple], 0);

    let mut controller = controller(config);
    let outcome = controller
        .execute_turn(&state, Move::new(Coord::new(2, 1), Coord::new(2, 2)), &NoopCallbacks)
        .await;

    assert!(outcome.completed);
    assert!(outcome.is_game_over());
    assert!(outcome.state.game_over);
    assert!(outcome.state.board.is_full());
    assert_eq!(outcome.state.board.ball_at(Coord::new(2, 1)), Some(BallColor::Purple));
    assert!(outcome.state.next_balls.is_empty());
    assert_eq!(outcome.state.statistics.turns_count, 1);

    // 終了したゲームではターンを実行できない
    let retry = controller
        .execute_turn(&outcome.state, Move::new(Coord::new(0, 0), Coord::new(1, 1)), &NoopCallbacks)
        .await;
    assert!(!retry.completed);
    assert_eq!(retry.state, outcome.state);
}
