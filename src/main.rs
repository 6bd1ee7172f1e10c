//! Linesヘッドレスプレイヤーのエントリポイント
//! 設定読み込み、ログ初期化を行い、設定された戦略でゲームを自動プレイする。

use Lines::{
    autoplay::{create_strategy, AutoPlayer, PacedCallbacks},
    config::Config,
    game::GameEngine,
    turn::{NoopCallbacks, TurnCallbacks, TurnFlowController},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "config.json";

/// メイン関数 - 設定の読み込みと自動プレイを担当
#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if std::env::args().any(|arg| arg == "--generate-config") {
        if let Err(e) = Config::default().save_to_file(DEFAULT_CONFIG_PATH) {
            eprintln!("設定ファイル生成失敗: {}", e);
            std::process::exit(1);
        }
        println!("デフォルト設定を生成: {}", DEFAULT_CONFIG_PATH);
        return;
    }

    // 設定ファイルと環境変数から統合設定を読み込み
    let config = match Config::load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("設定エラー: {}", e);
            eprintln!("デフォルト設定を生成: cargo run -- --generate-config");
            std::process::exit(1);
        }
    };

    println!("設定読み込み完了:");
    println!("  盤面: {}x{}", config.game.board_size, config.game.board_size);
    println!("  色数: {}", config.game.color_count);
    println!("  戦略: {:?}", config.autoplay.strategy);
    println!("  ゲーム数: {}", config.autoplay.games);

    let seed = config.autoplay.seed.unwrap_or_else(rand::random);
    println!("  シード: {}", seed);

    let engine = GameEngine::with_seed(config.game.clone(), seed);
    let strategy = create_strategy(config.autoplay.strategy, seed);
    let mut player = AutoPlayer::new(TurnFlowController::new(engine), strategy, config.autoplay.max_turns);

    let paced = PacedCallbacks::new(config.animation.clone());
    let callbacks: &dyn TurnCallbacks = if config.autoplay.animate { &paced } else { &NoopCallbacks };

    let mut high_score = 0;
    for game in 1..=config.autoplay.games {
        let summary = match player.play_game(high_score, callbacks).await {
            Ok(summary) => summary,
            Err(e) => {
                eprintln!("ゲーム{}の実行失敗: {}", game, e);
                std::process::exit(1);
            }
        };
        high_score = summary.high_score;

        println!(
            "ゲーム{}: スコア {} / ハイスコア {}{} / {}ターン / {}ライン (最長 {}) / {}ms / 終了理由 {:?}",
            game,
            summary.score,
            summary.high_score,
            if summary.beat_high_score { " (更新)" } else { "" },
            summary.turns,
            summary.lines_popped,
            summary.longest_line,
            summary.elapsed_ms,
            summary.reason,
        );
    }
}
