//! 設定システム統合テスト

use std::{env, fs, time::Duration};
use tempfile::TempDir;

use Lines::{
    autoplay::StrategyKind,
    config::{AnimationConfig, AutoplayConfig, Config, ConfigError, GameConfig},
    game::GameEngine,
};

fn create_test_config() -> Config {
    Config {
        game: GameConfig {
            board_size: 7,
            color_count: 5,
            balls_per_turn: 2,
            ..Default::default()
        },
        animation: AnimationConfig {
            pop: Duration::from_millis(120),
            ..Default::default()
        },
        autoplay: AutoplayConfig {
            games: 4,
            seed: Some(99),
            strategy: StrategyKind::Random,
            ..Default::default()
        },
    }
}

#[test]
fn test_config_serialization_deserialization() {
    let config = create_test_config();

    let json_str = serde_json::to_string_pretty(&config).unwrap();
    assert!(json_str.contains("\"board_size\": 7"));
    assert!(json_str.contains("\"random\""));

    let deserialized: Config = serde_json::from_str(&json_str).unwrap();
    assert_eq!(deserialized, config);
}

#[test]
fn test_config_file_operations() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("test_config.json");

    let original_config = create_test_config();

    // ファイルに保存
    original_config.save_to_file(&config_path).unwrap();
    assert!(config_path.exists());

    // ファイルから読み込み
    let loaded_config = Config::from_file(&config_path).unwrap();
    assert_eq!(loaded_config, original_config);
}

#[test]
fn test_config_file_errors() {
    let temp_dir = TempDir::new().unwrap();

    let missing = Config::from_file(temp_dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ConfigError::FileReadError(_))));

    let broken_path = temp_dir.path().join("broken.json");
    fs::write(&broken_path, "{ \"game\": ").unwrap();
    let broken = Config::from_file(&broken_path);
    assert!(matches!(broken, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // 有効な設定
    assert!(config.validate().is_ok());

    // 盤面サイズ0
    config.game.board_size = 0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    config.game.board_size = 9;

    // 色数がパレットを超える
    config.game.color_count = 8;
    assert!(config.validate().is_err());
    config.game.color_count = 7;

    // 得点表が減少している
    config.game.line_scores = vec![5, 3];
    assert!(config.validate().is_err());
    config.game.line_scores = vec![5, 8, 13, 21, 34];

    config.autoplay.games = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_configured_engine_uses_board_size() {
    let config = create_test_config();
    let mut engine = GameEngine::with_seed(config.game.clone(), 1);

    let state = engine.create_new_game();
    assert_eq!(state.board.size(), 7);
    assert_eq!(state.next_balls.len(), 2);
    assert!(state.next_balls.iter().all(|color| config.game.palette().contains(color)));
}

/// 環境変数はプロセス全体で共有されるため、上書きの検証は1つのテストにまとめる
#[test]
fn test_environment_overrides() {
    env::set_var("LINES_BOARD_SIZE", "11");
    env::set_var("LINES_SEED", "1234");
    env::set_var("LINES_STRATEGY", "Random");

    let config = Config::from_env().unwrap();
    assert_eq!(config.game.board_size, 11);
    assert_eq!(config.autoplay.seed, Some(1234));
    assert_eq!(config.autoplay.strategy, StrategyKind::Random);
    assert_eq!(config.game.color_count, GameConfig::default().color_count);

    env::set_var("LINES_GAMES", "many");
    let invalid = Config::from_env();
    assert!(matches!(invalid, Err(ConfigError::EnvVarError { .. })));
    env::remove_var("LINES_GAMES");

    env::set_var("LINES_STRATEGY", "minimax");
    assert!(Config::from_env().is_err());

    for name in ["LINES_BOARD_SIZE", "LINES_SEED", "LINES_STRATEGY"] {
        env::remove_var(name);
    }
    assert_eq!(Config::from_env().unwrap(), Config::default());
}
