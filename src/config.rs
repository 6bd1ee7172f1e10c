//! アプリケーション設定管理モジュール
//! 盤面サイズやスコア表などのゲームバランス定数、アニメーション時間、
//! ヘッドレス自動プレイの設定を設定ファイルと環境変数から読み込んで管理する。

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};

use crate::autoplay::StrategyKind;
use crate::game::BallColor;

/// Duration型をJSONでシリアライズするためのモジュール
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    /// Durationを(secs, nanos)のタプルとしてシリアライズ
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let secs = duration.as_secs();
        let nanos = duration.subsec_nanos();
        (secs, nanos).serialize(serializer)
    }

    /// (secs, nanos)のタプルからDurationをデシリアライズ
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos) = <(u64, u32)>::deserialize(deserializer)?;
        Ok(Duration::new(secs, nanos))
    }
}

/// ゲームルールの定数をまとめた構造体
/// エンジンはこの値だけを参照し、ハードコードされた定数を持たない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// 盤面の一辺のマス数
    pub board_size: usize,
    /// 使用するボールの色数（パレットの先頭から使用）
    pub color_count: usize,
    /// ゲーム開始時に置かれる実ボール数
    pub initial_balls: usize,
    /// 1ターンごとに出現する予告ボール数
    pub balls_per_turn: usize,
    /// 消去に必要な最小ライン長
    pub min_line_length: usize,
    /// ライン長ごとの得点（先頭がmin_line_lengthに対応）
    /// 表を超える長さは最大値で頭打ちになる
    pub line_scores: Vec<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 9,
            color_count: 7,
            initial_balls: 3,
            balls_per_turn: 3,
            min_line_length: 5,
            line_scores: vec![5, 8, 13, 21, 34],
        }
    }
}

impl GameConfig {
    /// 設定された色数に対応するパレットを返す
    pub fn palette(&self) -> &'static [BallColor] {
        let count = self.color_count.clamp(1, BallColor::ALL.len());
        &BallColor::ALL[..count]
    }
}

/// 呼び出し側が演出に使うアニメーション時間
/// エンジン自身は待機しない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// ボール移動の1マスあたりの時間
    #[serde(with = "duration_serde")]
    pub move_step: Duration,
    #[serde(with = "duration_serde")]
    pub pop: Duration,
    #[serde(with = "duration_serde")]
    pub grow: Duration,
    #[serde(with = "duration_serde")]
    pub floating_score: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            move_step: Duration::from_millis(50),
            pop: Duration::from_millis(300),
            grow: Duration::from_millis(100),
            floating_score: Duration::from_millis(1000),
        }
    }
}

/// ヘッドレス自動プレイの設定を管理する構造体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplayConfig {
    /// 連続して遊ぶゲーム数
    pub games: usize,
    /// 1ゲームあたりのターン上限
    pub max_turns: usize,
    /// 乱数シード（未指定ならOSのエントロピーから生成）
    pub seed: Option<u64>,
    pub strategy: StrategyKind,
    /// アニメーション時間どおりに待機するか
    pub animate: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            games: 1,
            max_turns: 10_000,
            seed: None,
            strategy: StrategyKind::Greedy,
            animate: false,
        }
    }
}

/// アプリケーションの全設定を統合するメイン設定構造体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub game: GameConfig,
    pub animation: AnimationConfig,
    pub autoplay: AutoplayConfig,
}

/// 設定関連のエラーを表すenum
/// ファイル読み込み、パース、検証エラーなどを含む
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイル読み込みエラー: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("設定ファイル解析エラー: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("環境変数エラー: {name} = {value}")]
    EnvVarError { name: String, value: String },

    #[error("設定値が無効です: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

/// 環境変数を読み取り、指定した型にパースする
fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarError {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// 指定したファイルパスから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 環境変数から設定を読み込む
    /// デフォルト値をベースに環境変数で上書きする
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// 現在の設定に環境変数の値を上書きする
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(size) = parse_env("LINES_BOARD_SIZE")? {
            self.game.board_size = size;
        }
        if let Some(count) = parse_env("LINES_COLOR_COUNT")? {
            self.game.color_count = count;
        }
        if let Some(count) = parse_env("LINES_BALLS_PER_TURN")? {
            self.game.balls_per_turn = count;
        }
        if let Some(count) = parse_env("LINES_INITIAL_BALLS")? {
            self.game.initial_balls = count;
        }
        if let Some(length) = parse_env("LINES_MIN_LINE_LENGTH")? {
            self.game.min_line_length = length;
        }
        if let Some(seed) = parse_env("LINES_SEED")? {
            self.autoplay.seed = Some(seed);
        }
        if let Some(games) = parse_env("LINES_GAMES")? {
            self.autoplay.games = games;
        }

        if let Ok(strategy) = env::var("LINES_STRATEGY") {
            self.autoplay.strategy = match strategy.to_lowercase().as_str() {
                "random" => StrategyKind::Random,
                "greedy" => StrategyKind::Greedy,
                _ => {
                    return Err(ConfigError::EnvVarError {
                        name: "LINES_STRATEGY".to_string(),
                        value: strategy,
                    })
                }
            };
        }

        Ok(())
    }

    /// 設定ファイルと環境変数を結合して設定を読み込む
    /// 設定ファイルがなくてもデフォルト値で動作する
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(file_config) = Self::from_file("config.json") {
            config = file_config;
        } else if let Ok(file_config) = Self::from_file("config/lines.json") {
            config = file_config;
        }

        // 環境変数で設定を上書き
        config.apply_env()?;

        Ok(config)
    }

    /// 現在の設定を指定したファイルに保存する
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 設定値の妥当性をチェックする
    /// 不正な値がある場合はConfigErrorを返す
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;

        if game.board_size == 0 {
            return Err(invalid("game.board_size", game.board_size));
        }

        if game.color_count == 0 || game.color_count > BallColor::ALL.len() {
            return Err(invalid("game.color_count", game.color_count));
        }

        if game.min_line_length < 2 {
            return Err(invalid("game.min_line_length", game.min_line_length));
        }

        if game.balls_per_turn == 0 {
            return Err(invalid("game.balls_per_turn", game.balls_per_turn));
        }

        if game.line_scores.is_empty() || game.line_scores.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("game.line_scores", format!("{:?}", game.line_scores)));
        }

        if self.autoplay.games == 0 {
            return Err(invalid("autoplay.games", self.autoplay.games));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.board_size, 9);
        assert_eq!(config.game.palette().len(), 7);
    }

    #[test]
    fn test_palette_respects_color_count() {
        let game = GameConfig {
            color_count: 3,
            ..Default::default()
        };
        assert_eq!(game.palette(), &BallColor::ALL[..3]);
    }

    #[test]
    fn test_validate_rejects_decreasing_scores() {
        let mut config = Config::default();
        config.game.line_scores = vec![5, 3];

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "game.line_scores"));
    }

    #[test]
    fn test_validate_rejects_zero_board() {
        let mut config = Config::default();
        config.game.board_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_animation_durations_serialize_as_tuples() {
        let json = serde_json::to_string(&AnimationConfig::default()).unwrap();
        assert!(json.contains("\"pop\":[0,300000000]"));
    }
}
