//! エンジン全体のエラー定義モジュール
//! 不正な手、状態の永続化、自動プレイ戦略のエラーを統一管理。

use thiserror::Error;

/// ゲームロジックに関連するエラー
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid move: {reason}")]
    InvalidMove { reason: String },

    #[error("Game already finished")]
    GameFinished,

    #[error("Persistence error: {source}")]
    Persistence {
        #[from]
        source: PersistenceError,
    },

    #[error("Strategy error: {source}")]
    Strategy {
        #[from]
        source: StrategyError,
    },
}

impl GameError {
    /// 不正な手のエラーを生成する
    pub fn invalid_move(reason: impl Into<String>) -> Self {
        GameError::InvalidMove {
            reason: reason.into(),
        }
    }
}

/// 手の自動選択に関連するエラー
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("No valid moves available")]
    NoValidMoves,

    #[error("Strategy failed: {message}")]
    StrategyFailed { message: String },
}

/// ゲーム状態の保存・復元に関連するエラー
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("File I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// ゲームエラーをベースとした結果型
pub type Result<T> = std::result::Result<T, GameError>;
