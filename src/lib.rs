pub mod game;
pub mod turn;
pub mod autoplay;
pub mod error;
pub mod config;

pub use error::{GameError, PersistenceError, StrategyError, Result};
pub use config::{Config, GameConfig};
