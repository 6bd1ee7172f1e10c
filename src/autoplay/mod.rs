pub mod runner;
pub mod strategies;

pub use runner::{AutoPlayer, GameSummary, PacedCallbacks, StopReason};
pub use strategies::{create_strategy, legal_moves, GreedyStrategy, MoveStrategy, RandomStrategy, StrategyKind};
