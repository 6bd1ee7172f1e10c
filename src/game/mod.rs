pub mod types;
pub mod board;
pub mod board_manager;
pub mod engine;
pub mod lines;
pub mod pathfinding;
pub mod scoring;
pub mod state;
pub mod validation;

pub use types::*;
pub use board::*;
pub use board_manager::{BoardManager, ConversionResult};
pub use engine::{GameEngine, MoveOutcome};
pub use lines::LineDetector;
pub use pathfinding::{find_path, find_unreachable_cells};
pub use scoring::{calculate_line_score, ScoringTable};
pub use state::*;
pub use validation::validate_move;
