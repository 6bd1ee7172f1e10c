pub mod callbacks;
pub mod controller;
pub mod machine;
pub mod phase;

pub use callbacks::{ChannelCallbacks, NoopCallbacks, TurnCallbacks};
pub use controller::{TurnFlowController, TurnOutcome};
pub use machine::TurnMachine;
pub use phase::{Transition, TurnEvent, TurnPhase, UiUpdate};
