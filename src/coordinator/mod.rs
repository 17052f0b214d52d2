//! Turn coordination: the state machine and the async shell that drives it.

mod driver;
mod machine;
mod scheduler;

pub use driver::{DriverEvent, DriverTimings, Interaction, MatchDriver};
pub use machine::{MatchSnapshot, RemoteDispatch, TurnCoordinator};
pub use scheduler::ResetScheduler;
