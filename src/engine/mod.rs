//! Timer engine for the Pomodoro timer.
//!
//! - `timer`: the Focus/Break countdown state machine
//! - `scheduler`: the one-second clock that drives `tick()`
//! - `error`: control surface errors

pub mod error;
pub mod scheduler;
pub mod timer;

pub use error::EngineError;
pub use scheduler::{TickScheduler, TICK_PERIOD};
pub use timer::{TickOutcome, TimerEngine, TimerEvent};
