//! Pomodoro timer core
//!
//! Phases, the phase queue, the clock abstraction, the render payload and
//! the state machine that ties them together. Nothing in here depends on
//! the HTTP layer or on a running async runtime.

pub mod clock;
pub mod display;
pub mod engine;
pub mod phase;
pub mod queue;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use display::{format_duration, Frame};
pub use engine::{EngineSnapshot, EngineState, RenderSink, Schedule, TimerEngine, TICK_PERIOD};
pub use phase::{Mode, PhaseSpec, Templates};
pub use queue::PhaseQueue;
