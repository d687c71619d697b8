//! Pomodoro Queue - A state-managed HTTP server driving a Pomodoro timer
//! 
//! This library provides a queue-based interval timer that cycles through
//! named phases ("Work", "Rest") and publishes a rendered view once per
//! second, along with the HTTP controls that toggle it.

pub mod config;
pub mod timer;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timer::{Frame, Mode, PhaseQueue, PhaseSpec, Templates, TimerEngine};
pub use utils::signals::shutdown_signal;
