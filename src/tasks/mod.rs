//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod ticker;

// Re-export main items
pub use ticker::{tick_channel, tick_driver_task, TickReceiver, TickSender, TokioSchedule};
