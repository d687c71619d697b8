//! State management module
//! 
//! This module contains the shared application state wrapping the timer engine.

pub mod app_state;

// Re-export main types
pub use app_state::AppState;
