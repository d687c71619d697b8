//! Render payload handed to the presentation layer

use serde::{Deserialize, Serialize};

use super::EngineState;

pub const START_WORK_LABEL: &str = "START WORK";
pub const START_BREAK_LABEL: &str = "START BREAK";
pub const STOP_LABEL: &str = "STOP";
pub const BUSY_LABEL: &str = "...";

/// One rendered view of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub button_label: String,
    pub break_button_label: String,
    pub display_text: String,
    pub phase_name: Option<String>,
    pub state: EngineState,
}

impl Frame {
    pub fn new(state: EngineState, seconds_remaining: i64, phase_name: Option<String>) -> Self {
        let (button_label, break_button_label) = match state {
            EngineState::Idle => (START_WORK_LABEL, START_BREAK_LABEL),
            EngineState::Running => (STOP_LABEL, BUSY_LABEL),
        };

        Self {
            button_label: button_label.to_string(),
            break_button_label: break_button_label.to_string(),
            display_text: format_duration(seconds_remaining.max(0) as u64),
            phase_name,
            state,
        }
    }

    /// The frame shown before anything has been started
    pub fn idle() -> Self {
        Self::new(EngineState::Idle, 0, None)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::idle()
    }
}

/// Format seconds as zero-padded `MM:SS`
pub fn format_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
