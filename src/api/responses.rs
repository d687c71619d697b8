//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{EngineSnapshot, Frame};

/// API response structure for toggle endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub frame: Frame,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, frame: Frame) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            frame,
        }
    }

    /// Create a running response
    pub fn running(message: String, frame: Frame) -> Self {
        Self::new("running".to_string(), message, frame)
    }

    /// Create an idle response
    pub fn idle(message: String, frame: Frame) -> Self {
        Self::new("idle".to_string(), message, frame)
    }
}

/// Status response with engine and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: EngineSnapshot,
    pub frame: Frame,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
