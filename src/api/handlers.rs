//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    state::AppState,
    timer::{EngineState, Frame, Mode},
};
use super::responses::{ApiResponse, StatusResponse, HealthResponse};

fn toggle(state: &AppState, mode: Mode) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle(mode) {
        Ok(frame) => {
            let response = match frame.state {
                EngineState::Running => {
                    info!("{} timer started", mode.as_str());
                    ApiResponse::running(format!("Started {} sequence", mode.as_str()), frame)
                }
                EngineState::Idle => {
                    info!("Timer stopped via {} control", mode.as_str());
                    ApiResponse::idle("Timer stopped".to_string(), frame)
                }
            };
            Ok(Json(response))
        }
        Err(e) => {
            error!("Failed to toggle {} timer: {}", mode.as_str(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /work - Start the work sequence or stop the running timer
pub async fn work_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    toggle(&state, Mode::Work)
}

/// Handle POST /break - Start the break sequence or stop the running timer
pub async fn break_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    toggle(&state, Mode::Break)
}

/// Handle GET /display - Return the latest rendered frame
pub async fn display_handler(State(state): State<Arc<AppState>>) -> Json<Frame> {
    Json(state.get_frame())
}

/// Handle GET /status - Return engine and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match state.get_snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: snapshot,
        frame: state.get_frame(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
