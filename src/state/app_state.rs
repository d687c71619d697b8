//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    tasks::{TickSender, TokioSchedule},
    timer::{Clock, EngineSnapshot, Frame, Mode, RenderSink, Schedule, SystemClock, Templates, TimerEngine},
};

/// Frames are published on a watch channel; readers only ever need the latest
impl RenderSink for watch::Sender<Frame> {
    fn render(&self, frame: &Frame) {
        debug!("Rendering frame: {} [{}]", frame.display_text, frame.button_label);
        if let Err(e) = self.send(frame.clone()) {
            warn!("Failed to publish frame: {}", e);
        }
    }
}

/// Main application state that owns the timer engine
#[derive(Debug)]
pub struct AppState {
    /// The single timer engine; both toggle controls drive it
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest rendered frame. Also keeps the channel open for the engine's sender.
    pub frame_rx: watch::Receiver<Frame>,
}

impl AppState {
    /// Create a new AppState using the system clock and a tokio schedule
    /// that delivers ticks on `tick_tx`
    pub fn new(
        port: u16,
        host: String,
        templates: Templates,
        tick_tx: TickSender,
    ) -> Self {
        Self::with_parts(
            port,
            host,
            templates,
            Box::new(SystemClock),
            Box::new(TokioSchedule::new(tick_tx)),
        )
    }

    /// Create a new AppState with an explicit clock and schedule
    pub fn with_parts(
        port: u16,
        host: String,
        templates: Templates,
        clock: Box<dyn Clock>,
        schedule: Box<dyn Schedule>,
    ) -> Self {
        let (frame_tx, frame_rx) = watch::channel(Frame::idle());
        let engine = TimerEngine::new(templates, clock, schedule, Box::new(frame_tx));

        Self {
            engine: Arc::new(Mutex::new(engine)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            frame_rx,
        }
    }

    /// Start a run of `mode` if idle, otherwise stop the current run
    pub fn toggle(&self, mode: Mode) -> Result<Frame, String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        info!("Toggle {} requested while {:?}", mode.as_str(), engine.state());
        engine.toggle(mode);
        let frame = engine.frame();
        drop(engine); // Release the lock early

        self.record_action(&format!("toggle-{}", mode.as_str()));
        Ok(frame)
    }

    /// Advance the engine by one scheduled tick
    pub fn tick(&self) -> Result<(), String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock timer engine: {}", e))?;

        engine.tick();
        Ok(())
    }

    /// Get a snapshot of the engine
    pub fn get_snapshot(&self) -> Result<EngineSnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock timer engine: {}", e))
    }

    /// Get the most recently rendered frame
    pub fn get_frame(&self) -> Frame {
        self.frame_rx.borrow().clone()
    }

    /// Subscribe to rendered frames
    pub fn subscribe_frames(&self) -> watch::Receiver<Frame> {
        self.frame_rx.clone()
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
