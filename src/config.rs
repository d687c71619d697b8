//! Configuration and CLI argument handling

use std::{fs, path::PathBuf};

use clap::Parser;
use tracing::info;

use crate::timer::{Mode, Templates};

/// Longest phase a templates file may declare
pub const MAX_PHASE_SECONDS: u64 = i64::MAX as u64;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-queue")]
#[command(about = "A state-managed HTTP server driving a queue-based Pomodoro timer")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// JSON file replacing the work and break sequences
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Load the template sequences, falling back to the defaults
    pub fn load_templates(&self) -> Result<Templates, String> {
        let Some(path) = &self.templates else {
            return Ok(Templates::default());
        };

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read templates file {}: {}", path.display(), e))?;
        let templates: Templates = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid templates file {}: {}", path.display(), e))?;

        for (mode, phases) in [(Mode::Work, &templates.work), (Mode::Break, &templates.breaks)] {
            if let Some(phase) = phases.iter().find(|p| p.duration_seconds > MAX_PHASE_SECONDS) {
                return Err(format!(
                    "Invalid templates file {}: {} phase {} lasts {}s, limit is {}s",
                    path.display(),
                    mode.as_str(),
                    phase.name,
                    phase.duration_seconds,
                    MAX_PHASE_SECONDS
                ));
            }
        }

        info!(
            "Loaded templates from {}: {} work phases, {} break phases",
            path.display(),
            templates.work.len(),
            templates.breaks.len()
        );
        Ok(templates)
    }
}
