//! Phase definitions and the two template sequences

use serde::{Deserialize, Serialize};

/// A named, fixed-duration interval such as "Work" for 25 minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub name: String,
    pub duration_seconds: u64,
}

impl PhaseSpec {
    pub fn new(name: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// Duration for remaining-time arithmetic, saturating at `i64::MAX`
    pub fn signed_duration(&self) -> i64 {
        i64::try_from(self.duration_seconds).unwrap_or(i64::MAX)
    }
}

/// Which template a run is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Work,
    Break,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Work => "work",
            Mode::Break => "break",
        }
    }
}

/// The two template sequences a run can be built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    pub work: Vec<PhaseSpec>,
    #[serde(rename = "break")]
    pub breaks: Vec<PhaseSpec>,
}

impl Templates {
    pub fn new(work: Vec<PhaseSpec>, breaks: Vec<PhaseSpec>) -> Self {
        Self { work, breaks }
    }

    /// Work then rest
    pub fn default_work() -> Vec<PhaseSpec> {
        vec![PhaseSpec::new("Work", 25 * 60), PhaseSpec::new("Rest", 5 * 60)]
    }

    /// Alternating sequence ending in a long rest
    pub fn default_break() -> Vec<PhaseSpec> {
        vec![
            PhaseSpec::new("Rest", 5 * 60),
            PhaseSpec::new("Work", 25 * 60),
            PhaseSpec::new("Rest", 5 * 60),
            PhaseSpec::new("Rest", 5 * 60),
            PhaseSpec::new("Work", 25 * 60),
            PhaseSpec::new("Rest", 5 * 60),
            PhaseSpec::new("Rest", 5 * 60),
            PhaseSpec::new("Rest", 15 * 60),
        ]
    }

    /// Get the template sequence for a mode
    pub fn sequence(&self, mode: Mode) -> &[PhaseSpec] {
        match mode {
            Mode::Work => &self.work,
            Mode::Break => &self.breaks,
        }
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new(Self::default_work(), Self::default_break())
    }
}
