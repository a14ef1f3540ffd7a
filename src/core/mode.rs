//! Research modes and their resource budgets.
//!
//! Each [`ResearchMode`] maps to a fixed [`ModeConfig`] bounding how many
//! searches a plan may contain and how long a run should take. The table
//! is a pure function of the mode, so it is deterministic and trivially
//! testable.
//!
//! # Budget Table
//!
//! | Mode  | Min sources | Max sources | Target time |
//! |-------|-------------|-------------|-------------|
//! | Quick | 4           | 6           | 2 min       |
//! | Deep  | 10          | 14          | 8 min       |
//!
//! No mode may exceed [`MAX_SOURCES_ABSOLUTE`].

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hard ceiling on searches per run, independent of mode.
pub const MAX_SOURCES_ABSOLUTE: usize = 20;

/// Research depth selected per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchMode {
    /// Fast scan with a handful of sources.
    #[default]
    Quick,
    /// Thorough investigation with many sources.
    Deep,
}

impl ResearchMode {
    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Deep => "deep",
        }
    }

    /// Returns the uppercase label used in status headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quick => "QUICK",
            Self::Deep => "DEEP",
        }
    }
}

impl std::fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "deep" => Ok(Self::Deep),
            other => Err(format!("unknown research mode '{other}' (expected quick or deep)")),
        }
    }
}

/// Resource budget for a research mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    /// Advisory lower bound on planned searches.
    pub min_sources: usize,
    /// Enforced upper bound on planned searches.
    pub max_sources: usize,
    /// Wall-clock target for the whole run.
    pub target_time: Duration,
    /// Human-readable description handed to the planner.
    pub description: &'static str,
}

const QUICK_CONFIG: ModeConfig = ModeConfig {
    min_sources: 4,
    max_sources: 6,
    target_time: Duration::from_secs(120),
    description: "Quick research: a focused scan of the most relevant sources",
};

const DEEP_CONFIG: ModeConfig = ModeConfig {
    min_sources: 10,
    max_sources: 14,
    target_time: Duration::from_secs(480),
    description: "Deep research: a thorough investigation across many diverse sources",
};

/// Looks up the budget for `mode`.
#[must_use]
pub const fn get_mode_config(mode: ResearchMode) -> ModeConfig {
    match mode {
        ResearchMode::Quick => QUICK_CONFIG,
        ResearchMode::Deep => DEEP_CONFIG,
    }
}

/// Clamps a proposed source count to the mode's budget.
///
/// The count is capped at [`MAX_SOURCES_ABSOLUTE`] and then at the mode's
/// `max_sources`. A result below `min_sources` is returned unchanged and
/// only logged: the minimum is advisory, the maximum is enforced.
pub fn validate_source_count(count: usize, mode: ResearchMode) -> usize {
    let config = get_mode_config(mode);
    let clamped = count.min(MAX_SOURCES_ABSOLUTE).min(config.max_sources);

    if clamped < count {
        tracing::warn!(
            mode = mode.as_str(),
            requested = count,
            allowed = clamped,
            "source count exceeds budget, truncating"
        );
    }
    if clamped < config.min_sources {
        tracing::warn!(
            mode = mode.as_str(),
            count = clamped,
            min_sources = config.min_sources,
            "source count below recommended minimum"
        );
    }

    clamped
}
