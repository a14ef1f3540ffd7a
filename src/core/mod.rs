//! Core research types.
//!
//! Pure data and pure functions: mode budgets, plan and report shapes,
//! and the confidence heuristic. Nothing here performs I/O.

pub mod confidence;
pub mod mode;
pub mod report;

pub use confidence::{ConfidenceLabel, calculate_confidence, get_confidence_label};
pub use mode::{
    MAX_SOURCES_ABSOLUTE, ModeConfig, ResearchMode, get_mode_config, validate_source_count,
};
pub use report::{ReportData, SearchPlan, SearchPlanItem};
