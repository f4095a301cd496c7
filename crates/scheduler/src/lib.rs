//! Greedy constructive scheduler for recurring health activities.
//!
//! Expands recurring activities into occurrences, places each one against
//! hard constraints (specialists, equipment, travel, overlaps) and soft
//! preferences (buffer, clustering, window centrality, weekday consistency),
//! and falls back along per-activity backup chains when a primary cannot be
//! placed. One pass, deterministic, single-threaded.

pub mod candidates;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod scoring;
pub mod state;

pub use candidates::{Horizon, Scope};
pub use config::SchedulerConfig;
pub use constraints::{ConstraintChecker, ConstraintViolation, ViolationKind};
pub use engine::{ScheduleEngine, SchedulerError};
pub use scoring::SlotScorer;
pub use state::{
    FailureRecord, FailureReportEntry, PriorityStats, ScheduleStatistics, SchedulerState,
};
