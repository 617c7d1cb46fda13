#![forbid(unsafe_code)]

//! Core domain model and business logic for Liftlog.
//!
//! This crate provides:
//! - Domain types (workouts, exercises, sets, goals)
//! - Plate notation codec
//! - Free-text workout log parser
//! - Progression analytics (1RM estimates, trend, insights)
//! - Workout recording (sets, cardio, notes, finishing)
//! - Aggregate statistics (weekly, monthly, lifetime)
//! - Persistence (record store, split preference, CSV export)
//! - Application state with read-your-writes actions

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod plates;
pub mod parser;
pub mod progression;
pub mod stats;
pub mod goals;
pub mod recorder;
pub mod store;
pub mod prefs;
pub mod export;
pub mod app;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use parser::{parse_workout_log, WorkoutLogParser};
pub use progression::{progression_for, summarize, ProgressionSummary, Trend, TrendOptions};
pub use stats::{lifetime_stats, monthly_breakdown, monthly_stats, weekly_stats, PeriodStats};
pub use store::{JsonFileStore, MemoryStore, Record, RecordStore};
pub use prefs::{CurrentWorkoutPointer, SplitPreference};
pub use app::{AppState, ImportReport};
