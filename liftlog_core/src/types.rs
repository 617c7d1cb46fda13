//! Core domain types for Liftlog.
//!
//! This module defines the fundamental records used throughout the system:
//! - Sets, exercises and workouts
//! - Goals
//! - Derived progression data points
//! - Field-level patches for partial updates
//!
//! Workout dates are calendar dates (`NaiveDate`) with no time-zone component,
//! so a stored date is never shifted by UTC conversion.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build a timestamp-derived record id such as `workout-1718000000000`
pub fn new_record_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

// ============================================================================
// Set
// ============================================================================

/// One performed effort within an exercise
///
/// Weights are in pounds. Cardio sets carry their calorie count as a number
/// string in `notes`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Set {
    pub id: String,
    pub weight: f64,
    pub reps: f64,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
}

impl Set {
    /// A completed strength set
    pub fn strength(id: impl Into<String>, weight: f64, reps: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            reps,
            completed: true,
            duration: None,
            distance: None,
            notes: None,
            rest_time: None,
            rpe: None,
        }
    }

    /// An empty, not yet performed set (weight 0, reps 0)
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            completed: false,
            ..Self::strength(id, 0.0, 0.0)
        }
    }

    /// A completed cardio entry; calories are kept in `notes` when positive
    pub fn cardio(id: impl Into<String>, distance: f64, duration: f64, calories: f64) -> Self {
        Self {
            distance: Some(distance),
            duration: Some(duration),
            notes: (calories > 0.0).then(|| calories.to_string()),
            ..Self::strength(id, 0.0, 0.0)
        }
    }

    /// Calorie count stored in `notes` by cardio entries
    pub fn calories(&self) -> Option<f64> {
        self.notes
            .as_deref()
            .and_then(|n| n.trim().parse::<f64>().ok())
            .filter(|c| c.is_finite())
    }

    /// Whether this set counts as a strength data point
    ///
    /// Zero or blank entries are placeholders and never reach an aggregate.
    pub fn is_valid_data_point(&self) -> bool {
        self.completed && self.weight > 0.0 && self.reps > 0.0
    }

    /// Raw `weight * reps`
    pub fn volume(&self) -> f64 {
        self.weight * self.reps
    }
}

// ============================================================================
// Exercise
// ============================================================================

/// Kind of exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Strength,
    Cardio,
    Custom,
}

impl ExerciseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Strength => "strength",
            ExerciseKind::Cardio => "cardio",
            ExerciseKind::Custom => "custom",
        }
    }
}

/// A named movement within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExerciseKind,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    pub sets: Vec<Set>,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Exercise {
    /// A strength exercise with no sets yet
    pub fn strength(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ExerciseKind::Strength,
            muscle_groups: Vec::new(),
            sets: Vec::new(),
            order,
            notes: None,
        }
    }

    /// Progression identity: case-insensitive name match on a strength exercise
    pub fn is_strength_named(&self, name: &str) -> bool {
        self.kind == ExerciseKind::Strength && self.name.to_lowercase() == name.to_lowercase()
    }

    /// Sets that count as strength data points
    pub fn valid_sets(&self) -> impl Iterator<Item = &Set> {
        self.sets.iter().filter(|s| s.is_valid_data_point())
    }
}

// ============================================================================
// Workout
// ============================================================================

/// Type of workout session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    Push,
    Pull,
    Legs,
    Upper,
    Lower,
    Full,
    Cardio,
    Custom,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 8] = [
        WorkoutKind::Push,
        WorkoutKind::Pull,
        WorkoutKind::Legs,
        WorkoutKind::Upper,
        WorkoutKind::Lower,
        WorkoutKind::Full,
        WorkoutKind::Cardio,
        WorkoutKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Push => "push",
            WorkoutKind::Pull => "pull",
            WorkoutKind::Legs => "legs",
            WorkoutKind::Upper => "upper",
            WorkoutKind::Lower => "lower",
            WorkoutKind::Full => "full",
            WorkoutKind::Cardio => "cardio",
            WorkoutKind::Custom => "custom",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutKind::Push => "Push",
            WorkoutKind::Pull => "Pull",
            WorkoutKind::Legs => "Legs",
            WorkoutKind::Upper => "Upper",
            WorkoutKind::Lower => "Lower",
            WorkoutKind::Full => "Full Body",
            WorkoutKind::Cardio => "Cardio",
            WorkoutKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        WorkoutKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| crate::Error::Other(format!("Unknown workout type: {}", s)))
    }
}

/// One training session
///
/// `completed = false` marks a draft that no aggregate or history view includes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
    pub date: NaiveDate,
    pub exercises: Vec<Exercise>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl Workout {
    /// An empty draft workout
    pub fn draft(id: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: WorkoutKind::Custom,
            date,
            exercises: Vec::new(),
            completed: false,
            notes: None,
            duration: None,
        }
    }

    /// Raw volume: `weight * reps` summed over every stored set
    pub fn volume(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .map(Set::volume)
            .sum()
    }

    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Check the record invariants; returns one message per violation
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id.is_empty() {
            errors.push("Workout has empty ID".to_string());
        }
        if let Some(d) = self.duration {
            if !is_non_negative(d) {
                errors.push(format!("Workout '{}' has invalid duration {}", self.id, d));
            }
        }

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push(format!("Workout '{}' has an exercise with empty ID", self.id));
            }
            for set in &exercise.sets {
                if !is_non_negative(set.weight) {
                    errors.push(format!(
                        "Set '{}' in '{}' has invalid weight {}",
                        set.id, exercise.name, set.weight
                    ));
                }
                if !is_non_negative(set.reps) {
                    errors.push(format!(
                        "Set '{}' in '{}' has invalid reps {}",
                        set.id, exercise.name, set.reps
                    ));
                }
                let optional = [
                    ("duration", set.duration),
                    ("distance", set.distance),
                    ("rest time", set.rest_time),
                    ("rpe", set.rpe),
                ];
                for (field, value) in optional {
                    if let Some(v) = value {
                        if !is_non_negative(v) {
                            errors.push(format!("Set '{}' has invalid {} {}", set.id, field, v));
                        }
                    }
                }
            }
        }

        errors
    }
}

pub(crate) fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Field-level partial update for a workout
///
/// `notes` and `duration` use a nested `Option` so a patch can clear them.
#[derive(Clone, Debug, Default)]
pub struct WorkoutPatch {
    pub name: Option<String>,
    pub kind: Option<WorkoutKind>,
    pub date: Option<NaiveDate>,
    pub exercises: Option<Vec<Exercise>>,
    pub completed: Option<bool>,
    pub notes: Option<Option<String>>,
    pub duration: Option<Option<f64>>,
}

impl WorkoutPatch {
    pub fn apply(self, workout: &mut Workout) {
        if let Some(name) = self.name {
            workout.name = name;
        }
        if let Some(kind) = self.kind {
            workout.kind = kind;
        }
        if let Some(date) = self.date {
            workout.date = date;
        }
        if let Some(exercises) = self.exercises {
            workout.exercises = exercises;
        }
        if let Some(completed) = self.completed {
            workout.completed = completed;
        }
        if let Some(notes) = self.notes {
            workout.notes = notes;
        }
        if let Some(duration) = self.duration {
            workout.duration = duration;
        }
    }
}

// ============================================================================
// Goal
// ============================================================================

/// Goal period
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

/// What a goal measures
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalTarget {
    Workouts,
    Volume,
    Weight,
    Custom,
}

/// A user-defined target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    #[serde(rename = "type")]
    pub period: GoalPeriod,
    pub target_type: GoalTarget,
    pub target_value: f64,
    pub current_value: f64,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub completed: bool,
    pub description: String,
}

// ============================================================================
// Progression
// ============================================================================

/// One derived progression point; recomputed on every query, never stored
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProgressionData {
    pub date: NaiveDate,
    pub max_weight: f64,
    pub max_reps: f64,
    pub total_volume: f64,
    pub one_rep_max: f64,
}
