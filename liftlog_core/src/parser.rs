//! Free-text workout log parser.
//!
//! Converts pasted training logs into [`Workout`] records. The grammar is a
//! single forward pass over trimmed, non-empty lines:
//!
//! 1. A `M/D/YY(YY)` date anywhere in a line sets the date for workouts
//!    created afterwards.
//! 2. A line starting with `push|pull|legs|upper|lower|full|cardio` opens a
//!    new workout named after the line.
//! 3. Any other line before the first header opens an implicit
//!    "Imported Workout".
//! 4. A `{weight}x{reps}[,{reps}...]` line adds sets to the open exercise,
//!    opening one named after the previous line when none is open.
//! 5. Any other text line longer than two characters closes an exercise that
//!    already has sets, so the next set line starts a new exercise.
//!
//! Workouts without exercises are dropped. Malformed text never fails; it
//! simply yields fewer (or zero) workouts.

use crate::plates::{decode_log_token, leading_number};
use crate::{Exercise, ExerciseKind, Set, Workout, WorkoutKind};
use chrono::{Local, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const IMPLICIT_WORKOUT_NAME: &str = "Imported Workout";
const UNKNOWN_EXERCISE_NAME: &str = "Unknown Exercise";

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{1,2})[/-]([0-9]{1,2})[/-]([0-9]{2,4})").expect("hardcoded pattern")
});

static HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(push|pull|legs|upper|lower|full|cardio)").expect("hardcoded pattern")
});

static SET_LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+p?[0-9]*\.?[0-9]*)x([0-9]+\.?[0-9]*(?:,[0-9]+\.?[0-9]*)*)")
        .expect("hardcoded pattern")
});

static WEIGHT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+p?[0-9]*\.?[0-9]*)x").expect("hardcoded pattern"));

static FIRST_REPS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"x([0-9]+\.?[0-9]*)").expect("hardcoded pattern"));

/// Parse a workout log dated relative to today's local calendar date
pub fn parse_workout_log(text: &str) -> Vec<Workout> {
    WorkoutLogParser::new(Local::now().date_naive()).parse(text)
}

/// Stateless parser configuration
///
/// `today` is the date used until the log names one; `stamp` seeds the
/// generated record ids (`workout-{stamp}-{line}`).
#[derive(Clone, Debug)]
pub struct WorkoutLogParser {
    today: NaiveDate,
    stamp: i64,
}

/// Mutable state of one parse pass
struct ParseState {
    workouts: Vec<Workout>,
    current_workout: Option<Workout>,
    current_exercise: Option<usize>,
    current_date: NaiveDate,
}

impl ParseState {
    fn flush(&mut self) {
        if let Some(workout) = self.current_workout.take() {
            tracing::debug!(
                "Parsed workout '{}' with {} exercise(s)",
                workout.name,
                workout.exercises.len()
            );
            self.workouts.push(workout);
        }
        self.current_exercise = None;
    }
}

impl WorkoutLogParser {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            stamp: Utc::now().timestamp_millis(),
        }
    }

    /// Fix the id seed (useful for reproducible output)
    pub fn with_stamp(mut self, stamp: i64) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn parse(&self, text: &str) -> Vec<Workout> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut state = ParseState {
            workouts: Vec::new(),
            current_workout: None,
            current_exercise: None,
            current_date: self.today,
        };

        for (i, &line) in lines.iter().enumerate() {
            let date_match = DATE_PATTERN.captures(line);
            if let Some(caps) = &date_match {
                match parse_us_date(&caps[1], &caps[2], &caps[3]) {
                    Some(date) => state.current_date = date,
                    None => tracing::warn!(
                        "Ignoring invalid date '{}' on line {}",
                        &caps[0],
                        i + 1
                    ),
                }
            }

            if HEADER_PATTERN.is_match(line) {
                state.flush();
                state.current_workout = Some(Workout {
                    id: format!("workout-{}-{}", self.stamp, i),
                    name: line.to_string(),
                    kind: header_kind(line),
                    date: state.current_date,
                    exercises: Vec::new(),
                    completed: true,
                    notes: None,
                    duration: None,
                });
                continue;
            }

            let workout = state.current_workout.get_or_insert_with(|| Workout {
                id: format!("workout-{}-{}", self.stamp, i),
                name: IMPLICIT_WORKOUT_NAME.to_string(),
                kind: WorkoutKind::Custom,
                date: state.current_date,
                exercises: Vec::new(),
                completed: true,
                notes: None,
                duration: None,
            });

            if SET_LINE_PATTERN.is_match(line) {
                let index = match state.current_exercise {
                    Some(index) => index,
                    None => {
                        let name = match i.checked_sub(1).map(|p| lines[p]) {
                            Some(prev) if !HEADER_PATTERN.is_match(prev) => prev,
                            _ => UNKNOWN_EXERCISE_NAME,
                        };
                        let order = workout.exercises.len() as u32;
                        workout.exercises.push(Exercise::strength(
                            format!("ex-{}-{}", self.stamp, i),
                            name,
                            order,
                        ));
                        state.current_exercise = Some(order as usize);
                        order as usize
                    }
                };

                let exercise = &mut workout.exercises[index];
                for (set_index, (weight, reps)) in parse_set_line(line).into_iter().enumerate() {
                    if weight != 0.0 && reps != 0.0 {
                        exercise.sets.push(Set::strength(
                            format!("set-{}-{}-{}", self.stamp, i, set_index),
                            weight,
                            reps,
                        ));
                    }
                }
            } else if !starts_with_digit(line) && line.chars().count() > 2 && date_match.is_none()
            {
                let has_sets = state
                    .current_exercise
                    .map(|index| !workout.exercises[index].sets.is_empty())
                    .unwrap_or(false);
                if has_sets {
                    state.current_exercise = None;
                }
            }
        }

        state.flush();

        let workouts: Vec<Workout> = state
            .workouts
            .into_iter()
            .filter(|w| !w.exercises.is_empty())
            .collect();

        tracing::info!("Parsed {} workout(s) from {} line(s)", workouts.len(), lines.len());
        workouts
    }
}

/// Render workouts back into the log syntax accepted by the parser
///
/// Each workout gets a date line, its header line (when the name is itself a
/// header) and one name line per exercise followed by set lines; consecutive
/// sets at the same weight share a line. Exercises without valid sets are
/// left out. Exercise names that look like headers or start with a digit do
/// not survive a re-parse.
pub fn to_log_text(workouts: &[Workout]) -> String {
    let mut out = String::new();

    for workout in workouts {
        out.push_str(&workout.date.format("%-m/%-d/%Y").to_string());
        out.push('\n');
        if HEADER_PATTERN.is_match(&workout.name) {
            out.push_str(&workout.name);
            out.push('\n');
        }

        for exercise in workout
            .exercises
            .iter()
            .filter(|e| e.kind == ExerciseKind::Strength)
        {
            let sets: Vec<&Set> = exercise.valid_sets().collect();
            if sets.is_empty() {
                continue;
            }
            out.push_str(&exercise.name);
            out.push('\n');

            let mut groups: Vec<(f64, Vec<f64>)> = Vec::new();
            for set in sets {
                match groups.last_mut() {
                    Some((weight, reps)) if *weight == set.weight => reps.push(set.reps),
                    _ => groups.push((set.weight, vec![set.reps])),
                }
            }
            for (weight, reps) in groups {
                let reps: Vec<String> = reps.iter().map(|r| r.to_string()).collect();
                out.push_str(&format!("{}x{}\n", weight, reps.join(",")));
            }
        }
        out.push('\n');
    }

    out
}

/// Split a set line into `(weight, reps)` pairs sharing one decoded weight
fn parse_set_line(line: &str) -> Vec<(f64, f64)> {
    let mut parts = line.split(',').map(str::trim);
    let first = match parts.next() {
        Some(first) => first,
        None => return Vec::new(),
    };

    let weight = match WEIGHT_PATTERN.captures(first) {
        Some(caps) => decode_log_token(&caps[1]),
        None => return Vec::new(),
    };

    let mut sets = Vec::new();
    if let Some(caps) = FIRST_REPS_PATTERN.captures(first) {
        if let Some(reps) = leading_number(&caps[1]) {
            sets.push((weight, reps));
        }
    }
    sets.extend(parts.filter_map(leading_number).map(|reps| (weight, reps)));
    sets
}

/// Workout type from a header line, first containment match wins
fn header_kind(line: &str) -> WorkoutKind {
    let lower = line.to_lowercase();
    if lower.contains("push") {
        WorkoutKind::Push
    } else if lower.contains("pull") {
        WorkoutKind::Pull
    } else if lower.contains("leg") {
        WorkoutKind::Legs
    } else if lower.contains("upper") {
        WorkoutKind::Upper
    } else if lower.contains("lower") {
        WorkoutKind::Lower
    } else if lower.contains("cardio") {
        WorkoutKind::Cardio
    } else {
        WorkoutKind::Custom
    }
}

/// Month/day/year, two-digit years in the 2000s
fn parse_us_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn starts_with_digit(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}
