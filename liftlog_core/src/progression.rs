//! Progression analytics for strength exercises.
//!
//! This module derives per-session metrics from workout history:
//! - One [`ProgressionData`] point per (workout, exercise) match
//! - Trend classification over the resulting series
//! - Rule-based insight text
//! - Helpers for the progress view (exercises by split, repeat templates)
//!
//! Every function here is a pure read of the history slice passed in.

use crate::config::AnalyticsConfig;
use crate::{Exercise, ProgressionData, Set, Workout, WorkoutKind};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Insight shown until a series has at least two points
pub const NEED_MORE_DATA_INSIGHT: &str =
    "Continue tracking this exercise to see progression insights.";

/// Compute the progression series for an exercise
///
/// Only completed workouts and valid sets (completed, weight > 0, reps > 0)
/// contribute. Points are sorted by workout date, oldest first, and only
/// the last `limit` are returned.
///
/// The 1RM estimate is `max_weight * (1 + max_reps / 30)` where the maximum
/// weight and maximum reps may come from different sets of the session.
pub fn progression_for(
    workouts: &[Workout],
    exercise_name: &str,
    limit: usize,
) -> Vec<ProgressionData> {
    let mut series: Vec<ProgressionData> = workouts
        .iter()
        .filter(|w| w.completed)
        .flat_map(|w| {
            w.exercises
                .iter()
                .filter(|e| e.is_strength_named(exercise_name))
                .filter_map(move |e| session_point(w.date, e))
        })
        .collect();

    // Stable sort keeps history order for points on the same date
    series.sort_by_key(|p| p.date);

    let skip = series.len().saturating_sub(limit);
    let series: Vec<ProgressionData> = series.into_iter().skip(skip).collect();

    tracing::debug!(
        "Computed {} progression point(s) for '{}'",
        series.len(),
        exercise_name
    );
    series
}

fn session_point(date: NaiveDate, exercise: &Exercise) -> Option<ProgressionData> {
    let sets: Vec<&Set> = exercise.valid_sets().collect();
    if sets.is_empty() {
        return None;
    }

    let max_weight = sets.iter().map(|s| s.weight).fold(f64::MIN, f64::max);
    let max_reps = sets.iter().map(|s| s.reps).fold(f64::MIN, f64::max);
    let total_volume: f64 = sets.iter().map(|s| s.volume()).sum();

    Some(ProgressionData {
        date,
        max_weight,
        max_reps,
        total_volume,
        one_rep_max: estimate_one_rep_max(max_weight, max_reps),
    })
}

/// Epley-style estimate: `weight * (1 + reps / 30)`
pub fn estimate_one_rep_max(weight: f64, reps: f64) -> f64 {
    weight * (1.0 + reps / 30.0)
}

// ============================================================================
// Trend and insight
// ============================================================================

/// Direction of a progression series
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// Parameters for trend classification
#[derive(Clone, Debug)]
pub struct TrendOptions {
    /// Change (in percent) beyond which the trend is up or down
    pub threshold_percent: f64,
    /// Points averaged at each end of the series
    pub window: usize,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            threshold_percent: 5.0,
            window: 3,
        }
    }
}

impl From<&AnalyticsConfig> for TrendOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            threshold_percent: config.trend_threshold_percent,
            window: config.trend_window.max(1),
        }
    }
}

/// Classify a series by comparing the average 1RM of its newest and oldest points
///
/// The two windows overlap when the series is shorter than twice the window.
/// Returns the trend and the change in percent; the change is `None` for
/// fewer than two points or when the older average is zero.
pub fn classify_trend(series: &[ProgressionData], options: &TrendOptions) -> (Trend, Option<f64>) {
    if series.len() < 2 {
        return (Trend::Stable, None);
    }

    let window = options.window.max(1).min(series.len());
    let older_avg = average_one_rep_max(&series[..window]);
    let recent_avg = average_one_rep_max(&series[series.len() - window..]);

    let change = (recent_avg - older_avg) / older_avg * 100.0;
    if !change.is_finite() {
        tracing::debug!("Non-finite trend change (older average {}), treating as stable", older_avg);
        return (Trend::Stable, None);
    }

    let trend = if change > options.threshold_percent {
        Trend::Up
    } else if change < -options.threshold_percent {
        Trend::Down
    } else {
        Trend::Stable
    };

    (trend, Some(change))
}

fn average_one_rep_max(points: &[ProgressionData]) -> f64 {
    points.iter().map(|p| p.one_rep_max).sum::<f64>() / points.len() as f64
}

/// Insight text for a classified series, keyed on the last two points
pub fn generate_insight(series: &[ProgressionData], trend: Trend) -> String {
    let (previous, latest) = match series {
        [.., previous, latest] => (previous, latest),
        _ => return NEED_MORE_DATA_INSIGHT.to_string(),
    };

    let weight_change = latest.max_weight - previous.max_weight;
    let reps_change = latest.max_reps - previous.max_reps;

    match trend {
        Trend::Up if weight_change > 0.0 && reps_change >= 0.0 => format!(
            "Great progress! You've increased both weight ({:.0} lbs) and maintained or \
             improved reps. This indicates strong strength gains.",
            weight_change.round()
        ),
        Trend::Up if weight_change > 0.0 => format!(
            "Strength is improving! You're lifting {:.0} lbs more. Consider focusing on \
             rep progression next.",
            weight_change.round()
        ),
        Trend::Up => "Rep performance is improving while maintaining weight. This shows \
                      increased muscular endurance."
            .to_string(),
        Trend::Down => "Recent performance has decreased. This could indicate fatigue, need \
                        for deload, or training adaptation. Consider reviewing your recovery \
                        and programming."
            .to_string(),
        Trend::Stable => "Performance is stable. To continue progressing, consider progressive \
                          overload: gradually increase weight or reps in upcoming sessions."
            .to_string(),
    }
}

/// Series, trend and insight for one exercise
#[derive(Clone, Debug, Serialize)]
pub struct ProgressionSummary {
    pub exercise: String,
    pub series: Vec<ProgressionData>,
    pub trend: Trend,
    pub change_percent: Option<f64>,
    pub insight: String,
}

pub fn summarize(
    exercise: &str,
    series: Vec<ProgressionData>,
    options: &TrendOptions,
) -> ProgressionSummary {
    let (trend, change_percent) = classify_trend(&series, options);
    let insight = generate_insight(&series, trend);

    ProgressionSummary {
        exercise: exercise.to_string(),
        series,
        trend,
        change_percent,
        insight,
    }
}

// ============================================================================
// Progress view helpers
// ============================================================================

/// Strength exercise names performed in completed workouts, grouped by workout type
pub fn exercises_by_split(workouts: &[Workout]) -> BTreeMap<WorkoutKind, Vec<String>> {
    let mut splits: BTreeMap<WorkoutKind, BTreeSet<String>> = BTreeMap::new();

    for workout in workouts.iter().filter(|w| w.completed) {
        let names = splits.entry(workout.kind).or_default();
        for exercise in &workout.exercises {
            if exercise.kind == crate::ExerciseKind::Strength {
                names.insert(exercise.name.clone());
            }
        }
    }

    splits
        .into_iter()
        .map(|(kind, names)| (kind, names.into_iter().collect()))
        .collect()
}

/// All strength exercise names across completed workouts, sorted and de-duplicated
pub fn strength_exercise_names(workouts: &[Workout]) -> Vec<String> {
    exercises_by_split(workouts)
        .into_values()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Completed workouts, newest date first (stable for equal dates)
fn newest_first(workouts: &[Workout]) -> Vec<&Workout> {
    let mut completed: Vec<&Workout> = workouts.iter().filter(|w| w.completed).collect();
    completed.sort_by(|a, b| b.date.cmp(&a.date));
    completed
}

/// Draft a new workout from the most recent completed workout of a type
///
/// Strength exercises are copied with a single empty placeholder set each.
pub fn repeat_template(workouts: &[Workout], kind: WorkoutKind, today: NaiveDate) -> Option<Workout> {
    let recent = newest_first(workouts)
        .into_iter()
        .find(|w| w.kind == kind)?;
    let stamp = Utc::now().timestamp_millis();

    let exercises = recent
        .exercises
        .iter()
        .filter(|e| e.kind == crate::ExerciseKind::Strength)
        .enumerate()
        .map(|(index, e)| Exercise {
            id: format!("ex-{}-{}", stamp, index),
            sets: vec![Set::placeholder(format!("set-{}-{}-0", stamp, index))],
            order: index as u32,
            ..e.clone()
        })
        .collect();

    tracing::debug!("Built {} template from workout {}", kind, recent.id);

    Some(Workout {
        id: format!("workout-{}", stamp),
        name: recent.name.clone(),
        kind,
        date: today,
        exercises,
        completed: false,
        notes: None,
        duration: None,
    })
}

/// Most recent non-empty note left on a strength exercise
pub fn previous_note<'a>(workouts: &'a [Workout], exercise_name: &str) -> Option<&'a str> {
    newest_first(workouts).into_iter().find_map(|w| {
        w.exercises
            .iter()
            .find(|e| e.is_strength_named(exercise_name))
            .and_then(|e| e.notes.as_deref())
            .filter(|n| !n.trim().is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(id: &str, on: NaiveDate, exercise: &str, sets: &[(f64, f64)]) -> Workout {
        let mut w = Workout::draft(id, "Push", on);
        w.kind = WorkoutKind::Push;
        w.completed = true;
        let mut e = Exercise::strength(format!("{}-e", id), exercise, 0);
        for (i, (weight, reps)) in sets.iter().enumerate() {
            e.sets.push(Set::strength(format!("{}-s{}", id, i), *weight, *reps));
        }
        w.exercises.push(e);
        w
    }

    fn point(one_rep_max: f64) -> ProgressionData {
        ProgressionData {
            date: date(2024, 1, 1),
            max_weight: 100.0,
            max_reps: 5.0,
            total_volume: 500.0,
            one_rep_max,
        }
    }

    #[test]
    fn test_empty_history() {
        let series = progression_for(&[], "Squat", 50);
        assert!(series.is_empty());

        let summary = summarize("Squat", series, &TrendOptions::default());
        assert_eq!(summary.trend, Trend::Stable);
        assert_eq!(summary.change_percent, None);
        assert_eq!(summary.insight, NEED_MORE_DATA_INSIGHT);
    }

    #[test]
    fn test_session_metrics() {
        let history = vec![workout(
            "w1",
            date(2024, 1, 1),
            "Bench Press",
            &[(135.0, 8.0), (155.0, 5.0)],
        )];

        let series = progression_for(&history, "bench press", 50);
        assert_eq!(series.len(), 1);
        let p = &series[0];
        assert_eq!(p.max_weight, 155.0);
        assert_eq!(p.max_reps, 8.0);
        assert_eq!(p.total_volume, 135.0 * 8.0 + 155.0 * 5.0);
        // Max weight and max reps come from different sets
        assert!((p.one_rep_max - 155.0 * (1.0 + 8.0 / 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_sets_are_excluded() {
        let mut w = workout("w1", date(2024, 1, 1), "Squat", &[(225.0, 5.0), (0.0, 10.0)]);
        let sets = &mut w.exercises[0].sets;
        sets.push(Set::strength("heavy-miss", 405.0, 0.0));
        let mut skipped = Set::strength("skipped", 315.0, 12.0);
        skipped.completed = false;
        sets.push(skipped);

        let series = progression_for(&[w], "Squat", 50);
        assert_eq!(series[0].max_weight, 225.0);
        assert_eq!(series[0].max_reps, 5.0);
        assert_eq!(series[0].total_volume, 1125.0);
    }

    #[test]
    fn test_exercise_without_valid_sets_is_skipped() {
        let w = workout("w1", date(2024, 1, 1), "Squat", &[(0.0, 0.0)]);
        assert!(progression_for(&[w], "Squat", 50).is_empty());
    }

    #[test]
    fn test_drafts_and_other_types_are_ignored() {
        let mut draft = workout("w1", date(2024, 1, 1), "Squat", &[(225.0, 5.0)]);
        draft.completed = false;
        let mut cardio = workout("w2", date(2024, 1, 2), "Squat", &[(225.0, 5.0)]);
        cardio.exercises[0].kind = ExerciseKind::Cardio;

        assert!(progression_for(&[draft, cardio], "Squat", 50).is_empty());
    }

    #[test]
    fn test_sorted_by_date_and_limited() {
        let history = vec![
            workout("w3", date(2024, 3, 1), "Squat", &[(245.0, 5.0)]),
            workout("w1", date(2024, 1, 1), "Squat", &[(225.0, 5.0)]),
            workout("w2", date(2024, 2, 1), "Squat", &[(235.0, 5.0)]),
        ];

        let series = progression_for(&history, "squat", 50);
        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);

        let last_two = progression_for(&history, "squat", 2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].max_weight, 235.0);
        assert_eq!(last_two[1].max_weight, 245.0);
    }

    #[test]
    fn test_trend_up() {
        let series: Vec<_> = [100.0, 100.0, 100.0, 130.0, 130.0, 130.0]
            .into_iter()
            .map(point)
            .collect();

        let (trend, change) = classify_trend(&series, &TrendOptions::default());
        assert_eq!(trend, Trend::Up);
        assert!((change.unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_down_and_stable() {
        let down: Vec<_> = [200.0, 200.0, 150.0].into_iter().map(point).collect();
        // Windows overlap: older = all three, recent = all three
        assert_eq!(classify_trend(&down, &TrendOptions::default()).0, Trend::Stable);

        let down: Vec<_> = [200.0, 200.0, 200.0, 150.0, 150.0, 150.0]
            .into_iter()
            .map(point)
            .collect();
        assert_eq!(classify_trend(&down, &TrendOptions::default()).0, Trend::Down);

        let stable: Vec<_> = [100.0, 104.0].into_iter().map(point).collect();
        assert_eq!(classify_trend(&stable, &TrendOptions::default()).0, Trend::Stable);
    }

    #[test]
    fn test_trend_zero_baseline_is_stable() {
        let series: Vec<_> = [0.0, 0.0, 0.0, 100.0, 100.0, 100.0]
            .into_iter()
            .map(point)
            .collect();
        assert_eq!(
            classify_trend(&series, &TrendOptions::default()),
            (Trend::Stable, None)
        );
    }

    #[test]
    fn test_insight_rules() {
        let mut previous = point(100.0);
        let mut latest = point(120.0);

        previous.max_weight = 100.0;
        latest.max_weight = 110.0;
        previous.max_reps = 5.0;
        latest.max_reps = 5.0;
        let insight = generate_insight(&[previous.clone(), latest.clone()], Trend::Up);
        assert!(insight.contains("increased both weight (10 lbs)"));

        latest.max_reps = 3.0;
        let insight = generate_insight(&[previous.clone(), latest.clone()], Trend::Up);
        assert!(insight.contains("lifting 10 lbs more"));

        // Half pounds round up, never to even
        latest.max_weight = 102.5;
        latest.max_reps = 5.0;
        let insight = generate_insight(&[previous.clone(), latest.clone()], Trend::Up);
        assert!(insight.contains("increased both weight (3 lbs)"), "{}", insight);
        latest.max_reps = 3.0;
        let insight = generate_insight(&[previous.clone(), latest.clone()], Trend::Up);
        assert!(insight.contains("lifting 3 lbs more"), "{}", insight);

        latest.max_weight = 100.0;
        let insight = generate_insight(&[previous.clone(), latest.clone()], Trend::Up);
        assert!(insight.contains("muscular endurance"));

        let insight = generate_insight(&[previous.clone(), latest.clone()], Trend::Down);
        assert!(insight.contains("performance has decreased"));

        let insight = generate_insight(&[previous, latest], Trend::Stable);
        assert!(insight.contains("progressive overload"));

        assert_eq!(generate_insight(&[point(1.0)], Trend::Up), NEED_MORE_DATA_INSIGHT);
    }

    #[test]
    fn test_exercises_by_split() {
        let mut pull = workout("w2", date(2024, 1, 2), "Row", &[(135.0, 8.0)]);
        pull.kind = WorkoutKind::Pull;
        let history = vec![
            workout("w1", date(2024, 1, 1), "Bench", &[(135.0, 5.0)]),
            workout("w3", date(2024, 1, 3), "Bench", &[(140.0, 5.0)]),
            pull,
        ];

        let splits = exercises_by_split(&history);
        assert_eq!(splits[&WorkoutKind::Push], vec!["Bench".to_string()]);
        assert_eq!(splits[&WorkoutKind::Pull], vec!["Row".to_string()]);
        assert_eq!(strength_exercise_names(&history), vec!["Bench", "Row"]);
    }

    #[test]
    fn test_repeat_template_uses_most_recent_workout() {
        let mut older = workout("w1", date(2024, 1, 1), "Bench", &[(135.0, 5.0)]);
        older.name = "Old Push".into();
        let mut newer = workout("w2", date(2024, 2, 1), "Incline", &[(95.0, 8.0), (95.0, 8.0)]);
        newer.name = "New Push".into();
        newer.exercises[0].notes = Some("seat 4".into());

        let today = date(2024, 3, 1);
        let template = repeat_template(&[newer, older], WorkoutKind::Push, today).unwrap();

        assert_eq!(template.name, "New Push");
        assert_eq!(template.date, today);
        assert!(!template.completed);
        assert_eq!(template.exercises.len(), 1);
        let exercise = &template.exercises[0];
        assert_eq!(exercise.name, "Incline");
        assert_eq!(exercise.notes.as_deref(), Some("seat 4"));
        assert_eq!(exercise.sets.len(), 1);
        assert!(!exercise.sets[0].is_valid_data_point());

        assert!(repeat_template(&[], WorkoutKind::Legs, today).is_none());
    }

    #[test]
    fn test_previous_note_prefers_newest() {
        let mut older = workout("w1", date(2024, 1, 1), "Bench", &[(135.0, 5.0)]);
        older.exercises[0].notes = Some("elbows in".into());
        let mut newer = workout("w2", date(2024, 2, 1), "bench", &[(135.0, 5.0)]);
        newer.exercises[0].notes = Some("pause first rep".into());
        let mut blank = workout("w3", date(2024, 3, 1), "Bench", &[(135.0, 5.0)]);
        blank.exercises[0].notes = Some("  ".into());

        let history = vec![newer, blank, older];
        assert_eq!(previous_note(&history, "BENCH"), Some("pause first rep"));
        assert_eq!(previous_note(&history, "Squat"), None);
    }
}
