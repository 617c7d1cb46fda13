//! Aggregate statistics over workout history.
//!
//! Weekly, monthly and lifetime rollups plus the per-month breakdown. Only
//! completed workouts count. Volume is the raw `weight * reps` sum over every
//! stored set; placeholder sets contribute zero.

use crate::Workout;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Workout count, volume and logged minutes for a period
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct PeriodStats {
    pub workouts: usize,
    pub volume: f64,
    pub minutes: f64,
}

impl PeriodStats {
    fn add(&mut self, workout: &Workout) {
        self.workouts += 1;
        self.volume += workout.volume();
        self.minutes += workout.duration.unwrap_or(0.0);
    }
}

/// Sunday on or before `today`
pub fn start_of_week(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
}

pub fn start_of_month(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn stats_between(workouts: &[Workout], first: NaiveDate, last: NaiveDate) -> PeriodStats {
    let mut stats = PeriodStats::default();
    for workout in workouts
        .iter()
        .filter(|w| w.completed && w.date >= first && w.date <= last)
    {
        stats.add(workout);
    }
    stats
}

/// Completed workouts from Sunday of the current week through today
pub fn weekly_stats(workouts: &[Workout], today: NaiveDate) -> PeriodStats {
    stats_between(workouts, start_of_week(today), today)
}

/// Completed workouts from the first of the current month through today
pub fn monthly_stats(workouts: &[Workout], today: NaiveDate) -> PeriodStats {
    stats_between(workouts, start_of_month(today), today)
}

/// All completed workouts
pub fn lifetime_stats(workouts: &[Workout]) -> PeriodStats {
    let mut stats = PeriodStats::default();
    for workout in workouts.iter().filter(|w| w.completed) {
        stats.add(workout);
    }
    stats
}

/// Completed-workout count for one calendar month
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MonthlyBreakdown {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
    pub month_name: String,
    pub workouts: usize,
}

/// Completed workouts per (year, month), newest month first
pub fn monthly_breakdown(workouts: &[Workout]) -> Vec<MonthlyBreakdown> {
    let mut months: BTreeMap<(i32, u32), MonthlyBreakdown> = BTreeMap::new();

    for workout in workouts.iter().filter(|w| w.completed) {
        let key = (workout.date.year(), workout.date.month());
        months
            .entry(key)
            .or_insert_with(|| MonthlyBreakdown {
                year: key.0,
                month: key.1,
                month_name: workout.date.format("%B").to_string(),
                workouts: 0,
            })
            .workouts += 1;
    }

    months.into_values().rev().collect()
}

/// The seven days of the current Sunday-start week and whether each has a completed workout
pub fn week_activity(workouts: &[Workout], today: NaiveDate) -> Vec<(NaiveDate, bool)> {
    let start = start_of_week(today);
    (0..7)
        .map(|offset| {
            let day = start + Duration::days(offset);
            let trained = workouts.iter().any(|w| w.completed && w.date == day);
            (day, trained)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Exercise, Set};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn workout(id: &str, on: NaiveDate, weight: f64, reps: f64) -> Workout {
        let mut w = Workout::draft(id, "Session", on);
        w.completed = true;
        let mut e = Exercise::strength(format!("{}-e", id), "Squat", 0);
        e.sets.push(Set::strength(format!("{}-s1", id), weight, reps));
        e.sets.push(Set::placeholder(format!("{}-s2", id)));
        w.exercises.push(e);
        w
    }

    #[test]
    fn test_start_of_week_is_sunday() {
        // 2024-06-12 is a Wednesday
        assert_eq!(start_of_week(date(2024, 6, 12)), date(2024, 6, 9));
        assert_eq!(start_of_week(date(2024, 6, 9)), date(2024, 6, 9));
        assert_eq!(start_of_week(date(2024, 6, 15)), date(2024, 6, 9));
        // Crosses a month boundary
        assert_eq!(start_of_week(date(2024, 6, 1)), date(2024, 5, 26));
    }

    #[test]
    fn test_weekly_stats_window() {
        let today = date(2024, 6, 12);
        let mut draft = workout("draft", date(2024, 6, 11), 500.0, 5.0);
        draft.completed = false;
        let mut timed = workout("w2", date(2024, 6, 9), 200.0, 5.0);
        timed.duration = Some(45.0);

        let history = vec![
            workout("before", date(2024, 6, 8), 100.0, 5.0),
            timed,
            workout("w3", date(2024, 6, 12), 100.0, 10.0),
            workout("future", date(2024, 6, 13), 100.0, 5.0),
            draft,
        ];

        let stats = weekly_stats(&history, today);
        assert_eq!(stats.workouts, 2);
        assert_eq!(stats.volume, 2000.0);
        assert_eq!(stats.minutes, 45.0);
    }

    #[test]
    fn test_monthly_stats_window() {
        let today = date(2024, 6, 12);
        let history = vec![
            workout("may", date(2024, 5, 31), 100.0, 5.0),
            workout("june1", date(2024, 6, 1), 100.0, 5.0),
            workout("june10", date(2024, 6, 10), 50.0, 10.0),
        ];

        let stats = monthly_stats(&history, today);
        assert_eq!(stats.workouts, 2);
        assert_eq!(stats.volume, 1000.0);
    }

    #[test]
    fn test_lifetime_stats() {
        let mut draft = workout("draft", date(2024, 1, 1), 100.0, 5.0);
        draft.completed = false;
        let history = vec![
            workout("a", date(2023, 1, 1), 100.0, 5.0),
            workout("b", date(2024, 1, 1), 100.0, 5.0),
            draft,
        ];

        let stats = lifetime_stats(&history);
        assert_eq!(stats.workouts, 2);
        assert_eq!(stats.volume, 1000.0);
        assert_eq!(lifetime_stats(&[]), PeriodStats::default());
    }

    #[test]
    fn test_monthly_breakdown_groups_same_month() {
        let history = vec![
            workout("a", date(2024, 3, 2), 100.0, 5.0),
            workout("b", date(2024, 3, 20), 100.0, 5.0),
        ];

        let breakdown = monthly_breakdown(&history);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].workouts, 2);
        assert_eq!(breakdown[0].month_name, "March");
        assert_eq!((breakdown[0].year, breakdown[0].month), (2024, 3));
    }

    #[test]
    fn test_monthly_breakdown_sorted_newest_first() {
        let mut draft = workout("draft", date(2025, 1, 5), 100.0, 5.0);
        draft.completed = false;
        let history = vec![
            workout("a", date(2023, 12, 2), 100.0, 5.0),
            workout("b", date(2024, 2, 20), 100.0, 5.0),
            workout("c", date(2024, 11, 1), 100.0, 5.0),
            workout("d", date(2024, 2, 1), 100.0, 5.0),
            draft,
        ];

        let keys: Vec<_> = monthly_breakdown(&history)
            .iter()
            .map(|m| (m.year, m.month, m.workouts))
            .collect();
        assert_eq!(keys, vec![(2024, 11, 1), (2024, 2, 2), (2023, 12, 1)]);
    }

    #[test]
    fn test_week_activity() {
        let history = vec![
            workout("mon", date(2024, 6, 10), 100.0, 5.0),
            workout("last_week", date(2024, 6, 8), 100.0, 5.0),
        ];

        let days = week_activity(&history, date(2024, 6, 12));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], (date(2024, 6, 9), false));
        assert_eq!(days[1], (date(2024, 6, 10), true));
        assert_eq!(days[6].0, date(2024, 6, 15));
        assert_eq!(days.iter().filter(|(_, trained)| *trained).count(), 1);
    }
}
