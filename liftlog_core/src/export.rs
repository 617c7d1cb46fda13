//! CSV export of logged sets.
//!
//! One row per set of every completed workout, in stored order. Cardio
//! calories come from the set notes.

use crate::{Exercise, Result, Set, Workout};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    workout_id: &'a str,
    date: String,
    workout: &'a str,
    workout_type: &'static str,
    exercise: &'a str,
    exercise_type: &'static str,
    set: usize,
    weight: f64,
    reps: f64,
    completed: bool,
    duration: Option<f64>,
    distance: Option<f64>,
    calories: Option<f64>,
}

impl<'a> CsvRow<'a> {
    fn new(workout: &'a Workout, exercise: &'a Exercise, index: usize, set: &'a Set) -> Self {
        CsvRow {
            workout_id: &workout.id,
            date: workout.date.format("%Y-%m-%d").to_string(),
            workout: &workout.name,
            workout_type: workout.kind.as_str(),
            exercise: &exercise.name,
            exercise_type: exercise.kind.as_str(),
            set: index + 1,
            weight: set.weight,
            reps: set.reps,
            completed: set.completed,
            duration: set.duration,
            distance: set.distance,
            calories: set.calories(),
        }
    }
}

/// Write every set of the completed workouts as CSV, with a header row
///
/// Returns the number of data rows written.
pub fn write_sets_csv<W: Write>(workouts: &[Workout], writer: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    let mut rows = 0;
    for workout in workouts.iter().filter(|w| w.completed) {
        for exercise in &workout.exercises {
            for (index, set) in exercise.sets.iter().enumerate() {
                writer.serialize(CsvRow::new(workout, exercise, index, set))?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} set(s) to CSV", rows);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history() -> Vec<Workout> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let mut push = Workout::draft("w1", "Push", date);
        push.kind = crate::WorkoutKind::Push;
        push.completed = true;
        let mut bench = Exercise::strength("e1", "Bench Press", 0);
        bench.sets.push(Set::strength("s1", 135.0, 5.0));
        bench.sets.push(Set::strength("s2", 135.0, 4.0));
        push.exercises.push(bench);
        let mut run = Exercise::strength("e2", "Run", 1);
        run.kind = crate::ExerciseKind::Cardio;
        run.sets.push(Set::cardio("s3", 2.0, 20.0, 250.0));
        push.exercises.push(run);

        let mut draft = Workout::draft("w2", "Draft", date);
        let mut squat = Exercise::strength("e3", "Squat", 0);
        squat.sets.push(Set::strength("s4", 225.0, 5.0));
        draft.exercises.push(squat);

        vec![push, draft]
    }

    #[test]
    fn test_export_rows() {
        let mut out = Vec::new();
        let rows = write_sets_csv(&history(), &mut out).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "workout_id,date,workout,workout_type,exercise,exercise_type,set,weight,reps,completed,duration,distance,calories"
        );
        assert_eq!(lines[1], "w1,2024-03-01,Push,push,Bench Press,strength,1,135.0,5.0,true,,,");
        assert_eq!(lines[2], "w1,2024-03-01,Push,push,Bench Press,strength,2,135.0,4.0,true,,,");
        assert_eq!(lines[3], "w1,2024-03-01,Push,push,Run,cardio,1,0.0,0.0,true,20.0,2.0,250.0");
    }

    #[test]
    fn test_export_empty_history_writes_nothing() {
        let mut out = Vec::new();
        let rows = write_sets_csv(&[], &mut out).unwrap();
        assert_eq!(rows, 0);
    }
}
