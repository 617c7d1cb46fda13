//! Recording a session: adding sets, cardio entries and notes to a workout
//! and finalising it for history.

use crate::{new_record_id, Error, Exercise, ExerciseKind, Result, Set, Workout};

impl Workout {
    /// Add a completed strength set to the named exercise, creating the exercise if needed
    ///
    /// An empty placeholder set (as left by a repeat template) is filled in
    /// before new sets are appended. Weight and reps must both be positive.
    pub fn add_strength_set(&mut self, exercise: &str, weight: f64, reps: f64) -> Result<()> {
        let name = exercise.trim();
        if name.is_empty() {
            return Err(Error::Validation("Exercise name is empty".into()));
        }
        if !(weight.is_finite() && weight > 0.0 && reps.is_finite() && reps > 0.0) {
            return Err(Error::Validation(format!(
                "A set needs a positive weight and reps, got {} x {}",
                weight, reps
            )));
        }

        let index = self.strength_exercise_index(name);
        let exercise = &mut self.exercises[index];
        let id = format!("{}-{}", new_record_id("set"), exercise.sets.len());

        match exercise.sets.iter_mut().find(|s| is_placeholder(s)) {
            Some(placeholder) => {
                placeholder.weight = weight;
                placeholder.reps = reps;
                placeholder.completed = true;
            }
            None => exercise.sets.push(Set::strength(id, weight, reps)),
        }
        Ok(())
    }

    /// Add a cardio exercise with a single entry
    pub fn add_cardio(
        &mut self,
        name: &str,
        distance: f64,
        minutes: f64,
        calories: f64,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Cardio type is empty".into()));
        }

        let id = format!("{}-{}", new_record_id("ex"), self.exercises.len());
        let set = Set::cardio(
            format!("set-{}", id),
            distance.max(0.0),
            minutes.max(0.0),
            calories,
        );
        self.exercises.push(Exercise {
            id,
            name: name.to_string(),
            kind: ExerciseKind::Cardio,
            muscle_groups: Vec::new(),
            sets: vec![set],
            order: self.exercises.len() as u32,
            notes: None,
        });
        Ok(())
    }

    /// Attach a note to a strength exercise; an empty note clears it
    pub fn set_exercise_note(&mut self, exercise: &str, note: &str) -> Result<()> {
        let name = exercise.trim();
        if name.is_empty() {
            return Err(Error::Validation("Exercise name is empty".into()));
        }

        let index = self.strength_exercise_index(name);
        let note = note.trim();
        self.exercises[index].notes = (!note.is_empty()).then(|| note.to_string());
        Ok(())
    }

    /// The workout as saved from the recorder
    ///
    /// Strength exercises keep only sets with positive weight and reps and are
    /// dropped when none remain. Cardio entries follow the strength work.
    /// Exercise order is renumbered and the workout is marked completed.
    pub fn finalize(&self) -> Workout {
        let strength = self
            .exercises
            .iter()
            .filter(|e| e.kind != ExerciseKind::Cardio && !e.name.trim().is_empty())
            .filter_map(|e| {
                let sets: Vec<Set> = e
                    .sets
                    .iter()
                    .filter(|s| s.weight > 0.0 && s.reps > 0.0)
                    .map(|s| Set {
                        completed: true,
                        ..s.clone()
                    })
                    .collect();
                (!sets.is_empty()).then(|| Exercise {
                    name: e.name.trim().to_string(),
                    kind: ExerciseKind::Strength,
                    sets,
                    ..e.clone()
                })
            });

        let cardio = self
            .exercises
            .iter()
            .filter(|e| e.kind == ExerciseKind::Cardio && !e.name.trim().is_empty())
            .cloned();

        let exercises = strength
            .chain(cardio)
            .enumerate()
            .map(|(order, e)| Exercise {
                order: order as u32,
                ..e
            })
            .collect();

        Workout {
            exercises,
            completed: true,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            ..self.clone()
        }
    }

    fn strength_exercise_index(&mut self, name: &str) -> usize {
        match self.exercises.iter().position(|e| e.is_strength_named(name)) {
            Some(index) => index,
            None => {
                let order = self.exercises.len();
                let id = format!("{}-{}", new_record_id("ex"), order);
                self.exercises.push(Exercise::strength(id, name, order as u32));
                order
            }
        }
    }
}

fn is_placeholder(set: &Set) -> bool {
    !set.completed && set.weight == 0.0 && set.reps == 0.0
}
