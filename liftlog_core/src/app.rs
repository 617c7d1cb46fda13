//! Application state: loaded collections, the workout being recorded and the
//! split label.
//!
//! Every mutation goes through the record store and is followed by a reload
//! of the affected collection, so reads always reflect the last write.

use crate::config::{AnalyticsConfig, Config};
use crate::goals::{partition_goals, GoalPatch};
use crate::progression::{self, ProgressionSummary, TrendOptions};
use crate::stats::{self, MonthlyBreakdown, PeriodStats};
use crate::prefs::CurrentWorkoutPointer;
use crate::{
    Error, Goal, JsonFileStore, RecordStore, Result, SplitPreference, Workout, WorkoutKind,
    WorkoutLogParser, WorkoutPatch,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Outcome of a successful log import
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub workout_ids: Vec<String>,
}

pub struct AppState<S: RecordStore> {
    store: S,
    analytics: AnalyticsConfig,
    split_pref: Option<SplitPreference>,
    current_pointer: Option<CurrentWorkoutPointer>,
    workouts: Vec<Workout>,
    goals: Vec<Goal>,
    current_workout: Option<Workout>,
    current_split: String,
}

impl AppState<JsonFileStore> {
    /// Open the file-backed state in the configured data directory and load it
    pub fn open(config: &Config) -> Result<Self> {
        let data_dir = &config.data.data_dir;
        tracing::debug!("Opening data directory {:?}", data_dir);

        let mut state = Self::new(JsonFileStore::new(data_dir), config.analytics.clone())
            .with_split_preference(SplitPreference::new(data_dir))
            .with_current_workout_pointer(CurrentWorkoutPointer::new(data_dir));
        state.load()?;
        Ok(state)
    }
}

impl<S: RecordStore> AppState<S> {
    /// Empty state over a store; call [`AppState::load`] to read it
    pub fn new(store: S, analytics: AnalyticsConfig) -> Self {
        Self {
            store,
            analytics,
            split_pref: None,
            current_pointer: None,
            workouts: Vec::new(),
            goals: Vec::new(),
            current_workout: None,
            current_split: String::new(),
        }
    }

    pub fn with_split_preference(mut self, pref: SplitPreference) -> Self {
        self.split_pref = Some(pref);
        self
    }

    pub fn with_current_workout_pointer(mut self, pointer: CurrentWorkoutPointer) -> Self {
        self.current_pointer = Some(pointer);
        self
    }

    pub fn load(&mut self) -> Result<()> {
        self.load_workouts()?;
        self.load_goals()?;
        if let Some(pref) = &self.split_pref {
            self.current_split = pref.load()?;
        }
        if let Some(pointer) = &self.current_pointer {
            self.current_workout = match pointer.load()? {
                Some(id) => {
                    let found = self.workout(&id).cloned();
                    if found.is_none() {
                        tracing::warn!("Workout {} being recorded no longer exists", id);
                    }
                    found
                }
                None => None,
            };
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    /// Reload workouts from the store, newest first
    pub fn load_workouts(&mut self) -> Result<()> {
        let mut workouts: Vec<Workout> = self.store.get_all()?;
        workouts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        self.workouts = workouts;
        Ok(())
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Completed workouts only, newest first
    pub fn history(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter().filter(|w| w.completed)
    }

    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    pub fn add_workout(&mut self, workout: &Workout) -> Result<()> {
        self.store.put(workout)?;
        tracing::info!("Saved workout {} ({})", workout.id, workout.name);
        self.load_workouts()
    }

    /// Merge a patch into a stored workout
    ///
    /// Returns `false` without writing when no workout has this id.
    pub fn update_workout(&mut self, id: &str, patch: WorkoutPatch) -> Result<bool> {
        let Some(mut workout) = self.store.get::<Workout>(id)? else {
            tracing::warn!("Cannot update unknown workout {}", id);
            return Ok(false);
        };

        patch.apply(&mut workout);
        self.store.put(&workout)?;
        self.load_workouts()?;
        if self.is_current(id) {
            self.current_workout = self.workout(id).cloned();
        }
        Ok(true)
    }

    pub fn delete_workout(&mut self, id: &str) -> Result<bool> {
        let deleted = self.store.delete::<Workout>(id)?;
        if deleted {
            tracing::info!("Deleted workout {}", id);
        }
        self.load_workouts()?;
        if self.is_current(id) {
            self.set_current_workout(None)?;
        }
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    pub fn current_workout(&self) -> Option<&Workout> {
        self.current_workout.as_ref()
    }

    /// Select the workout being recorded, or clear the selection
    ///
    /// The selection is remembered by id only; the workout itself is not
    /// written here.
    pub fn set_current_workout(&mut self, workout: Option<Workout>) -> Result<()> {
        if let Some(pointer) = &self.current_pointer {
            match &workout {
                Some(w) => pointer.save(&w.id)?,
                None => pointer.clear()?,
            }
        }
        self.current_workout = workout;
        Ok(())
    }

    fn is_current(&self, id: &str) -> bool {
        self.current_workout.as_ref().is_some_and(|w| w.id == id)
    }

    fn recording(&self) -> Result<Workout> {
        self.current_workout
            .clone()
            .ok_or_else(|| Error::Other("No workout in progress".into()))
    }

    /// Save a new workout and start recording into it
    pub fn start_workout(&mut self, workout: Workout) -> Result<()> {
        self.add_workout(&workout)?;
        self.set_current_workout(Some(workout))
    }

    /// Select a stored workout for recording, applying a patch first
    ///
    /// A completed workout stays completed while it is edited. Returns
    /// `false` when no workout has this id.
    pub fn edit_workout(&mut self, id: &str, patch: WorkoutPatch) -> Result<bool> {
        if !self.update_workout(id, patch)? {
            return Ok(false);
        }
        let workout = self.workout(id).cloned();
        self.set_current_workout(workout)?;
        Ok(true)
    }

    /// Record a strength set in the current workout
    pub fn record_set(&mut self, exercise: &str, weight: f64, reps: f64) -> Result<Workout> {
        let mut workout = self.recording()?;
        workout.add_strength_set(exercise, weight, reps)?;
        self.save_recording(&workout)
    }

    /// Record a cardio entry in the current workout
    pub fn record_cardio(
        &mut self,
        name: &str,
        distance: f64,
        minutes: f64,
        calories: f64,
    ) -> Result<Workout> {
        let mut workout = self.recording()?;
        workout.add_cardio(name, distance, minutes, calories)?;
        self.save_recording(&workout)
    }

    /// Set or clear an exercise note in the current workout
    pub fn note_exercise(&mut self, exercise: &str, note: &str) -> Result<Workout> {
        let mut workout = self.recording()?;
        workout.set_exercise_note(exercise, note)?;
        self.save_recording(&workout)
    }

    /// Finalise and complete a workout, then stop recording
    ///
    /// Finishes the workout with `id`, or the current workout when `id` is
    /// `None`. `notes` replaces the workout notes when given.
    pub fn finish_workout(&mut self, id: Option<&str>, notes: Option<&str>) -> Result<Workout> {
        let mut workout = match id {
            Some(id) => self
                .workout(id)
                .cloned()
                .ok_or_else(|| Error::Other(format!("No workout with id {}", id)))?,
            None => self.recording()?,
        };
        if let Some(notes) = notes {
            workout.notes = Some(notes.to_string());
        }

        let finished = self.save_recording(&workout.finalize())?;
        if self.is_current(&finished.id) {
            self.set_current_workout(None)?;
        }
        tracing::info!(
            "Finished workout {} with {} exercise(s)",
            finished.id,
            finished.exercises.len()
        );
        Ok(finished)
    }

    /// Stop recording; an unfinished draft is deleted
    ///
    /// Returns the id of the deleted draft, if any.
    pub fn discard_current_workout(&mut self) -> Result<Option<String>> {
        let Some(workout) = self.current_workout.clone() else {
            return Ok(None);
        };
        self.set_current_workout(None)?;
        if workout.completed {
            return Ok(None);
        }
        self.delete_workout(&workout.id)?;
        Ok(Some(workout.id))
    }

    fn save_recording(&mut self, workout: &Workout) -> Result<Workout> {
        let patch = WorkoutPatch {
            exercises: Some(workout.exercises.clone()),
            completed: Some(workout.completed),
            notes: Some(workout.notes.clone()),
            ..Default::default()
        };
        if !self.update_workout(&workout.id, patch)? {
            if self.is_current(&workout.id) {
                self.set_current_workout(None)?;
            }
            return Err(Error::Other(format!(
                "Workout {} no longer exists",
                workout.id
            )));
        }
        self.workout(&workout.id)
            .cloned()
            .ok_or_else(|| Error::Store(format!("Workout {} missing after save", workout.id)))
    }

    // ------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------

    pub fn load_goals(&mut self) -> Result<()> {
        let mut goals: Vec<Goal> = self.store.get_all()?;
        goals.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        self.goals = goals;
        Ok(())
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// (active, completed)
    pub fn partitioned_goals(&self) -> (Vec<&Goal>, Vec<&Goal>) {
        partition_goals(&self.goals)
    }

    pub fn add_goal(&mut self, goal: &Goal) -> Result<()> {
        self.store.put(goal)?;
        tracing::info!("Saved goal {}", goal.id);
        self.load_goals()
    }

    /// Merge a patch into a stored goal; `false` when no goal has this id
    pub fn update_goal(&mut self, id: &str, patch: GoalPatch) -> Result<bool> {
        let Some(mut goal) = self.store.get::<Goal>(id)? else {
            tracing::warn!("Cannot update unknown goal {}", id);
            return Ok(false);
        };

        patch.apply(&mut goal);
        self.store.put(&goal)?;
        self.load_goals()?;
        Ok(true)
    }

    pub fn delete_goal(&mut self, id: &str) -> Result<bool> {
        let deleted = self.store.delete::<Goal>(id)?;
        self.load_goals()?;
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Split
    // ------------------------------------------------------------------

    pub fn current_split(&self) -> &str {
        &self.current_split
    }

    pub fn set_current_split(&mut self, label: &str) -> Result<()> {
        if let Some(pref) = &self.split_pref {
            pref.save(label)?;
        }
        self.current_split = label.trim().to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Import
    // ------------------------------------------------------------------

    /// Parse a free-text log and save each workout in order
    ///
    /// Text with nothing recognisable imports zero workouts. A failed save
    /// stops the import; workouts saved before it stay saved.
    pub fn import_log(&mut self, text: &str, today: NaiveDate) -> Result<ImportReport> {
        let parsed = WorkoutLogParser::new(today).parse(text);
        tracing::info!("Parsed {} workout(s) from log", parsed.len());

        let mut report = ImportReport::default();
        for workout in &parsed {
            if let Err(e) = self.store.put(workout) {
                tracing::error!(
                    "Import stopped at workout {} after {} save(s): {}",
                    workout.id,
                    report.imported,
                    e
                );
                if let Err(reload) = self.load_workouts() {
                    tracing::warn!("Failed to reload workouts after import error: {}", reload);
                }
                return Err(Error::Import {
                    saved: report.imported,
                    source: Box::new(e),
                });
            }
            report.imported += 1;
            report.workout_ids.push(workout.id.clone());
        }

        self.load_workouts()?;
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Analytics over the loaded snapshot
    // ------------------------------------------------------------------

    pub fn trend_options(&self) -> TrendOptions {
        TrendOptions::from(&self.analytics)
    }

    /// Progression series, trend and insight for one exercise
    pub fn progression(&self, exercise: &str, limit: Option<usize>) -> ProgressionSummary {
        let limit = limit.unwrap_or(self.analytics.progression_limit);
        let series = progression::progression_for(&self.workouts, exercise, limit);
        progression::summarize(exercise, series, &self.trend_options())
    }

    pub fn exercise_names(&self) -> Vec<String> {
        progression::strength_exercise_names(&self.workouts)
    }

    pub fn exercises_by_split(&self) -> BTreeMap<WorkoutKind, Vec<String>> {
        progression::exercises_by_split(&self.workouts)
    }

    pub fn repeat_template(&self, kind: WorkoutKind, today: NaiveDate) -> Option<Workout> {
        progression::repeat_template(&self.workouts, kind, today)
    }

    pub fn previous_note(&self, exercise: &str) -> Option<&str> {
        progression::previous_note(&self.workouts, exercise)
    }

    pub fn weekly_stats(&self, today: NaiveDate) -> PeriodStats {
        stats::weekly_stats(&self.workouts, today)
    }

    pub fn monthly_stats(&self, today: NaiveDate) -> PeriodStats {
        stats::monthly_stats(&self.workouts, today)
    }

    pub fn lifetime_stats(&self) -> PeriodStats {
        stats::lifetime_stats(&self.workouts)
    }

    pub fn monthly_breakdown(&self) -> Vec<MonthlyBreakdown> {
        stats::monthly_breakdown(&self.workouts)
    }

    pub fn week_activity(&self, today: NaiveDate) -> Vec<(NaiveDate, bool)> {
        stats::week_activity(&self.workouts, today)
    }
}
