//! Goal helpers: creation defaults, progress, validation and patches.

use crate::types::is_non_negative;
use crate::{new_record_id, Goal, GoalPeriod, GoalTarget};
use chrono::NaiveDate;

impl Goal {
    /// A free-text goal as created from the goals view: open-ended, target 1
    pub fn new_custom(description: &str, today: NaiveDate) -> Self {
        Self {
            id: new_record_id("goal"),
            period: GoalPeriod::Custom,
            target_type: GoalTarget::Custom,
            target_value: 1.0,
            current_value: 0.0,
            start_date: today,
            end_date: None,
            completed: false,
            description: description.trim().to_string(),
        }
    }

    /// Progress fraction `current / max(target, 1)`, clamped to [0, 1]
    pub fn progress(&self) -> f64 {
        let fraction = self.current_value / self.target_value.max(1.0);
        if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Check the record invariants; returns one message per violation
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id.is_empty() {
            errors.push("Goal has empty ID".to_string());
        }
        if !is_non_negative(self.target_value) {
            errors.push(format!(
                "Goal '{}' has invalid target value {}",
                self.id, self.target_value
            ));
        }
        if !is_non_negative(self.current_value) {
            errors.push(format!(
                "Goal '{}' has invalid current value {}",
                self.id, self.current_value
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                errors.push(format!(
                    "Goal '{}' ends ({}) before it starts ({})",
                    self.id, end, self.start_date
                ));
            }
        }

        errors
    }
}

/// Field-level partial update for a goal
#[derive(Clone, Debug, Default)]
pub struct GoalPatch {
    pub period: Option<GoalPeriod>,
    pub target_type: Option<GoalTarget>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
    pub description: Option<String>,
}

impl GoalPatch {
    pub fn apply(self, goal: &mut Goal) {
        if let Some(period) = self.period {
            goal.period = period;
        }
        if let Some(target_type) = self.target_type {
            goal.target_type = target_type;
        }
        if let Some(target_value) = self.target_value {
            goal.target_value = target_value;
        }
        if let Some(current_value) = self.current_value {
            goal.current_value = current_value;
        }
        if let Some(start_date) = self.start_date {
            goal.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            goal.end_date = end_date;
        }
        if let Some(completed) = self.completed {
            goal.completed = completed;
        }
        if let Some(description) = self.description {
            goal.description = description;
        }
    }
}

/// Split goals into (active, completed), keeping their order
pub fn partition_goals(goals: &[Goal]) -> (Vec<&Goal>, Vec<&Goal>) {
    goals.iter().partition(|g| !g.completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_new_custom_goal_defaults() {
        let goal = Goal::new_custom("  Bench 225  ", today());
        assert!(goal.id.starts_with("goal-"));
        assert_eq!(goal.description, "Bench 225");
        assert_eq!(goal.period, GoalPeriod::Custom);
        assert_eq!(goal.target_type, GoalTarget::Custom);
        assert_eq!(goal.target_value, 1.0);
        assert_eq!(goal.current_value, 0.0);
        assert_eq!(goal.start_date, today());
        assert!(goal.end_date.is_none());
        assert!(!goal.completed);
        assert!(goal.validate().is_empty());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut goal = Goal::new_custom("Workouts", today());
        goal.target_value = 20.0;
        goal.current_value = 5.0;
        assert_eq!(goal.progress(), 0.25);

        goal.current_value = 30.0;
        assert_eq!(goal.progress(), 1.0);

        // A zero target divides by one
        goal.target_value = 0.0;
        goal.current_value = 0.5;
        assert_eq!(goal.progress(), 0.5);

        goal.current_value = -3.0;
        assert_eq!(goal.progress(), 0.0);
    }

    #[test]
    fn test_validate_goal() {
        let mut goal = Goal::new_custom("Squat", today());
        goal.target_value = f64::INFINITY;
        goal.end_date = NaiveDate::from_ymd_opt(2024, 5, 1);

        let errors = goal.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("target value"));
        assert!(errors[1].contains("before it starts"));
    }

    #[test]
    fn test_patch_and_partition() {
        let mut done = Goal::new_custom("Done", today());
        GoalPatch {
            completed: Some(true),
            current_value: Some(1.0),
            ..Default::default()
        }
        .apply(&mut done);
        assert!(done.completed);
        assert_eq!(done.progress(), 1.0);
        assert_eq!(done.description, "Done");

        let open = Goal::new_custom("Open", today());
        let goals = vec![done, open];
        let (active, completed) = partition_goals(&goals);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].description, "Open");
        assert_eq!(completed[0].description, "Done");
    }
}
