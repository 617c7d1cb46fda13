use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use liftlog_core::goals::GoalPatch;
use liftlog_core::stats::PeriodStats;
use liftlog_core::*;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Workout log importer and strength progression tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a free-text workout log from a file (or stdin)
    Import {
        /// Log file to read; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// List completed workouts, newest first
    List {
        /// Include drafts
        #[arg(long)]
        all: bool,
    },

    /// Show one workout in full
    Show { id: String },

    /// Delete a workout
    Delete { id: String },

    /// Progression, trend and insight for an exercise
    Progress {
        exercise: String,

        /// Number of most recent sessions to include
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },

    /// Strength exercises grouped by workout type
    Exercises,

    /// Weekly, monthly and lifetime statistics
    Stats,

    /// Save a draft copied from the most recent workout of a type
    Repeat {
        /// Workout type (push, pull, legs, upper, lower, full, cardio, custom)
        kind: String,
    },

    /// Record a workout set by set
    Log {
        #[command(subcommand)]
        action: LogCommand,
    },

    /// Change a stored workout and resume recording into it
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Workout type (push, pull, legs, upper, lower, full, cardio, custom)
        #[arg(long = "type")]
        kind: Option<String>,

        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Workout notes; an empty string clears them
        #[arg(long)]
        notes: Option<String>,
    },

    /// Manage goals
    Goal {
        #[command(subcommand)]
        action: GoalCommand,
    },

    /// Print or set the current training split
    Split { label: Option<String> },

    /// Convert between plate notation (2p35) and pounds
    Plates { value: String },

    /// Export completed workout sets as CSV
    Export {
        /// Output file; writes to stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    /// Start recording a new workout
    Start {
        #[arg(long)]
        name: Option<String>,

        /// Workout type (push, pull, legs, upper, lower, full, cardio, custom)
        #[arg(long = "type")]
        kind: Option<String>,

        /// Date as YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Add a strength set; weight accepts plate notation (2p35)
    AddSet {
        exercise: String,
        weight: String,
        reps: f64,
    },
    /// Add a cardio entry: distance in miles, time in minutes
    Cardio {
        name: String,
        distance: f64,
        minutes: f64,
        calories: Option<f64>,
    },
    /// Set the note on an exercise
    Note { exercise: String, text: String },
    /// Save the workout as completed
    Finish {
        /// Workout to finish, such as a repeat draft; defaults to the current one
        id: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Show the workout being recorded
    Status,
    /// Stop recording and delete an unfinished draft
    Cancel,
}

#[derive(Subcommand)]
enum GoalCommand {
    /// Add a free-text goal
    Add { description: String },
    /// List active and completed goals
    List,
    /// Mark a goal completed
    Done { id: String },
    /// Record the current value of a goal
    Progress { id: String, value: f64 },
    /// Delete a goal
    Delete { id: String },
}

fn main() -> Result<()> {
    // Initialize logging
    liftlog_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    let mut state = AppState::open(&config)?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Import { file } => cmd_import(&mut state, file, today),
        Commands::List { all } => cmd_list(&state, all),
        Commands::Show { id } => cmd_show(&state, &id),
        Commands::Delete { id } => cmd_delete(&mut state, &id),
        Commands::Progress { exercise, limit } => {
            let limit = limit.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
            cmd_progress(&state, &exercise, limit)
        }
        Commands::Exercises => cmd_exercises(&state),
        Commands::Stats => cmd_stats(&state, today),
        Commands::Repeat { kind } => cmd_repeat(&mut state, &kind, today),
        Commands::Log { action } => cmd_log(&mut state, action, today),
        Commands::Edit {
            id,
            name,
            kind,
            date,
            notes,
        } => cmd_edit(&mut state, &id, name, kind, date, notes),
        Commands::Goal { action } => cmd_goal(&mut state, action, today),
        Commands::Split { label } => cmd_split(&mut state, label),
        Commands::Plates { value } => {
            cmd_plates(&value);
            Ok(())
        }
        Commands::Export { out } => cmd_export(&state, out),
    }
}

fn cmd_import(
    state: &mut AppState<JsonFileStore>,
    file: Option<PathBuf>,
    today: chrono::NaiveDate,
) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    match state.import_log(&text, today) {
        Ok(report) => {
            println!("✓ Imported {} workout(s)", report.imported);
            if report.imported == 0 {
                println!("  No dates, workout headers or set lines were recognised.");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error importing workouts, check the log format.");
            Err(e)
        }
    }
}

fn cmd_list(state: &AppState<JsonFileStore>, all: bool) -> Result<()> {
    let workouts: Vec<&Workout> = if all {
        state.workouts().iter().collect()
    } else {
        state.history().collect()
    };

    if workouts.is_empty() {
        println!("No workouts logged yet.");
        return Ok(());
    }

    for workout in workouts {
        println!(
            "{}  {:<10} {}{}  {} exercise(s), {} set(s), {} lb  [{}]",
            workout.date.format("%Y-%m-%d"),
            workout.kind.display_name(),
            workout.name,
            if workout.completed { "" } else { " (draft)" },
            workout.exercises.len(),
            workout.set_count(),
            format_number(workout.volume()),
            workout.id
        );
    }

    Ok(())
}

fn cmd_show(state: &AppState<JsonFileStore>, id: &str) -> Result<()> {
    let workout = state
        .workout(id)
        .ok_or_else(|| Error::Other(format!("No workout with id {}", id)))?;

    println!("{} ({})", workout.name, workout.kind.display_name());
    println!("  Date: {}", workout.date.format("%A, %B %-d, %Y"));
    if !workout.completed {
        println!("  Draft");
    }
    if let Some(minutes) = workout.duration {
        println!("  Duration: {} min", format_number(minutes));
    }
    if let Some(notes) = &workout.notes {
        println!("  Notes: {}", notes);
    }

    for exercise in &workout.exercises {
        println!();
        println!("  {}", exercise.name);
        if let Some(previous) = state.previous_note(&exercise.name) {
            println!("    Last note: {}", previous);
        }
        for (index, set) in exercise.sets.iter().enumerate() {
            match exercise.kind {
                ExerciseKind::Cardio => println!(
                    "    {}. {} mi in {} min{}",
                    index + 1,
                    format_number(set.distance.unwrap_or(0.0)),
                    format_number(set.duration.unwrap_or(0.0)),
                    set.calories()
                        .map(|c| format!(", {} cal", format_number(c)))
                        .unwrap_or_default()
                ),
                _ => println!(
                    "    {}. {} lb x {}{}",
                    index + 1,
                    format_number(set.weight),
                    format_number(set.reps),
                    if set.completed { "" } else { " (pending)" }
                ),
            }
        }
    }

    Ok(())
}

fn cmd_delete(state: &mut AppState<JsonFileStore>, id: &str) -> Result<()> {
    if state.delete_workout(id)? {
        println!("✓ Deleted workout {}", id);
    } else {
        println!("No workout with id {}", id);
    }
    Ok(())
}

fn cmd_progress(state: &AppState<JsonFileStore>, exercise: &str, limit: Option<usize>) -> Result<()> {
    let summary = state.progression(exercise, limit);

    if summary.series.is_empty() {
        println!("No completed sets logged for {}.", exercise);
        println!("{}", summary.insight);
        return Ok(());
    }

    println!("{}", summary.exercise);
    println!(
        "  {:<12} {:>10} {:>8} {:>10} {:>8}",
        "Date", "Max lb", "Reps", "Volume", "1RM"
    );
    for point in &summary.series {
        println!(
            "  {:<12} {:>10} {:>8} {:>10} {:>8.1}",
            point.date.format("%Y-%m-%d").to_string(),
            format_number(point.max_weight),
            format_number(point.max_reps),
            format_number(point.total_volume),
            point.one_rep_max
        );
    }

    println!();
    match summary.change_percent {
        Some(change) => println!("Trend: {} ({:+.1}%)", summary.trend.as_str(), change),
        None => println!("Trend: {}", summary.trend.as_str()),
    }
    println!("{}", summary.insight);

    Ok(())
}

fn cmd_exercises(state: &AppState<JsonFileStore>) -> Result<()> {
    let by_split = state.exercises_by_split();
    if by_split.is_empty() {
        println!("No exercises logged yet.");
        return Ok(());
    }

    for (kind, names) in by_split {
        println!("{}:", kind.display_name());
        for name in names {
            println!("  {}", name);
        }
    }

    Ok(())
}

fn cmd_stats(state: &AppState<JsonFileStore>, today: chrono::NaiveDate) -> Result<()> {
    print_period("This week", &state.weekly_stats(today));
    print_period("This month", &state.monthly_stats(today));
    print_period("All time", &state.lifetime_stats());

    println!();
    let strip: Vec<String> = state
        .week_activity(today)
        .into_iter()
        .map(|(day, trained)| {
            let letter = day.format("%a").to_string();
            if trained {
                format!("[{}]", letter)
            } else {
                format!(" {} ", letter)
            }
        })
        .collect();
    println!("Week: {}", strip.join(""));

    let breakdown = state.monthly_breakdown();
    if !breakdown.is_empty() {
        println!();
        println!("Monthly breakdown:");
        for month in breakdown {
            println!(
                "  {} {}: {} workout(s)",
                month.month_name, month.year, month.workouts
            );
        }
    }

    Ok(())
}

fn print_period(label: &str, stats: &PeriodStats) {
    println!(
        "{}: {} workout(s), {} lb volume, {} min",
        label,
        stats.workouts,
        format_number(stats.volume),
        format_number(stats.minutes)
    );
}

fn cmd_repeat(
    state: &mut AppState<JsonFileStore>,
    kind: &str,
    today: chrono::NaiveDate,
) -> Result<()> {
    let kind: WorkoutKind = kind.parse()?;

    let Some(template) = state.repeat_template(kind, today) else {
        println!("No completed {} workout to repeat.", kind.display_name());
        return Ok(());
    };

    let (id, exercises) = (template.id.clone(), template.exercises.len());
    state.start_workout(template)?;
    println!("✓ Saved draft {} with {} exercise(s)", id, exercises);
    Ok(())
}

fn cmd_log(
    state: &mut AppState<JsonFileStore>,
    action: LogCommand,
    today: NaiveDate,
) -> Result<()> {
    match action {
        LogCommand::Start { name, kind, date } => {
            if let Some(current) = state.current_workout() {
                return Err(Error::Other(format!(
                    "Workout {} is already in progress; finish or cancel it first",
                    current.id
                )));
            }
            let kind: WorkoutKind = match kind {
                Some(kind) => kind.parse()?,
                None => WorkoutKind::Custom,
            };
            let name = name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| kind.display_name().to_string());

            let mut workout = Workout::draft(
                new_record_id("workout"),
                name.trim(),
                date.unwrap_or(today),
            );
            workout.kind = kind;
            let started = format!("{} [{}]", workout.name, workout.id);
            state.start_workout(workout)?;
            println!("✓ Started {}", started);
        }
        LogCommand::AddSet {
            exercise,
            weight,
            reps,
        } => {
            let pounds = plates::decode(&weight);
            let workout = state.record_set(&exercise, pounds, reps)?;
            let sets = workout
                .exercises
                .iter()
                .find(|e| e.is_strength_named(exercise.trim()))
                .map(|e| e.valid_sets().count())
                .unwrap_or(0);
            println!(
                "✓ {}: set {}, {} lb x {}",
                exercise.trim(),
                sets,
                format_number(pounds),
                format_number(reps)
            );
        }
        LogCommand::Cardio {
            name,
            distance,
            minutes,
            calories,
        } => {
            state.record_cardio(&name, distance, minutes, calories.unwrap_or(0.0))?;
            println!(
                "✓ {}: {} mi in {} min",
                name.trim(),
                format_number(distance),
                format_number(minutes)
            );
        }
        LogCommand::Note { exercise, text } => {
            state.note_exercise(&exercise, &text)?;
            println!("✓ Noted {}", exercise.trim());
        }
        LogCommand::Finish { id, notes } => {
            let finished = state.finish_workout(id.as_deref(), notes.as_deref())?;
            println!(
                "✓ Saved {} with {} exercise(s), {} lb volume",
                finished.name,
                finished.exercises.len(),
                format_number(finished.volume())
            );
        }
        LogCommand::Status => match state.current_workout() {
            Some(workout) => {
                let id = workout.id.clone();
                println!("Recording [{}]", id);
                cmd_show(state, &id)?;
            }
            None => println!("No workout in progress."),
        },
        LogCommand::Cancel => match state.discard_current_workout()? {
            Some(id) => println!("✓ Discarded draft {}", id),
            None => println!("Stopped recording."),
        },
    }
    Ok(())
}

fn cmd_edit(
    state: &mut AppState<JsonFileStore>,
    id: &str,
    name: Option<String>,
    kind: Option<String>,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<()> {
    let kind: Option<WorkoutKind> = kind.map(|k| k.parse()).transpose()?;
    let patch = WorkoutPatch {
        name: name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        kind,
        date,
        notes: notes.map(|n| {
            let n = n.trim();
            (!n.is_empty()).then(|| n.to_string())
        }),
        ..Default::default()
    };

    if state.edit_workout(id, patch)? {
        println!("✓ Editing workout {}", id);
    } else {
        println!("No workout with id {}", id);
    }
    Ok(())
}

fn cmd_goal(
    state: &mut AppState<JsonFileStore>,
    action: GoalCommand,
    today: chrono::NaiveDate,
) -> Result<()> {
    match action {
        GoalCommand::Add { description } => {
            if description.trim().is_empty() {
                return Err(Error::Validation("Goal description is empty".into()));
            }
            let goal = Goal::new_custom(&description, today);
            state.add_goal(&goal)?;
            println!("✓ Added goal {}", goal.id);
        }
        GoalCommand::List => {
            let (active, completed) = state.partitioned_goals();
            if active.is_empty() && completed.is_empty() {
                println!("No goals yet.");
                return Ok(());
            }
            println!("Active:");
            for goal in active {
                println!(
                    "  {:>3.0}%  {}  [{}]",
                    goal.progress() * 100.0,
                    goal.description,
                    goal.id
                );
            }
            if !completed.is_empty() {
                println!("Completed:");
                for goal in completed {
                    println!("  ✓ {}  [{}]", goal.description, goal.id);
                }
            }
        }
        GoalCommand::Done { id } => {
            let patch = GoalPatch {
                completed: Some(true),
                ..Default::default()
            };
            report_goal_update(state.update_goal(&id, patch)?, &id, "Completed");
        }
        GoalCommand::Progress { id, value } => {
            let patch = GoalPatch {
                current_value: Some(value),
                ..Default::default()
            };
            report_goal_update(state.update_goal(&id, patch)?, &id, "Updated");
        }
        GoalCommand::Delete { id } => {
            report_goal_update(state.delete_goal(&id)?, &id, "Deleted");
        }
    }
    Ok(())
}

fn report_goal_update(found: bool, id: &str, verb: &str) {
    if found {
        println!("✓ {} goal {}", verb, id);
    } else {
        println!("No goal with id {}", id);
    }
}

fn cmd_split(state: &mut AppState<JsonFileStore>, label: Option<String>) -> Result<()> {
    match label {
        Some(label) => {
            state.set_current_split(&label)?;
            println!("✓ Current split: {}", state.current_split());
        }
        None if state.current_split().is_empty() => println!("No split selected."),
        None => println!("Current split: {}", state.current_split()),
    }
    Ok(())
}

fn cmd_plates(value: &str) {
    match value.trim().parse::<f64>() {
        Ok(weight) => {
            let encoded = plates::encode(weight);
            let encoded = if encoded.is_empty() { "0".to_string() } else { encoded };
            println!("{} lb = {}", format_number(weight), encoded);
        }
        Err(_) => println!("{} = {} lb", value.trim(), format_number(plates::decode(value))),
    }
}

fn cmd_export(state: &AppState<JsonFileStore>, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            let file = std::fs::File::create(&path)?;
            let rows = export::write_sets_csv(state.workouts(), file)?;
            println!("✓ Exported {} set(s) to {}", rows, path.display());
        }
        None => {
            export::write_sets_csv(state.workouts(), io::stdout().lock())?;
        }
    }
    Ok(())
}

/// Whole numbers without a trailing `.0`
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}
