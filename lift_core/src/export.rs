//! CSV export of completed workout history.
//!
//! Flattens completed logs into one row per set so the history can be
//! analyzed outside the app.

use crate::error::Result;
use crate::types::{Catalog, Difficulty, WorkoutLog};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    workout_id: String,
    date: String,
    template_id: String,
    exercise: String,
    set_number: usize,
    reps: u32,
    weight: f64,
    difficulty: String,
    volume: f64,
}

fn difficulty_label(difficulty: Option<Difficulty>) -> String {
    match difficulty {
        Some(Difficulty::Easy) => "easy".into(),
        Some(Difficulty::Ok) => "ok".into(),
        Some(Difficulty::Hard) => "hard".into(),
        None => String::new(),
    }
}

/// Write all completed logs to a CSV file, one row per set.
///
/// Returns the number of rows written. Incomplete logs are skipped.
pub fn export_history_csv(
    logs: &[WorkoutLog],
    catalog: &Catalog,
    path: &Path,
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0usize;

    for log in logs.iter().filter(|l| l.is_complete) {
        for set in &log.sets {
            writer.serialize(CsvRow {
                workout_id: log.id.to_string(),
                date: log.date.to_string(),
                template_id: log.template_id.clone(),
                exercise: catalog.exercise_name(&set.exercise_id),
                set_number: set.set_number,
                reps: set.reps,
                weight: set.weight,
                difficulty: difficulty_label(set.difficulty),
                volume: set.volume(),
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    tracing::info!(rows, "exported history to {:?}", path);
    Ok(rows)
}
