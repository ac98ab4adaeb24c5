//! Cursor derivation for the active workout session.
//!
//! The cursor is never authoritative on its own: it must always be
//! recomputable from the template and the logged set entries. This
//! module holds the single derivation routine shared by the start,
//! resume and delete-set paths.

use crate::types::{SetEntry, WorkoutTemplate};
use serde::{Deserialize, Serialize};

/// Position of the next set to log within a workout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Index into the template's exercise list; equals the exercise
    /// count when every exercise is satisfied (workout complete).
    pub exercise_index: usize,
    pub set_index: usize,
}

impl Cursor {
    /// Whether the cursor has advanced past the last exercise
    pub fn is_past_end(&self, template: &WorkoutTemplate) -> bool {
        self.exercise_index >= template.exercises.len()
    }
}

/// Derive the cursor purely from the logged sets.
///
/// The cursor points at the first exercise (in template order) whose
/// logged-set count is below its target, with `set_index` equal to
/// that count. When all exercises are satisfied the cursor points one
/// past the last exercise.
pub fn derive_cursor(template: &WorkoutTemplate, sets: &[SetEntry]) -> Cursor {
    for (i, exercise) in template.exercises.iter().enumerate() {
        let logged = sets.iter().filter(|s| s.exercise_id == exercise.id).count();
        if logged < exercise.target_sets {
            return Cursor {
                exercise_index: i,
                set_index: logged,
            };
        }
    }

    Cursor {
        exercise_index: template.exercises.len(),
        set_index: 0,
    }
}
