//! Semantic events emitted by the engines.
//!
//! The core only records that something happened; an external layer
//! decides how to surface it (stdout, haptics, notifications). Events
//! accumulate inside the session engine and are drained by the caller
//! after each operation.

use crate::types::PersonalRecord;
use uuid::Uuid;

/// Why experience was earned
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XpReason {
    SetCompleted,
    ExerciseCompleted,
    WorkoutCompleted,
    VolumeBeaten,
}

/// A semantic event produced by an engine operation
#[derive(Clone, Debug)]
pub enum Event {
    SetLogged {
        exercise_id: String,
        set_number: usize,
    },
    ExperienceEarned {
        amount: u64,
        reason: XpReason,
    },
    PersonalRecordBeaten(PersonalRecord),
    WorkoutCompleted {
        log_id: Uuid,
        total_volume: f64,
        xp_awarded: u64,
    },
    RestFinished,
}
