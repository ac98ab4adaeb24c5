//! Core domain types for the Lift Me Up tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Workout templates and their exercises
//! - Logged sets and workout logs
//! - Profile statistics and personal records
//! - The active session cursor

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Template Types
// ============================================================================

/// An exercise slot inside a workout template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    /// Number of sets this exercise expects. Progress is always derived
    /// by counting logged sets against this, never by a stored counter.
    pub target_sets: usize,
    pub rep_range: (u32, u32),
    pub weight_range: (f64, f64),
    pub unit: String,
}

/// A static workout definition (e.g., "Push Day")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub exercises: Vec<ExerciseTemplate>,
}

/// The complete catalog of workout templates
#[derive(Clone, Debug)]
pub struct Catalog {
    pub templates: HashMap<String, WorkoutTemplate>,
}

impl Catalog {
    /// Look up a template by id
    pub fn template(&self, id: &str) -> Option<&WorkoutTemplate> {
        self.templates.get(id)
    }
}

// ============================================================================
// Logged Data Types
// ============================================================================

/// Perceived difficulty of a logged set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Ok,
    Hard,
}

/// A single logged set within a workout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetEntry {
    pub id: Uuid,
    pub exercise_id: String,
    /// 1-based, sequential within the exercise as logged
    pub set_number: usize,
    pub reps: u32,
    pub weight: f64,
    pub difficulty: Option<Difficulty>,
    pub timestamp: DateTime<Utc>,
}

impl SetEntry {
    /// Volume contribution of this set
    pub fn volume(&self) -> f64 {
        self.reps as f64 * self.weight
    }
}

/// Area of reported pain in a post-workout check-in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PainArea {
    #[default]
    None,
    Knee,
    Shoulder,
    Back,
    Other,
}

/// Post-workout subjective check-in (all scores 1-5)
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CheckIn {
    pub fatigue: u8,
    pub difficulty: u8,
    pub recovery: u8,
    pub sleep_quality: u8,
    pub motivation: u8,
    #[serde(default)]
    pub pain: PainArea,
    #[serde(default)]
    pub notes: String,
}

/// A recorded workout, either in progress or completed
///
/// Invariant: `total_volume` always equals the sum of volume
/// contributions of the current `sets`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub date: NaiveDate,
    pub template_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub total_volume: f64,
    pub notes: String,
    pub is_complete: bool,
    pub sets: Vec<SetEntry>,
    pub check_in: Option<CheckIn>,
}

impl WorkoutLog {
    /// Count of logged sets for a given exercise
    pub fn sets_for_exercise(&self, exercise_id: &str) -> usize {
        self.sets
            .iter()
            .filter(|s| s.exercise_id == exercise_id)
            .count()
    }

    /// Recompute total volume from the current set entries
    pub fn computed_volume(&self) -> f64 {
        self.sets.iter().map(SetEntry::volume).sum()
    }
}

// ============================================================================
// Profile and Record Types
// ============================================================================

/// Persistent per-profile aggregate statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfileStats {
    pub xp: u64,
    pub level: u32,
    pub current_streak_days: u32,
    pub longest_streak_days: u32,
    pub last_workout_date: Option<NaiveDate>,
}

impl Default for UserProfileStats {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            current_streak_days: 0,
            longest_streak_days: 0,
            last_workout_date: None,
        }
    }
}

/// Per-exercise best estimated one-rep-max ever logged
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub date: NaiveDate,
    pub estimated_1rm: f64,
}

// ============================================================================
// Quest Types
// ============================================================================

/// What a weekly quest measures over the week's completed logs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    /// Completed workouts
    Workouts,
    /// Logged sets
    Sets,
    /// Total volume lifted
    Volume,
    /// Distinct templates completed
    Variety,
    /// Current streak length
    Streak,
}

/// A drawable quest definition; two are rotated in each week
#[derive(Clone, Debug)]
pub struct QuestTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: QuestKind,
    pub target: u64,
    pub xp_reward: u64,
}

/// An active weekly quest with its derived progress
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quest {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub kind: QuestKind,
    pub target: u64,
    pub current: u64,
    pub xp_reward: u64,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub is_complete: bool,
}

/// Result of a streak computation over completed-log history
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
    pub is_active: bool,
}

/// A level threshold row: the highest row at or below the user's XP wins
#[derive(Clone, Debug)]
pub struct LevelThreshold {
    pub level: u32,
    pub xp_required: u64,
    pub title: &'static str,
}
