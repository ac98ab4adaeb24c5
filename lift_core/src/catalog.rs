//! Default catalog of workout templates and gamification tables.
//!
//! This module provides the built-in workout definitions, the level
//! threshold table and the experience reward amounts.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

// ============================================================================
// Experience Rewards
// ============================================================================

/// XP earned for logging a single set
pub const XP_PER_SET: u64 = 10;

/// XP earned when the last set of an exercise is logged
pub const XP_PER_EXERCISE: u64 = 25;

/// XP earned for completing a workout
pub const XP_PER_WORKOUT: u64 = 100;

/// XP bonus for beating the previous volume on the same template
pub const XP_VOLUME_BEAT: u64 = 50;

// ============================================================================
// Level Thresholds
// ============================================================================

/// Ascending level table. The highest row whose threshold is at or
/// below the user's XP determines the level.
pub static LEVEL_THRESHOLDS: &[LevelThreshold] = &[
    LevelThreshold { level: 1, xp_required: 0, title: "Novice" },
    LevelThreshold { level: 2, xp_required: 200, title: "Beginner" },
    LevelThreshold { level: 3, xp_required: 500, title: "Apprentice" },
    LevelThreshold { level: 4, xp_required: 1_000, title: "Regular" },
    LevelThreshold { level: 5, xp_required: 2_000, title: "Dedicated" },
    LevelThreshold { level: 6, xp_required: 3_500, title: "Committed" },
    LevelThreshold { level: 7, xp_required: 5_500, title: "Athlete" },
    LevelThreshold { level: 8, xp_required: 8_000, title: "Veteran" },
    LevelThreshold { level: 9, xp_required: 11_500, title: "Elite" },
    LevelThreshold { level: 10, xp_required: 16_000, title: "Legend" },
];

// ============================================================================
// Weekly Quest Pool
// ============================================================================

/// Quest definitions the weekly rotation draws from
pub static QUEST_TEMPLATES: &[QuestTemplate] = &[
    QuestTemplate {
        name: "Show Up",
        description: "Complete 3 workouts this week",
        kind: QuestKind::Workouts,
        target: 3,
        xp_reward: 150,
    },
    QuestTemplate {
        name: "Set Machine",
        description: "Log 25 sets this week",
        kind: QuestKind::Sets,
        target: 25,
        xp_reward: 150,
    },
    QuestTemplate {
        name: "Volume Mover",
        description: "Lift 25,000 total volume this week",
        kind: QuestKind::Volume,
        target: 25_000,
        xp_reward: 200,
    },
    QuestTemplate {
        name: "Mix It Up",
        description: "Complete 2 different workout types this week",
        kind: QuestKind::Variety,
        target: 2,
        xp_reward: 100,
    },
    QuestTemplate {
        name: "Keep The Flame",
        description: "Reach a 3 day streak",
        kind: QuestKind::Streak,
        target: 3,
        xp_reward: 150,
    },
];

// ============================================================================
// Default Catalog
// ============================================================================

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with the built-in workout templates
///
/// **Note**: For production use, prefer `get_default_catalog()` which
/// returns a cached reference. This function is retained for testing
/// and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    let mut templates = HashMap::new();

    templates.insert(
        "push_day".into(),
        WorkoutTemplate {
            id: "push_day".into(),
            name: "Push Day".into(),
            description: "Chest, shoulders and triceps".into(),
            exercises: vec![
                ExerciseTemplate {
                    id: "bench_press".into(),
                    name: "Bench Press".into(),
                    target_sets: 3,
                    rep_range: (6, 10),
                    weight_range: (45.0, 315.0),
                    unit: "lbs".into(),
                },
                ExerciseTemplate {
                    id: "overhead_press".into(),
                    name: "Overhead Press".into(),
                    target_sets: 3,
                    rep_range: (6, 10),
                    weight_range: (25.0, 185.0),
                    unit: "lbs".into(),
                },
                ExerciseTemplate {
                    id: "tricep_pushdown".into(),
                    name: "Tricep Pushdown".into(),
                    target_sets: 3,
                    rep_range: (10, 15),
                    weight_range: (20.0, 120.0),
                    unit: "lbs".into(),
                },
            ],
        },
    );

    templates.insert(
        "pull_day".into(),
        WorkoutTemplate {
            id: "pull_day".into(),
            name: "Pull Day".into(),
            description: "Back and biceps".into(),
            exercises: vec![
                ExerciseTemplate {
                    id: "deadlift".into(),
                    name: "Deadlift".into(),
                    target_sets: 3,
                    rep_range: (4, 8),
                    weight_range: (95.0, 500.0),
                    unit: "lbs".into(),
                },
                ExerciseTemplate {
                    id: "barbell_row".into(),
                    name: "Barbell Row".into(),
                    target_sets: 3,
                    rep_range: (6, 10),
                    weight_range: (65.0, 275.0),
                    unit: "lbs".into(),
                },
                ExerciseTemplate {
                    id: "bicep_curl".into(),
                    name: "Bicep Curl".into(),
                    target_sets: 3,
                    rep_range: (8, 12),
                    weight_range: (15.0, 80.0),
                    unit: "lbs".into(),
                },
            ],
        },
    );

    templates.insert(
        "leg_day".into(),
        WorkoutTemplate {
            id: "leg_day".into(),
            name: "Leg Day".into(),
            description: "Quads, hamstrings and calves".into(),
            exercises: vec![
                ExerciseTemplate {
                    id: "squat".into(),
                    name: "Back Squat".into(),
                    target_sets: 3,
                    rep_range: (5, 8),
                    weight_range: (95.0, 405.0),
                    unit: "lbs".into(),
                },
                ExerciseTemplate {
                    id: "leg_press".into(),
                    name: "Leg Press".into(),
                    target_sets: 3,
                    rep_range: (8, 12),
                    weight_range: (90.0, 600.0),
                    unit: "lbs".into(),
                },
                ExerciseTemplate {
                    id: "calf_raise".into(),
                    name: "Standing Calf Raise".into(),
                    target_sets: 3,
                    rep_range: (10, 15),
                    weight_range: (45.0, 250.0),
                    unit: "lbs".into(),
                },
            ],
        },
    );

    Catalog { templates }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, template) in &self.templates {
            if id.is_empty() || template.id.is_empty() {
                errors.push("Template has empty ID".to_string());
            }
            if id != &template.id {
                errors.push(format!(
                    "Template key '{}' doesn't match template.id '{}'",
                    id, template.id
                ));
            }
            if template.name.is_empty() {
                errors.push(format!("Template '{}' has empty name", id));
            }
            if template.exercises.is_empty() {
                errors.push(format!("Template '{}' has no exercises", id));
            }

            let mut seen = std::collections::HashSet::new();
            for exercise in &template.exercises {
                if exercise.id.is_empty() {
                    errors.push(format!("Template '{}' has an exercise with empty ID", id));
                }
                if !seen.insert(exercise.id.as_str()) {
                    errors.push(format!(
                        "Template '{}' has duplicate exercise '{}'",
                        id, exercise.id
                    ));
                }
                if exercise.target_sets == 0 {
                    errors.push(format!(
                        "Template '{}': exercise '{}' has zero target sets",
                        id, exercise.id
                    ));
                }
                let (rep_min, rep_max) = exercise.rep_range;
                if rep_min == 0 || rep_min > rep_max {
                    errors.push(format!(
                        "Template '{}': exercise '{}' has invalid rep range {}..{}",
                        id, exercise.id, rep_min, rep_max
                    ));
                }
                let (w_min, w_max) = exercise.weight_range;
                if w_min <= 0.0 || w_min > w_max {
                    errors.push(format!(
                        "Template '{}': exercise '{}' has invalid weight range {}..{}",
                        id, exercise.id, w_min, w_max
                    ));
                }
            }
        }

        // The level table must start at zero XP so every XP value maps
        // to a level, and must be strictly ascending.
        if LEVEL_THRESHOLDS.first().map(|t| t.xp_required) != Some(0) {
            errors.push("Level table does not start at 0 XP".to_string());
        }
        for pair in LEVEL_THRESHOLDS.windows(2) {
            if pair[1].xp_required <= pair[0].xp_required {
                errors.push(format!(
                    "Level table not ascending at level {}",
                    pair[1].level
                ));
            }
        }

        for quest in QUEST_TEMPLATES {
            if quest.target == 0 || quest.xp_reward == 0 {
                errors.push(format!(
                    "Quest '{}' has a zero target or reward",
                    quest.name
                ));
            }
        }

        errors
    }

    /// Resolve an exercise id to its display name, searching all templates
    ///
    /// Falls back to the raw id when the exercise is unknown, so that
    /// recalculation never fails on orphaned history.
    pub fn exercise_name(&self, exercise_id: &str) -> String {
        self.templates
            .values()
            .flat_map(|t| t.exercises.iter())
            .find(|e| e.id == exercise_id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| exercise_id.to_string())
    }
}
