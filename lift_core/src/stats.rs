//! Statistics engine: experience, levels, streaks and personal records.
//!
//! Everything here is a pure function over completed-log history. After
//! a historical deletion the engine recomputes from scratch rather than
//! patching incrementally, so derived values can never drift from the
//! logs that remain.

use crate::catalog::{
    LEVEL_THRESHOLDS, XP_PER_EXERCISE, XP_PER_SET, XP_PER_WORKOUT, XP_VOLUME_BEAT,
};
use crate::types::{Catalog, PersonalRecord, StreakSummary, UserProfileStats, WorkoutLog};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

// ============================================================================
// Pure Functions
// ============================================================================

/// Level for a given XP total: the highest threshold row at or below it
pub fn level_for_xp(xp: u64) -> u32 {
    for threshold in LEVEL_THRESHOLDS.iter().rev() {
        if xp >= threshold.xp_required {
            return threshold.level;
        }
    }
    1
}

/// Title for a given level, defaulting to the lowest row
pub fn level_title(level: u32) -> &'static str {
    LEVEL_THRESHOLDS
        .iter()
        .find(|t| t.level == level)
        .map(|t| t.title)
        .unwrap_or(LEVEL_THRESHOLDS[0].title)
}

/// Estimated one-rep-max via the Epley formula.
///
/// A single rep is the lift itself; running it through the formula
/// would inflate it, so reps == 1 returns the weight exactly.
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    if reps == 1 {
        weight
    } else {
        weight * (1.0 + reps as f64 / 30.0)
    }
}

/// Compute the current streak from completed-log history.
///
/// A gap of more than one day between `today` and the most recent
/// completed log breaks the streak outright. Otherwise the logs are
/// walked backward: a one-day decrement extends the streak, multiple
/// logs on the same day collapse into one, and any larger gap stops
/// the walk.
pub fn compute_streak(logs: &[WorkoutLog], today: NaiveDate) -> StreakSummary {
    let mut dates: Vec<NaiveDate> = logs
        .iter()
        .filter(|l| l.is_complete)
        .map(|l| l.date)
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let Some(&last) = dates.first() else {
        return StreakSummary { current: 0, longest: 0, is_active: false };
    };

    let days_since_last = (today - last).num_days();
    if days_since_last > 1 {
        return StreakSummary { current: 0, longest: 0, is_active: false };
    }

    let mut streak = 0u32;
    let mut anchor = if days_since_last == 0 { today } else { last };

    for date in dates {
        let gap = (anchor - date).num_days();
        if gap == 0 {
            if streak == 0 {
                streak = 1;
            }
        } else if gap == 1 {
            streak += 1;
            anchor = date;
        } else {
            break;
        }
    }

    StreakSummary { current: streak, longest: streak, is_active: true }
}

/// Total XP implied by a set of logs: the fixed formula of 10 XP per
/// set, 25 XP per distinct exercise touched and 100 XP per completed
/// workout. Incomplete logs contribute nothing.
pub fn total_xp_from_logs(logs: &[WorkoutLog]) -> u64 {
    let mut total = 0u64;
    for log in logs.iter().filter(|l| l.is_complete) {
        total += log.sets.len() as u64 * XP_PER_SET;
        let exercises: HashSet<&str> =
            log.sets.iter().map(|s| s.exercise_id.as_str()).collect();
        total += exercises.len() as u64 * XP_PER_EXERCISE;
        total += XP_PER_WORKOUT;
    }
    total
}

/// Rebuild personal records from every set in every completed log,
/// keeping only the highest estimated 1RM per exercise.
pub fn recalculate_records(logs: &[WorkoutLog], catalog: &Catalog) -> Vec<PersonalRecord> {
    let mut best: HashMap<String, PersonalRecord> = HashMap::new();

    for log in logs.iter().filter(|l| l.is_complete) {
        for set in &log.sets {
            let estimated = estimate_one_rep_max(set.weight, set.reps);
            let beats = best
                .get(&set.exercise_id)
                .map(|pr| estimated > pr.estimated_1rm)
                .unwrap_or(true);
            if beats {
                best.insert(
                    set.exercise_id.clone(),
                    PersonalRecord {
                        exercise_id: set.exercise_id.clone(),
                        exercise_name: catalog.exercise_name(&set.exercise_id),
                        weight: set.weight,
                        reps: set.reps,
                        date: log.date,
                        estimated_1rm: estimated,
                    },
                );
            }
        }
    }

    let mut records: Vec<PersonalRecord> = best.into_values().collect();
    records.sort_by(|a, b| a.exercise_id.cmp(&b.exercise_id));
    records
}

// ============================================================================
// Stats Engine
// ============================================================================

/// Owns the persistent profile statistics and personal records
#[derive(Clone, Debug, Default)]
pub struct StatsEngine {
    pub stats: UserProfileStats,
    pub records: Vec<PersonalRecord>,
}

impl StatsEngine {
    pub fn new(stats: UserProfileStats, records: Vec<PersonalRecord>) -> Self {
        Self { stats, records }
    }

    /// Add experience and recompute the level. XP never decreases
    /// through this call.
    pub fn award_experience(&mut self, amount: u64) {
        self.stats.xp += amount;
        self.stats.level = level_for_xp(self.stats.xp);
        tracing::debug!(amount, xp = self.stats.xp, level = self.stats.level, "awarded XP");
    }

    /// Check a freshly logged set against the stored PR for its
    /// exercise. Replaces and returns the record when the estimated
    /// 1RM beats (or first establishes) the previous best.
    pub fn check_personal_record(
        &mut self,
        exercise_id: &str,
        exercise_name: &str,
        weight: f64,
        reps: u32,
        date: NaiveDate,
    ) -> Option<PersonalRecord> {
        let estimated = estimate_one_rep_max(weight, reps);

        let existing = self.records.iter().position(|r| r.exercise_id == exercise_id);
        if let Some(idx) = existing {
            if estimated <= self.records[idx].estimated_1rm {
                return None;
            }
        }

        let record = PersonalRecord {
            exercise_id: exercise_id.to_string(),
            exercise_name: exercise_name.to_string(),
            weight,
            reps,
            date,
            estimated_1rm: estimated,
        };

        match existing {
            Some(idx) => self.records[idx] = record.clone(),
            None => self.records.push(record.clone()),
        }

        tracing::info!(exercise_id, estimated_1rm = estimated, "new personal record");
        Some(record)
    }

    /// Apply a completed workout: extend the streak, stamp the last
    /// workout date, and award the completion bonus plus the
    /// volume-beat bonus when the log out-lifts the previous completed
    /// log of the same template. Returns the XP awarded.
    pub fn record_completion(
        &mut self,
        log: &WorkoutLog,
        previous_same_template: Option<&WorkoutLog>,
    ) -> u64 {
        self.stats.current_streak_days += 1;
        self.stats.longest_streak_days = self
            .stats
            .longest_streak_days
            .max(self.stats.current_streak_days);
        self.stats.last_workout_date = Some(log.date);

        let mut awarded = XP_PER_WORKOUT;
        if let Some(previous) = previous_same_template {
            if log.total_volume > previous.total_volume {
                awarded += XP_VOLUME_BEAT;
            }
        }

        self.award_experience(awarded);
        awarded
    }

    /// Recompute the live streak against a real calendar date, without
    /// touching XP. Used at startup so a lapsed streak reads 0 before
    /// any mutation happens.
    pub fn refresh_streak(&mut self, logs: &[WorkoutLog], today: NaiveDate) {
        let streak = compute_streak(logs, today);
        self.stats.current_streak_days = streak.current;
        self.stats.longest_streak_days =
            self.stats.longest_streak_days.max(streak.longest);
    }

    /// Full rebuild after a historical log deletion.
    ///
    /// XP comes from the fixed per-log formula (not the accumulated
    /// value, which may contain bonuses for logs that no longer
    /// exist), the level from that XP, the streak from the remaining
    /// logs with their newest date as the reference point, and the
    /// records from scratch. The longest streak is never revised
    /// downward. Idempotent: a second call over the same logs is a
    /// no-op.
    pub fn recalculate(&mut self, logs: &[WorkoutLog], catalog: &Catalog) {
        let xp = total_xp_from_logs(logs);
        self.stats.xp = xp;
        self.stats.level = level_for_xp(xp);

        let last_date = logs
            .iter()
            .filter(|l| l.is_complete)
            .map(|l| l.date)
            .max();

        match last_date {
            Some(reference) => {
                let streak = compute_streak(logs, reference);
                self.stats.current_streak_days = streak.current;
                self.stats.longest_streak_days =
                    self.stats.longest_streak_days.max(streak.current);
            }
            None => {
                self.stats.current_streak_days = 0;
            }
        }
        self.stats.last_workout_date = last_date;

        self.records = recalculate_records(logs, catalog);

        tracing::info!(
            xp,
            level = self.stats.level,
            streak = self.stats.current_streak_days,
            records = self.records.len(),
            "recalculated statistics from history"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::types::{Difficulty, SetEntry};
    use chrono::Utc;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn set(exercise_id: &str, set_number: usize, reps: u32, weight: f64) -> SetEntry {
        SetEntry {
            id: Uuid::new_v4(),
            exercise_id: exercise_id.into(),
            set_number,
            reps,
            weight,
            difficulty: Some(Difficulty::Ok),
            timestamp: Utc::now(),
        }
    }

    fn completed_log(d: &str, template_id: &str, sets: Vec<SetEntry>) -> WorkoutLog {
        let total_volume = sets.iter().map(|s| s.volume()).sum();
        WorkoutLog {
            id: Uuid::new_v4(),
            date: date(d),
            template_id: template_id.into(),
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
            duration_minutes: 45,
            total_volume,
            notes: String::new(),
            is_complete: true,
            sets,
            check_in: None,
        }
    }

    #[test]
    fn test_level_is_monotonic_in_xp() {
        let mut previous = 0;
        for xp in (0..20_000).step_by(50) {
            let level = level_for_xp(xp);
            assert!(level >= previous, "level regressed at {} XP", xp);
            previous = level;
        }
    }

    #[test]
    fn test_level_floor_is_one() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(199), 1);
        assert_eq!(level_for_xp(200), 2);
    }

    #[test]
    fn test_award_experience_never_decreases() {
        let mut engine = StatsEngine::default();
        engine.award_experience(150);
        assert_eq!(engine.stats.xp, 150);
        engine.award_experience(0);
        assert_eq!(engine.stats.xp, 150);
        engine.award_experience(100);
        assert_eq!(engine.stats.xp, 250);
        assert_eq!(engine.stats.level, 2);
    }

    #[test]
    fn test_epley_estimate() {
        assert!((estimate_one_rep_max(100.0, 10) - 133.33).abs() < 0.01);
        assert!((estimate_one_rep_max(120.0, 5) - 140.0).abs() < 1e-9);
        // Singles are not inflated
        assert_eq!(estimate_one_rep_max(225.0, 1), 225.0);
    }

    #[test]
    fn test_streak_empty_history() {
        let streak = compute_streak(&[], date("2025-03-10"));
        assert_eq!(streak, StreakSummary { current: 0, longest: 0, is_active: false });
    }

    #[test]
    fn test_streak_broken_after_two_day_gap() {
        // Thirty consecutive days, then a two-day gap to today
        let logs: Vec<WorkoutLog> = (1..=30)
            .map(|day| {
                completed_log(
                    &format!("2025-03-{:02}", day),
                    "push_day",
                    vec![set("bench_press", 1, 8, 100.0)],
                )
            })
            .collect();

        let streak = compute_streak(&logs, date("2025-04-01"));
        assert_eq!(streak.current, 0);
        assert!(!streak.is_active);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let logs = vec![
            completed_log("2025-03-08", "push_day", vec![set("bench_press", 1, 8, 100.0)]),
            completed_log("2025-03-09", "pull_day", vec![set("deadlift", 1, 5, 200.0)]),
            completed_log("2025-03-10", "leg_day", vec![set("squat", 1, 5, 185.0)]),
        ];

        let streak = compute_streak(&logs, date("2025-03-10"));
        assert_eq!(streak.current, 3);
        assert!(streak.is_active);
    }

    #[test]
    fn test_streak_same_day_collapses() {
        let logs = vec![
            completed_log("2025-03-09", "push_day", vec![set("bench_press", 1, 8, 100.0)]),
            completed_log("2025-03-10", "pull_day", vec![set("deadlift", 1, 5, 200.0)]),
            completed_log("2025-03-10", "leg_day", vec![set("squat", 1, 5, 185.0)]),
        ];

        let streak = compute_streak(&logs, date("2025-03-10"));
        assert_eq!(streak.current, 2);
    }

    #[test]
    fn test_streak_active_yesterday() {
        let logs = vec![
            completed_log("2025-03-09", "push_day", vec![set("bench_press", 1, 8, 100.0)]),
        ];

        let streak = compute_streak(&logs, date("2025-03-10"));
        assert_eq!(streak.current, 1);
        assert!(streak.is_active);
    }

    #[test]
    fn test_personal_record_scenario() {
        let mut engine = StatsEngine::default();

        let first = engine
            .check_personal_record("bench_press", "Bench Press", 100.0, 10, date("2025-03-01"));
        assert!(first.is_some());

        // 120x5 -> est 140, beats 100x10 -> est 133.3
        let second = engine
            .check_personal_record("bench_press", "Bench Press", 120.0, 5, date("2025-03-05"));
        let second = second.expect("heavier estimate should replace the record");
        assert!((second.estimated_1rm - 140.0).abs() < 1e-9);

        // Weaker set does not regress the record
        let third = engine
            .check_personal_record("bench_press", "Bench Press", 95.0, 8, date("2025-03-08"));
        assert!(third.is_none());
        assert!((engine.records[0].estimated_1rm - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_pr_monotonic_over_random_sets() {
        let mut engine = StatsEngine::default();
        let mut last = 0.0f64;
        let lifts = [(60.0, 12), (80.0, 8), (70.0, 5), (100.0, 3), (90.0, 10), (100.0, 1)];
        for (weight, reps) in lifts {
            engine.check_personal_record("squat", "Back Squat", weight, reps, date("2025-03-01"));
            let current = engine.records[0].estimated_1rm;
            assert!(current >= last);
            last = current;
        }
    }

    #[test]
    fn test_total_xp_formula() {
        // 3 sets over 2 distinct exercises in one completed workout:
        // 3*10 + 2*25 + 100 = 180
        let log = completed_log(
            "2025-03-10",
            "push_day",
            vec![
                set("bench_press", 1, 8, 100.0),
                set("bench_press", 2, 8, 100.0),
                set("overhead_press", 1, 8, 65.0),
            ],
        );
        assert_eq!(total_xp_from_logs(&[log]), 180);
    }

    #[test]
    fn test_incomplete_logs_earn_nothing() {
        let mut log = completed_log("2025-03-10", "push_day", vec![set("bench_press", 1, 8, 100.0)]);
        log.is_complete = false;
        assert_eq!(total_xp_from_logs(&[log]), 0);
    }

    #[test]
    fn test_recalculate_drops_phantom_xp() {
        let catalog = build_default_catalog();
        let keep = completed_log(
            "2025-03-09",
            "push_day",
            vec![set("bench_press", 1, 8, 100.0), set("bench_press", 2, 8, 100.0)],
        );
        let drop = completed_log(
            "2025-03-10",
            "pull_day",
            vec![
                set("deadlift", 1, 5, 225.0),
                set("deadlift", 2, 5, 225.0),
                set("barbell_row", 1, 8, 135.0),
            ],
        );

        let mut engine = StatsEngine::default();
        engine.recalculate(&[keep.clone(), drop.clone()], &catalog);
        let xp_before = engine.stats.xp;

        engine.recalculate(&[keep], &catalog);
        // Deleted log contributed 3 sets, 2 distinct exercises, 1 completion
        assert_eq!(xp_before - engine.stats.xp, 3 * 10 + 2 * 25 + 100);
    }

    #[test]
    fn test_recalculate_is_idempotent() {
        let catalog = build_default_catalog();
        let logs = vec![
            completed_log("2025-03-08", "push_day", vec![set("bench_press", 1, 8, 100.0)]),
            completed_log("2025-03-09", "pull_day", vec![set("deadlift", 1, 5, 225.0)]),
        ];

        let mut engine = StatsEngine::default();
        engine.recalculate(&logs, &catalog);
        let stats_once = engine.stats.clone();
        let records_once = engine.records.clone();

        engine.recalculate(&logs, &catalog);
        assert_eq!(engine.stats.xp, stats_once.xp);
        assert_eq!(engine.stats.level, stats_once.level);
        assert_eq!(engine.stats.current_streak_days, stats_once.current_streak_days);
        assert_eq!(engine.stats.last_workout_date, stats_once.last_workout_date);
        assert_eq!(engine.records.len(), records_once.len());
        for (a, b) in engine.records.iter().zip(records_once.iter()) {
            assert_eq!(a.exercise_id, b.exercise_id);
            assert_eq!(a.estimated_1rm, b.estimated_1rm);
        }
    }

    #[test]
    fn test_recalculate_never_lowers_longest_streak() {
        let catalog = build_default_catalog();
        let mut engine = StatsEngine::default();
        engine.stats.longest_streak_days = 30;

        let logs = vec![
            completed_log("2025-03-10", "push_day", vec![set("bench_press", 1, 8, 100.0)]),
        ];
        engine.recalculate(&logs, &catalog);

        assert_eq!(engine.stats.current_streak_days, 1);
        assert_eq!(engine.stats.longest_streak_days, 30);
    }

    #[test]
    fn test_recalculate_resolves_unknown_exercise_to_raw_id() {
        let catalog = build_default_catalog();
        let logs = vec![
            completed_log("2025-03-10", "push_day", vec![set("mystery_machine", 1, 8, 50.0)]),
        ];

        let mut engine = StatsEngine::default();
        engine.recalculate(&logs, &catalog);
        assert_eq!(engine.records.len(), 1);
        assert_eq!(engine.records[0].exercise_name, "mystery_machine");
    }

    #[test]
    fn test_record_completion_awards_volume_beat() {
        let previous = completed_log(
            "2025-03-09",
            "push_day",
            vec![set("bench_press", 1, 8, 100.0)],
        );
        let bigger = completed_log(
            "2025-03-10",
            "push_day",
            vec![set("bench_press", 1, 10, 100.0)],
        );

        let mut engine = StatsEngine::default();
        let awarded = engine.record_completion(&bigger, Some(&previous));
        assert_eq!(awarded, 150);
        assert_eq!(engine.stats.current_streak_days, 1);
        assert_eq!(engine.stats.last_workout_date, Some(date("2025-03-10")));
    }

    #[test]
    fn test_record_completion_without_previous() {
        let log = completed_log("2025-03-10", "push_day", vec![set("bench_press", 1, 8, 100.0)]);
        let mut engine = StatsEngine::default();
        let awarded = engine.record_completion(&log, None);
        assert_eq!(awarded, 100);
    }

    #[test]
    fn test_refresh_streak_zeroes_lapsed_streak() {
        let logs = vec![
            completed_log("2025-03-01", "push_day", vec![set("bench_press", 1, 8, 100.0)]),
        ];
        let mut engine = StatsEngine::default();
        engine.stats.current_streak_days = 12;
        engine.stats.longest_streak_days = 12;

        engine.refresh_streak(&logs, date("2025-03-10"));
        assert_eq!(engine.stats.current_streak_days, 0);
        assert_eq!(engine.stats.longest_streak_days, 12);
    }
}
