//! Session engine: the in-progress workout state machine.
//!
//! The engine owns the full log collection plus the optional active
//! session (cursor, rest timer). At most one incomplete log exists at
//! a time; starting a second workout is rejected. Every rejected
//! operation leaves state untouched.

use crate::cursor::{derive_cursor, Cursor};
use crate::error::{Error, Result};
use crate::events::{Event, XpReason};
use crate::store::Clock;
use crate::types::{Catalog, CheckIn, Difficulty, ExerciseTemplate, SetEntry, WorkoutLog};
use crate::catalog::{XP_PER_EXERCISE, XP_PER_SET};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The resumable in-progress session attached to an incomplete log
#[derive(Clone, Debug)]
pub struct ActiveSession {
    pub log_id: Uuid,
    pub cursor: Cursor,
    pub is_resting: bool,
    pub rest_seconds_remaining: u32,
}

/// The persistable part of an active session. Manual cursor moves
/// (skipping a set, jumping to an exercise) are not reconstructable
/// from the logged sets, so the cursor itself is stored between
/// invocations; the rest timer is not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub log_id: Uuid,
    pub cursor: Cursor,
}

/// Owns the single active workout and the log history it lives in
pub struct SessionEngine {
    catalog: Catalog,
    logs: Vec<WorkoutLog>,
    active: Option<ActiveSession>,
    clock: Box<dyn Clock>,
    events: Vec<Event>,
}

impl SessionEngine {
    pub fn new(catalog: Catalog, logs: Vec<WorkoutLog>, clock: Box<dyn Clock>) -> Self {
        Self {
            catalog,
            logs,
            active: None,
            clock,
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn logs(&self) -> &[WorkoutLog] {
        &self.logs
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    /// The incomplete log the active session is attached to
    pub fn active_log(&self) -> Option<&WorkoutLog> {
        let session = self.active.as_ref()?;
        self.logs.iter().find(|l| l.id == session.log_id)
    }

    /// The exercise the cursor currently points at, if any
    pub fn current_exercise(&self) -> Option<&ExerciseTemplate> {
        let session = self.active.as_ref()?;
        let log = self.logs.iter().find(|l| l.id == session.log_id)?;
        let template = self.catalog.template(&log.template_id)?;
        template.exercises.get(session.cursor.exercise_index)
    }

    /// Whether the cursor has advanced past the last exercise
    pub fn is_workout_complete(&self) -> bool {
        let Some(session) = self.active.as_ref() else {
            return false;
        };
        let Some(log) = self.logs.iter().find(|l| l.id == session.log_id) else {
            return false;
        };
        match self.catalog.template(&log.template_id) {
            Some(template) => session.cursor.is_past_end(template),
            None => false,
        }
    }

    /// Take the events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn incomplete_log(&self) -> Option<&WorkoutLog> {
        self.logs.iter().find(|l| !l.is_complete)
    }

    fn require_active(&self) -> Result<&ActiveSession> {
        self.active
            .as_ref()
            .ok_or_else(|| Error::InvalidOperation("no workout in progress".into()))
    }

    // ------------------------------------------------------------------
    // Lifecycle transitions
    // ------------------------------------------------------------------

    /// Start a new workout from a template. Rejected while another
    /// incomplete log exists; resume or discard it first.
    pub fn start_workout(&mut self, template_id: &str, date: NaiveDate) -> Result<Uuid> {
        if let Some(existing) = self.incomplete_log() {
            return Err(Error::InvalidOperation(format!(
                "workout {} is still in progress; resume or discard it first",
                existing.id
            )));
        }
        if self.catalog.template(template_id).is_none() {
            return Err(Error::NotFound(format!("template '{}'", template_id)));
        }

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            date,
            template_id: template_id.to_string(),
            started_at: self.clock.now(),
            ended_at: None,
            duration_minutes: 0,
            total_volume: 0.0,
            notes: String::new(),
            is_complete: false,
            sets: Vec::new(),
            check_in: None,
        };
        let id = log.id;
        self.logs.push(log);
        self.active = Some(ActiveSession {
            log_id: id,
            cursor: Cursor { exercise_index: 0, set_index: 0 },
            is_resting: false,
            rest_seconds_remaining: 0,
        });

        tracing::info!(%id, template_id, "started workout");
        Ok(id)
    }

    /// The persistable view of the active session, if any
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.active.as_ref().map(|s| SessionSnapshot {
            log_id: s.log_id,
            cursor: s.cursor,
        })
    }

    /// Best-effort re-attach at startup. A stored snapshot that still
    /// matches the incomplete log restores its cursor exactly,
    /// preserving manual skips and jumps; anything stale falls back to
    /// from-scratch derivation. Leaves the engine detached when no
    /// workout is in progress.
    pub fn restore(&mut self, snapshot: Option<SessionSnapshot>) {
        if self.active.is_some() {
            return;
        }

        if let Some(snap) = snapshot {
            let log = self
                .logs
                .iter()
                .find(|l| l.id == snap.log_id && !l.is_complete);
            if let Some(log) = log {
                if let Some(template) = self.catalog.template(&log.template_id) {
                    if snap.cursor.exercise_index <= template.exercises.len() {
                        self.active = Some(ActiveSession {
                            log_id: snap.log_id,
                            cursor: snap.cursor,
                            is_resting: false,
                            rest_seconds_remaining: 0,
                        });
                        tracing::debug!(log_id = %snap.log_id, cursor = ?snap.cursor, "restored session cursor");
                        return;
                    }
                }
            }
        }

        if self.incomplete_log().is_some() {
            self.resume().ok();
        }
    }

    /// Attach to the stored incomplete log, deriving the cursor from
    /// its set entries. No-op when already attached.
    pub fn resume(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Ok(());
        }

        let log = self
            .incomplete_log()
            .ok_or_else(|| Error::InvalidOperation("no workout in progress".into()))?;
        let template = self
            .catalog
            .template(&log.template_id)
            .ok_or_else(|| Error::NotFound(format!("template '{}'", log.template_id)))?;

        let cursor = derive_cursor(template, &log.sets);
        let log_id = log.id;
        self.active = Some(ActiveSession {
            log_id,
            cursor,
            is_resting: false,
            rest_seconds_remaining: 0,
        });

        tracing::info!(%log_id, ?cursor, "resumed workout");
        Ok(())
    }

    /// Detach from the active session, leaving the incomplete log in
    /// history for a later resume.
    pub fn pause_workout(&mut self) -> Result<()> {
        self.require_active()?;
        self.active = None;
        Ok(())
    }

    /// Delete the active workout log entirely. Irreversible.
    pub fn discard_workout(&mut self) -> Result<()> {
        let session = self.require_active()?;
        let log_id = session.log_id;
        self.logs.retain(|l| l.id != log_id);
        self.active = None;
        tracing::info!(%log_id, "discarded workout");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Set mutations
    // ------------------------------------------------------------------

    /// Log a set at the cursor position. Emits SetLogged plus the XP
    /// signals for the set and, when this fills the exercise's target,
    /// for the exercise.
    pub fn log_set(
        &mut self,
        reps: u32,
        weight: f64,
        difficulty: Option<Difficulty>,
    ) -> Result<SetEntry> {
        let session = self.require_active()?;
        if reps == 0 || weight <= 0.0 {
            return Err(Error::InvalidOperation(
                "a set needs positive reps and weight".into(),
            ));
        }

        let log_id = session.log_id;
        let exercise_index = session.cursor.exercise_index;
        let log = self
            .logs
            .iter()
            .find(|l| l.id == log_id)
            .ok_or_else(|| Error::NotFound(format!("log {}", log_id)))?;
        let template = self
            .catalog
            .template(&log.template_id)
            .ok_or_else(|| Error::NotFound(format!("template '{}'", log.template_id)))?;
        let exercise = template.exercises.get(exercise_index).ok_or_else(|| {
            Error::InvalidOperation("workout is already complete".into())
        })?;

        let exercise_id = exercise.id.clone();
        let target_sets = exercise.target_sets;
        let set_number = log.sets_for_exercise(&exercise_id) + 1;

        let entry = SetEntry {
            id: Uuid::new_v4(),
            exercise_id: exercise_id.clone(),
            set_number,
            reps,
            weight,
            difficulty,
            timestamp: self.clock.now(),
        };

        let log = self
            .logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .expect("active log verified above");
        log.sets.push(entry.clone());
        log.total_volume = log.computed_volume();

        self.events.push(Event::SetLogged {
            exercise_id: exercise_id.clone(),
            set_number,
        });
        self.events.push(Event::ExperienceEarned {
            amount: XP_PER_SET,
            reason: XpReason::SetCompleted,
        });
        if set_number >= target_sets {
            self.events.push(Event::ExperienceEarned {
                amount: XP_PER_EXERCISE,
                reason: XpReason::ExerciseCompleted,
            });
        }

        tracing::debug!(exercise_id, set_number, reps, weight, "logged set");
        Ok(entry)
    }

    /// Edit a previously logged set, keeping the running volume in sync
    pub fn edit_set(
        &mut self,
        set_id: Uuid,
        reps: u32,
        weight: f64,
        difficulty: Option<Difficulty>,
    ) -> Result<()> {
        let session = self.require_active()?;
        if reps == 0 || weight <= 0.0 {
            return Err(Error::InvalidOperation(
                "a set needs positive reps and weight".into(),
            ));
        }

        let log_id = session.log_id;
        let log = self
            .logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| Error::NotFound(format!("log {}", log_id)))?;
        let set = log
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .ok_or_else(|| Error::NotFound(format!("set {}", set_id)))?;

        set.reps = reps;
        set.weight = weight;
        set.difficulty = difficulty;
        log.total_volume = log.computed_volume();
        Ok(())
    }

    /// Delete a logged set. Deletion can move the position backward
    /// into an earlier exercise, so the cursor is re-derived from
    /// scratch and any rest is cancelled.
    pub fn delete_set(&mut self, set_id: Uuid) -> Result<()> {
        let session = self.require_active()?;
        let log_id = session.log_id;

        let log = self
            .logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .ok_or_else(|| Error::NotFound(format!("log {}", log_id)))?;
        if !log.sets.iter().any(|s| s.id == set_id) {
            return Err(Error::NotFound(format!("set {}", set_id)));
        }

        log.sets.retain(|s| s.id != set_id);
        log.total_volume = log.computed_volume();

        let template = self
            .catalog
            .template(&log.template_id)
            .ok_or_else(|| Error::NotFound(format!("template '{}'", log.template_id)))?;
        let cursor = derive_cursor(template, &log.sets);

        let session = self.active.as_mut().expect("active session verified above");
        session.cursor = cursor;
        session.is_resting = false;
        session.rest_seconds_remaining = 0;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cursor movement
    // ------------------------------------------------------------------

    /// Forward-only advance: next set, rolling over to the next
    /// exercise when the current one's target is met. Used right after
    /// logging a set; after deletions the from-scratch derivation is
    /// authoritative instead.
    pub fn next_set(&mut self) -> Result<()> {
        let session = self.require_active()?;
        let log_id = session.log_id;
        let log = self
            .logs
            .iter()
            .find(|l| l.id == log_id)
            .ok_or_else(|| Error::NotFound(format!("log {}", log_id)))?;
        let template = self
            .catalog
            .template(&log.template_id)
            .ok_or_else(|| Error::NotFound(format!("template '{}'", log.template_id)))?;

        let session = self.active.as_mut().expect("active session verified above");
        let Some(exercise) = template.exercises.get(session.cursor.exercise_index) else {
            return Err(Error::InvalidOperation("workout is already complete".into()));
        };

        session.cursor.set_index += 1;
        if session.cursor.set_index >= exercise.target_sets {
            session.cursor.set_index = 0;
            session.cursor.exercise_index += 1;
        }
        session.is_resting = false;
        session.rest_seconds_remaining = 0;
        Ok(())
    }

    /// Manual out-of-order navigation: point the cursor at an exercise,
    /// with the set index derived from what is already logged there.
    pub fn jump_to_exercise(&mut self, exercise_index: usize) -> Result<()> {
        let session = self.require_active()?;
        let log_id = session.log_id;
        let log = self
            .logs
            .iter()
            .find(|l| l.id == log_id)
            .ok_or_else(|| Error::NotFound(format!("log {}", log_id)))?;
        let template = self
            .catalog
            .template(&log.template_id)
            .ok_or_else(|| Error::NotFound(format!("template '{}'", log.template_id)))?;
        let exercise = template.exercises.get(exercise_index).ok_or_else(|| {
            Error::InvalidOperation(format!("no exercise at index {}", exercise_index))
        })?;

        let set_index = log.sets_for_exercise(&exercise.id);
        let session = self.active.as_mut().expect("active session verified above");
        session.cursor = Cursor { exercise_index, set_index };
        session.is_resting = false;
        session.rest_seconds_remaining = 0;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rest timer
    // ------------------------------------------------------------------

    pub fn start_rest(&mut self, duration_seconds: u32) -> Result<()> {
        self.require_active()?;
        let session = self.active.as_mut().expect("active session verified above");
        session.is_resting = true;
        session.rest_seconds_remaining = duration_seconds;
        Ok(())
    }

    /// One second of rest elapsed. Driven by an external scheduler;
    /// floors at zero and emits RestFinished on the tick that reaches
    /// it. No-op when not resting.
    pub fn tick_rest(&mut self) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        if !session.is_resting || session.rest_seconds_remaining == 0 {
            return;
        }
        session.rest_seconds_remaining -= 1;
        if session.rest_seconds_remaining == 0 {
            self.events.push(Event::RestFinished);
        }
    }

    pub fn skip_rest(&mut self) -> Result<()> {
        self.require_active()?;
        let session = self.active.as_mut().expect("active session verified above");
        session.is_resting = false;
        session.rest_seconds_remaining = 0;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Completion and history
    // ------------------------------------------------------------------

    /// Finish the active workout and hand the completed log to the
    /// statistics engine. Only valid once the cursor has advanced past
    /// the last exercise.
    pub fn complete_workout(
        &mut self,
        check_in: Option<CheckIn>,
        notes: &str,
        stats: &mut crate::stats::StatsEngine,
    ) -> Result<WorkoutLog> {
        let session = self.require_active()?;
        let log_id = session.log_id;

        if !self.is_workout_complete() {
            return Err(Error::InvalidOperation(
                "exercises remaining; finish or skip them first".into(),
            ));
        }

        let template_id = self
            .logs
            .iter()
            .find(|l| l.id == log_id)
            .map(|l| l.template_id.clone())
            .ok_or_else(|| Error::NotFound(format!("log {}", log_id)))?;

        // The previous completed log of the same template decides the
        // volume-beat bonus; the current log is still incomplete here
        // so it never matches itself.
        let previous = self
            .logs
            .iter()
            .filter(|l| l.is_complete && l.template_id == template_id)
            .max_by_key(|l| (l.date, l.started_at))
            .cloned();

        let now = self.clock.now();
        let log = self
            .logs
            .iter_mut()
            .find(|l| l.id == log_id)
            .expect("active log verified above");
        let elapsed = now - log.started_at;
        log.ended_at = Some(now);
        log.duration_minutes = ((elapsed.num_seconds() as f64) / 60.0).round().max(0.0) as u32;
        log.is_complete = true;
        log.notes = notes.to_string();
        log.check_in = check_in;
        let completed = log.clone();

        let awarded = stats.record_completion(&completed, previous.as_ref());
        self.events.push(Event::WorkoutCompleted {
            log_id,
            total_volume: completed.total_volume,
            xp_awarded: awarded,
        });
        self.active = None;

        tracing::info!(%log_id, volume = completed.total_volume, awarded, "completed workout");
        Ok(completed)
    }

    /// Delete a log from history and rebuild all derived statistics
    /// from what remains. Deleting the active log detaches the session
    /// as well.
    pub fn delete_log(
        &mut self,
        log_id: Uuid,
        stats: &mut crate::stats::StatsEngine,
    ) -> Result<()> {
        if !self.logs.iter().any(|l| l.id == log_id) {
            return Err(Error::NotFound(format!("log {}", log_id)));
        }

        self.logs.retain(|l| l.id != log_id);
        if self.active.as_ref().map(|s| s.log_id) == Some(log_id) {
            self.active = None;
        }

        stats.recalculate(&self.logs, &self.catalog);
        tracing::info!(%log_id, "deleted workout log and recalculated statistics");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::stats::StatsEngine;
    use crate::store::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    fn engine() -> SessionEngine {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap());
        SessionEngine::new(build_default_catalog(), Vec::new(), Box::new(clock))
    }

    fn today() -> NaiveDate {
        "2025-03-10".parse().unwrap()
    }

    fn fill_workout(engine: &mut SessionEngine) {
        while !engine.is_workout_complete() {
            engine.log_set(8, 100.0, Some(Difficulty::Ok)).unwrap();
            engine.next_set().unwrap();
        }
    }

    #[test]
    fn test_start_rejects_second_active_workout() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        let err = engine.start_workout("pull_day", today()).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert_eq!(engine.logs().len(), 1);
    }

    #[test]
    fn test_start_rejects_unknown_template() {
        let mut engine = engine();
        let err = engine.start_workout("yoga_day", today()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(engine.logs().is_empty());
    }

    #[test]
    fn test_scenario_two_sets_volume_and_cursor() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();

        engine.log_set(10, 100.0, None).unwrap();
        engine.next_set().unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        engine.next_set().unwrap();

        let log = engine.active_log().unwrap();
        assert_eq!(log.total_volume, 1800.0);
        // bench_press targets 3 sets, so the cursor stays on it
        let cursor = engine.active().unwrap().cursor;
        assert_eq!(cursor.exercise_index, 0);
        assert_eq!(cursor.set_index, 2);
    }

    #[test]
    fn test_edit_set_adjusts_volume_by_delta() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        let entry = engine.log_set(10, 100.0, None).unwrap();
        assert_eq!(engine.active_log().unwrap().total_volume, 1000.0);

        engine.edit_set(entry.id, 8, 110.0, Some(Difficulty::Hard)).unwrap();
        // (8*110) - (10*100) = -120
        assert_eq!(engine.active_log().unwrap().total_volume, 880.0);
    }

    #[test]
    fn test_edit_unknown_set_leaves_state_unchanged() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(10, 100.0, None).unwrap();

        let err = engine.edit_set(Uuid::new_v4(), 5, 50.0, None).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(engine.active_log().unwrap().total_volume, 1000.0);
    }

    #[test]
    fn test_volume_invariant_across_mutations() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();

        let first = engine.log_set(10, 100.0, None).unwrap();
        engine.next_set().unwrap();
        engine.log_set(8, 105.0, None).unwrap();
        engine.next_set().unwrap();
        engine.edit_set(first.id, 9, 100.0, None).unwrap();
        engine.log_set(12, 60.0, None).unwrap();

        let log = engine.active_log().unwrap();
        assert_eq!(log.total_volume, log.computed_volume());

        let last = log.sets.last().unwrap().id;
        engine.delete_set(last).unwrap();
        let log = engine.active_log().unwrap();
        assert_eq!(log.total_volume, log.computed_volume());
    }

    #[test]
    fn test_delete_set_rederives_cursor_and_stops_rest() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();

        // Fill the first exercise, move on, then rest
        let first = engine.log_set(10, 100.0, None).unwrap();
        engine.next_set().unwrap();
        engine.log_set(10, 100.0, None).unwrap();
        engine.next_set().unwrap();
        engine.log_set(10, 100.0, None).unwrap();
        engine.next_set().unwrap();
        assert_eq!(engine.active().unwrap().cursor.exercise_index, 1);
        engine.start_rest(90).unwrap();

        engine.delete_set(first.id).unwrap();

        let session = engine.active().unwrap();
        // Back to the first exercise, at the count of remaining sets
        assert_eq!(session.cursor.exercise_index, 0);
        assert_eq!(session.cursor.set_index, 2);
        assert!(!session.is_resting);
        assert_eq!(session.rest_seconds_remaining, 0);
    }

    #[test]
    fn test_incremental_advance_matches_derivation() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();

        loop {
            if engine.is_workout_complete() {
                break;
            }
            engine.log_set(8, 100.0, None).unwrap();

            let log = engine.active_log().unwrap();
            let template = engine.catalog().template(&log.template_id).unwrap();
            let derived = derive_cursor(template, &log.sets);

            engine.next_set().unwrap();
            assert_eq!(engine.active().unwrap().cursor, derived);
        }
    }

    #[test]
    fn test_log_set_rejects_zero_reps_and_weight() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        assert!(engine.log_set(0, 100.0, None).is_err());
        assert!(engine.log_set(10, 0.0, None).is_err());
        assert!(engine.active_log().unwrap().sets.is_empty());
    }

    #[test]
    fn test_log_set_emits_xp_signals() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.drain_events();

        engine.log_set(8, 100.0, None).unwrap();
        let events = engine.drain_events();
        assert!(matches!(events[0], Event::SetLogged { .. }));
        assert!(matches!(
            events[1],
            Event::ExperienceEarned { amount: 10, reason: XpReason::SetCompleted }
        ));
        assert_eq!(events.len(), 2);

        // Filling the exercise target adds the exercise bonus
        engine.next_set().unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        engine.next_set().unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::ExperienceEarned { amount: 25, reason: XpReason::ExerciseCompleted }
        )));
    }

    #[test]
    fn test_jump_to_exercise_derives_set_index() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        engine.start_rest(60).unwrap();

        engine.jump_to_exercise(2).unwrap();
        let session = engine.active().unwrap();
        assert_eq!(session.cursor.exercise_index, 2);
        assert_eq!(session.cursor.set_index, 0);
        assert!(!session.is_resting);

        engine.jump_to_exercise(0).unwrap();
        assert_eq!(engine.active().unwrap().cursor.set_index, 1);
    }

    #[test]
    fn test_rest_timer_floors_at_zero_and_signals() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.start_rest(2).unwrap();
        engine.drain_events();

        engine.tick_rest();
        assert_eq!(engine.active().unwrap().rest_seconds_remaining, 1);
        assert!(engine.drain_events().is_empty());

        engine.tick_rest();
        assert_eq!(engine.active().unwrap().rest_seconds_remaining, 0);
        let events = engine.drain_events();
        assert!(matches!(events.as_slice(), [Event::RestFinished]));

        // Further ticks stay floored and stay quiet
        engine.tick_rest();
        assert_eq!(engine.active().unwrap().rest_seconds_remaining, 0);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_pause_and_resume_rebuild_cursor() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        engine.next_set().unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        engine.next_set().unwrap();

        engine.pause_workout().unwrap();
        assert!(engine.active().is_none());
        assert_eq!(engine.logs().len(), 1);

        engine.resume().unwrap();
        let cursor = engine.active().unwrap().cursor;
        assert_eq!(cursor.exercise_index, 0);
        assert_eq!(cursor.set_index, 2);
    }

    #[test]
    fn test_restore_preserves_skipped_cursor() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(8, 100.0, None).unwrap();
        engine.next_set().unwrap();
        // Skip a set without logging it
        engine.next_set().unwrap();
        let cursor = engine.active().unwrap().cursor;
        assert_eq!(cursor.set_index, 2);

        let snapshot = engine.snapshot();
        let logs = engine.logs().to_vec();

        // A fresh engine (new process) re-attaches at the skipped
        // position, not at the derived one
        let mut fresh = SessionEngine::new(
            build_default_catalog(),
            logs,
            Box::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap())),
        );
        fresh.restore(snapshot);
        assert_eq!(fresh.active().unwrap().cursor, cursor);
    }

    #[test]
    fn test_restore_with_stale_snapshot_falls_back_to_derivation() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(8, 100.0, None).unwrap();

        // Snapshot referencing a log that no longer exists
        let stale = SessionSnapshot {
            log_id: Uuid::new_v4(),
            cursor: Cursor { exercise_index: 2, set_index: 1 },
        };
        let logs = engine.logs().to_vec();

        let mut fresh = SessionEngine::new(
            build_default_catalog(),
            logs,
            Box::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap())),
        );
        fresh.restore(Some(stale));
        let cursor = fresh.active().unwrap().cursor;
        assert_eq!(cursor.exercise_index, 0);
        assert_eq!(cursor.set_index, 1);
    }

    #[test]
    fn test_restore_without_incomplete_log_stays_detached() {
        let mut engine = engine();
        engine.restore(None);
        assert!(engine.active().is_none());
    }

    #[test]
    fn test_resume_without_incomplete_log_fails() {
        let mut engine = engine();
        let err = engine.resume().unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn test_discard_removes_log_from_history() {
        let mut engine = engine();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(8, 100.0, None).unwrap();

        engine.discard_workout().unwrap();
        assert!(engine.active().is_none());
        assert!(engine.logs().is_empty());
    }

    #[test]
    fn test_complete_rejected_with_exercises_remaining() {
        let mut engine = engine();
        let mut stats = StatsEngine::default();
        engine.start_workout("push_day", today()).unwrap();
        engine.log_set(8, 100.0, None).unwrap();

        let err = engine.complete_workout(None, "", &mut stats).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
        assert!(!engine.logs()[0].is_complete);
        assert_eq!(stats.stats.xp, 0);
    }

    #[test]
    fn test_complete_workout_stamps_duration_and_hands_off() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        let handle = clock.clone();
        let mut engine =
            SessionEngine::new(build_default_catalog(), Vec::new(), Box::new(clock));
        let mut stats = StatsEngine::default();

        engine.start_workout("push_day", today()).unwrap();
        fill_workout(&mut engine);
        handle.set(start + Duration::minutes(42) + Duration::seconds(20));

        let completed = engine.complete_workout(None, "solid session", &mut stats).unwrap();
        assert!(completed.is_complete);
        assert_eq!(completed.duration_minutes, 42);
        assert_eq!(completed.notes, "solid session");
        assert!(engine.active().is_none());
        assert_eq!(stats.stats.current_streak_days, 1);
        assert_eq!(stats.stats.last_workout_date, Some(today()));
        assert_eq!(stats.stats.xp, 100);

        let events = engine.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::WorkoutCompleted { xp_awarded: 100, .. })));
    }

    #[test]
    fn test_second_completion_earns_volume_beat() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        let mut engine =
            SessionEngine::new(build_default_catalog(), Vec::new(), Box::new(clock));
        let mut stats = StatsEngine::default();

        engine.start_workout("push_day", today()).unwrap();
        fill_workout(&mut engine);
        engine.complete_workout(None, "", &mut stats).unwrap();
        let baseline = stats.stats.xp;

        // Same template, heavier sets
        engine.start_workout("push_day", today()).unwrap();
        while !engine.is_workout_complete() {
            engine.log_set(8, 120.0, None).unwrap();
            engine.next_set().unwrap();
        }
        engine.complete_workout(None, "", &mut stats).unwrap();
        assert_eq!(stats.stats.xp - baseline, 150);
    }

    #[test]
    fn test_delete_log_triggers_full_recalculation() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap();
        let mut engine = SessionEngine::new(
            build_default_catalog(),
            Vec::new(),
            Box::new(FixedClock::new(start)),
        );
        let mut stats = StatsEngine::default();

        engine.start_workout("push_day", today()).unwrap();
        fill_workout(&mut engine);
        let completed = engine.complete_workout(None, "", &mut stats).unwrap();

        // Seed XP with per-set awards so deletion visibly rebuilds from
        // the fixed formula
        stats.award_experience(500);

        engine.delete_log(completed.id, &mut stats).unwrap();
        assert!(engine.logs().is_empty());
        assert_eq!(stats.stats.xp, 0);
        assert_eq!(stats.stats.level, 1);
        assert_eq!(stats.stats.current_streak_days, 0);
        assert!(stats.records.is_empty());
    }

    #[test]
    fn test_delete_unknown_log_is_rejected() {
        let mut engine = engine();
        let mut stats = StatsEngine::default();
        let err = engine.delete_log(Uuid::new_v4(), &mut stats).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_operations_without_session_are_rejected() {
        let mut engine = engine();
        assert!(engine.log_set(8, 100.0, None).is_err());
        assert!(engine.edit_set(Uuid::new_v4(), 8, 100.0, None).is_err());
        assert!(engine.delete_set(Uuid::new_v4()).is_err());
        assert!(engine.next_set().is_err());
        assert!(engine.jump_to_exercise(0).is_err());
        assert!(engine.start_rest(60).is_err());
        assert!(engine.skip_rest().is_err());
        assert!(engine.pause_workout().is_err());
        assert!(engine.discard_workout().is_err());
        engine.tick_rest(); // explicit no-op
        assert!(engine.logs().is_empty());
    }
}
