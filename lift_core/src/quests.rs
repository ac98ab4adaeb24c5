//! Weekly quests.
//!
//! Two quests are drawn from the pool each week (Monday start) and
//! their progress is derived from the completed logs falling inside
//! the week, never stored incrementally. Completing a quest awards its
//! XP reward exactly once.

use crate::catalog::QUEST_TEMPLATES;
use crate::stats::compute_streak;
use crate::types::{Quest, QuestKind, WorkoutLog};
use chrono::{NaiveDate, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use uuid::Uuid;

fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = today.week(Weekday::Mon);
    (week.first_day(), week.last_day())
}

/// Whether the stored quests are missing or belong to an earlier week
pub fn quests_need_rotation(quests: &[Quest], today: NaiveDate) -> bool {
    match quests.first() {
        None => true,
        Some(quest) => today > quest.week_end,
    }
}

/// Draw two quests from the pool for the week containing `today`
pub fn generate_weekly_quests<R: Rng>(today: NaiveDate, rng: &mut R) -> Vec<Quest> {
    let (week_start, week_end) = week_bounds(today);
    QUEST_TEMPLATES
        .choose_multiple(rng, 2)
        .map(|template| Quest {
            id: Uuid::new_v4(),
            name: template.name.to_string(),
            description: template.description.to_string(),
            kind: template.kind,
            target: template.target,
            current: 0,
            xp_reward: template.xp_reward,
            week_start,
            week_end,
            is_complete: false,
        })
        .collect()
}

/// Progress of one quest kind over the completed logs of its week
fn quest_progress(
    kind: QuestKind,
    logs: &[WorkoutLog],
    week_start: NaiveDate,
    week_end: NaiveDate,
    today: NaiveDate,
) -> u64 {
    let in_week = || {
        logs.iter()
            .filter(move |l| l.is_complete && l.date >= week_start && l.date <= week_end)
    };

    match kind {
        QuestKind::Workouts => in_week().count() as u64,
        QuestKind::Sets => in_week().map(|l| l.sets.len() as u64).sum(),
        QuestKind::Volume => in_week().map(|l| l.total_volume).sum::<f64>() as u64,
        QuestKind::Variety => {
            let templates: HashSet<&str> =
                in_week().map(|l| l.template_id.as_str()).collect();
            templates.len() as u64
        }
        QuestKind::Streak => compute_streak(logs, today).current as u64,
    }
}

/// Re-derive every quest's progress from the logs.
///
/// Returns the XP for quests that crossed their target on this pass.
/// Already-completed quests keep their flag and award nothing again,
/// so calling this repeatedly over the same logs is a no-op.
pub fn update_quest_progress(
    quests: &mut [Quest],
    logs: &[WorkoutLog],
    today: NaiveDate,
) -> u64 {
    let mut awarded = 0u64;

    for quest in quests.iter_mut() {
        if today < quest.week_start || today > quest.week_end {
            continue;
        }
        quest.current =
            quest_progress(quest.kind, logs, quest.week_start, quest.week_end, today);
        if !quest.is_complete && quest.current >= quest.target {
            quest.is_complete = true;
            awarded += quest.xp_reward;
            tracing::info!(quest = %quest.name, reward = quest.xp_reward, "quest completed");
        }
    }

    awarded
}
