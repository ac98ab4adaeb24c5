use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use lift_core::events::XpReason;
use lift_core::stats::{level_title, total_xp_from_logs};
use lift_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftmeup")]
#[command(about = "Personal workout tracker with streaks, XP and PRs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override profile name
    #[arg(long, global = true)]
    profile: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new workout from a template
    Start {
        /// Template id (see `templates`)
        template: String,

        /// Workout date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List the available workout templates
    Templates,

    /// Show the in-progress workout and cursor position
    Status,

    /// Log a set at the current position and advance
    Log {
        reps: u32,
        weight: f64,

        /// Perceived difficulty (easy, ok, hard)
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Edit a previously logged set
    Edit {
        set_id: Uuid,
        reps: u32,
        weight: f64,

        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Delete a logged set (recomputes the position)
    DeleteSet { set_id: Uuid },

    /// Advance to the next set without logging
    Next,

    /// Jump to an exercise by its position in the template (0-based)
    Jump { exercise: usize },

    /// Run a rest countdown
    Rest {
        /// Duration in seconds; defaults to the configured rest time
        #[arg(long)]
        seconds: Option<u32>,

        /// Tick instantly instead of sleeping (for scripting/tests)
        #[arg(long)]
        no_wait: bool,
    },

    /// Save the in-progress workout for later
    Pause,

    /// Throw away the in-progress workout entirely
    Discard,

    /// Finish the workout and bank streak/XP
    Complete {
        #[arg(long, default_value = "")]
        notes: String,

        /// Check-in scores, 1-5
        #[arg(long)]
        fatigue: Option<u8>,
        #[arg(long)]
        effort: Option<u8>,
        #[arg(long)]
        recovery: Option<u8>,
        #[arg(long)]
        sleep: Option<u8>,
        #[arg(long)]
        motivation: Option<u8>,

        /// Pain area (none, knee, shoulder, back, other)
        #[arg(long)]
        pain: Option<String>,
    },

    /// List workout history
    History,

    /// Delete a workout log and rebuild all statistics
    Delete { log_id: Uuid },

    /// Show level, XP and streak
    Stats,

    /// Show personal records
    Prs,

    /// Show weekly quests and claim completed rewards
    Quests {
        /// Seed the weekly draw (for scripting/tests)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Suggest the next workout
    Suggest {
        /// Seed the random pick (for scripting/tests)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Export completed history to CSV
    Export {
        /// Output path; defaults to <data-dir>/history.csv
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Everything a command needs: the store plus both engines
struct App {
    store: ProfileStore,
    session: SessionEngine,
    stats: StatsEngine,
}

impl App {
    fn load(data_dir: &Path, profile: &str) -> Result<Self> {
        let store = ProfileStore::new(data_dir, profile);
        let logs = store.load_logs()?;
        let mut session =
            SessionEngine::new(get_default_catalog().clone(), logs, Box::new(SystemClock));
        session.restore(store.load_session()?);

        let mut stats = StatsEngine::new(store.load_stats()?, store.load_records()?);
        // A lapsed streak must read 0 before any completion extends it
        stats.refresh_streak(session.logs(), Utc::now().date_naive());

        Ok(Self { store, session, stats })
    }

    /// Persist the full snapshots. The in-memory transition has already
    /// committed; a failing save surfaces as an error without rollback.
    fn persist(&self) -> Result<()> {
        self.store.save_logs(self.session.logs())?;
        self.store.save_stats(&self.stats.stats)?;
        self.store.save_records(&self.stats.records)?;
        self.store.save_session(&self.session.snapshot())?;
        Ok(())
    }

    /// Drain engine events: bank the XP signals and announce everything
    fn apply_events(&mut self) {
        for event in self.session.drain_events() {
            if let Event::ExperienceEarned { amount, .. } = &event {
                self.stats.award_experience(*amount);
            }
            announce(&event);
        }
    }

    fn print_position(&self) {
        if let (Some(exercise), Some(session)) =
            (self.session.current_exercise(), self.session.active())
        {
            println!(
                "Up next: {} — set {}/{}",
                exercise.name,
                session.cursor.set_index + 1,
                exercise.target_sets
            );
        } else if self.session.is_workout_complete() {
            println!("All exercises done — run `liftmeup complete` to finish.");
        }
    }
}

fn announce(event: &Event) {
    match event {
        Event::SetLogged { exercise_id, set_number } => {
            println!("Logged set {} of {}", set_number, exercise_id);
        }
        Event::ExperienceEarned { amount, reason } => {
            let label = match reason {
                XpReason::SetCompleted => "set",
                XpReason::ExerciseCompleted => "exercise finished",
                XpReason::WorkoutCompleted => "workout",
                XpReason::VolumeBeaten => "volume beaten",
            };
            println!("+{} XP ({})", amount, label);
        }
        Event::PersonalRecordBeaten(pr) => {
            println!(
                "New PR on {}: {}x{} (est. 1RM {:.1})",
                pr.exercise_name, pr.weight, pr.reps, pr.estimated_1rm
            );
        }
        Event::WorkoutCompleted { total_volume, xp_awarded, .. } => {
            println!(
                "Workout complete! Total volume {:.0}, +{} XP",
                total_volume, xp_awarded
            );
        }
        Event::RestFinished => {
            println!("Rest finished.");
        }
    }
}

fn parse_difficulty(value: Option<&str>) -> Result<Option<Difficulty>> {
    match value {
        None => Ok(None),
        Some(s) => match s.to_lowercase().as_str() {
            "easy" => Ok(Some(Difficulty::Easy)),
            "ok" => Ok(Some(Difficulty::Ok)),
            "hard" => Ok(Some(Difficulty::Hard)),
            other => Err(Error::InvalidOperation(format!(
                "unknown difficulty '{}'",
                other
            ))),
        },
    }
}

fn parse_pain(value: Option<&str>) -> Result<PainArea> {
    match value {
        None => Ok(PainArea::None),
        Some(s) => match s.to_lowercase().as_str() {
            "none" => Ok(PainArea::None),
            "knee" => Ok(PainArea::Knee),
            "shoulder" => Ok(PainArea::Shoulder),
            "back" => Ok(PainArea::Back),
            "other" => Ok(PainArea::Other),
            unknown => Err(Error::InvalidOperation(format!(
                "unknown pain area '{}'",
                unknown
            ))),
        },
    }
}

fn main() -> Result<()> {
    lift_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let profile = cli.profile.unwrap_or_else(|| config.profile.name.clone());

    let mut app = App::load(&data_dir, &profile)?;

    match cli.command {
        Commands::Start { template, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            app.session.start_workout(&template, date)?;
            let name = app
                .session
                .catalog()
                .template(&template)
                .map(|t| t.name.clone())
                .unwrap_or(template);
            println!("Started {}.", name);
            app.print_position();
            app.persist()?;
        }

        Commands::Templates => {
            let mut templates: Vec<_> = app.session.catalog().templates.values().collect();
            templates.sort_by(|a, b| a.id.cmp(&b.id));
            for template in templates {
                println!("{:<12} {} — {}", template.id, template.name, template.description);
                for (i, exercise) in template.exercises.iter().enumerate() {
                    println!(
                        "  [{}] {} ({} sets of {}-{} reps)",
                        i, exercise.name, exercise.target_sets,
                        exercise.rep_range.0, exercise.rep_range.1
                    );
                }
            }
        }

        Commands::Status => {
            if app.session.resume().is_err() {
                println!("No workout in progress.");
                return Ok(());
            }
            let log = app
                .session
                .active_log()
                .ok_or_else(|| Error::InvalidOperation("no workout in progress".into()))?;
            let template_name = app
                .session
                .catalog()
                .template(&log.template_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| log.template_id.clone());
            println!(
                "{} on {} — {} sets, volume {:.0}",
                template_name,
                log.date,
                log.sets.len(),
                log.total_volume
            );
            for set in &log.sets {
                println!(
                    "  {}  {} #{}: {}x{} ({})",
                    set.id,
                    set.exercise_id,
                    set.set_number,
                    set.weight,
                    set.reps,
                    set.difficulty
                        .map(|d| format!("{:?}", d).to_lowercase())
                        .unwrap_or_else(|| "-".into()),
                );
            }
            app.print_position();
        }

        Commands::Log { reps, weight, difficulty } => {
            app.session.resume()?;
            let difficulty = parse_difficulty(difficulty.as_deref())?;
            let entry = app.session.log_set(reps, weight, difficulty)?;
            app.apply_events();

            let exercise_name = app.session.catalog().exercise_name(&entry.exercise_id);
            let date = app
                .session
                .active_log()
                .map(|l| l.date)
                .unwrap_or_else(|| Utc::now().date_naive());
            if let Some(pr) = app.stats.check_personal_record(
                &entry.exercise_id,
                &exercise_name,
                entry.weight,
                entry.reps,
                date,
            ) {
                announce(&Event::PersonalRecordBeaten(pr));
            }

            app.session.next_set()?;
            app.print_position();
            app.persist()?;
        }

        Commands::Edit { set_id, reps, weight, difficulty } => {
            app.session.resume()?;
            let difficulty = parse_difficulty(difficulty.as_deref())?;
            app.session.edit_set(set_id, reps, weight, difficulty)?;
            let volume = app.session.active_log().map(|l| l.total_volume).unwrap_or(0.0);
            println!("Set updated; volume is now {:.0}.", volume);
            app.persist()?;
        }

        Commands::DeleteSet { set_id } => {
            app.session.resume()?;
            app.session.delete_set(set_id)?;
            println!("Set deleted.");
            app.print_position();
            app.persist()?;
        }

        Commands::Next => {
            app.session.resume()?;
            app.session.next_set()?;
            app.print_position();
            app.persist()?;
        }

        Commands::Jump { exercise } => {
            app.session.resume()?;
            app.session.jump_to_exercise(exercise)?;
            app.print_position();
            app.persist()?;
        }

        Commands::Rest { seconds, no_wait } => {
            app.session.resume()?;
            let duration = seconds.unwrap_or(config.session.default_rest_seconds);
            app.session.start_rest(duration)?;
            println!("Resting for {}s...", duration);
            for _ in 0..duration {
                if !no_wait {
                    std::thread::sleep(std::time::Duration::from_secs(1));
                }
                app.session.tick_rest();
                app.apply_events();
            }
            app.session.skip_rest()?;
        }

        Commands::Pause => {
            app.session.resume()?;
            app.session.pause_workout()?;
            println!("Workout saved — resume any time by logging the next set.");
            app.persist()?;
        }

        Commands::Discard => {
            app.session.resume()?;
            app.session.discard_workout()?;
            println!("Workout discarded.");
            app.persist()?;
        }

        Commands::Complete { notes, fatigue, effort, recovery, sleep, motivation, pain } => {
            app.session.resume()?;

            let has_check_in = fatigue.is_some()
                || effort.is_some()
                || recovery.is_some()
                || sleep.is_some()
                || motivation.is_some()
                || pain.is_some();
            let check_in = if has_check_in {
                Some(CheckIn {
                    fatigue: fatigue.unwrap_or(3),
                    difficulty: effort.unwrap_or(3),
                    recovery: recovery.unwrap_or(3),
                    sleep_quality: sleep.unwrap_or(3),
                    motivation: motivation.unwrap_or(3),
                    pain: parse_pain(pain.as_deref())?,
                    notes: String::new(),
                })
            } else {
                None
            };

            app.session.complete_workout(check_in, &notes, &mut app.stats)?;
            app.apply_events();

            // The finished workout may push a weekly quest over its target
            let today = Utc::now().date_naive();
            let mut quests = app.store.load_quests()?;
            let awarded = update_quest_progress(&mut quests, app.session.logs(), today);
            if awarded > 0 {
                app.stats.award_experience(awarded);
                println!("+{} XP (quest completed)", awarded);
            }
            app.store.save_quests(&quests)?;

            app.persist()?;
        }

        Commands::History => {
            if app.session.logs().is_empty() {
                println!("No workouts yet.");
                return Ok(());
            }
            let mut logs: Vec<_> = app.session.logs().to_vec();
            logs.sort_by(|a, b| (b.date, b.started_at).cmp(&(a.date, a.started_at)));
            for log in logs {
                let marker = if log.is_complete { " " } else { "*" };
                println!(
                    "{} {}  {}  {:<12} {:>3} sets  volume {:>8.0}  {} min",
                    marker,
                    log.id,
                    log.date,
                    log.template_id,
                    log.sets.len(),
                    log.total_volume,
                    log.duration_minutes
                );
            }
            println!("(* = in progress)");
        }

        Commands::Delete { log_id } => {
            app.session.delete_log(log_id, &mut app.stats)?;
            println!("Workout deleted; statistics rebuilt from remaining history.");
            app.persist()?;
        }

        Commands::Stats => {
            // The streak was already refreshed on load
            let stats = &app.stats.stats;
            println!(
                "Level {} ({}) — {} XP",
                stats.level,
                level_title(stats.level),
                stats.xp
            );
            println!(
                "Streak: {} days (longest {})",
                stats.current_streak_days, stats.longest_streak_days
            );
            match stats.last_workout_date {
                Some(date) => println!("Last workout: {}", date),
                None => println!("Last workout: never"),
            }
            let completed = app.session.logs().iter().filter(|l| l.is_complete).count();
            println!(
                "Completed workouts: {} ({} XP banked in history)",
                completed,
                total_xp_from_logs(app.session.logs())
            );
            app.persist()?;
        }

        Commands::Prs => {
            if app.stats.records.is_empty() {
                println!("No personal records yet.");
                return Ok(());
            }
            for pr in &app.stats.records {
                println!(
                    "{:<24} {}x{} on {} (est. 1RM {:.1})",
                    pr.exercise_name, pr.weight, pr.reps, pr.date, pr.estimated_1rm
                );
            }
        }

        Commands::Quests { seed } => {
            let today = Utc::now().date_naive();
            let mut quests = app.store.load_quests()?;

            if quests_need_rotation(&quests, today) {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                quests = generate_weekly_quests(today, &mut rng);
                if let Some(quest) = quests.first() {
                    println!("New quests for the week of {}:", quest.week_start);
                }
            }

            let awarded = update_quest_progress(&mut quests, app.session.logs(), today);
            if awarded > 0 {
                app.stats.award_experience(awarded);
                println!("+{} XP (quest completed)", awarded);
            }

            for quest in &quests {
                let marker = if quest.is_complete { "x" } else { " " };
                println!(
                    "[{}] {:<16} {:>6}/{:<6} (+{} XP)  {}",
                    marker,
                    quest.name,
                    quest.current,
                    quest.target,
                    quest.xp_reward,
                    quest.description
                );
            }

            app.store.save_quests(&quests)?;
            app.persist()?;
        }

        Commands::Suggest { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match suggest_template(app.session.catalog(), app.session.logs(), &mut rng) {
                Some(id) => {
                    let name = app
                        .session
                        .catalog()
                        .template(&id)
                        .map(|t| t.name.clone())
                        .unwrap_or_else(|| id.clone());
                    println!("Suggested workout: {} ({})", name, id);
                }
                None => println!("Catalog is empty."),
            }
        }

        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| data_dir.join("history.csv"));
            let rows = export_history_csv(
                app.session.logs(),
                app.session.catalog(),
                &path,
            )?;
            println!("Exported {} rows to {}", rows, path.display());
        }
    }

    Ok(())
}
