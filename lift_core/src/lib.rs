#![forbid(unsafe_code)]

//! Core domain model and business logic for the Lift Me Up tracker.
//!
//! This crate provides:
//! - Domain types (templates, set entries, workout logs, profile stats)
//! - Workout catalog management
//! - Session engine (the in-progress workout state machine)
//! - Statistics engine (XP/level, streaks, personal records)
//! - Persistence (JSON snapshots, CSV export, config)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod cursor;
pub mod events;
pub mod session;
pub mod stats;
pub mod store;
pub mod suggest;
pub mod export;
pub mod quests;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use cursor::{derive_cursor, Cursor};
pub use events::Event;
pub use session::{SessionEngine, SessionSnapshot};
pub use stats::{compute_streak, estimate_one_rep_max, level_for_xp, StatsEngine};
pub use store::{Clock, ProfileStore, SystemClock};
pub use suggest::suggest_template;
pub use export::export_history_csv;
pub use quests::{generate_weekly_quests, quests_need_rotation, update_quest_progress};
