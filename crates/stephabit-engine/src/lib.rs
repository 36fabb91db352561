//! # stephabit-engine
//!
//! Schedule window engine for StepHabit: given a user's habit and busy
//! blocks, compute the free windows of each day, the blocks that overlap, and
//! suggested activities for the gaps. Creating a block goes through a guard
//! that rejects any overlap with the owner's existing blocks.
//!
//! All intervals are half-open, so back-to-back blocks never conflict.
//!
//! ## Modules
//!
//! - [`window`] — `TimeWindow` primitive and the daily envelope
//! - [`block`] — Schedule blocks, loose block records, creation candidates
//! - [`bucket`] — Group blocks by local calendar day
//! - [`freebusy`] — Free windows within a day's envelope
//! - [`conflict`] — Overlapping blocks within a day (adjacent or pairwise)
//! - [`suggest`] — Free windows → suggested activities
//! - [`store`] — `ScheduleStore` persistence seam and `MemoryStore`
//! - [`service`] — Owner-scoped operations and the create-time conflict guard
//! - [`config`] — `EngineConfig` (TOML)
//! - [`error`] — Error types

pub mod block;
pub mod bucket;
pub mod config;
pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod service;
pub mod store;
pub mod suggest;
pub mod window;

pub use block::{BlockKind, CandidateKind, NewBlock, Repeat, ScheduleBlock};
pub use bucket::bucket_by_day;
pub use config::EngineConfig;
pub use conflict::{find_conflicts, Conflict, ConflictMode};
pub use error::ScheduleError;
pub use freebusy::{find_free_windows, FreeWindow};
pub use service::{SchedulePlan, ScheduleService};
pub use store::{MemoryStore, ScheduleStore, Snapshot};
pub use suggest::{suggest_blocks, Suggestion};
pub use window::{DayEnvelope, TimeWindow};
