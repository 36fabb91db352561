//! Owner-scoped schedule operations over a [`ScheduleStore`].
//!
//! This is the surface an HTTP router calls: read-side computations (free
//! windows, conflicts, suggestions) and the write-side guard that refuses to
//! create a block overlapping one the owner already has.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::block::{BlockDraft, BlockId, BlockKind, CandidateKind, NewBlock, ScheduleBlock, UserId};
use crate::bucket::bucket_by_day;
use crate::config::EngineConfig;
use crate::conflict::{conflicts_by_day, Conflict};
use crate::error::{Result, ScheduleError};
use crate::freebusy::{free_windows_by_day, FreeWindow};
use crate::store::{display_title, ScheduleStore};
use crate::suggest::{self, Suggestion};
use crate::window::DayEnvelope;

/// Free windows, conflicts and suggestions computed from one fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub owner_id: UserId,
    pub free_windows: Vec<FreeWindow>,
    pub conflicts: Vec<Conflict>,
    pub suggestions: Vec<Suggestion>,
}

pub struct ScheduleService<S> {
    store: S,
    config: EngineConfig,
}

impl<S: ScheduleStore> ScheduleService<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The owner's blocks ordered by `(start, id)`, capped at `query_limit`.
    pub fn list_blocks(&self, owner: UserId) -> Result<Vec<ScheduleBlock>> {
        self.ensure_user(owner)?;
        let blocks = self
            .store
            .list_blocks_for_user(owner, self.config.query_limit)
            .inspect_err(|e| error!(owner_id = owner, error = %e, "failed to list blocks"))?;
        debug!(owner_id = owner, block_count = blocks.len(), "listed blocks");
        Ok(blocks)
    }

    /// Free windows on every day the owner has blocks, in calendar order.
    ///
    /// `envelope` overrides the configured day envelope.
    pub fn compute_free_windows(
        &self,
        owner: UserId,
        envelope: Option<DayEnvelope>,
    ) -> Result<Vec<FreeWindow>> {
        let blocks = self.list_blocks(owner)?;
        let envelope = envelope.unwrap_or(self.config.envelope);
        let buckets = bucket_by_day(&blocks, self.config.timezone);
        let windows = free_windows_by_day(&buckets, &envelope, self.config.timezone)?;
        debug!(
            owner_id = owner,
            day_count = buckets.len(),
            window_count = windows.len(),
            "computed free windows"
        );
        Ok(windows)
    }

    /// Overlapping blocks per day, using the configured conflict mode.
    pub fn compute_conflicts(&self, owner: UserId) -> Result<Vec<Conflict>> {
        let blocks = self.list_blocks(owner)?;
        let buckets = bucket_by_day(&blocks, self.config.timezone);
        let conflicts = conflicts_by_day(&buckets, self.config.conflict_mode);
        debug!(
            owner_id = owner,
            mode = ?self.config.conflict_mode,
            conflict_count = conflicts.len(),
            "computed conflicts"
        );
        Ok(conflicts)
    }

    /// Suggestions for the first `limit` free windows (default from config).
    pub fn suggest_blocks(&self, owner: UserId, limit: Option<usize>) -> Result<Vec<Suggestion>> {
        let windows = self.compute_free_windows(owner, None)?;
        let limit = limit.unwrap_or(self.config.suggestion_limit);
        Ok(suggest::suggest_blocks(&windows, limit))
    }

    /// Free windows, conflicts and suggestions from a single block fetch.
    pub fn plan(&self, owner: UserId) -> Result<SchedulePlan> {
        let blocks = self.list_blocks(owner)?;
        let tz = self.config.timezone;
        let buckets = bucket_by_day(&blocks, tz);
        let free_windows = free_windows_by_day(&buckets, &self.config.envelope, tz)?;
        let conflicts = conflicts_by_day(&buckets, self.config.conflict_mode);
        let suggestions = suggest::suggest_blocks(&free_windows, self.config.suggestion_limit);
        Ok(SchedulePlan {
            owner_id: owner,
            free_windows,
            conflicts,
            suggestions,
        })
    }

    /// Create a block unless it overlaps one the owner already has.
    ///
    /// # Errors
    /// - `UserNotFound` when the owner does not exist. Checked first.
    /// - `InvalidWindow` when the resolved end is not after the start.
    /// - `InvalidTime` when a duration pushes the end out of range.
    /// - `MissingHabitReference` for a custom candidate without a title.
    /// - `ScheduleConflict` when any existing block of the owner overlaps.
    ///
    /// A custom candidate find-or-creates a habit with its title, even when the
    /// create is then rejected as a conflict.
    pub fn create_block(&self, candidate: NewBlock) -> Result<ScheduleBlock> {
        let owner = candidate.owner_id;
        self.ensure_user(owner)?;
        let window = candidate.resolve_window(self.config.default_duration_minutes)?;

        let kind = match candidate.kind {
            CandidateKind::Habit(habit) => BlockKind::Habit(habit),
            CandidateKind::Custom { title } => {
                let title = title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        warn!(owner_id = owner, "custom block without a title rejected");
                        ScheduleError::MissingHabitReference
                    })?
                    .to_string();
                let habit_id =
                    self.store
                        .find_or_create_habit(owner, &title, candidate.notes.as_deref())?;
                BlockKind::Custom {
                    title,
                    habit_id: Some(habit_id),
                }
            }
        };
        let title = display_title(&self.store, &kind)?;

        let draft = BlockDraft {
            owner_id: owner,
            window,
            kind,
            repeat: candidate.repeat,
            notes: candidate.notes,
            title,
        };

        // The scan and the insert share one exclusive section so two racing
        // creates cannot both pass the check.
        let created = self.store.write_exclusive(owner, |store| {
            let existing = store.list_blocks_for_user(owner, usize::MAX)?;
            if let Some(clash) = existing.iter().find(|b| b.window.overlaps(&draft.window)) {
                warn!(
                    owner_id = owner,
                    existing_block_id = clash.id,
                    "schedule conflict, block not created"
                );
                return Err(ScheduleError::ScheduleConflict { existing: clash.id });
            }
            store.insert_block(draft)
        });

        match created {
            Ok(block) => {
                info!(
                    owner_id = owner,
                    block_id = block.id,
                    start = %block.start(),
                    end = %block.end(),
                    "schedule block created"
                );
                Ok(block)
            }
            Err(e @ ScheduleError::Storage(_)) => {
                error!(owner_id = owner, error = %e, "failed to create block");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// # Errors
    /// `NotFound` when no block has id `id`.
    pub fn delete_block(&self, id: BlockId) -> Result<()> {
        let removed = self
            .store
            .delete_block(id)
            .inspect_err(|e| error!(block_id = id, error = %e, "failed to delete block"))?;
        if !removed {
            return Err(ScheduleError::NotFound(id));
        }
        info!(block_id = id, "schedule block deleted");
        Ok(())
    }

    fn ensure_user(&self, owner: UserId) -> Result<()> {
        if self.store.user_exists(owner)? {
            Ok(())
        } else {
            Err(ScheduleError::UserNotFound(owner))
        }
    }
}
