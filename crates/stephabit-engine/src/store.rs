//! Persistence seam for schedule blocks, plus an in-memory implementation.
//!
//! The engine never talks to a database directly. Everything it needs from
//! storage goes through [`ScheduleStore`]; [`MemoryStore`] backs the CLI and
//! the tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::block::{BlockDraft, BlockId, BlockKind, BlockRecord, HabitId, ScheduleBlock, UserId};
use crate::bucket::sort_blocks;
use crate::config::EngineConfig;
use crate::error::{Result, ScheduleError};

/// Storage operations the engine relies on. All reads are owner-scoped.
pub trait ScheduleStore {
    /// Up to `limit` blocks of `owner`, earliest first.
    fn list_blocks_for_user(&self, owner: UserId, limit: usize) -> Result<Vec<ScheduleBlock>>;

    fn user_exists(&self, owner: UserId) -> Result<bool>;

    /// Id of the habit titled `title` for `owner`, creating it when missing.
    fn find_or_create_habit(
        &self,
        owner: UserId,
        title: &str,
        description: Option<&str>,
    ) -> Result<HabitId>;

    fn habit_title(&self, habit: HabitId) -> Result<Option<String>>;

    /// Persist a draft and return it with its assigned id.
    fn insert_block(&self, draft: BlockDraft) -> Result<ScheduleBlock>;

    /// Returns `true` if a block was removed.
    fn delete_block(&self, id: BlockId) -> Result<bool>;

    /// Run `op` with exclusive write access for `owner`.
    ///
    /// No other `write_exclusive` section for the same owner may interleave
    /// with `op`. A database store maps this to a serializable transaction.
    fn write_exclusive<T, F>(&self, owner: UserId, op: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
        Self: Sized;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub owner_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub users: Vec<UserId>,
    pub habits: Vec<Habit>,
    pub blocks: Vec<BlockRecord>,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeSet<UserId>,
    habits: BTreeMap<HabitId, Habit>,
    blocks: BTreeMap<BlockId, ScheduleBlock>,
    last_block_id: BlockId,
    last_habit_id: HabitId,
}

/// Thread-safe in-memory store.
///
/// Data sits behind an `RwLock`; `write_exclusive` sections additionally
/// serialize on a separate mutex so a section can still read and insert.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot. Owners referenced by blocks or habits are registered
    /// as users. Records without an id get fresh ids in document order.
    /// Habit blocks without a title take the habit's title.
    ///
    /// # Errors
    /// Fails on the first record that does not materialize, and with
    /// `Storage` when two records carry the same id.
    pub fn from_snapshot(snapshot: Snapshot, config: &EngineConfig) -> Result<Self> {
        let store = Self::new();
        for user in snapshot.users {
            store.add_user(user)?;
        }
        for habit in snapshot.habits {
            store.add_user(habit.owner_id)?;
            store.add_habit(habit)?;
        }

        let mut next_id = snapshot
            .blocks
            .iter()
            .filter_map(|r| r.id)
            .max()
            .unwrap_or(0);
        for record in snapshot.blocks {
            if record.id.is_none() {
                next_id += 1;
            }
            let mut block =
                record.into_block(next_id, config.timezone, config.open_ended_minutes)?;
            if block.title.is_none() {
                block.title = display_title(&store, &block.kind)?;
            }
            store.add_user(block.owner_id)?;
            store.restore_block(block)?;
        }
        Ok(store)
    }

    /// Dump users, habits and blocks, each ordered by id.
    pub fn to_snapshot(&self) -> Result<Snapshot> {
        let state = self.read()?;
        Ok(Snapshot {
            users: state.users.iter().copied().collect(),
            habits: state.habits.values().cloned().collect(),
            blocks: state.blocks.values().map(ScheduleBlock::to_record).collect(),
        })
    }

    pub fn add_user(&self, user: UserId) -> Result<()> {
        self.write()?.users.insert(user);
        Ok(())
    }

    pub fn add_habit(&self, habit: Habit) -> Result<()> {
        let mut state = self.write()?;
        state.last_habit_id = state.last_habit_id.max(habit.id);
        state.habits.insert(habit.id, habit);
        Ok(())
    }

    /// Put back a block that already has an id.
    ///
    /// # Errors
    /// `Storage` when a block with that id is already stored.
    pub fn restore_block(&self, block: ScheduleBlock) -> Result<()> {
        let mut state = self.write()?;
        if state.blocks.contains_key(&block.id) {
            return Err(ScheduleError::Storage(format!("duplicate block id {}", block.id)));
        }
        state.last_block_id = state.last_block_id.max(block.id);
        state.blocks.insert(block.id, block);
        Ok(())
    }

    pub fn habits_for_user(&self, owner: UserId) -> Result<Vec<Habit>> {
        Ok(self
            .read()?
            .habits
            .values()
            .filter(|h| h.owner_id == owner)
            .cloned()
            .collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| ScheduleError::Storage("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| ScheduleError::Storage("store lock poisoned".to_string()))
    }
}

impl ScheduleStore for MemoryStore {
    fn list_blocks_for_user(&self, owner: UserId, limit: usize) -> Result<Vec<ScheduleBlock>> {
        let mut blocks: Vec<ScheduleBlock> = self
            .read()?
            .blocks
            .values()
            .filter(|b| b.owner_id == owner)
            .cloned()
            .collect();
        sort_blocks(&mut blocks);
        blocks.truncate(limit);
        Ok(blocks)
    }

    fn user_exists(&self, owner: UserId) -> Result<bool> {
        Ok(self.read()?.users.contains(&owner))
    }

    fn find_or_create_habit(
        &self,
        owner: UserId,
        title: &str,
        description: Option<&str>,
    ) -> Result<HabitId> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .habits
            .values()
            .find(|h| h.owner_id == owner && h.title == title)
        {
            return Ok(existing.id);
        }
        state.last_habit_id += 1;
        let id = state.last_habit_id;
        state.habits.insert(
            id,
            Habit {
                id,
                owner_id: owner,
                title: title.to_string(),
                description: description.map(str::to_string),
            },
        );
        Ok(id)
    }

    fn habit_title(&self, habit: HabitId) -> Result<Option<String>> {
        Ok(self.read()?.habits.get(&habit).map(|h| h.title.clone()))
    }

    fn insert_block(&self, draft: BlockDraft) -> Result<ScheduleBlock> {
        let mut state = self.write()?;
        state.last_block_id += 1;
        let block = draft.into_block(state.last_block_id);
        state.blocks.insert(block.id, block.clone());
        Ok(block)
    }

    fn delete_block(&self, id: BlockId) -> Result<bool> {
        Ok(self.write()?.blocks.remove(&id).is_some())
    }

    fn write_exclusive<T, F>(&self, _owner: UserId, op: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        // Single lock shared by every owner.
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ScheduleError::Storage("write lock poisoned".to_string()))?;
        op(self)
    }
}

/// Title a block should display, resolving habit links through `store`.
pub fn display_title<S: ScheduleStore>(store: &S, kind: &BlockKind) -> Result<Option<String>> {
    match kind {
        BlockKind::Habit(habit) => store.habit_title(*habit),
        BlockKind::Custom { title, .. } => Ok(Some(title.clone())),
    }
}
