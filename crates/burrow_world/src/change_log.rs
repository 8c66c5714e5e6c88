//! # Change Log
//!
//! The sparse record of every player-made deviation from generated terrain,
//! keyed by linear cell index. Last write wins: recording at an index that
//! already has an entry replaces the action and moves the entry to the end
//! of the log order, so replaying [`ChangeLog::entries`] front to back
//! reproduces every derived side effect (portal positions) exactly.
//!
//! Entries are never removed.

use std::collections::HashMap;

use crate::error::{WorldError, WorldResult};
use crate::tile::TileType;

/// What the player did at a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// The cell was dug out.
    Remove,
    /// The cell was refilled with the given type.
    PlaceAs(TileType),
}

impl ChangeAction {
    /// Wire tag for the remove action.
    pub const REMOVE_TAG: u8 = 0;

    /// Encodes the action as a one-byte tag: 0 for remove, the tile's wire
    /// id otherwise.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Remove => Self::REMOVE_TAG,
            Self::PlaceAs(tile) => tile.wire_id(),
        }
    }

    /// Decodes a one-byte tag.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::UnknownChangeTag` if the tag is neither 0 nor a
    /// known tile wire id.
    pub fn from_tag(tag: u8) -> WorldResult<Self> {
        if tag == Self::REMOVE_TAG {
            return Ok(Self::Remove);
        }
        TileType::from_wire_id(tag)
            .map(Self::PlaceAs)
            .map_err(|_| WorldError::UnknownChangeTag(tag))
    }
}

/// One `(index, action)` pair in log order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEntry {
    /// Linear cell index.
    pub index: u64,
    /// Latest action at that index.
    pub action: ChangeAction,
}

impl ChangeEntry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(index: u64, action: ChangeAction) -> Self {
        Self { index, action }
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    seq: u64,
    action: ChangeAction,
}

/// Sparse last-write-wins map from cell index to action.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    slots: HashMap<u64, Slot>,
    next_seq: u64,
}

impl ChangeLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an action, replacing any earlier one at the same index.
    ///
    /// Returns the action that was replaced.
    pub fn record(&mut self, index: u64, action: ChangeAction) -> Option<ChangeAction> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots
            .insert(index, Slot { seq, action })
            .map(|previous| previous.action)
    }

    /// Returns the latest action at an index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u64) -> Option<ChangeAction> {
        self.slots.get(&index).map(|slot| slot.action)
    }

    /// Returns true if the index has ever been edited.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        self.slots.contains_key(&index)
    }

    /// Number of edited cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing has been edited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All entries, oldest write first.
    #[must_use]
    pub fn entries(&self) -> Vec<ChangeEntry> {
        let mut ordered: Vec<(u64, ChangeEntry)> = self
            .slots
            .iter()
            .map(|(&index, slot)| (slot.seq, ChangeEntry::new(index, slot.action)))
            .collect();
        ordered.sort_unstable_by_key(|&(seq, _)| seq);
        ordered.into_iter().map(|(_, entry)| entry).collect()
    }

    /// Indices whose latest action is a removal.
    pub fn removed_indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.action == ChangeAction::Remove)
            .map(|(&index, _)| index)
    }

    /// Rebuilds a log from entries in log order.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ChangeEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.record(entry.index, entry.action);
        }
        log
    }
}
