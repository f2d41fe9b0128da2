use serde::{Deserialize, Serialize};

use super::section::SectionHandle;
use super::track_network::SectionArena;
use crate::error::{Result, TrackError};

/// Identifier of a junction within a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JunctionId(pub u32);

/// A branch point: an entry section whose forward slot is wired to one of two branches.
///
/// Both branches always have the entry in their `previous` slot, so trains can
/// trail through from either side. Only the selected branch is in the entry's
/// `next` slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    entry: SectionHandle,
    left: SectionHandle,
    right: SectionHandle,
    go_left: bool,
}

impl Junction {
    /// Wire up three existing sections as a junction, with the left branch selected
    pub(crate) fn new(
        arena: &mut SectionArena,
        entry: SectionHandle,
        left: SectionHandle,
        right: SectionHandle,
    ) -> Result<Self> {
        if entry == left || entry == right || left == right {
            return Err(TrackError::InvalidParameter(
                "Junction needs three distinct sections".to_string(),
            ));
        }
        for handle in [entry, left, right] {
            if !arena.contains_node(handle) {
                return Err(TrackError::UnknownSection(handle));
            }
        }

        for branch in [left, right] {
            if let Some(section) = arena.node_weight_mut(branch) {
                section.previous = Some(entry);
            }
        }

        let mut junction = Self {
            entry,
            left,
            right,
            go_left: false,
        };
        junction.toggle(arena);
        Ok(junction)
    }

    /// Switch to the other branch, rewiring the entry's `next` slot
    pub(crate) fn toggle(&mut self, arena: &mut SectionArena) {
        self.go_left = !self.go_left;
        let target = self.active_branch();
        if let Some(entry) = arena.node_weight_mut(self.entry) {
            entry.next = Some(target);
        }
    }

    #[must_use]
    pub fn entry(&self) -> SectionHandle {
        self.entry
    }

    #[must_use]
    pub fn left(&self) -> SectionHandle {
        self.left
    }

    #[must_use]
    pub fn right(&self) -> SectionHandle {
        self.right
    }

    #[must_use]
    pub fn go_left(&self) -> bool {
        self.go_left
    }

    /// The branch currently wired to the entry
    #[must_use]
    pub fn active_branch(&self) -> SectionHandle {
        if self.go_left {
            self.left
        } else {
            self.right
        }
    }

    /// True if `handle` is the entry or one of the branches
    #[must_use]
    pub fn involves(&self, handle: SectionHandle) -> bool {
        handle == self.entry || handle == self.left || handle == self.right
    }
}
