use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

use super::TrackNetwork;
use crate::error::{Result, TrackError};
use crate::models::section::SectionHandle;

/// Identifier shared by sections that were built together and are removed together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub NonZeroU16);

impl GroupId {
    /// Group id as stored on disk, where 0 means ungrouped
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        NonZeroU16::new(raw).map(Self)
    }

    #[must_use]
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

/// Extension trait for section grouping on `TrackNetwork`
pub trait Groups {
    /// Put the given sections into a new group, taking them out of any group they were in
    ///
    /// # Errors
    ///
    /// Returns `UnknownSection` for a stale handle, or `InvalidState` if no group ids are left
    fn create_group(&mut self, members: &[SectionHandle]) -> Result<GroupId>;

    /// Members of a group, in the order they were added
    fn group_members(&self, group: GroupId) -> &[SectionHandle];

    /// The group a section belongs to
    fn group_of(&self, handle: SectionHandle) -> Option<GroupId>;

    /// Take a section out of its group; empty groups are dropped
    fn ungroup(&mut self, handle: SectionHandle);

    /// All groups and their members
    fn groups(&self) -> Vec<(GroupId, Vec<SectionHandle>)>;
}

impl Groups for TrackNetwork {
    fn create_group(&mut self, members: &[SectionHandle]) -> Result<GroupId> {
        for &handle in members {
            self.try_section(handle)?;
        }

        let Some(group) = GroupId::from_raw(self.next_group_id) else {
            return Err(TrackError::InvalidState("No free group ids left".to_string()));
        };
        self.next_group_id = self.next_group_id.wrapping_add(1);

        for &handle in members {
            self.ungroup(handle);
            if let Some(section) = self.sections.node_weight_mut(handle) {
                section.group = Some(group);
            }
        }

        let mut unique = Vec::with_capacity(members.len());
        for &handle in members {
            if !unique.contains(&handle) {
                unique.push(handle);
            }
        }
        self.groups.insert(group, unique);
        Ok(group)
    }

    fn group_members(&self, group: GroupId) -> &[SectionHandle] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    fn group_of(&self, handle: SectionHandle) -> Option<GroupId> {
        self.sections.node_weight(handle).and_then(|section| section.group)
    }

    fn ungroup(&mut self, handle: SectionHandle) {
        let Some(group) = self.group_of(handle) else {
            return;
        };
        if let Some(section) = self.sections.node_weight_mut(handle) {
            section.group = None;
        }
        if let Some(members) = self.groups.get_mut(&group) {
            members.retain(|&member| member != handle);
            if members.is_empty() {
                self.groups.shift_remove(&group);
            }
        }
    }

    fn groups(&self) -> Vec<(GroupId, Vec<SectionHandle>)> {
        self.groups
            .iter()
            .map(|(&group, members)| (group, members.clone()))
            .collect()
    }
}
