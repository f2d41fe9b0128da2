use glam::Vec3;

use super::{Autoconnect, Groups, TrackNetwork};
use crate::error::Result;
use crate::models::section::{SectionEnd, SectionHandle};

/// Extension trait for section lifecycle operations on `TrackNetwork`
pub trait Sections {
    /// Register a section in the database and optionally autoconnect its free ends
    ///
    /// # Errors
    ///
    /// Returns an error if the handle is stale or the section's id clashes with another
    fn commit_section(&mut self, handle: SectionHandle, autoconnect: bool) -> Result<u32>;

    /// Detach a section from all of its neighbours
    ///
    /// Every neighbour slot pointing back at the section is cleared, whichever of
    /// the neighbour's two slots it is.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSection` if the handle is stale
    fn unlink_section(&mut self, handle: SectionHandle) -> Result<()>;

    /// Remove a section, or its whole group if it is grouped
    ///
    /// Removed sections are unlinked, deregistered and dropped from the arena, and
    /// junctions built on any of them are discarded. Returns the removed handles.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSection` if the handle is stale
    fn remove_section(&mut self, handle: SectionHandle) -> Result<Vec<SectionHandle>>;

    /// The endpoint of a section nearest to `point`
    ///
    /// With `only_unconnected`, returns `None` if that endpoint is already linked.
    fn closest_end(&self, handle: SectionHandle, point: Vec3, only_unconnected: bool) -> Option<SectionEnd>;

    /// True if each section holds the other in one of its slots
    fn are_linked(&self, a: SectionHandle, b: SectionHandle) -> bool;
}

impl Sections for TrackNetwork {
    fn commit_section(&mut self, handle: SectionHandle, autoconnect: bool) -> Result<u32> {
        let section = self
            .sections
            .node_weight_mut(handle)
            .ok_or(crate::error::TrackError::UnknownSection(handle))?;
        let id = self.database.register(handle, section)?;
        if autoconnect {
            self.autoconnect(handle)?;
        }
        Ok(id)
    }

    fn unlink_section(&mut self, handle: SectionHandle) -> Result<()> {
        let section = self.try_section(handle)?;
        let neighbours = [section.next, section.previous];

        for neighbour in neighbours.into_iter().flatten() {
            let Some(other) = self.sections.node_weight_mut(neighbour) else {
                continue;
            };
            if other.next == Some(handle) {
                other.next = None;
            }
            if other.previous == Some(handle) {
                other.previous = None;
            }
        }

        let section = self.try_section_mut(handle)?;
        section.next = None;
        section.previous = None;
        Ok(())
    }

    fn remove_section(&mut self, handle: SectionHandle) -> Result<Vec<SectionHandle>> {
        self.try_section(handle)?;

        let removed = match self.group_of(handle) {
            Some(group) => {
                let members = self.group_members(group).to_vec();
                self.groups.shift_remove(&group);
                members
            }
            None => vec![handle],
        };

        for &member in &removed {
            if !self.sections.contains_node(member) {
                continue;
            }
            self.unlink_section(member)?;
            if let Some(section) = self.sections.node_weight_mut(member) {
                if section.is_registered() {
                    self.database.deregister(member, section);
                }
            }
            self.sections.remove_node(member);
        }

        self.junctions
            .retain(|_, junction| !removed.iter().any(|&member| junction.involves(member)));

        log::debug!("Removed {} section(s)", removed.len());
        Ok(removed)
    }

    fn closest_end(&self, handle: SectionHandle, point: Vec3, only_unconnected: bool) -> Option<SectionEnd> {
        let section = self.section(handle)?;
        let to_end = point.distance(section.end_position());
        let to_start = point.distance(section.position);
        let end = if to_end < to_start {
            SectionEnd::End
        } else {
            SectionEnd::Start
        };

        if only_unconnected && section.slot(end).is_some() {
            return None;
        }
        Some(end)
    }

    fn are_linked(&self, a: SectionHandle, b: SectionHandle) -> bool {
        match (self.section(a), self.section(b)) {
            (Some(first), Some(second)) => {
                first.end_linked_to(b).is_some() && second.end_linked_to(a).is_some()
            }
            _ => false,
        }
    }
}
