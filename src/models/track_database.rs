use std::collections::HashMap;

use glam::{IVec3, Vec3};
use indexmap::IndexSet;

use super::section::{SectionHandle, TrackSection};
use crate::constants::DEFAULT_ZONE_SIZE;
use crate::error::{Result, TrackError};

/// Registry of placed sections: unique ids plus a zone grid for proximity queries.
///
/// Each registered section is filed under the zone of its start point and the
/// zone of its end point. Buckets are insertion ordered so that scans over a
/// zone are reproducible.
#[derive(Debug, Clone)]
pub struct TrackDatabase {
    zone_size: f32,
    zones: HashMap<IVec3, IndexSet<SectionHandle>>,
    sections_by_id: HashMap<u32, SectionHandle>,
    next_free_id: u32,
}

impl TrackDatabase {
    #[must_use]
    pub fn new(zone_size: f32) -> Self {
        Self {
            zone_size,
            zones: HashMap::new(),
            sections_by_id: HashMap::new(),
            next_free_id: 1,
        }
    }

    #[must_use]
    pub fn zone_size(&self) -> f32 {
        self.zone_size
    }

    /// Grid cell containing `point`
    #[must_use]
    pub fn zone_of(&self, point: Vec3) -> IVec3 {
        (point / self.zone_size).floor().as_ivec3()
    }

    fn endpoint_zones(&self, section: &TrackSection) -> (IVec3, IVec3) {
        (self.zone_of(section.position), self.zone_of(section.end_position()))
    }

    /// Register a section, assigning it an id if it has none
    ///
    /// A section that already carries an id (e.g. one read from disk) keeps it,
    /// and the id counter is moved past it so later ids stay unique.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` if the section's id already belongs to another
    /// section, and `InvalidState` if the id space is exhausted
    pub fn register(&mut self, handle: SectionHandle, section: &mut TrackSection) -> Result<u32> {
        if section.id == 0 {
            if self.next_free_id == u32::MAX {
                return Err(TrackError::InvalidState("No free section ids left".to_string()));
            }
            section.id = self.next_free_id;
            self.next_free_id += 1;
        } else {
            match self.sections_by_id.get(&section.id) {
                Some(&existing) if existing != handle => {
                    return Err(TrackError::CorruptData(format!(
                        "Duplicate track id {}",
                        section.id
                    )));
                }
                _ => {}
            }
            if self.next_free_id <= section.id {
                self.next_free_id = section.id.saturating_add(1);
            }
        }

        let (zone_start, zone_end) = self.endpoint_zones(section);
        self.zones.entry(zone_start).or_default().insert(handle);
        if zone_end != zone_start {
            self.zones.entry(zone_end).or_default().insert(handle);
        }

        self.sections_by_id.insert(section.id, handle);
        log::debug!("Registered section {} in zones {zone_start} / {zone_end}", section.id);
        Ok(section.id)
    }

    /// Remove a section from the zone grid and id map and reset its id to 0
    ///
    /// A missing zone bucket is logged and skipped; the rest of the
    /// deregistration still happens.
    pub fn deregister(&mut self, handle: SectionHandle, section: &mut TrackSection) {
        let (zone_start, zone_end) = self.endpoint_zones(section);
        self.remove_from_zone(zone_start, handle);
        if zone_end != zone_start {
            self.remove_from_zone(zone_end, handle);
        }

        if self.sections_by_id.get(&section.id) == Some(&handle) {
            self.sections_by_id.remove(&section.id);
        }
        log::debug!("Deregistered section {}", section.id);
        section.id = 0;
    }

    fn remove_from_zone(&mut self, zone: IVec3, handle: SectionHandle) {
        let Some(bucket) = self.zones.get_mut(&zone) else {
            log::error!("Zone {zone} does not exist, can not remove track from it");
            return;
        };
        bucket.shift_remove(&handle);
        if bucket.is_empty() {
            self.zones.remove(&zone);
        }
    }

    /// Sections with an endpoint in the same zone as `point`
    pub fn zone_sections(&self, point: Vec3) -> impl Iterator<Item = SectionHandle> + '_ {
        self.zones
            .get(&self.zone_of(point))
            .into_iter()
            .flatten()
            .copied()
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<SectionHandle> {
        self.sections_by_id.get(&id).copied()
    }

    /// All registered `(id, handle)` pairs in ascending id order
    #[must_use]
    pub fn registered(&self) -> Vec<(u32, SectionHandle)> {
        let mut entries: Vec<_> = self.sections_by_id.iter().map(|(&id, &h)| (id, h)).collect();
        entries.sort_unstable_by_key(|&(id, _)| id);
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections_by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections_by_id.is_empty()
    }

    /// Drop all sections and restart ids at 1
    pub fn clear(&mut self) {
        self.zones.clear();
        self.sections_by_id.clear();
        self.next_free_id = 1;
    }
}

impl Default for TrackDatabase {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE_SIZE)
    }
}
