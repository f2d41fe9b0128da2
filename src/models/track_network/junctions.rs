use super::TrackNetwork;
use crate::error::{Result, TrackError};
use crate::models::junction::{Junction, JunctionId};
use crate::models::section::SectionHandle;

/// Extension trait for junction-related operations on `TrackNetwork`
pub trait Junctions {
    /// Build a junction from three existing sections, with the left branch selected
    ///
    /// # Errors
    ///
    /// Returns an error if the sections are not distinct, a handle is stale, or
    /// no junction ids are left
    fn add_junction(
        &mut self,
        entry: SectionHandle,
        left: SectionHandle,
        right: SectionHandle,
    ) -> Result<JunctionId>;

    /// Get junction by id
    fn junction(&self, id: JunctionId) -> Option<&Junction>;

    /// All junctions in creation order
    fn junctions(&self) -> impl Iterator<Item = (JunctionId, &Junction)>;

    /// Switch a junction to its other branch and return whether it now goes left
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an unknown junction id
    fn toggle_junction(&mut self, id: JunctionId) -> Result<bool>;

    /// Select a specific branch; does nothing if it is already selected
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an unknown junction id
    fn set_junction(&mut self, id: JunctionId, go_left: bool) -> Result<()>;

    /// The junction whose entry is the given section
    fn junction_for_entry(&self, entry: SectionHandle) -> Option<JunctionId>;

    /// Forget a junction; the sections and their current wiring stay as they are
    fn remove_junction(&mut self, id: JunctionId) -> Option<Junction>;
}

fn unknown_junction(id: JunctionId) -> TrackError {
    TrackError::InvalidParameter(format!("Junction {} does not exist", id.0))
}

impl Junctions for TrackNetwork {
    fn add_junction(
        &mut self,
        entry: SectionHandle,
        left: SectionHandle,
        right: SectionHandle,
    ) -> Result<JunctionId> {
        if self.next_junction_id == 0 {
            return Err(TrackError::InvalidState("No free junction ids left".to_string()));
        }
        let junction = Junction::new(&mut self.sections, entry, left, right)?;
        let id = JunctionId(self.next_junction_id);
        self.next_junction_id = self.next_junction_id.wrapping_add(1);
        self.junctions.insert(id, junction);
        log::debug!("Added junction {} at entry {entry:?}", id.0);
        Ok(id)
    }

    fn junction(&self, id: JunctionId) -> Option<&Junction> {
        self.junctions.get(&id)
    }

    fn junctions(&self) -> impl Iterator<Item = (JunctionId, &Junction)> {
        self.junctions.iter().map(|(&id, junction)| (id, junction))
    }

    fn toggle_junction(&mut self, id: JunctionId) -> Result<bool> {
        let junction = self.junctions.get_mut(&id).ok_or_else(|| unknown_junction(id))?;
        junction.toggle(&mut self.sections);
        crate::debug_log!("Junction {} now goes {}", id.0, if junction.go_left() { "left" } else { "right" });
        Ok(junction.go_left())
    }

    fn set_junction(&mut self, id: JunctionId, go_left: bool) -> Result<()> {
        let current = self.junction(id).ok_or_else(|| unknown_junction(id))?.go_left();
        if current != go_left {
            self.toggle_junction(id)?;
        }
        Ok(())
    }

    fn junction_for_entry(&self, entry: SectionHandle) -> Option<JunctionId> {
        self.junctions
            .iter()
            .find(|(_, junction)| junction.entry() == entry)
            .map(|(&id, _)| id)
    }

    fn remove_junction(&mut self, id: JunctionId) -> Option<Junction> {
        self.junctions.shift_remove(&id)
    }
}
