use indexmap::IndexMap;
use petgraph::stable_graph::StableGraph;

use super::junction::{Junction, JunctionId};
use super::section::{SectionEnd, SectionHandle, TrackSection};
use super::track_database::TrackDatabase;
use crate::config::TrackConfig;
use crate::error::{Result, TrackError};

mod autoconnect;
mod groups;
mod junctions;
mod sections;

pub use autoconnect::Autoconnect;
pub use groups::{GroupId, Groups};
pub use junctions::Junctions;
pub use sections::Sections;

/// Arena holding every section of a network, addressed by stable handles
///
/// Only nodes are used; graph links live in the sections' own `next` and
/// `previous` slots.
pub type SectionArena = StableGraph<TrackSection, ()>;

/// The rail network: section arena, spatial database, junctions and groups.
///
/// This is the one context object that builders, tools and followers operate
/// on. Sections enter the arena unregistered (id 0) and become visible to
/// proximity queries once committed to the database.
#[derive(Debug, Clone)]
pub struct TrackNetwork {
    pub(crate) sections: SectionArena,
    pub(crate) database: TrackDatabase,
    pub(crate) junctions: IndexMap<JunctionId, Junction>,
    pub(crate) next_junction_id: u32,
    pub(crate) groups: IndexMap<GroupId, Vec<SectionHandle>>,
    pub(crate) next_group_id: u16,
    config: TrackConfig,
}

impl TrackNetwork {
    #[must_use]
    pub fn new() -> Self {
        let config = TrackConfig::default();
        Self {
            sections: SectionArena::default(),
            database: TrackDatabase::new(config.zone_size),
            junctions: IndexMap::new(),
            next_junction_id: 1,
            groups: IndexMap::new(),
            next_group_id: 1,
            config,
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidParameter` if the config does not validate
    pub fn with_config(config: TrackConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            database: TrackDatabase::new(config.zone_size),
            config,
            ..Self::new()
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    #[must_use]
    pub fn database(&self) -> &TrackDatabase {
        &self.database
    }

    /// Add a section to the arena without registering it
    pub fn insert_section(&mut self, section: TrackSection) -> SectionHandle {
        self.sections.add_node(section)
    }

    #[must_use]
    pub fn section(&self, handle: SectionHandle) -> Option<&TrackSection> {
        self.sections.node_weight(handle)
    }

    pub fn section_mut(&mut self, handle: SectionHandle) -> Option<&mut TrackSection> {
        self.sections.node_weight_mut(handle)
    }

    /// # Errors
    ///
    /// Returns `UnknownSection` if the handle is stale
    pub fn try_section(&self, handle: SectionHandle) -> Result<&TrackSection> {
        self.sections
            .node_weight(handle)
            .ok_or(TrackError::UnknownSection(handle))
    }

    /// # Errors
    ///
    /// Returns `UnknownSection` if the handle is stale
    pub fn try_section_mut(&mut self, handle: SectionHandle) -> Result<&mut TrackSection> {
        self.sections
            .node_weight_mut(handle)
            .ok_or(TrackError::UnknownSection(handle))
    }

    /// Look up a registered section by its unique id
    #[must_use]
    pub fn section_by_id(&self, id: u32) -> Option<SectionHandle> {
        self.database.get(id)
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionHandle, &TrackSection)> {
        self.sections
            .node_indices()
            .filter_map(|handle| self.sections.node_weight(handle).map(|s| (handle, s)))
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.node_count()
    }

    /// Forget every section, junction and group; used before loading a new world
    pub fn clear(&mut self) {
        self.sections.clear();
        self.database.clear();
        self.junctions.clear();
        self.next_junction_id = 1;
        self.groups.clear();
        self.next_group_id = 1;
    }

    /// Link two section endpoints to each other
    pub(crate) fn link(
        &mut self,
        a: SectionHandle,
        a_end: SectionEnd,
        b: SectionHandle,
        b_end: SectionEnd,
    ) -> Result<()> {
        self.try_section_mut(a)?.set_slot(a_end, Some(b));
        self.try_section_mut(b)?.set_slot(b_end, Some(a));
        log::debug!("Linked {a:?} {a_end:?} <-> {b:?} {b_end:?}");
        Ok(())
    }
}

impl Default for TrackNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_new_network_is_empty() {
        let network = TrackNetwork::new();
        assert_eq!(network.section_count(), 0);
        assert!(network.database().is_empty());
        assert_eq!(network.config(), &TrackConfig::default());
    }

    #[test]
    fn test_with_config_sets_zone_size() {
        let config = TrackConfig {
            zone_size: 25.0,
            ..TrackConfig::default()
        };
        let network = TrackNetwork::with_config(config).expect("valid config");
        assert_eq!(network.database().zone_size(), 25.0);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = TrackConfig {
            zone_size: -1.0,
            ..TrackConfig::default()
        };
        assert!(TrackNetwork::with_config(config).is_err());
    }

    #[test]
    fn test_insert_section_is_unregistered() {
        let mut network = TrackNetwork::new();
        let handle = network.insert_section(TrackSection::new(3.0).expect("valid section"));
        let section = network.section(handle).expect("section should exist");
        assert_eq!(section.id(), 0);
        assert_eq!(network.database().zone_sections(Vec3::ZERO).count(), 0);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut network = TrackNetwork::new();
        let handle = network.insert_section(TrackSection::new(3.0).expect("valid section"));
        network.clear();
        assert_eq!(network.section_count(), 0);
        assert!(network.section(handle).is_none());
        assert!(matches!(network.try_section(handle), Err(TrackError::UnknownSection(_))));
    }
}
