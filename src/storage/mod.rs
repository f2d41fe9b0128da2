mod file;

pub use file::{load_network, save_network};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::models::TrackSection;

pub use crate::constants::CURRENT_FORMAT_VERSION;

/// On-disk form of one section; every field is fixed width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: u32,
    pub position: [f32; 3],
    /// Stored as w, x, y, z
    pub rotation: [f32; 4],
    pub length: f32,
    /// 0 for straight sections
    pub curve: f32,
}

/// A section record followed by its group, 0 meaning ungrouped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPieceRecord {
    pub section: SectionRecord,
    pub group_id: u16,
}

/// Junction wiring, referencing sections by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionRecord {
    pub entry_id: u32,
    pub left_id: u32,
    pub right_id: u32,
    pub go_left: bool,
}

impl From<&TrackSection> for SectionRecord {
    fn from(section: &TrackSection) -> Self {
        let [x, y, z, w] = section.rotation.to_array();
        Self {
            id: section.id(),
            position: section.position.to_array(),
            rotation: [w, x, y, z],
            length: section.length(),
            curve: section.curve(),
        }
    }
}

impl SectionRecord {
    /// Rebuild the section this record describes, carrying the stored id
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` if the stored geometry is not a valid section
    pub fn to_section(&self) -> Result<TrackSection> {
        let section = if self.curve == 0.0 {
            TrackSection::new(self.length)
        } else {
            TrackSection::curved(self.length, self.curve)
        };
        let [w, x, y, z] = self.rotation;
        let mut section = section
            .map_err(|e| TrackError::CorruptData(format!("Track {}: {e}", self.id)))?
            .with_pose(Vec3::from_array(self.position), Quat::from_xyzw(x, y, z, w));
        section.id = self.id;
        Ok(section)
    }
}
