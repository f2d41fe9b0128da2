use glam::{Quat, Vec3};

use super::section::{SectionHandle, TrackSection};
use super::track_network::TrackNetwork;
use crate::error::{Result, TrackError};
use crate::geometry::invert_track_rotation;

/// Shape of a piece to be laid by a [`TrackLayer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPiece {
    pub length: f32,
    pub curve: Option<f32>,
    /// Lay the piece end first, so its start points away from the cursor
    pub inverted: bool,
}

impl TrackPiece {
    #[must_use]
    pub fn straight(length: f32) -> Self {
        Self {
            length,
            curve: None,
            inverted: false,
        }
    }

    #[must_use]
    pub fn curved(length: f32, curve: f32) -> Self {
        Self {
            length,
            curve: Some(curve),
            inverted: false,
        }
    }

    #[must_use]
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    fn build(&self) -> Result<TrackSection> {
        match self.curve {
            Some(curve) => TrackSection::curved(self.length, curve),
            None => TrackSection::new(self.length),
        }
    }
}

/// Procedural builder that chains new sections onto a cursor section.
///
/// The cursor is the section new pieces attach to. While the layer is not
/// inverted, pieces go onto the cursor's end and its `next` slot; while it is
/// inverted they go onto its start and its `previous` slot. Each placement
/// pushes the previous cursor state so that [`TrackLayer::move_back`] can undo
/// one step of cursor movement.
///
/// Sections are inserted into the network's arena unregistered; committing
/// them to the database is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct TrackLayer {
    current: Option<SectionHandle>,
    inverted: bool,
    history: Vec<(Option<SectionHandle>, bool)>,
}

impl TrackLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<SectionHandle> {
        self.current
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn push_state(&mut self) {
        self.history.push((self.current, self.inverted));
    }

    /// Start a fresh piece at a given pose and make it the cursor
    ///
    /// An inverted piece is flipped after construction so that it runs back
    /// toward `position`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a non-positive length and `Unsupported`
    /// for an inverted curve
    pub fn start_track(
        &mut self,
        network: &mut TrackNetwork,
        position: Vec3,
        rotation: Quat,
        piece: TrackPiece,
    ) -> Result<SectionHandle> {
        let mut section = piece.build()?.with_pose(position, rotation);
        if piece.inverted {
            section.flip()?;
        }

        if self.current.is_some() {
            self.push_state();
        }

        let handle = network.insert_section(section);
        self.current = Some(handle);
        self.inverted = piece.inverted;
        crate::debug_log!("Started track {handle:?} at {position}");
        Ok(handle)
    }

    /// Lay a new piece onto the cursor and move the cursor onto it
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when there is no cursor, `UnknownSection` when the
    /// cursor section no longer exists, and `InvalidParameter` for a
    /// non-positive length
    pub fn place_track(&mut self, network: &mut TrackNetwork, piece: TrackPiece) -> Result<SectionHandle> {
        let Some(current) = self.current else {
            return Err(TrackError::InvalidState(
                "No active cursor, call start_track first".to_string(),
            ));
        };
        let mut section = piece.build()?;

        let cursor = network.try_section(current)?;
        let (anchor, anchor_rotation) = if self.inverted {
            (cursor.position, invert_track_rotation(cursor.rotation))
        } else {
            (cursor.end_position(), cursor.end_rotation())
        };

        // Rotation first: the inverted offset is taken in the new piece's frame
        section.rotation = if piece.inverted {
            invert_track_rotation(anchor_rotation) * section.local_rotation_at(section.length()).inverse()
        } else {
            anchor_rotation
        };
        section.position = if piece.inverted {
            anchor - section.rotation * section.local_position_at(section.length())
        } else {
            anchor
        };

        if piece.inverted {
            section.next = Some(current);
        } else {
            section.previous = Some(current);
        }

        let handle = network.insert_section(section);
        let cursor = network.try_section_mut(current)?;
        if self.inverted {
            cursor.previous = Some(handle);
        } else {
            cursor.next = Some(handle);
        }

        self.push_state();
        self.current = Some(handle);
        self.inverted = piece.inverted;
        crate::debug_log!("Placed track {handle:?} after {current:?}");
        Ok(handle)
    }

    /// Like [`TrackLayer::place_track`], then turn the new piece by an extra rotation
    ///
    /// # Errors
    ///
    /// Same as [`TrackLayer::place_track`]
    pub fn place_track_rotated(
        &mut self,
        network: &mut TrackNetwork,
        piece: TrackPiece,
        relative_rotation: Quat,
    ) -> Result<SectionHandle> {
        let handle = self.place_track(network, piece)?;
        let section = network.try_section_mut(handle)?;
        section.rotation *= relative_rotation;
        Ok(handle)
    }

    /// Put the cursor on an existing section, or clear it with `None`
    pub fn reposition(&mut self, section: Option<SectionHandle>, inverted: bool) {
        self.clear_history();
        self.current = section;
        self.inverted = inverted;
    }

    /// Drop the cursor but keep the history, so `move_back` can still return to it
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    /// Restore the cursor from before the last placement
    pub fn move_back(&mut self) {
        if let Some((section, inverted)) = self.history.pop() {
            self.current = section;
            self.inverted = inverted;
        }
    }
}
