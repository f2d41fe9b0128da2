use super::junction::JunctionId;
use super::layer::{TrackLayer, TrackPiece};
use super::section::{SectionEnd, SectionHandle};
use super::track_network::{Groups, Junctions, Sections, TrackNetwork};
use crate::error::{Result, TrackError};
use crate::geometry::Pose;

/// Side the diverging branch of a new junction bends toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionSide {
    Left,
    Right,
}

/// Placement tool: lays standard pieces with a [`TrackLayer`] and commits them.
///
/// Every placed piece is registered and autoconnected straight away. When the
/// cursor's open end got connected in the process there is nothing left to
/// build onto, so the cursor is released.
#[derive(Debug, Clone, Default)]
pub struct TrackPlacer {
    layer: TrackLayer,
}

impl TrackPlacer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn layer(&self) -> &TrackLayer {
        &self.layer
    }

    /// The section new pieces will attach to
    #[must_use]
    pub fn cursor(&self) -> Option<SectionHandle> {
        self.layer.current()
    }

    /// Lay a piece on the cursor, or start a new track at `start_pose` if there is no cursor
    fn lay(&mut self, network: &mut TrackNetwork, piece: TrackPiece, start_pose: Option<Pose>) -> Result<SectionHandle> {
        match (self.layer.current(), start_pose) {
            (Some(_), _) => self.layer.place_track(network, piece),
            (None, Some(pose)) => self.layer.start_track(network, pose.position, pose.rotation, piece),
            (None, None) => Err(TrackError::InvalidState(
                "Nothing selected and no start position given".to_string(),
            )),
        }
    }

    fn place(&mut self, network: &mut TrackNetwork, piece: TrackPiece, start_pose: Option<Pose>) -> Result<SectionHandle> {
        let handle = self.lay(network, piece, start_pose)?;
        network.commit_section(handle, true)?;
        self.deselect_if_connected(network);
        Ok(handle)
    }

    /// # Errors
    ///
    /// Returns `InvalidState` if there is neither a cursor nor a start pose
    pub fn place_straight(&mut self, network: &mut TrackNetwork, start_pose: Option<Pose>) -> Result<SectionHandle> {
        let piece = TrackPiece::straight(network.config().piece_length);
        self.place(network, piece, start_pose)
    }

    /// # Errors
    ///
    /// Returns `InvalidState` if there is neither a cursor nor a start pose
    pub fn place_short(&mut self, network: &mut TrackNetwork, start_pose: Option<Pose>) -> Result<SectionHandle> {
        let piece = TrackPiece::straight(network.config().short_length);
        self.place(network, piece, start_pose)
    }

    /// # Errors
    ///
    /// Returns `InvalidState` if there is neither a cursor nor a start pose
    pub fn place_left(&mut self, network: &mut TrackNetwork, start_pose: Option<Pose>) -> Result<SectionHandle> {
        let config = network.config();
        let piece = TrackPiece::curved(config.piece_length, -config.curve_angle);
        self.place(network, piece, start_pose)
    }

    /// # Errors
    ///
    /// Returns `InvalidState` if there is neither a cursor nor a start pose
    pub fn place_right(&mut self, network: &mut TrackNetwork, start_pose: Option<Pose>) -> Result<SectionHandle> {
        let config = network.config();
        let piece = TrackPiece::curved(config.piece_length, config.curve_angle);
        self.place(network, piece, start_pose)
    }

    /// Lay a short entry piece that splits into a straight and a curved branch
    ///
    /// The three pieces are grouped so they are removed together, and the
    /// junction is set to the straight branch. The cursor ends up on the
    /// curved branch.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if there is neither a cursor nor a start pose
    pub fn place_junction(
        &mut self,
        network: &mut TrackNetwork,
        side: JunctionSide,
        start_pose: Option<Pose>,
    ) -> Result<JunctionId> {
        let config = network.config().clone();
        let entry = self.lay(
            network,
            TrackPiece::straight(config.junction_entry_length),
            start_pose,
        )?;
        let straight = self
            .layer
            .place_track(network, TrackPiece::straight(config.piece_length))?;
        self.layer.move_back();

        let curve = match side {
            JunctionSide::Left => -config.curve_angle,
            JunctionSide::Right => config.curve_angle,
        };
        let branch = self
            .layer
            .place_track(network, TrackPiece::curved(config.piece_length, curve))?;

        let id = match side {
            JunctionSide::Right => network.add_junction(entry, straight, branch)?,
            JunctionSide::Left => {
                let id = network.add_junction(entry, branch, straight)?;
                network.toggle_junction(id)?;
                id
            }
        };

        network.create_group(&[entry, straight, branch])?;
        for handle in [entry, straight, branch] {
            network.commit_section(handle, true)?;
        }

        self.deselect_if_connected(network);
        log::debug!("Placed {side:?} junction {}", id.0);
        Ok(id)
    }

    /// Put the cursor on a free endpoint of an existing section
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if that endpoint is already connected, and
    /// `UnknownSection` if the handle is stale
    pub fn select(&mut self, network: &TrackNetwork, handle: SectionHandle, end: SectionEnd) -> Result<()> {
        if network.try_section(handle)?.slot(end).is_some() {
            return Err(TrackError::InvalidState(format!(
                "{end:?} of section {handle:?} is already connected"
            )));
        }
        self.layer.reposition(Some(handle), end == SectionEnd::Start);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.layer.reposition(None, false);
    }

    /// Release the cursor if the end being built onto is already linked
    ///
    /// A cursor pointing at a section that no longer exists is released as well.
    pub fn deselect_if_connected(&mut self, network: &TrackNetwork) {
        let Some(current) = self.layer.current() else {
            return;
        };
        let open_end = if self.layer.is_inverted() {
            SectionEnd::Start
        } else {
            SectionEnd::End
        };
        let connected = network
            .section(current)
            .is_none_or(|section| section.slot(open_end).is_some());
        if connected {
            self.layer.clear_current();
        }
    }

    /// Remove a section (and its group), releasing the cursor if it was removed
    ///
    /// # Errors
    ///
    /// Returns `UnknownSection` if the handle is stale
    pub fn remove(&mut self, network: &mut TrackNetwork, handle: SectionHandle) -> Result<Vec<SectionHandle>> {
        let removed = network.remove_section(handle)?;
        if self.layer.current().is_some_and(|current| removed.contains(&current)) {
            self.deselect();
        }
        Ok(removed)
    }
}
