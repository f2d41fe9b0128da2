use glam::{Quat, Vec3};
use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use super::GroupId;
use crate::error::{Result, TrackError};
use crate::geometry::{invert_track_rotation, yaw, Pose};

/// Stable handle of a section inside a network's section arena
pub type SectionHandle = NodeIndex;

/// One of the two endpoints of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionEnd {
    Start,
    End,
}

/// A single straight or constant-curvature piece of track.
///
/// `next` and `previous` are the two graph slots. They are plain handles into
/// the owning network and carry no direction: a neighbour in `next` may have
/// this section in either of its own slots.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSection {
    pub(crate) id: u32,
    pub position: Vec3,
    pub rotation: Quat,
    length: f32,
    curved: bool,
    curve: f32,
    pub next: Option<SectionHandle>,
    pub previous: Option<SectionHandle>,
    pub(crate) group: Option<GroupId>,
}

fn check_length(length: f32) -> Result<()> {
    if length.is_finite() && length > 0.0 {
        Ok(())
    } else {
        Err(TrackError::InvalidParameter(format!(
            "Length must be positive, got {length}"
        )))
    }
}

impl TrackSection {
    /// Create an unregistered straight section at the origin
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `length` is not positive
    pub fn new(length: f32) -> Result<Self> {
        check_length(length)?;
        Ok(Self {
            id: 0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            length,
            curved: false,
            curve: 0.0,
            next: None,
            previous: None,
            group: None,
        })
    }

    /// Create an unregistered curved section turning `curve` degrees over `length`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `length` is not positive or `curve` is not finite
    pub fn curved(length: f32, curve: f32) -> Result<Self> {
        if !curve.is_finite() {
            return Err(TrackError::InvalidParameter(format!(
                "Curve must be finite, got {curve}"
            )));
        }
        let mut section = Self::new(length)?;
        section.curved = true;
        section.curve = curve;
        Ok(section)
    }

    #[must_use]
    pub fn with_pose(mut self, position: Vec3, rotation: Quat) -> Self {
        self.position = position;
        self.rotation = rotation;
        self
    }

    /// Unique id assigned on registration, 0 while unregistered
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.id != 0
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// # Errors
    ///
    /// Returns `InvalidParameter` if `length` is not positive
    pub fn set_length(&mut self, length: f32) -> Result<()> {
        check_length(length)?;
        self.length = length;
        Ok(())
    }

    #[must_use]
    pub fn is_curved(&self) -> bool {
        self.curved
    }

    /// Signed turn in degrees; 0 for straight sections
    #[must_use]
    pub fn curve(&self) -> f32 {
        if self.curved {
            self.curve
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    // A zero-degree arc has an infinite radius, so it is evaluated as a straight
    fn arc_angle(&self) -> Option<f32> {
        (self.curved && self.curve != 0.0).then_some(self.curve)
    }

    /// Position at `distance` along the section, relative to the section's own anchor and orientation
    #[must_use]
    pub fn local_position_at(&self, distance: f32) -> Vec3 {
        if let Some(curve) = self.arc_angle() {
            let angle_radians = curve.to_radians();
            let radius = self.length / angle_radians;
            let a = angle_radians * (distance / self.length);
            return Vec3::new(radius - a.cos() * radius, 0.0, a.sin() * radius);
        }

        Vec3::ZERO.lerp(Vec3::Z * self.length, distance / self.length)
    }

    /// Heading at `distance` along the section, relative to the section's own orientation
    #[must_use]
    pub fn local_rotation_at(&self, distance: f32) -> Quat {
        match self.arc_angle() {
            Some(curve) => yaw(curve * (distance / self.length)),
            None => Quat::IDENTITY,
        }
    }

    /// World position at `distance` from the start of the section
    #[must_use]
    pub fn position_at(&self, distance: f32) -> Vec3 {
        if self.arc_angle().is_some() {
            return self.rotation * self.local_position_at(distance) + self.position;
        }

        let end = self.rotation * Vec3::Z * self.length + self.position;
        self.position.lerp(end, distance / self.length)
    }

    /// World orientation at `distance` from the start of the section
    #[must_use]
    pub fn rotation_at(&self, distance: f32) -> Quat {
        self.rotation * self.local_rotation_at(distance)
    }

    #[must_use]
    pub fn end_position(&self) -> Vec3 {
        self.position_at(self.length)
    }

    #[must_use]
    pub fn end_rotation(&self) -> Quat {
        self.rotation_at(self.length)
    }

    /// Position of an endpoint and the orientation pointing out of the section there
    #[must_use]
    pub fn end_point(&self, end: SectionEnd) -> Pose {
        match end {
            SectionEnd::End => Pose::new(self.end_position(), self.end_rotation()),
            SectionEnd::Start => Pose::new(self.position, invert_track_rotation(self.rotation)),
        }
    }

    /// The graph slot attached at an endpoint
    #[must_use]
    pub fn slot(&self, end: SectionEnd) -> Option<SectionHandle> {
        match end {
            SectionEnd::End => self.next,
            SectionEnd::Start => self.previous,
        }
    }

    pub fn set_slot(&mut self, end: SectionEnd, neighbour: Option<SectionHandle>) {
        match end {
            SectionEnd::End => self.next = neighbour,
            SectionEnd::Start => self.previous = neighbour,
        }
    }

    /// Which slot, if any, holds `neighbour`
    #[must_use]
    pub fn end_linked_to(&self, neighbour: SectionHandle) -> Option<SectionEnd> {
        if self.next == Some(neighbour) {
            Some(SectionEnd::End)
        } else if self.previous == Some(neighbour) {
            Some(SectionEnd::Start)
        } else {
            None
        }
    }

    /// Swap start and end in place, so the old end becomes the new start
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for curved sections
    pub fn flip(&mut self) -> Result<()> {
        if self.curved {
            return Err(TrackError::Unsupported(
                "Flipping a curved section is not supported".to_string(),
            ));
        }

        let end = self.end_position();
        self.rotation = invert_track_rotation(self.rotation);
        self.position = end;
        Ok(())
    }

    /// Copy of the geometry only: no id, links or group
    #[must_use]
    pub fn clone_geometry(&self) -> Self {
        Self {
            id: 0,
            next: None,
            previous: None,
            group: None,
            ..self.clone()
        }
    }
}
