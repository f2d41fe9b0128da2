use glam::{Quat, Vec3};

use super::section::{SectionHandle, TrackSection};
use super::track_network::TrackNetwork;
use crate::geometry::invert_track_rotation;

/// A point that travels along the track graph by arc length.
///
/// `distance` is measured from the start of `section`. `inverted` means the
/// follower's forward is against the section's own forward, so a positive
/// move walks toward the section's start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackFollower {
    section: SectionHandle,
    distance: f32,
    inverted: bool,
}

impl TrackFollower {
    #[must_use]
    pub fn new(section: SectionHandle, distance: f32, inverted: bool) -> Self {
        Self {
            section,
            distance,
            inverted,
        }
    }

    #[must_use]
    pub fn section(&self) -> SectionHandle {
        self.section
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// World position, or `None` if the section has been removed
    #[must_use]
    pub fn position(&self, network: &TrackNetwork) -> Option<Vec3> {
        network
            .section(self.section)
            .map(|section| section.position_at(self.distance))
    }

    /// World orientation facing the follower's direction of travel
    #[must_use]
    pub fn rotation(&self, network: &TrackNetwork) -> Option<Quat> {
        let rotation = network.section(self.section)?.rotation_at(self.distance);
        Some(if self.inverted {
            invert_track_rotation(rotation)
        } else {
            rotation
        })
    }

    /// Advance by `delta` along the follower's own forward direction
    ///
    /// Crosses as many section boundaries as needed. Returns `false` when the
    /// track runs out before the full distance is covered; the follower is then
    /// left at the last boundary it reached. Also returns `false` if the
    /// follower's section no longer exists.
    pub fn move_by(&mut self, network: &TrackNetwork, delta: f32) -> bool {
        let tolerance = network.config().reversal_tolerance;
        let mut remaining = delta.abs();

        while remaining > 0.0 {
            let Some(section) = network.section(self.section) else {
                return false;
            };

            let mut relative = delta.signum() * remaining;
            if self.inverted {
                relative = -relative;
            }

            if relative < 0.0 {
                if self.distance + relative >= 0.0 {
                    self.distance += relative;
                    return true;
                }
                let Some(previous) = section.previous.and_then(|h| network.section(h).map(|s| (h, s))) else {
                    return false;
                };

                remaining -= self.distance;
                self.enter(previous, section.position, TrackSection::end_position, tolerance, 0.0);
            } else {
                if self.distance + relative <= section.length() {
                    self.distance += relative;
                    return true;
                }
                let Some(next) = section.next.and_then(|h| network.section(h).map(|s| (h, s))) else {
                    return false;
                };

                remaining -= section.length() - self.distance;
                self.enter(next, section.end_position(), |s| s.position, tolerance, next.1.length());
            }
        }
        true
    }

    /// Step onto a neighbour through the boundary at `boundary`
    ///
    /// The neighbour is aligned when its `meeting` endpoint sits on the
    /// boundary; otherwise it is reversed, the follower flips and enters at
    /// `reversed_distance`.
    fn enter(
        &mut self,
        (handle, neighbour): (SectionHandle, &TrackSection),
        boundary: Vec3,
        meeting: impl Fn(&TrackSection) -> Vec3,
        tolerance: f32,
        reversed_distance: f32,
    ) {
        let reversed = meeting(neighbour).distance(boundary) > tolerance;
        if reversed {
            self.inverted = !self.inverted;
            self.distance = reversed_distance;
        } else {
            self.distance = neighbour.length() - reversed_distance;
        }
        crate::debug_log!(
            "Follower crossed from {:?} into {handle:?}{}",
            self.section,
            if reversed { " (reversed)" } else { "" }
        );
        self.section = handle;
    }
}
