//! Flex track: joining two free section ends with a fitted curve.

use glam::{Quat, Vec3};

use super::layer::{TrackLayer, TrackPiece};
use super::section::{SectionEnd, SectionHandle};
use super::track_network::{Sections, TrackNetwork};
use crate::constants::FLEX_COLLINEAR_ANGLE;
use crate::error::{Result, TrackError};
use crate::geometry::{angle_between, invert_track_rotation, line_line_intersection};

/// Legs shorter than this are treated as equal, so no straight filler is laid
const EQUAL_LEG_TOLERANCE: f32 = 1e-4;

/// Join two section endpoints with new track
///
/// The outward rays of both ends are intersected. If they meet ahead of both
/// ends, a circular curve is fitted against the shorter leg and a straight
/// makes up the rest of the longer one. If the ends face each other on one line
/// a single straight is laid instead. The new pieces are committed; the last
/// one is autoconnected so it links onto `to`.
///
/// # Errors
///
/// Returns `InvalidParameter` when either end is already connected or the ends
/// cannot be joined this way, and `UnknownSection` for stale handles
pub fn connect_ends(
    network: &mut TrackNetwork,
    from: (SectionHandle, SectionEnd),
    to: (SectionHandle, SectionEnd),
) -> Result<Vec<SectionHandle>> {
    for (handle, end) in [from, to] {
        if network.try_section(handle)?.slot(end).is_some() {
            return Err(TrackError::InvalidParameter(format!(
                "{end:?} of section {handle:?} is already connected"
            )));
        }
    }

    let from_pose = network.try_section(from.0)?.end_point(from.1);
    let to_pose = network.try_section(to.0)?.end_point(to.1);
    let from_forward = from_pose.forward();
    let to_forward = to_pose.forward();

    let mut layer = TrackLayer::new();
    layer.reposition(Some(from.0), from.1 == SectionEnd::Start);

    let pieces = match line_line_intersection(from_pose.position, from_forward, to_pose.position, to_forward) {
        Some((intersection, s, t)) if s > 0.0 && t > 0.0 => {
            let from_leg = intersection.distance(from_pose.position);
            let to_leg = intersection.distance(to_pose.position);

            let mut curve = 180.0 - angle_between(from_pose.rotation, to_pose.rotation);
            if from_forward.cross(to_pose.position - from_pose.position).y < 0.0 {
                curve = -curve;
            }
            let arc = FittedArc {
                from: from_pose.position,
                from_rotation: from_pose.rotation,
                to: to_pose.position,
                to_rotation: to_pose.rotation,
                curve,
            };

            let straight_length = (from_leg - to_leg).abs();
            if straight_length < EQUAL_LEG_TOLERANCE {
                vec![TrackPiece::curved(arc.length(0.0, 0.0)?, curve)]
            } else if from_leg < to_leg {
                vec![
                    TrackPiece::curved(arc.length(0.0, straight_length)?, curve),
                    TrackPiece::straight(straight_length),
                ]
            } else {
                vec![
                    TrackPiece::straight(straight_length),
                    TrackPiece::curved(arc.length(straight_length, 0.0)?, curve),
                ]
            }
        }
        _ => {
            let facing = angle_between(from_pose.rotation, invert_track_rotation(to_pose.rotation));
            let gap = to_pose.position - from_pose.position;
            if facing >= FLEX_COLLINEAR_ANGLE || gap.dot(from_forward) <= 0.0 {
                return Err(TrackError::InvalidParameter(
                    "Track ends can not be joined with a curve or a straight".to_string(),
                ));
            }
            vec![TrackPiece::straight(gap.length())]
        }
    };

    let mut placed = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        let handle = layer.place_track(network, *piece)?;
        network.commit_section(handle, index + 1 == pieces.len())?;
        placed.push(handle);
    }

    log::debug!("Flex track placed {} piece(s) between {:?} and {:?}", placed.len(), from.0, to.0);
    Ok(placed)
}

/// The circle tangent to both end rays
struct FittedArc {
    from: Vec3,
    from_rotation: Quat,
    to: Vec3,
    to_rotation: Quat,
    curve: f32,
}

impl FittedArc {
    /// Arc length of the curve when the arc starts `start_offset` along the
    /// from-ray and ends `end_offset` along the to-ray
    fn length(&self, start_offset: f32, end_offset: f32) -> Result<f32> {
        let start = self.from + self.from_rotation * Vec3::Z * start_offset;
        let end = self.to + self.to_rotation * Vec3::Z * end_offset;
        let side = self.curve.signum();

        let (center, _, _) = line_line_intersection(
            start,
            self.from_rotation * (Vec3::X * side),
            end,
            self.to_rotation * (Vec3::NEG_X * side),
        )
        .ok_or_else(|| TrackError::InvalidParameter("Can not fit a curve between the track ends".to_string()))?;

        Ok(end.distance(center) * self.curve.abs().to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{assert_vec_eq, yaw};
    use crate::models::TrackSection;

    fn committed(network: &mut TrackNetwork, section: TrackSection) -> SectionHandle {
        let handle = network.insert_section(section);
        network.commit_section(handle, false).expect("commit");
        handle
    }

    fn straight_at(position: Vec3, rotation: Quat) -> TrackSection {
        TrackSection::new(5.0).expect("valid section").with_pose(position, rotation)
    }

    #[test]
    fn test_quarter_turn_with_equal_legs() {
        let mut network = TrackNetwork::new();
        let from = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        let to = committed(&mut network, straight_at(Vec3::new(10.0, 0.0, 15.0), yaw(90.0)));

        let placed = connect_ends(&mut network, (from, SectionEnd::End), (to, SectionEnd::Start))
            .expect("flex track");

        assert_eq!(placed.len(), 1);
        let curve = network.section(placed[0]).expect("curve");
        assert!((curve.curve() - 90.0).abs() < 1e-2);
        assert!((curve.length() - 5.0 * std::f32::consts::PI).abs() < 1e-2);
        assert_vec_eq(curve.end_position(), Vec3::new(10.0, 0.0, 15.0), 1e-2);
        assert!(network.are_linked(from, placed[0]));
        assert!(network.are_linked(placed[0], to));
    }

    #[test]
    fn test_longer_to_leg_gets_straight_after_curve() {
        let mut network = TrackNetwork::new();
        let from = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        let to = committed(&mut network, straight_at(Vec3::new(-20.0, 0.0, 15.0), yaw(-90.0)));

        let placed = connect_ends(&mut network, (from, SectionEnd::End), (to, SectionEnd::Start))
            .expect("flex track");

        assert_eq!(placed.len(), 2);
        let curve = network.section(placed[0]).expect("curve");
        let straight = network.section(placed[1]).expect("straight");
        assert!(curve.curve() < 0.0);
        assert!((straight.length() - 10.0).abs() < 1e-2);
        assert_vec_eq(straight.end_position(), Vec3::new(-20.0, 0.0, 15.0), 1e-2);
        assert!(network.are_linked(placed[1], to));
    }

    #[test]
    fn test_longer_from_leg_gets_straight_before_curve() {
        let mut network = TrackNetwork::new();
        let from = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        let to = committed(&mut network, straight_at(Vec3::new(10.0, 0.0, 25.0), yaw(90.0)));

        let placed = connect_ends(&mut network, (from, SectionEnd::End), (to, SectionEnd::Start))
            .expect("flex track");

        assert_eq!(placed.len(), 2);
        assert!((network.section(placed[0]).expect("straight").length() - 10.0).abs() < 1e-2);
        assert!(network.section(placed[1]).expect("curve").is_curved());
        assert!(network.are_linked(placed[1], to));
    }

    #[test]
    fn test_facing_ends_get_a_straight() {
        let mut network = TrackNetwork::new();
        let from = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        let to = committed(&mut network, straight_at(Vec3::new(0.0, 0.0, 12.0), Quat::IDENTITY));

        let placed = connect_ends(&mut network, (from, SectionEnd::End), (to, SectionEnd::Start))
            .expect("flex track");

        assert_eq!(placed.len(), 1);
        let straight = network.section(placed[0]).expect("straight");
        assert!(!straight.is_curved());
        assert!((straight.length() - 7.0).abs() < 1e-4);
        assert!(network.are_linked(placed[0], to));
    }

    #[test]
    fn test_from_start_builds_backward() {
        let mut network = TrackNetwork::new();
        let from = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        // Its end sits 8 units behind the from-section's start
        let to = committed(&mut network, straight_at(Vec3::new(0.0, 0.0, -13.0), Quat::IDENTITY));

        let placed = connect_ends(&mut network, (from, SectionEnd::Start), (to, SectionEnd::End))
            .expect("flex track");

        assert_eq!(placed.len(), 1);
        assert_eq!(network.section(from).expect("from").previous, Some(placed[0]));
        assert!(network.are_linked(placed[0], to));
    }

    #[test]
    fn test_connected_ends_are_rejected() {
        let mut network = TrackNetwork::new();
        let a = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        let b = network.insert_section(straight_at(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY));
        network.commit_section(b, true).expect("commit b");
        assert!(network.are_linked(a, b));
        let c = committed(&mut network, straight_at(Vec3::new(0.0, 0.0, 30.0), Quat::IDENTITY));

        let result = connect_ends(&mut network, (a, SectionEnd::End), (c, SectionEnd::Start));
        assert!(matches!(result, Err(TrackError::InvalidParameter(_))));

        let result = connect_ends(&mut network, (c, SectionEnd::Start), (b, SectionEnd::Start));
        assert!(matches!(result, Err(TrackError::InvalidParameter(_))));

        assert_eq!(network.section_count(), 3);
        assert_eq!(network.section(a).expect("a").next, Some(b));
        assert_eq!(network.section(b).expect("b").previous, Some(a));
    }

    #[test]
    fn test_diverging_ends_are_rejected() {
        let mut network = TrackNetwork::new();
        let from = committed(&mut network, straight_at(Vec3::ZERO, Quat::IDENTITY));
        // Its start faces +X, away from the from-ray, so the rays meet behind it
        let to = committed(&mut network, straight_at(Vec3::new(10.0, 0.0, 15.0), yaw(-90.0)));

        let result = connect_ends(&mut network, (from, SectionEnd::End), (to, SectionEnd::Start));
        assert!(matches!(result, Err(TrackError::InvalidParameter(_))));
        assert_eq!(network.section_count(), 2);
    }
}
