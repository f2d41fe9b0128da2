use super::TrackNetwork;
use crate::error::Result;
use crate::geometry::{angle_between, invert_track_rotation};
use crate::models::section::{SectionEnd, SectionHandle};

/// Extension trait for snapping free section ends onto nearby free ends
pub trait Autoconnect {
    /// Link every free end of a section to the nearest compatible free end
    ///
    /// Candidates are the sections filed in the same zone as the endpoint. Two
    /// ends are compatible when both slots are empty, they are closer than
    /// `max_connect_distance` and they face each other within
    /// `max_connect_angle` degrees. Returns how many links were made.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSection` if the handle is stale
    fn autoconnect(&mut self, handle: SectionHandle) -> Result<usize>;

    /// The nearest compatible free end for one endpoint, without linking
    fn find_connection(&self, handle: SectionHandle, end: SectionEnd) -> Option<(SectionHandle, SectionEnd)>;
}

impl Autoconnect for TrackNetwork {
    fn autoconnect(&mut self, handle: SectionHandle) -> Result<usize> {
        self.try_section(handle)?;

        let mut linked = 0;
        for end in [SectionEnd::Start, SectionEnd::End] {
            if let Some((other, other_end)) = self.find_connection(handle, end) {
                self.link(handle, end, other, other_end)?;
                linked += 1;
            }
        }
        Ok(linked)
    }

    fn find_connection(&self, handle: SectionHandle, end: SectionEnd) -> Option<(SectionHandle, SectionEnd)> {
        let section = self.section(handle)?;
        if section.slot(end).is_some() {
            return None;
        }

        let config = self.config();
        let here = section.end_point(end);
        let facing = invert_track_rotation(here.rotation);

        let mut best: Option<(f32, SectionHandle, SectionEnd)> = None;
        for candidate in self.database.zone_sections(here.position) {
            if candidate == handle {
                continue;
            }
            let Some(other) = self.section(candidate) else {
                continue;
            };

            for other_end in [SectionEnd::End, SectionEnd::Start] {
                if other.slot(other_end).is_some() {
                    continue;
                }
                let there = other.end_point(other_end);
                let distance = there.position.distance(here.position);
                if distance >= config.max_connect_distance {
                    continue;
                }
                if angle_between(there.rotation, facing) >= config.max_connect_angle {
                    continue;
                }
                if best.is_none_or(|(closest, _, _)| distance < closest) {
                    best = Some((distance, candidate, other_end));
                }
            }
        }

        best.map(|(_, candidate, other_end)| (candidate, other_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::yaw;
    use crate::models::{Sections, TrackSection};
    use glam::{Quat, Vec3};

    fn place(network: &mut TrackNetwork, section: TrackSection, position: Vec3, rotation: Quat) -> SectionHandle {
        let handle = network.insert_section(section.with_pose(position, rotation));
        network.commit_section(handle, false).expect("commit");
        handle
    }

    fn straight(length: f32) -> TrackSection {
        TrackSection::new(length).expect("valid section")
    }

    #[test]
    fn test_end_to_start_connects() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);

        assert_eq!(network.autoconnect(b).expect("autoconnect"), 1);
        assert_eq!(network.section(a).expect("a").next, Some(b));
        assert_eq!(network.section(b).expect("b").previous, Some(a));
    }

    #[test]
    fn test_end_to_end_connects_reversed_sections() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        // Starts at z = 10 and runs back toward a, so both ends meet at z = 5
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 10.0), yaw(180.0));

        network.autoconnect(b).expect("autoconnect");

        assert_eq!(network.section(a).expect("a").next, Some(b));
        assert_eq!(network.section(b).expect("b").next, Some(a));
    }

    #[test]
    fn test_start_to_start_connects() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::ZERO, yaw(180.0));

        network.autoconnect(b).expect("autoconnect");

        assert_eq!(network.section(a).expect("a").previous, Some(b));
        assert_eq!(network.section(b).expect("b").previous, Some(a));
    }

    #[test]
    fn test_too_far_does_not_connect() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.1), Quat::IDENTITY);

        assert_eq!(network.autoconnect(b).expect("autoconnect"), 0);
        assert_eq!(network.section(a).expect("a").next, None);
    }

    #[test]
    fn test_misaligned_does_not_connect() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.0), yaw(10.0));

        assert_eq!(network.autoconnect(b).expect("autoconnect"), 0);
        assert_eq!(network.section(a).expect("a").next, None);
    }

    #[test]
    fn test_small_misalignment_connects() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.01, 0.0, 5.0), yaw(3.0));

        assert_eq!(network.autoconnect(b).expect("autoconnect"), 1);
        assert!(network.are_linked(a, b));
    }

    #[test]
    fn test_occupied_end_is_skipped() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);
        network.autoconnect(b).expect("autoconnect");

        let c = place(&mut network, straight(3.0), Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);
        assert_eq!(network.autoconnect(c).expect("autoconnect"), 0);
        assert_eq!(network.section(a).expect("a").next, Some(b));
        assert_eq!(network.section(c).expect("c").previous, None);
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let mut network = TrackNetwork::new();
        let far = place(&mut network, straight(5.0), Vec3::new(0.03, 0.0, 0.0), Quat::IDENTITY);
        let near = place(&mut network, straight(5.0), Vec3::new(0.01, 0.0, 0.0), Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);

        network.autoconnect(b).expect("autoconnect");

        assert_eq!(network.section(b).expect("b").previous, Some(near));
        assert_eq!(network.section(far).expect("far").next, None);
    }

    #[test]
    fn test_unregistered_sections_are_invisible() {
        let mut network = TrackNetwork::new();
        let a = network.insert_section(straight(5.0));
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);

        assert_eq!(network.autoconnect(b).expect("autoconnect"), 0);
        assert_eq!(network.section(a).expect("a").next, None);
    }

    #[test]
    fn test_curved_end_meets_straight_start() {
        let mut network = TrackNetwork::new();
        let curve = place(
            &mut network,
            TrackSection::curved(5.0, 15.0).expect("valid section"),
            Vec3::ZERO,
            Quat::IDENTITY,
        );
        let (end_position, end_rotation) = {
            let section = network.section(curve).expect("curve");
            (section.end_position(), section.end_rotation())
        };
        let b = place(&mut network, straight(5.0), end_position, end_rotation);

        assert_eq!(network.autoconnect(b).expect("autoconnect"), 1);
        assert_eq!(network.section(curve).expect("curve").next, Some(b));
    }

    #[test]
    fn test_find_connection_does_not_link() {
        let mut network = TrackNetwork::new();
        let a = place(&mut network, straight(5.0), Vec3::ZERO, Quat::IDENTITY);
        let b = place(&mut network, straight(5.0), Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);

        assert_eq!(network.find_connection(b, SectionEnd::Start), Some((a, SectionEnd::End)));
        assert_eq!(network.find_connection(b, SectionEnd::End), None);
        assert_eq!(network.section(a).expect("a").next, None);
    }
}
