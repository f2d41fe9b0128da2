mod flex;
mod follower;
mod junction;
mod layer;
mod placement;
mod section;
mod track_database;
mod track_network;

pub use flex::connect_ends;
pub use follower::TrackFollower;
pub use junction::{Junction, JunctionId};
pub use layer::{TrackLayer, TrackPiece};
pub use placement::{JunctionSide, TrackPlacer};
pub use section::{SectionEnd, SectionHandle, TrackSection};
pub use track_database::TrackDatabase;
pub use track_network::{
    Autoconnect, GroupId, Groups, Junctions, SectionArena, Sections, TrackNetwork,
};
