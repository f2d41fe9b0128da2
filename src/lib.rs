pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod models;
pub mod storage;

pub use config::TrackConfig;
pub use error::{Result, TrackError};
pub use models::{
    Autoconnect, Groups, Junctions, Sections, TrackFollower, TrackLayer, TrackNetwork, TrackPiece,
    TrackPlacer, TrackSection,
};
