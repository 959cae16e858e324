//! # telemetry_core - Recorded match state for simulated robot soccer
//!
//! Data model for a recorded match: static and dynamic team/player/ball
//! state, the per-simulation-step records, and the sparse wide table the
//! post-processing tools read and augment. Persistence covers pretty JSON
//! and a MessagePack+LZ4 cache with checksum metadata.

pub mod error;
pub mod io;
pub mod match_info;
pub mod step;
pub mod table;

pub use error::{MatchInfoError, TableError};
pub use io::{
    export_table_cache, load_table_cache, load_table_json, save_table_json, verify_table_cache,
    ExportMetadata,
};
pub use match_info::{
    Ball, PlatformData, Player, Pose, Position, Rotation, StaticBall, StaticPlayer, StaticTeam,
    StaticTeams, Team, TeamColor, Teams,
};
pub use step::{Match, MatchType, SimTime, Step};
pub use table::{player_id_column, CellValue, StepTable};
