//! Match state model: teams, players, ball and spatial primitives.

pub mod ball;
pub mod player;
pub mod pose;
pub mod team;

pub use ball::{Ball, StaticBall};
pub use player::{Player, StaticPlayer};
pub use pose::{Pose, Position, Rotation};
pub use team::{PlatformData, StaticTeam, StaticTeams, Team, TeamColor, Teams};
