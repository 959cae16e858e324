//! Player state as captured by the step recorder.

use serde::{Deserialize, Serialize};

use super::pose::{Pose, Position};

/// Static information about a player, fixed for the whole match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPlayer {
    pub id: String,
    pub mass_kg: f64,
    /// Degrees of freedom of the robot platform.
    pub dof: u32,
    /// Robot platform name, used to join in per-platform metadata.
    pub platform: String,
    /// Per-platform metadata joined in by
    /// `StaticTeams::fill_in_additional_player_data`, serialized inline
    /// with the player.
    #[serde(flatten, skip_serializing_if = "serde_json::Map::is_empty")]
    pub additional: serde_json::Map<String, serde_json::Value>,
}

/// Dynamic per-step player state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub pose: Pose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Position>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_info::pose::Rotation;

    #[test]
    fn test_player_json_roundtrip() {
        let player = Player {
            id: "player_1".to_string(),
            pose: Pose {
                position: Position { x: 0.5, y: 1.0, z: 0.0 },
                rotation: Rotation { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
            },
            velocity: None,
        };
        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(player, back);
    }
}
