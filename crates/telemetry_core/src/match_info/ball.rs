//! Ball state as captured by the step recorder.

use serde::{Deserialize, Serialize};

use super::pose::Position;

/// Static information about the match ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticBall {
    pub id: String,
    pub mass_kg: f64,
    pub texture: String,
    pub diameter_m: f64,
}

/// Dynamic per-step ball state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Position>,
}
