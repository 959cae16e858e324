//! Spatial primitives shared by players and the ball.

use serde::{Deserialize, Serialize};

/// Position of an object in 3D space, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Rotation of an object in 3D space as a quaternion (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Rotation {
    /// Convert to intrinsic roll/pitch/yaw Euler angles.
    pub fn rpy(&self) -> (f64, f64, f64) {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);

        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));

        // Clamp guards against numeric drift just outside [-1, 1].
        let sinp = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let pitch = sinp.asin();

        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        (roll, pitch, yaw)
    }
}

/// Pose of an object: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    pub rotation: Rotation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_quaternion_has_zero_rpy() {
        let r = Rotation { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
        let (roll, pitch, yaw) = r.rpy();
        assert!(roll.abs() < 1e-9);
        assert!(pitch.abs() < 1e-9);
        assert!(yaw.abs() < 1e-9);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        // 90 degrees about z
        let half = std::f64::consts::FRAC_PI_4;
        let r = Rotation { x: 0.0, y: 0.0, z: half.sin(), w: half.cos() };
        let (_, _, yaw) = r.rpy();
        assert!((yaw - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_pose_json_roundtrip() {
        let pose = Pose {
            position: Position { x: 1.0, y: -2.5, z: 0.3 },
            rotation: Rotation { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
        };
        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(pose, back);
    }
}
