//! Team communication payload decoding.
//!
//! Payloads are protobuf (`proto/team_comm.proto`). Decoding converts the
//! generated types into the plain [`TeamCommMessage`] the merge consumes;
//! a failure drops that single message and never interrupts the batch.

use prost::Message;
use thiserror::Error;

use crate::relay_log::RelayRecord;

/// Generated protobuf types for the team communication schema.
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/teamcomm.rs"));
}

use proto as pb;

/// Error returned when a payload does not decode to a usable message.
///
/// `timestamp` and `current_pose` carry the message's time and sender
/// identity; without them the message cannot be merged, so their absence
/// is a decode failure rather than a defaulted value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("decode failed: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("message missing required field {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3f {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 3x3 covariance flattened row-major: xx, xy, xz, yx, .., zz.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Covariance(pub [f64; 9]);

/// One observation of another robot.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotObservation {
    /// Team number claimed for the observed robot; 0 means unknown.
    pub team: u32,
    pub position: Vec3f,
    pub covariance: Covariance,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BallObservation {
    pub position: Vec3f,
    pub velocity: Vec3f,
    pub covariance: Covariance,
}

/// A decoded team communication message, owned by the merge step that
/// produced it and discarded once written into the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamCommMessage {
    /// Simulation time the sender stamped, in seconds.
    pub time: f64,
    /// Sender's team number as it reports it.
    pub team: u32,
    /// Sender's player slot (1-based).
    pub player_id: u32,
    pub self_position: Vec3f,
    pub self_covariance: Covariance,
    pub walk_command: Vec3f,
    pub target_position: Vec3f,
    pub target_covariance: Covariance,
    pub kick_target: (f64, f64),
    pub ball: BallObservation,
    pub others: Vec<RobotObservation>,
    /// Parallel to `others`; may be shorter.
    pub other_confidence: Vec<f64>,
    pub time_to_ball: f64,
    pub role: i32,
    pub action: i32,
}

impl TeamCommMessage {
    /// Decode a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let msg = pb::TeamComm::decode(bytes)?;

        let timestamp = msg
            .timestamp
            .ok_or(DecodeError::MissingField("timestamp"))?;
        let current_pose = msg
            .current_pose
            .ok_or(DecodeError::MissingField("current_pose"))?;

        let (target_position, target_covariance) = match msg.target_pose {
            Some(t) => (vec3(t.position), covariance(t.covariance)),
            None => (Vec3f::default(), Covariance::default()),
        };

        let others = msg
            .others
            .into_iter()
            .map(|o| RobotObservation {
                team: o.team,
                position: vec3(o.position),
                covariance: covariance(o.covariance),
            })
            .collect();

        Ok(Self {
            time: timestamp.seconds as f64 + timestamp.nanos as f64 * 1e-9,
            team: current_pose.team,
            player_id: current_pose.player_id,
            self_position: vec3(current_pose.position),
            self_covariance: covariance(current_pose.covariance),
            walk_command: vec3(msg.walk_command),
            target_position,
            target_covariance,
            kick_target: msg
                .kick_target
                .map_or((0.0, 0.0), |k| (k.x as f64, k.y as f64)),
            ball: msg
                .ball
                .map(|b| BallObservation {
                    position: vec3(b.position),
                    velocity: vec3(b.velocity),
                    covariance: covariance(b.covariance),
                })
                .unwrap_or_default(),
            other_confidence: msg
                .other_robot_confidence
                .into_iter()
                .map(f64::from)
                .collect(),
            others,
            time_to_ball: msg.time_to_ball as f64,
            role: msg.role,
            action: msg.action,
        })
    }
}

fn vec3(v: Option<pb::Vec3>) -> Vec3f {
    v.map_or(Vec3f::default(), |v| Vec3f {
        x: v.x as f64,
        y: v.y as f64,
        z: v.z as f64,
    })
}

fn covariance(m: Option<pb::Mat3>) -> Covariance {
    let Some(m) = m else {
        return Covariance::default();
    };
    let row = |r: Option<pb::Vec3>| {
        let v = vec3(r);
        [v.x, v.y, v.z]
    };
    let [xx, xy, xz] = row(m.x);
    let [yx, yy, yz] = row(m.y);
    let [zx, zy, zz] = row(m.z);
    Covariance([xx, xy, xz, yx, yy, yz, zx, zy, zz])
}

/// Decode one partition's payloads in order. Failures are logged and
/// counted, never fatal; the decoded messages keep arrival order.
pub fn decode_partition(records: &[&RelayRecord]) -> (Vec<TeamCommMessage>, u32) {
    let mut messages = Vec::with_capacity(records.len());
    let mut failures = 0u32;

    for record in records {
        let Some(payload) = record.payload.as_deref() else {
            continue;
        };
        match TeamCommMessage::decode(payload) {
            Ok(msg) => messages.push(msg),
            Err(e) => {
                failures += 1;
                log::warn!(
                    "Dropping undecodable payload from {} at t={}: {}",
                    record.sender_ip,
                    record.time,
                    e
                );
            }
        }
    }

    (messages, failures)
}
