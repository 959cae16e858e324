//! Partition payload-bearing packets by sender team.
//!
//! Records without a payload (relay sub-messages, roster announcements)
//! are not communication traffic and are not counted. Packets from
//! addresses outside both rosters are expected (the game controller also
//! broadcasts) and are counted but otherwise dropped.

use telemetry_core::TeamColor;

use crate::relay_log::{RelayLine, RelayRecord};
use crate::roster::TeamRosters;

/// Payload-bearing packets split by team, in arrival order.
#[derive(Debug, Default)]
pub struct TeamPartitions<'a> {
    pub blue: Vec<&'a RelayRecord>,
    pub red: Vec<&'a RelayRecord>,
    pub unattributed: u32,
}

/// Assign each payload-bearing packet to the team whose roster contains
/// its sender address. Relative order is preserved within each partition.
pub fn partition_by_team<'a>(
    lines: &'a [RelayLine],
    rosters: &TeamRosters,
) -> TeamPartitions<'a> {
    let mut partitions = TeamPartitions::default();

    for line in lines {
        let RelayLine::Packet(record) = line else {
            continue;
        };
        if record.payload.is_none() {
            continue;
        }
        match rosters.color_for(&record.sender_ip) {
            Some(TeamColor::Blue) => partitions.blue.push(record),
            Some(TeamColor::Red) => partitions.red.push(record),
            _ => {
                partitions.unattributed += 1;
                log::debug!(
                    "Packet from {} matches no roster, dropping",
                    record.sender_ip
                );
            }
        }
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay_log::RosterAnnouncement;

    fn packet(ip: &str, payload: Option<Vec<u8>>) -> RelayLine {
        RelayLine::Packet(RelayRecord {
            time: 0.0,
            sender_ip: ip.to_string(),
            sender_port: 3737,
            payload,
        })
    }

    fn rosters() -> TeamRosters {
        TeamRosters {
            blue: ["10.0.0.1".to_string()].into_iter().collect(),
            red: ["10.0.0.2".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn test_partition_is_disjoint_and_covers_payload_records() {
        let lines = vec![
            packet("10.0.0.1", Some(vec![1])),
            packet("10.0.0.2", Some(vec![2])),
            packet("10.0.0.9", Some(vec![3])), // game controller
            packet("10.0.0.1", None),          // no payload, not comm traffic
            RelayLine::Roster(RosterAnnouncement {
                color: telemetry_core::TeamColor::Blue,
                addresses: vec![],
            }),
        ];
        let parts = partition_by_team(&lines, &rosters());

        assert_eq!(parts.blue.len(), 1);
        assert_eq!(parts.red.len(), 1);
        assert_eq!(parts.unattributed, 1);
        assert_eq!(
            parts.blue.len() + parts.red.len() + parts.unattributed as usize,
            3 // every payload-bearing record landed in exactly one bucket
        );
    }

    #[test]
    fn test_arrival_order_preserved_within_partition() {
        let lines = vec![
            packet("10.0.0.1", Some(vec![1])),
            packet("10.0.0.2", Some(vec![9])),
            packet("10.0.0.1", Some(vec![2])),
            packet("10.0.0.1", Some(vec![3])),
        ];
        let parts = partition_by_team(&lines, &rosters());
        let payloads: Vec<u8> = parts
            .blue
            .iter()
            .map(|r| r.payload.as_ref().unwrap()[0])
            .collect();
        assert_eq!(payloads, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_rosters_attribute_nothing() {
        let lines = vec![packet("10.0.0.1", Some(vec![1]))];
        let parts = partition_by_team(&lines, &TeamRosters::default());
        assert!(parts.blue.is_empty());
        assert!(parts.red.is_empty());
        assert_eq!(parts.unattributed, 1);
    }
}
