//! Team roster resolution from announcement lines.
//!
//! The relay announces each team's player addresses at least once; noisy
//! captures can repeat the announcement. The fold below is explicitly
//! last-wins: a later announcement for a color replaces the earlier set,
//! so duplicates are idempotent and conflicts resolve deterministically.

use std::collections::HashSet;

use telemetry_core::TeamColor;

use crate::relay_log::RelayLine;

/// Address sets for the two recognized team colors. An empty set means no
/// announcement was seen for that color; all of that color's packets then
/// stay unattributable, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamRosters {
    pub blue: HashSet<String>,
    pub red: HashSet<String>,
}

impl TeamRosters {
    /// Which team color a sender address belongs to, if any.
    ///
    /// The two sets are expected to be disjoint; should an address appear
    /// in both, blue takes precedence.
    pub fn color_for(&self, address: &str) -> Option<TeamColor> {
        if self.blue.contains(address) {
            Some(TeamColor::Blue)
        } else if self.red.contains(address) {
            Some(TeamColor::Red)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blue.is_empty() && self.red.is_empty()
    }
}

/// Fold all roster announcements into the two address sets, last-wins.
pub fn resolve_rosters(lines: &[RelayLine]) -> TeamRosters {
    let mut rosters = TeamRosters::default();

    for line in lines {
        if let RelayLine::Roster(announcement) = line {
            let set: HashSet<String> = announcement.addresses.iter().cloned().collect();
            match announcement.color {
                TeamColor::Blue => rosters.blue = set,
                TeamColor::Red => rosters.red = set,
                other => log::debug!("Ignoring roster announcement for color {:?}", other),
            }
        }
    }

    if rosters.blue.is_empty() {
        log::info!("No roster announcement seen for team blue");
    }
    if rosters.red.is_empty() {
        log::info!("No roster announcement seen for team red");
    }

    rosters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay_log::RosterAnnouncement;

    fn roster(color: TeamColor, addresses: &[&str]) -> RelayLine {
        RelayLine::Roster(RosterAnnouncement {
            color,
            addresses: addresses.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_resolves_both_colors() {
        let lines = vec![
            roster(TeamColor::Blue, &["10.0.0.1", "10.0.0.2"]),
            roster(TeamColor::Red, &["10.0.0.3"]),
        ];
        let rosters = resolve_rosters(&lines);
        assert_eq!(rosters.color_for("10.0.0.2"), Some(TeamColor::Blue));
        assert_eq!(rosters.color_for("10.0.0.3"), Some(TeamColor::Red));
        assert_eq!(rosters.color_for("10.0.0.9"), None);
    }

    #[test]
    fn test_duplicate_announcements_are_idempotent() {
        let once = resolve_rosters(&[roster(TeamColor::Blue, &["10.0.0.1"])]);
        let twice = resolve_rosters(&[
            roster(TeamColor::Blue, &["10.0.0.1"]),
            roster(TeamColor::Blue, &["10.0.0.1"]),
        ]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_conflicting_announcements_last_wins() {
        let rosters = resolve_rosters(&[
            roster(TeamColor::Blue, &["10.0.0.1"]),
            roster(TeamColor::Blue, &["10.0.0.5"]),
        ]);
        assert_eq!(rosters.color_for("10.0.0.1"), None);
        assert_eq!(rosters.color_for("10.0.0.5"), Some(TeamColor::Blue));
    }

    #[test]
    fn test_address_in_both_rosters_resolves_blue() {
        let rosters = resolve_rosters(&[
            roster(TeamColor::Blue, &["10.0.0.1"]),
            roster(TeamColor::Red, &["10.0.0.1"]),
        ]);
        assert_eq!(rosters.color_for("10.0.0.1"), Some(TeamColor::Blue));
    }

    #[test]
    fn test_missing_color_yields_empty_set() {
        let rosters = resolve_rosters(&[roster(TeamColor::Red, &["10.0.0.3"])]);
        assert!(rosters.blue.is_empty());
        assert!(!rosters.is_empty());
    }
}
