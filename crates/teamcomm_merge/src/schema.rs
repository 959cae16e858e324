//! Sparse output schema for the communication columns.
//!
//! Column names are built through [`CommColumns`] by both the schema
//! generator and the merge writer, so the registered schema and the merge
//! writes cannot drift apart. Generation is deterministic: the same roster
//! shape always yields the same ordered, collision-free column list.

use telemetry_core::StepTable;

/// Per-category capacity of the `others` observation slots.
pub const TEAMMATE_SLOTS: usize = 3;
pub const OPPONENT_SLOTS: usize = 4;
pub const UNKNOWN_SLOTS: usize = 7;

/// Namespace for observations whose team affiliation is unknown.
const UNKNOWN_NS: &str = "team_unknown";

/// Which `others` namespace an observation falls into, relative to the
/// reporting player's team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherCategory {
    Teammate,
    Opponent,
    Unknown,
}

impl OtherCategory {
    pub fn slot_capacity(self) -> usize {
        match self {
            OtherCategory::Teammate => TEAMMATE_SLOTS,
            OtherCategory::Opponent => OPPONENT_SLOTS,
            OtherCategory::Unknown => UNKNOWN_SLOTS,
        }
    }
}

/// Column name builder for one reporting team/player slot.
#[derive(Debug, Clone)]
pub struct CommColumns {
    base: String,
    team: u8,
}

impl CommColumns {
    pub fn new(team: u8, player: u8) -> Self {
        Self {
            base: format!("teams.team{team}.player{player}.team_comm"),
            team,
        }
    }

    pub fn scalar(&self, name: &str) -> String {
        format!("{}.{name}", self.base)
    }

    /// The x/y/z columns under a vector-valued stem.
    pub fn vec3(&self, stem: &str) -> [String; 3] {
        ["x", "y", "z"].map(|axis| format!("{}.{stem}.{axis}", self.base))
    }

    /// The nine flattened covariance columns under a stem.
    pub fn covariance(&self, stem: &str) -> [String; 9] {
        std::array::from_fn(|i| format!("{}.{stem}.{i}", self.base))
    }

    pub fn kick_target(&self) -> [String; 2] {
        ["x", "y"].map(|axis| format!("{}.kick_target.{axis}", self.base))
    }

    fn others_ns(&self, category: OtherCategory) -> String {
        match category {
            OtherCategory::Teammate => format!("team{}", self.team),
            OtherCategory::Opponent => format!("team{}", 3 - self.team),
            OtherCategory::Unknown => UNKNOWN_NS.to_string(),
        }
    }

    /// Column builder for one `others` observation slot (1-based).
    pub fn other_slot(&self, category: OtherCategory, slot: usize) -> OtherColumns {
        OtherColumns {
            base: format!(
                "{}.others.{}.player{slot}",
                self.base,
                self.others_ns(category)
            ),
        }
    }
}

/// Column names for a single observed-robot slot.
#[derive(Debug, Clone)]
pub struct OtherColumns {
    base: String,
}

impl OtherColumns {
    pub fn position(&self) -> [String; 3] {
        ["x", "y", "z"].map(|axis| format!("{}.pose.position.{axis}", self.base))
    }

    pub fn confidence(&self) -> String {
        format!("{}.confidence", self.base)
    }

    pub fn covariance(&self) -> [String; 9] {
        std::array::from_fn(|i| format!("{}.covariance.{i}", self.base))
    }
}

/// All communication columns for one reporting team/player slot, in a
/// stable order.
pub fn player_comm_columns(team: u8, player: u8) -> Vec<String> {
    let cols = CommColumns::new(team, player);
    let mut out = Vec::new();

    out.extend(cols.vec3("self_localization.pose.position"));
    out.extend(cols.covariance("self_localization.covariance"));

    out.extend(cols.vec3("walk_command"));

    out.extend(cols.vec3("target_pose.pose.position"));
    out.extend(cols.covariance("target_pose.covariance"));

    out.extend(cols.kick_target());

    out.extend(cols.vec3("ball.position"));
    out.extend(cols.vec3("ball.velocity"));
    out.extend(cols.covariance("ball.covariance"));

    for category in [
        OtherCategory::Teammate,
        OtherCategory::Opponent,
        OtherCategory::Unknown,
    ] {
        for slot in 1..=category.slot_capacity() {
            let other = cols.other_slot(category, slot);
            out.extend(other.position());
            out.push(other.confidence());
            out.extend(other.covariance());
        }
    }

    out.push(cols.scalar("time_to_ball"));
    out.push(cols.scalar("role"));
    out.push(cols.scalar("action"));

    out
}

/// Derive the full communication schema from the roster shape recorded in
/// the table: a player slot participates when its id column exists.
pub fn comm_schema(table: &StepTable) -> Vec<String> {
    let mut columns = Vec::new();
    for team in [1u8, 2] {
        for player in 1..=4u8 {
            if !table.player_slot_present(team, player) {
                continue;
            }
            columns.extend(player_comm_columns(team, player));
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use telemetry_core::player_id_column;

    fn table_with_slots(slots: &[(u8, u8)]) -> StepTable {
        let mut t = StepTable::new();
        t.push_row(0.0).unwrap();
        for &(team, player) in slots {
            t.register_column(&player_id_column(team, player));
        }
        t
    }

    #[test]
    fn test_schema_is_deterministic() {
        let table = table_with_slots(&[(1, 1), (1, 2), (2, 1)]);
        assert_eq!(comm_schema(&table), comm_schema(&table));
    }

    #[test]
    fn test_schema_is_collision_free() {
        let table = table_with_slots(&[(1, 1), (1, 2), (1, 3), (1, 4), (2, 1), (2, 2)]);
        let schema = comm_schema(&table);
        let unique: HashSet<&String> = schema.iter().collect();
        assert_eq!(unique.len(), schema.len());
    }

    #[test]
    fn test_schema_skips_unregistered_players() {
        let table = table_with_slots(&[(1, 1)]);
        let schema = comm_schema(&table);
        assert!(schema.iter().all(|c| c.starts_with("teams.team1.player1.")));

        let empty = table_with_slots(&[]);
        assert!(comm_schema(&empty).is_empty());
    }

    #[test]
    fn test_expected_column_count_per_player() {
        // vec3 + cov for self, walk vec3, vec3 + cov for target, kick 2,
        // ball 2*vec3 + cov, (3+4+7) other slots of 13 each, 3 extensions.
        let expected = (3 + 9) + 3 + (3 + 9) + 2 + (3 + 3 + 9) + 14 * 13 + 3;
        assert_eq!(player_comm_columns(1, 1).len(), expected);
    }

    #[test]
    fn test_opponent_namespace_is_the_other_team() {
        let cols = CommColumns::new(1, 2);
        let opp = cols.other_slot(OtherCategory::Opponent, 1);
        assert!(opp.confidence().contains(".others.team2.player1."));
        let mate = cols.other_slot(OtherCategory::Teammate, 3);
        assert!(mate.confidence().contains(".others.team1.player3."));
        let unknown = cols.other_slot(OtherCategory::Unknown, 7);
        assert!(unknown.confidence().contains(".others.team_unknown.player7."));
    }

    #[test]
    fn test_end_to_end_column_example() {
        let cols = CommColumns::new(1, 2);
        assert_eq!(
            cols.vec3("ball.position")[0],
            "teams.team1.player2.team_comm.ball.position.x"
        );
    }
}
