//! Sparse wide table of per-step match state.
//!
//! Rows are keyed by a non-decreasing simulation time. Cells are stored
//! sparsely per row so that "no observation" stays distinct from an
//! observed zero; with the communication columns added the column space
//! runs into the thousands while a typical row carries a handful of
//! values. Columns must be registered before cells can be written, which
//! catches schema/merge mismatches at the write site.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::step::Step;

/// A single cell value. Untagged so JSON stays `1.5` / `3` / `"striker"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Text(_) => None,
        }
    }
}

/// Sparse per-step table, mutated in place by the merge engine.
///
/// Rows are never reordered or removed once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TableData", into = "TableData")]
pub struct StepTable {
    time: Vec<f64>,
    columns: Vec<String>,
    column_set: FxHashSet<String>,
    rows: Vec<FxHashMap<String, CellValue>>,
}

/// Serialized form of [`StepTable`]; the column set is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableData {
    time: Vec<f64>,
    columns: Vec<String>,
    rows: Vec<FxHashMap<String, CellValue>>,
}

impl From<TableData> for StepTable {
    fn from(data: TableData) -> Self {
        let column_set = data.columns.iter().cloned().collect();
        let mut rows = data.rows;
        rows.resize_with(data.time.len(), FxHashMap::default);
        Self { time: data.time, columns: data.columns, column_set, rows }
    }
}

impl From<StepTable> for TableData {
    fn from(table: StepTable) -> Self {
        Self { time: table.time, columns: table.columns, rows: table.rows }
    }
}

impl StepTable {
    pub fn new() -> Self {
        Self {
            time: Vec::new(),
            columns: Vec::new(),
            column_set: FxHashSet::default(),
            rows: Vec::new(),
        }
    }

    /// Build a table directly from recorded steps, populating the
    /// `teams.team{t}.player{p}.id` columns for every populated slot.
    pub fn from_steps(steps: &[Step]) -> Result<Self, TableError> {
        let mut table = Self::new();
        for step in steps {
            let row = table.push_row(step.time.as_secs_f64())?;
            if let Some(teams) = &step.teams {
                for (team_number, team) in [(1u8, &teams.team1), (2u8, &teams.team2)] {
                    for (slot, player) in team.player_slots() {
                        if let Some(player) = player {
                            let column = player_id_column(team_number, slot);
                            table.register_column(&column);
                            table.set(row, &column, CellValue::Text(player.id.clone()))?;
                        }
                    }
                }
            }
        }
        Ok(table)
    }

    /// Append a row at the given time. Times must be non-decreasing.
    pub fn push_row(&mut self, time: f64) -> Result<usize, TableError> {
        if let Some(&prev) = self.time.last() {
            if time < prev {
                return Err(TableError::NonMonotonicTime { time, prev });
            }
        }
        self.time.push(time);
        self.rows.push(FxHashMap::default());
        Ok(self.rows.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.time
    }

    pub fn last_time(&self) -> Option<f64> {
        self.time.last().copied()
    }

    /// Registered columns in registration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_set.contains(name)
    }

    /// Register a column. Re-registering is a no-op, so repeated schema
    /// generation cannot duplicate columns.
    pub fn register_column(&mut self, name: &str) {
        if self.column_set.insert(name.to_string()) {
            self.columns.push(name.to_string());
        }
    }

    pub fn register_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.register_column(name.as_ref());
        }
    }

    /// Write one cell. The column must be registered and the row in range.
    pub fn set(&mut self, row: usize, column: &str, value: CellValue) -> Result<(), TableError> {
        if !self.column_set.contains(column) {
            return Err(TableError::UnknownColumn(column.to_string()));
        }
        let rows = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(TableError::RowOutOfRange { row, rows })?;
        cells.insert(column.to_string(), value);
        Ok(())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }

    /// Number of populated cells in one row.
    pub fn row_cell_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |r| r.len())
    }

    /// Whether the step recorder registered an id for this team/player slot.
    pub fn player_slot_present(&self, team: u8, player: u8) -> bool {
        self.has_column(&player_id_column(team, player))
    }
}

impl Default for StepTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Column under which the step recorder stores a player's id.
pub fn player_id_column(team: u8, player: u8) -> String {
    format!("teams.team{team}.player{player}.id")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_times(times: &[f64]) -> StepTable {
        let mut t = StepTable::new();
        for &time in times {
            t.push_row(time).unwrap();
        }
        t
    }

    #[test]
    fn test_push_row_rejects_time_going_backwards() {
        let mut t = table_with_times(&[0.0, 1.0]);
        assert!(matches!(
            t.push_row(0.5),
            Err(TableError::NonMonotonicTime { .. })
        ));
        // Equal times are allowed; only regressions are rejected.
        assert!(t.push_row(1.0).is_ok());
    }

    #[test]
    fn test_set_requires_registered_column() {
        let mut t = table_with_times(&[0.0]);
        assert!(matches!(
            t.set(0, "a.b", CellValue::Float(1.0)),
            Err(TableError::UnknownColumn(_))
        ));
        t.register_column("a.b");
        t.set(0, "a.b", CellValue::Float(1.0)).unwrap();
        assert_eq!(t.get(0, "a.b"), Some(&CellValue::Float(1.0)));
    }

    #[test]
    fn test_set_out_of_range_row() {
        let mut t = table_with_times(&[0.0]);
        t.register_column("a.b");
        assert!(matches!(
            t.set(3, "a.b", CellValue::Int(1)),
            Err(TableError::RowOutOfRange { row: 3, rows: 1 })
        ));
    }

    #[test]
    fn test_register_column_is_idempotent() {
        let mut t = StepTable::new();
        t.register_columns(["a", "b", "a"]);
        assert_eq!(t.columns(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_absent_cell_is_none_not_zero() {
        let mut t = table_with_times(&[0.0, 1.0]);
        t.register_column("x");
        t.set(1, "x", CellValue::Float(0.0)).unwrap();
        assert!(t.get(0, "x").is_none());
        assert_eq!(t.get(1, "x").unwrap().as_f64(), Some(0.0));
    }

    #[test]
    fn test_json_roundtrip_rebuilds_column_set() {
        let mut t = table_with_times(&[0.0, 0.5]);
        t.register_columns(["a", "b"]);
        t.set(0, "a", CellValue::Int(3)).unwrap();
        t.set(1, "b", CellValue::Text("role".to_string())).unwrap();

        let json = serde_json::to_string(&t).unwrap();
        let mut back: StepTable = serde_json::from_str(&json).unwrap();

        assert_eq!(back.times(), &[0.0, 0.5]);
        assert_eq!(back.get(0, "a"), Some(&CellValue::Int(3)));
        // Column set must be usable for writes after a load.
        back.set(1, "a", CellValue::Int(4)).unwrap();
    }

    #[test]
    fn test_from_steps_registers_player_ids() {
        use crate::match_info::{Player, Pose, Position, Rotation, Team, Teams};
        use crate::step::{SimTime, Step};

        let pose = Pose {
            position: Position { x: 0.0, y: 0.0, z: 0.0 },
            rotation: Rotation { x: 0.0, y: 0.0, z: 0.0, w: 1.0 },
        };
        let mut team1 = Team::new("a");
        team1.player1 = Some(Player { id: "a_p1".to_string(), pose, velocity: None });
        let teams = Teams { team1, team2: Team::new("b") };

        let mut step = Step::new(0, SimTime::new(0, 0));
        step.teams = Some(teams);

        let table = StepTable::from_steps(&[step]).unwrap();
        assert!(table.player_slot_present(1, 1));
        assert!(!table.player_slot_present(1, 2));
        assert!(!table.player_slot_present(2, 1));
        assert_eq!(
            table.get(0, "teams.team1.player1.id"),
            Some(&CellValue::Text("a_p1".to_string()))
        );
    }
}
