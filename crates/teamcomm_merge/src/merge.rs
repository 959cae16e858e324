//! Time-aligned merge of decoded messages into the step table.
//!
//! A message stamped T lands in the first row whose time is strictly
//! greater than T: that row is the one "current" when the message would
//! have been received relative to the simulation clock. Messages at or
//! beyond the last row's time have no row to receive them and are
//! dropped. Each partition is sorted by timestamp first, so arrival order
//! in the log does not affect row targeting.

use telemetry_core::{CellValue, StepTable, TableError};

use crate::decode::{Covariance, TeamCommMessage, Vec3f};
use crate::schema::{CommColumns, OtherCategory};

/// Per-partition merge counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: u32,
    pub stale_dropped: u32,
    /// Messages naming a player slot the step table never registered.
    pub unknown_player_dropped: u32,
    /// Observations beyond a category's slot capacity.
    pub others_overflow_dropped: u32,
}

/// Row that receives a message stamped `t`, given the table's row times.
///
/// Pure function of the two timestamps series: the first row with time
/// strictly greater than `t`, or `None` when `t` is at or beyond the
/// last row (stale) or the table is empty.
pub fn target_row(times: &[f64], t: f64) -> Option<usize> {
    let &last = times.last()?;
    if t >= last {
        return None;
    }
    Some(times.partition_point(|&row_time| row_time <= t))
}

/// Merge one team partition's messages into the table.
///
/// `team` is the table-side team number (1 or 2) this partition was
/// attributed to; the two partitions write disjoint column subsets. The
/// communication schema must already be registered.
pub fn merge_team_messages(
    table: &mut StepTable,
    mut messages: Vec<TeamCommMessage>,
    team: u8,
) -> Result<MergeOutcome, TableError> {
    // Stable sort: equal timestamps keep arrival order.
    messages.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut outcome = MergeOutcome::default();

    for msg in messages {
        let player = msg.player_id;
        if !(1..=4).contains(&player) || !table.player_slot_present(team, player as u8) {
            outcome.unknown_player_dropped += 1;
            log::warn!(
                "Dropping message for unregistered team{team} player slot {player}"
            );
            continue;
        }

        let Some(row) = target_row(table.times(), msg.time) else {
            outcome.stale_dropped += 1;
            log::debug!(
                "Dropping stale message at t={} (table ends at {:?})",
                msg.time,
                table.last_time()
            );
            continue;
        };

        outcome.others_overflow_dropped += write_message(table, row, &msg, team)?;
        outcome.merged += 1;
    }

    Ok(outcome)
}

/// Returns the number of observations dropped for slot overflow.
fn write_message(
    table: &mut StepTable,
    row: usize,
    msg: &TeamCommMessage,
    team: u8,
) -> Result<u32, TableError> {
    let cols = CommColumns::new(team, msg.player_id as u8);

    write_vec3(table, row, &cols.vec3("self_localization.pose.position"), &msg.self_position)?;
    write_cov(table, row, &cols.covariance("self_localization.covariance"), &msg.self_covariance)?;

    write_vec3(table, row, &cols.vec3("walk_command"), &msg.walk_command)?;

    write_vec3(table, row, &cols.vec3("target_pose.pose.position"), &msg.target_position)?;
    write_cov(table, row, &cols.covariance("target_pose.covariance"), &msg.target_covariance)?;

    let [kick_x, kick_y] = cols.kick_target();
    table.set(row, &kick_x, msg.kick_target.0.into())?;
    table.set(row, &kick_y, msg.kick_target.1.into())?;

    write_vec3(table, row, &cols.vec3("ball.position"), &msg.ball.position)?;
    write_vec3(table, row, &cols.vec3("ball.velocity"), &msg.ball.velocity)?;
    write_cov(table, row, &cols.covariance("ball.covariance"), &msg.ball.covariance)?;

    let overflow = write_others(table, row, msg, &cols)?;

    table.set(row, &cols.scalar("time_to_ball"), msg.time_to_ball.into())?;
    table.set(row, &cols.scalar("role"), CellValue::Int(msg.role as i64))?;
    table.set(row, &cols.scalar("action"), CellValue::Int(msg.action as i64))?;

    Ok(overflow)
}

/// Write the observations of other robots. Slot indices are running
/// per-category counters in observation order, restarting every message;
/// overflowing observations are counted and skipped.
fn write_others(
    table: &mut StepTable,
    row: usize,
    msg: &TeamCommMessage,
    cols: &CommColumns,
) -> Result<u32, TableError> {
    let mut overflow = 0u32;
    let mut teammate_count = 0usize;
    let mut opponent_count = 0usize;
    let mut unknown_count = 0usize;

    for (i, other) in msg.others.iter().enumerate() {
        // The observed player number is never reliable, only the claimed
        // team affiliation is used.
        let (category, slot) = if other.team == msg.team {
            teammate_count += 1;
            (OtherCategory::Teammate, teammate_count)
        } else if other.team != 0 {
            opponent_count += 1;
            (OtherCategory::Opponent, opponent_count)
        } else {
            unknown_count += 1;
            (OtherCategory::Unknown, unknown_count)
        };

        if slot > category.slot_capacity() {
            overflow += 1;
            log::debug!(
                "Ignoring {category:?} observation beyond slot capacity ({slot})"
            );
            continue;
        }

        let other_cols = cols.other_slot(category, slot);
        write_vec3(table, row, &other_cols.position(), &other.position)?;
        if let Some(&confidence) = msg.other_confidence.get(i) {
            table.set(row, &other_cols.confidence(), confidence.into())?;
        }
        write_cov(table, row, &other_cols.covariance(), &other.covariance)?;
    }

    Ok(overflow)
}

fn write_vec3(
    table: &mut StepTable,
    row: usize,
    columns: &[String; 3],
    v: &Vec3f,
) -> Result<(), TableError> {
    for (column, value) in columns.iter().zip([v.x, v.y, v.z]) {
        table.set(row, column, value.into())?;
    }
    Ok(())
}

fn write_cov(
    table: &mut StepTable,
    row: usize,
    columns: &[String; 9],
    c: &Covariance,
) -> Result<(), TableError> {
    for (column, value) in columns.iter().zip(c.0) {
        table.set(row, column, value.into())?;
    }
    Ok(())
}
