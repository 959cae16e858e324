//! Merge team-communication traffic from a relay log into a match step
//! table.
//!
//! The relay log is a line-oriented capture of UDP packets exchanged by
//! the robots during a match, interleaved with roster announcements that
//! map sender addresses to team colors. This crate parses the log,
//! decodes the protobuf payloads, and writes each message's fields into
//! the step table row that was current when the message was sent.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use telemetry_core::StepTable;

pub mod classify;
pub mod decode;
pub mod merge;
pub mod relay_log;
pub mod roster;
pub mod schema;

use classify::partition_by_team;
use decode::decode_partition;
use merge::merge_team_messages;
use relay_log::parse_log;
use roster::resolve_rosters;
use schema::comm_schema;

/// Blue announcements map to the team1 column namespace, red to team2.
const BLUE_TEAM_NUMBER: u8 = 1;
const RED_TEAM_NUMBER: u8 = 2;

/// Counters describing one merge run, for the CLI summary and the
/// optional JSON report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeReport {
    pub lines_total: u32,
    pub lines_skipped: u32,
    pub roster_blue: usize,
    pub roster_red: usize,
    pub packets_blue: usize,
    pub packets_red: usize,
    pub packets_unattributed: u32,
    pub decoded: usize,
    pub decode_failures: u32,
    pub merged: u32,
    pub stale_dropped: u32,
    pub unknown_player_dropped: u32,
    pub others_overflow_dropped: u32,
    pub columns_added: usize,
}

/// Run the whole pipeline against one relay log, writing into `table`.
///
/// A missing or unreadable log file is the only fatal condition; all
/// per-line and per-packet problems are skipped and counted.
pub fn merge_team_comm(log_path: &Path, table: &mut StepTable) -> anyhow::Result<MergeReport> {
    let text = fs::read_to_string(log_path)
        .with_context(|| format!("Failed to read relay log {}", log_path.display()))?;

    let (lines, stats) = parse_log(text.lines());
    log::info!(
        "Parsed {} of {} relay log lines ({} skipped)",
        stats.parsed,
        stats.total_lines,
        stats.skipped
    );

    let rosters = resolve_rosters(&lines);
    if rosters.is_empty() {
        log::warn!("No roster announcements found, every packet will be unattributed");
    }

    let partitions = partition_by_team(&lines, &rosters);

    let (blue_messages, blue_failures) = decode_partition(&partitions.blue);
    let (red_messages, red_failures) = decode_partition(&partitions.red);

    let mut report = MergeReport {
        lines_total: stats.total_lines,
        lines_skipped: stats.skipped,
        roster_blue: rosters.blue.len(),
        roster_red: rosters.red.len(),
        packets_blue: partitions.blue.len(),
        packets_red: partitions.red.len(),
        packets_unattributed: partitions.unattributed,
        decoded: blue_messages.len() + red_messages.len(),
        decode_failures: blue_failures + red_failures,
        ..MergeReport::default()
    };

    let columns = comm_schema(table);
    report.columns_added = columns.len();
    table.register_columns(columns);

    for (messages, team) in [
        (blue_messages, BLUE_TEAM_NUMBER),
        (red_messages, RED_TEAM_NUMBER),
    ] {
        let outcome = merge_team_messages(table, messages, team)?;
        report.merged += outcome.merged;
        report.stale_dropped += outcome.stale_dropped;
        report.unknown_player_dropped += outcome.unknown_player_dropped;
        report.others_overflow_dropped += outcome.others_overflow_dropped;
    }

    Ok(report)
}
