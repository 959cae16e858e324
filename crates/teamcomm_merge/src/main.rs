//! Team communication merge CLI
//!
//! Reads a relay log and a step table, merges the decoded messages into
//! the table, and writes the enriched table back out.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use teamcomm_merge::{merge_team_comm, MergeReport};
use telemetry_core::io;

#[derive(Parser)]
#[command(name = "teamcomm_merge")]
#[command(about = "Merge team communication from a relay log into a step table", long_about = None)]
struct Cli {
    /// Relay log file captured during the match
    #[arg(long)]
    log: PathBuf,

    /// Input step table JSON file
    #[arg(long)]
    table: PathBuf,

    /// Output step table JSON file
    #[arg(long)]
    out: PathBuf,

    /// Also export the table as a MsgPack+LZ4 cache
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Verify the cache after exporting it
    #[arg(long, default_value = "false")]
    verify: bool,

    /// Write the merge counters as a JSON report
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("🔨 Merging team communication...");
    println!("   Log:    {}", cli.log.display());
    println!("   Table:  {}", cli.table.display());
    println!("   Output: {}", cli.out.display());

    let mut table = io::load_table_json(&cli.table)?;
    let report = merge_team_comm(&cli.log, &mut table)?;
    io::save_table_json(&table, &cli.out)?;

    print_report(&report);

    if let Some(cache_path) = cli.cache {
        let meta = io::export_table_cache(&table, &cache_path)?;
        println!("\n📦 Cache exported to: {}", cache_path.display());
        println!(
            "   Compressed size: {} bytes ({:.2} KB)",
            meta.compressed_size,
            meta.compressed_size as f64 / 1024.0
        );
        println!("   Checksum:        {}", meta.checksum);

        if cli.verify {
            verify_cache_integrity(&cache_path, &meta.checksum)?;
        }
    }

    if let Some(report_path) = cli.report {
        let report_json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&report_path, report_json)?;
        println!("\n📄 Report saved to: {}", report_path.display());
    }

    Ok(())
}

fn print_report(report: &MergeReport) {
    println!("\n✅ Merge complete!");
    println!(
        "   Log lines:    {} parsed, {} skipped",
        report.lines_total - report.lines_skipped,
        report.lines_skipped
    );
    println!(
        "   Rosters:      {} blue, {} red",
        report.roster_blue, report.roster_red
    );
    println!(
        "   Packets:      {} blue, {} red, {} unattributed",
        report.packets_blue, report.packets_red, report.packets_unattributed
    );
    println!(
        "   Decoded:      {} ({} failures)",
        report.decoded, report.decode_failures
    );
    println!(
        "   Merged:       {} ({} stale, {} unknown player, {} observation overflow)",
        report.merged,
        report.stale_dropped,
        report.unknown_player_dropped,
        report.others_overflow_dropped
    );
    println!("   Columns:      {} registered", report.columns_added);
}

fn verify_cache_integrity(cache_path: &std::path::Path, checksum: &str) -> Result<()> {
    println!("\n🔍 Verifying cache integrity...");
    let is_valid = io::verify_table_cache(cache_path, checksum)?;

    if is_valid {
        println!("✅ Cache verification passed");
        Ok(())
    } else {
        anyhow::bail!("❌ Cache verification failed - checksum mismatch!")
    }
}
