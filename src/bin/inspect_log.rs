//! Inspect LeafSpy logs from the command line.
//!
//! Usage: `inspect_log <file-or-directory> [--json]`
//!
//! Prints a per-file decode summary, or every decoded record as one JSON
//! object per line with `--json`. Set `RUST_LOG=debug` to see skipped rows.

use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use leaflog::parsers::LoadedLog;
use leaflog::{LeafLog, LeafSpy, Settings};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut target: Option<PathBuf> = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ if target.is_none() => target = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument: {}", arg),
        }
    }
    let Some(target) = target else {
        bail!("usage: inspect_log <file-or-directory> [--json]");
    };

    let parser = LeafSpy::new(Settings::load());

    let logs = if target.is_dir() {
        parser
            .load_directory(&target)
            .with_context(|| format!("loading {}", target.display()))?
    } else {
        let log = parser
            .parse_file(&target)
            .with_context(|| format!("parsing {}", target.display()))?;
        vec![LoadedLog { path: target, log }]
    };

    for LoadedLog { path, log } in &logs {
        if json {
            for record in &log.records {
                println!("{}", serde_json::to_string(record)?);
            }
        } else {
            print_summary(path, log);
        }
    }

    Ok(())
}

fn print_summary(path: &Path, log: &LeafLog) {
    let stats = &log.stats;
    println!("{}", path.display());
    println!(
        "  rows: {}  decoded: {}  skipped: {}  ({:.1}%)",
        stats.total_rows,
        stats.decoded,
        stats.skipped,
        stats.success_rate()
    );

    if let (Some(first), Some(last)) = (log.records.first(), log.records.last()) {
        println!("  span: {} .. {}", first.date_time, last.date_time);
        println!(
            "  gids: {} -> {}  odo: {:.1} km -> {:.1} km",
            first.gids, last.gids, first.odo_km, last.odo_km
        );
    }

    for error in stats.errors.iter().take(5) {
        println!("  line {}: {}", error.line, error.error);
    }
    if stats.errors.len() > 5 {
        println!("  ... {} more", stats.errors.len() - 5);
    }
}
