use serde::Serialize;

use usher_config::UsherConfig;
use usher_core::rounds::RoundState;

use crate::cli::{GlobalFlags, OutputFormat, RoundsArgs};
use crate::commands::open_store;
use crate::output::print_json;

#[derive(Debug, Serialize)]
struct RoundsReport {
    session_id: String,
    selected_round: Option<String>,
    rounds: Vec<RoundState>,
}

/// Handle `ush rounds`.
pub fn handle(args: &RoundsArgs, config: &UsherConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = open_store(config, &args.session)?;
    let report = RoundsReport {
        session_id: store.session_id().to_string(),
        selected_round: store.selected_round().map(ToString::to_string),
        rounds: store.rounds().cloned().collect(),
    };

    match flags.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &RoundsReport) {
    if report.rounds.is_empty() {
        println!("session {}: no rounds yet", report.session_id);
        return;
    }
    println!("session {}", report.session_id);
    for round in &report.rounds {
        let selected = if report.selected_round.as_deref() == Some(round.round_id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{selected} round {:<8} {:<9} moved {:<4} admitted {}",
            round.round_id,
            round.phase.as_str(),
            round.moved_count,
            round.admitted_count
        );
    }
}
