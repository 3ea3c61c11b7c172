use serde::Serialize;

use usher_config::UsherConfig;
use usher_core::rounds::RoundState;

use crate::cli::{GlobalFlags, OutputFormat, StatusArgs};
use crate::commands::open_store;
use crate::output::print_json;

#[derive(Debug, Serialize)]
struct StatusReport {
    session_id: String,
    #[serde(flatten)]
    state: RoundState,
}

/// Handle `ush status`.
pub fn handle(args: &StatusArgs, config: &UsherConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let store = open_store(config, &args.session)?;
    let Some(state) = store.round_state(&args.round) else {
        anyhow::bail!(
            "round '{}' has no state in session '{}'",
            args.round,
            args.session
        );
    };
    let report = StatusReport {
        session_id: store.session_id().to_string(),
        state: state.clone(),
    };

    match flags.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &StatusReport) {
    let state = &report.state;
    println!("session:  {}", report.session_id);
    println!("round:    {}", state.round_id);
    println!("phase:    {}", state.phase);
    if let Some(started) = state.started_at {
        println!("started:  {}", started.to_rfc3339());
    }
    if let Some(ended) = state.ended_at {
        println!("ended:    {}", ended.to_rfc3339());
    }
    println!("moved:    {}", state.moved_count);
    println!("admitted: {}", state.admitted_count);
    for id in &state.moved {
        println!("  moved {id}");
    }
}
