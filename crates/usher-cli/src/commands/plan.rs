use anyhow::Context;
use serde::Serialize;

use usher_config::UsherConfig;
use usher_core::participant::Participant;
use usher_csv::parse_conflicts;
use usher_engine::matcher::{match_participants, MatchOutcome};

use crate::cli::{GlobalFlags, OutputFormat, PlanArgs};
use crate::commands::open_store;
use crate::output::print_json;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct PlanReport {
    round_id: String,
    conflict_emails: usize,
    #[serde(flatten)]
    outcome: MatchOutcome,
}

/// Handle `ush plan`: a dry run of one round's match, no provider calls.
pub fn handle(args: &PlanArgs, config: &UsherConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let csv_text = std::fs::read_to_string(&args.csv)
        .with_context(|| format!("failed to read '{}'", args.csv.display()))?;
    let snapshot_text = std::fs::read_to_string(&args.participants)
        .with_context(|| format!("failed to read '{}'", args.participants.display()))?;
    let mut participants: Vec<Participant> = serde_json::from_str(&snapshot_text)
        .with_context(|| format!("invalid participant snapshot '{}'", args.participants.display()))?;

    let spinner = Progress::spinner(flags, "planning round match");
    let outcome = parse_conflicts(&csv_text);
    let Some(data) = outcome.data else {
        spinner.finish_clear();
        anyhow::bail!("CSV could not be parsed: {}", outcome.errors.join("; "));
    };
    if !data.conflicts.round_ids().any(|id| id == args.round) {
        spinner.finish_clear();
        anyhow::bail!(
            "round '{}' not found in CSV (rounds: {})",
            args.round,
            data.conflicts.round_ids().collect::<Vec<_>>().join(", ")
        );
    }

    if let Some(session) = &args.session {
        let store = open_store(config, session)?;
        participants = store.with_effective_emails(&participants);
    }

    let conflict_emails = data.conflicts.emails_for(&args.round);
    let matched = match_participants(&conflict_emails, &participants);
    spinner.finish_clear();

    let report = PlanReport {
        round_id: args.round.clone(),
        conflict_emails: conflict_emails.len(),
        outcome: matched,
    };
    match flags.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &PlanReport) {
    println!(
        "round {}: {} conflict emails, {} matched, {} not found, {} without email",
        report.round_id,
        report.conflict_emails,
        report.outcome.matched.len(),
        report.outcome.not_found.len(),
        report.outcome.no_email.len()
    );
    for participant in &report.outcome.matched {
        let email = participant.email.as_deref().unwrap_or("-");
        println!("  move  {:<12} {} <{}>", participant.id, participant.display_name, email);
    }
    for email in &report.outcome.not_found {
        println!("  absent             <{email}>");
    }
    for participant in &report.outcome.no_email {
        println!("  no-email {:<9} {}", participant.id, participant.display_name);
    }
}
