use anyhow::Context;
use serde::Serialize;

use usher_csv::{parse_conflicts, parse_registrant_map, ParseOutcome};

use crate::cli::{GlobalFlags, OutputFormat, ParseArgs};
use crate::output::print_json;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct ParseReport {
    #[serde(flatten)]
    outcome: ParseOutcome,
    /// How many conflict emails were rewritten via the registrant map.
    #[serde(skip_serializing_if = "Option::is_none")]
    rewritten: Option<usize>,
}

/// Handle `ush parse`.
pub fn handle(args: &ParseArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.csv)
        .with_context(|| format!("failed to read '{}'", args.csv.display()))?;

    let spinner = Progress::spinner(flags, "parsing conflict CSV");
    let mut outcome = parse_conflicts(&text);
    let mut rewritten = None;

    if let (Some(path), Some(data)) = (&args.registrants, &mut outcome.data) {
        let registrant_text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        match parse_registrant_map(&registrant_text) {
            Some(map) => {
                let (rewritten_set, count) = data.conflicts.rewrite_emails(&map);
                data.conflicts = rewritten_set;
                rewritten = Some(count);
            }
            None => {
                tracing::warn!(path = %path.display(), "registrant CSV had no usable email columns");
            }
        }
    }
    spinner.finish_clear();

    let report = ParseReport { outcome, rewritten };
    match flags.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_table(&report, flags),
    }

    if !report.outcome.success {
        anyhow::bail!("CSV could not be parsed: {}", report.outcome.errors.join("; "));
    }
    Ok(())
}

fn print_table(report: &ParseReport, flags: &GlobalFlags) {
    let outcome = &report.outcome;
    if let Some(data) = &outcome.data {
        println!("format:        {:?}", data.format);
        println!("rows read:     {}", outcome.stats.total_rows);
        println!("rounds:        {}", outcome.stats.rounds_found);
        println!("unique emails: {}", outcome.stats.unique_emails);
        if let Some(count) = report.rewritten {
            println!("rewritten:     {count}");
        }
        for round_id in data.conflicts.round_ids() {
            let emails = data.conflicts.emails_for(round_id);
            println!("  round {round_id}: {} conflicts", emails.len());
        }
    }
    if !flags.quiet {
        for warning in &outcome.warnings {
            eprintln!("warning: {warning}");
        }
    }
    for error in &outcome.errors {
        eprintln!("error: {error}");
    }
}
