//! Terminal and JSON rendering of scan and fix results.

use papirus_apps::{FixOutcome, FixReport, ScanResult, ScanSession};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

const RULE: &str = "============================================================";

/// Heading plus the located installations.
pub fn write_header(out: &mut impl Write, session: &ScanSession) -> io::Result<()> {
    let theme = session.family().name;
    writeln!(out, "Scanning all applications for {theme} icon usage...")?;
    writeln!(out, "{RULE}")?;

    writeln!(out, "Found {theme} installations:")?;
    for install in session.installations() {
        writeln!(out, "  - {}", install.path.display())?;
    }
    writeln!(out)
}

/// Per-app lines and the summary, then the fix step, then its outcome.
///
/// `fix` runs only after the scan results are on `out`, so an interactive
/// prompt writing to the same stream follows them.
pub fn report_then_fix<W, F>(
    out: &mut W,
    session: &ScanSession,
    result: &ScanResult,
    verbose: bool,
    fix: F,
) -> io::Result<Option<FixReport>>
where
    W: Write,
    F: FnOnce(&mut W) -> Option<FixReport>,
{
    write_apps(out, session, result, verbose)?;
    write_summary(out, session, result)?;
    out.flush()?;

    let fixes = fix(out);
    if let Some(report) = &fixes {
        write_fix_report(out, report)?;
    }
    Ok(fixes)
}

/// One line per application; `verbose` adds paths, status and the top
/// alternatives.
fn write_apps(
    out: &mut impl Write,
    session: &ScanSession,
    result: &ScanResult,
    verbose: bool,
) -> io::Result<()> {
    let theme = session.family().name;

    for matched in &result.matching {
        let app = &matched.app;
        writeln!(out, "  ✓ {} ({}) - Using {theme}", app.name, app.origin)?;
        if verbose {
            let file = matched
                .resolved_path
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(out, "    Icon: {} → {}", app.icon, file)?;
            if let Some(path) = &matched.resolved_path {
                writeln!(out, "    Path: {}", path.display())?;
            }
        }
    }

    for entry in &result.non_matching {
        let app = &entry.app;
        writeln!(out, "  ✗ {} ({}) - NOT using {theme}", app.name, app.origin)?;

        if verbose {
            writeln!(out, "    Icon: {}", app.icon)?;
            writeln!(out, "    Status: {}", entry.status())?;
            if let Some(path) = &entry.resolved_path {
                writeln!(out, "    Current path: {}", path.display())?;
            }
            if entry.suggestions.is_empty() {
                writeln!(out, "    No {theme} alternatives found")?;
            } else {
                let top: Vec<&str> = entry.suggestions.iter().take(3).map(String::as_str).collect();
                writeln!(out, "    {theme} alternatives: {}", top.join(", "))?;
            }
        } else if let Some(best) = entry.best_suggestion() {
            writeln!(out, "    Suggested fix: Use '{best}'")?;
        }
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, session: &ScanSession, result: &ScanResult) -> io::Result<()> {
    let report = result.report(session.config().summary_limit);
    writeln!(out, "{RULE}")?;
    write!(out, "{}", report.display(session.family().name))
}

fn write_fix_report(out: &mut impl Write, report: &FixReport) -> io::Result<()> {
    if report.cancelled {
        return writeln!(out, "Fixes cancelled.");
    }

    for record in &report.records {
        match &record.outcome {
            FixOutcome::Fixed => writeln!(out, "✓ Fixed: {} → {}", record.name, record.icon)?,
            FixOutcome::Failed(reason) => {
                writeln!(out, "✗ Failed: {} ({})", record.name, reason)?
            }
        }
    }
    for name in &report.no_alternative {
        writeln!(out, "- {name}: no alternative available")?;
    }

    writeln!(
        out,
        "\nResults: {} fixed, {} failed",
        report.fixed(),
        report.failed()
    )
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    theme: &'a str,
    installations: Vec<&'a Path>,
    report: papirus_apps::CoverageReport,
    non_matching: &'a [papirus_apps::UnmatchedApp],
    #[serde(skip_serializing_if = "Option::is_none")]
    fixes: Option<&'a FixReport>,
}

/// Whole run as one JSON document.
pub fn print_json(
    session: &ScanSession,
    result: &ScanResult,
    fixes: Option<&FixReport>,
) -> serde_json::Result<()> {
    let output = JsonOutput {
        theme: session.family().name,
        installations: session
            .installations()
            .iter()
            .map(|i| i.path.as_path())
            .collect(),
        report: result.report(session.config().summary_limit),
        non_matching: &result.non_matching,
        fixes,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
