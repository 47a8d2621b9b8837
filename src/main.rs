//! papirus-audit - Papirus icon coverage for installed applications
//!
//! Scans APT, Flatpak, Snap and user applications, reports which ones use a
//! Papirus icon and optionally rewrites the others to a Papirus alternative.

mod output;
mod prompt;
mod services;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use papirus_apps::{AuditConfig, FixMode, FixReport, ScanResult, ScanSession};
use prompt::LinePrompt;
use services::apps::{LookupOptions, open_session};
use std::io::{self, Write};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  papirus-audit --scan
  papirus-audit --scan --fix
  papirus-audit --scan --fix --auto
  papirus-audit --scan --debug";

/// Manage Papirus icons across all Linux package managers
#[derive(Parser, Debug)]
#[command(name = "papirus-audit", version, about, after_help = EXAMPLES)]
struct Args {
    /// Scan all applications for Papirus icon coverage
    #[arg(long)]
    scan: bool,

    /// Apply fixes for missing Papirus icons
    #[arg(long)]
    fix: bool,

    /// Apply fixes automatically without prompting
    #[arg(long)]
    auto: bool,

    /// Enable debug mode with verbose logging
    #[arg(long)]
    debug: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Do not resolve icons through the installed themes
    #[arg(long)]
    no_lookup: bool,

    /// Icon theme to resolve against instead of the desktop's current one
    #[arg(long, value_name = "NAME")]
    icon_theme: Option<String>,

    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.scan {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }

    init_logging(args.debug);

    let config = load_config(args.config.as_deref())?;
    let session = open_session(
        config,
        LookupOptions {
            icon_theme: args.icon_theme.clone(),
            disabled: args.no_lookup,
        },
    );

    if session.installations().is_empty() {
        let theme = session.family().name;
        println!("ERROR: No {theme} icon themes found. Please install {theme} first.");
        println!("Install with: sudo apt install papirus-icon-theme");
        return Ok(());
    }

    if args.json {
        let result = session.scan();
        // Keep stdout clean for the JSON document.
        let fixes = args
            .fix
            .then(|| run_fixes(&session, &result, args.auto, &mut io::stderr()))
            .flatten();
        output::print_json(&session, &result, fixes.as_ref())?;
    } else {
        let mut out = io::stdout().lock();
        output::write_header(&mut out, &session)?;
        let result = session.scan();
        output::report_then_fix(&mut out, &session, &result, args.debug, |out| {
            args.fix
                .then(|| run_fixes(&session, &result, args.auto, out))
                .flatten()
        })?;
    }

    info!("Done.");
    Ok(())
}

/// Fix step over the non-matching apps; questions go to `out`.
fn run_fixes(
    session: &ScanSession,
    result: &ScanResult,
    auto: bool,
    out: &mut impl Write,
) -> Option<FixReport> {
    if result.non_matching.is_empty() {
        return None;
    }

    let fixer = session.fixer();
    let report = if auto {
        fixer.apply(&result.non_matching, FixMode::Auto)
    } else {
        let mut prompt = LinePrompt::new(io::stdin().lock(), out);
        fixer.apply(&result.non_matching, FixMode::Interactive(&mut prompt))
    };
    Some(report)
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<AuditConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match AuditConfig::default_path() {
            Some(path) => path,
            None => return Ok(AuditConfig::default()),
        },
    };

    let loaded = AuditConfig::load_existing(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    match loaded {
        Some(config) => {
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(AuditConfig::default())
        }
    }
}
