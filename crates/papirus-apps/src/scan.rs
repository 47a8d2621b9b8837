//! Scan of every installed application and the coverage summary.

use crate::desktop_entry::{AppDescriptor, PackageOrigin};
use crate::icons::ResolvedIcon;
use crate::session::ScanSession;
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// An application whose icon already comes from the target theme.
#[derive(Clone, Debug, Serialize)]
pub struct MatchedApp {
    pub app: AppDescriptor,
    pub resolved_path: Option<PathBuf>,
}

/// An application whose icon does not come from the target theme.
#[derive(Clone, Debug, Serialize)]
pub struct UnmatchedApp {
    pub app: AppDescriptor,
    pub resolved_path: Option<PathBuf>,
    /// Label of the theme currently providing the icon.
    pub current_theme: String,
    /// Replacement names that exist in the target theme, best first.
    pub suggestions: Vec<String>,
}

impl UnmatchedApp {
    /// Human readable reason the icon does not match.
    pub fn status(&self) -> String {
        match &self.resolved_path {
            None => "Could not resolve icon (missing from theme)".to_string(),
            Some(_) => format!("Using {}", self.current_theme),
        }
    }

    pub fn best_suggestion(&self) -> Option<&str> {
        self.suggestions.first().map(String::as_str)
    }
}

/// Every scanned application, split by whether it matches the target theme.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ScanResult {
    pub matching: Vec<MatchedApp>,
    pub non_matching: Vec<UnmatchedApp>,
}

impl ScanResult {
    pub fn total(&self) -> usize {
        self.matching.len() + self.non_matching.len()
    }

    /// Summary with at most `limit` entries listed per origin.
    pub fn report(&self, limit: usize) -> CoverageReport {
        let total = self.total();
        let coverage_percent = if total == 0 {
            0.0
        } else {
            (self.matching.len() as f64 / total as f64 * 1000.0).round() / 10.0
        };

        let mut groups: Vec<OriginGroup> = Vec::new();
        for entry in &self.non_matching {
            let idx = match groups.iter().position(|g| g.origin == entry.app.origin) {
                Some(idx) => idx,
                None => {
                    groups.push(OriginGroup {
                        origin: entry.app.origin,
                        count: 0,
                        entries: Vec::new(),
                        overflow: 0,
                    });
                    groups.len() - 1
                }
            };

            let group = &mut groups[idx];
            group.count += 1;
            if group.entries.len() < limit {
                group.entries.push(ReportEntry {
                    name: entry.app.name.clone(),
                    suggestion: entry.best_suggestion().map(String::from),
                });
            } else {
                group.overflow += 1;
            }
        }

        CoverageReport {
            total,
            matching: self.matching.len(),
            non_matching: self.non_matching.len(),
            coverage_percent,
            groups,
        }
    }
}

/// One listed application in the summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub suggestion: Option<String>,
}

/// Non-matching applications of one package origin.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OriginGroup {
    pub origin: PackageOrigin,
    pub count: usize,
    pub entries: Vec<ReportEntry>,
    /// Applications beyond the listed ones.
    pub overflow: usize,
}

/// Coverage summary of a scan.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoverageReport {
    pub total: usize,
    pub matching: usize,
    pub non_matching: usize,
    /// Share of matching applications, one decimal place.
    pub coverage_percent: f64,
    pub groups: Vec<OriginGroup>,
}

impl CoverageReport {
    /// Render with the target theme's name in the headings.
    pub fn display<'a>(&'a self, theme_name: &'a str) -> ReportDisplay<'a> {
        ReportDisplay {
            report: self,
            theme_name,
        }
    }
}

pub struct ReportDisplay<'a> {
    report: &'a CoverageReport,
    theme_name: &'a str,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        let theme = self.theme_name;

        writeln!(f, "SUMMARY:")?;
        writeln!(f, "Total applications checked: {}", r.total)?;
        writeln!(f, "Using {theme} icons: {}", r.matching)?;
        writeln!(f, "NOT using {theme} icons: {}", r.non_matching)?;
        writeln!(f, "{theme} coverage: {:.1}%", r.coverage_percent)?;

        if r.groups.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "Applications that could be improved:")?;
        for group in &r.groups {
            writeln!(f)?;
            writeln!(f, "{} applications ({}):", group.origin, group.count)?;
            for entry in &group.entries {
                writeln!(f, "  • {}", entry.name)?;
                match &entry.suggestion {
                    Some(icon) => writeln!(f, "    → Could use: {icon}")?,
                    None => writeln!(f, "    → No suitable {theme} icon found")?,
                }
            }
            if group.overflow > 0 {
                writeln!(f, "  ... and {} more", group.overflow)?;
            }
        }

        Ok(())
    }
}

/// Runs resolution, classification and suggestion over every descriptor.
pub struct ScanCoordinator<'a> {
    session: &'a ScanSession,
}

impl<'a> ScanCoordinator<'a> {
    pub fn new(session: &'a ScanSession) -> Self {
        Self { session }
    }

    pub fn run(&self) -> ScanResult {
        debug!("Scanning applications for {} icon usage", self.session.family().name);

        let apps = self.session.descriptors().enumerate();
        let finder = self.session.finder();
        let mut result = ScanResult::default();

        for app in apps {
            debug!("Processing app '{}' with icon '{}'", app.name, app.icon);

            let ResolvedIcon { path, theme } = self.session.resolver().resolve(&app.icon);
            let matching = path
                .as_deref()
                .is_some_and(|p| self.session.is_target_theme(p));
            debug!("{}: matching={}", app.name, matching);

            if matching {
                result.matching.push(MatchedApp {
                    app,
                    resolved_path: path,
                });
            } else {
                let suggestions = finder.suggest(&app);
                result.non_matching.push(UnmatchedApp {
                    app,
                    resolved_path: path,
                    current_theme: theme,
                    suggestions,
                });
            }
        }

        info!(
            "Scan complete: {} applications, {} matching",
            result.total(),
            result.matching.len()
        );
        result
    }
}
