//! papirus-apps: Papirus icon coverage for Linux desktop applications.
//!
//! Provides the pieces behind a coverage scan:
//! - Discovery of Papirus installations and `.desktop` files (APT, Flatpak, Snap, user)
//! - Icon resolution through a pluggable lookup, with a theme-index implementation
//! - Replacement suggestions from name variations and app-type generic icons
//! - Desktop file rewriting with user overrides and one-time backups

mod alternatives;
mod catalog;
mod config;
mod desktop_entry;
mod error;
mod fix;
mod icons;
mod paths;
mod scan;
mod session;
mod theme;

pub use alternatives::{AlternativeFinder, AppType, detect_app_types, name_variations};
pub use catalog::DescriptorStore;
pub use config::{AuditConfig, DEFAULT_LOOKUP_SIZE, DEFAULT_SUMMARY_LIMIT, OverridePolicy};
pub use desktop_entry::{AppDescriptor, DesktopFile, PackageOrigin, parse_desktop_file};
pub use error::{AuditError, DesktopEntryError};
pub use fix::{Choice, FixApplier, FixMode, FixOutcome, FixPrompt, FixRecord, FixReport, backup_path};
pub use icons::{
    IconLookup, IconResolver, NoLookup, ResolvedIcon, ThemeIndexLookup, strip_icon_extension,
};
pub use paths::SystemLayout;
pub use scan::{
    CoverageReport, MatchedApp, OriginGroup, ReportDisplay, ReportEntry, ScanCoordinator, ScanResult,
    UnmatchedApp,
};
pub use session::ScanSession;
pub use theme::{ThemeFamily, ThemeInstallation, theme_label};
