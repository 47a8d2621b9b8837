//! System-facing services for papirus-audit.
//!
//! - `apps` - Scan session setup on top of papirus-apps
//! - `desktop_theme` - Active icon theme from the desktop settings tools

pub mod apps;
pub mod desktop_theme;
