//! Scan session setup.
//!
//! Wraps the papirus-apps crate: resolves the layout, picks the icon lookup
//! and locates the Papirus installations.

use super::desktop_theme;
use log::{debug, info};
use papirus_apps::{
    AuditConfig, IconLookup, NoLookup, ScanSession, SystemLayout, ThemeFamily, ThemeIndexLookup,
};
use std::path::PathBuf;

/// How the icon lookup should be chosen.
pub struct LookupOptions {
    /// Theme forced on the command line.
    pub icon_theme: Option<String>,
    /// Skip the lookup entirely; every icon stays unresolved.
    pub disabled: bool,
}

/// Build the session for one invocation.
pub fn open_session(config: AuditConfig, options: LookupOptions) -> ScanSession {
    let family = ThemeFamily::papirus();
    let layout = SystemLayout::detect(&family).with_config(&config);

    let detected = desktop_theme::current_icon_theme();
    if let Some(theme) = &detected {
        info!("Current icon theme: {}", theme);
    }

    let active = options
        .icon_theme
        .or_else(|| config.icon_theme.clone())
        .or(detected);
    let lookup = choose_lookup(options.disabled, active.as_deref(), &layout.icon_base_dirs);

    ScanSession::new(config, layout, family, lookup)
}

/// Theme index over `base_dirs`, or [`NoLookup`] when disabled or when no
/// theme directory exists. The resolver reports the missing lookup itself.
fn choose_lookup(
    disabled: bool,
    active_theme: Option<&str>,
    base_dirs: &[PathBuf],
) -> Box<dyn IconLookup> {
    if disabled {
        return Box::new(NoLookup);
    }

    let index = ThemeIndexLookup::build(active_theme, base_dirs);
    if index.is_available() {
        Box::new(index)
    } else {
        debug!("No icon theme directories found; icons stay unresolved");
        Box::new(NoLookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_theme_dirs_give_an_unavailable_lookup() {
        let base = vec![PathBuf::from("/nonexistent/papirus-audit/icons")];

        assert!(!choose_lookup(false, Some("Papirus"), &base).is_available());
        assert!(!choose_lookup(true, None, &base).is_available());
    }
}
