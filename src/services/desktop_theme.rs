//! Active icon theme as reported by the desktop environment.

use log::debug;
use std::process::Command;

/// Settings queries per desktop, tried in order.
const THEME_QUERIES: &[(&str, &str, &[&str])] = &[
    (
        "GNOME",
        "gsettings",
        &["get", "org.gnome.desktop.interface", "icon-theme"],
    ),
    (
        "Cinnamon",
        "gsettings",
        &["get", "org.cinnamon.desktop.interface", "icon-theme"],
    ),
    ("MATE", "gsettings", &["get", "org.mate.interface", "icon-theme"]),
    (
        "XFCE",
        "xfconf-query",
        &["-c", "xsettings", "-p", "/Net/IconThemeName"],
    ),
];

/// Name of the icon theme the desktop is using, if any tool reports one.
/// Missing tools and failing queries are ignored.
pub fn current_icon_theme() -> Option<String> {
    for (desktop, program, args) in THEME_QUERIES {
        let Ok(output) = Command::new(program).args(*args).output() else {
            continue;
        };
        if !output.status.success() {
            continue;
        }

        if let Some(theme) = parse_theme_output(&String::from_utf8_lossy(&output.stdout)) {
            debug!("Current icon theme ({}): {}", desktop, theme);
            return Some(theme);
        }
    }

    debug!("Could not determine current icon theme");
    None
}

/// `'Papirus-Dark'\n` -> `Papirus-Dark`
fn parse_theme_output(stdout: &str) -> Option<String> {
    let theme = stdout.trim().trim_matches(|c| c == '\'' || c == '"');
    (!theme.is_empty()).then(|| theme.to_string())
}
