//! Target theme family and discovery of its installations.

use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Path markers mapped to a display label, checked in order.
const THEME_INDICATORS: &[(&str, &str)] = &[
    ("/Papirus/", "Papirus"),
    ("/Papirus-Dark/", "Papirus-Dark"),
    ("/Papirus-Light/", "Papirus-Light"),
    ("/ePapirus/", "ePapirus"),
    ("/ePapirus-Dark/", "ePapirus-Dark"),
    ("/hicolor/", "hicolor"),
    ("/Adwaita/", "Adwaita"),
    ("/gnome/", "GNOME"),
    ("/breeze/", "Breeze"),
    ("/oxygen/", "Oxygen"),
];

/// A family of related icon themes treated as one target.
#[derive(Clone, Debug)]
pub struct ThemeFamily {
    pub name: &'static str,
    /// Variants looked up under `/usr/share/icons`.
    pub system_variants: &'static [&'static str],
    /// Variants looked up under the per-user icon directories.
    pub user_variants: &'static [&'static str],
    /// Path segments that identify a file as belonging to the family, even
    /// under an install prefix that is not a known candidate.
    pub markers: &'static [&'static str],
}

impl ThemeFamily {
    pub fn papirus() -> Self {
        Self {
            name: "Papirus",
            system_variants: &[
                "Papirus",
                "Papirus-Dark",
                "Papirus-Light",
                "ePapirus",
                "ePapirus-Dark",
            ],
            user_variants: &["Papirus", "Papirus-Dark", "Papirus-Light"],
            markers: &[
                "/Papirus/",
                "/Papirus-Dark/",
                "/Papirus-Light/",
                "/ePapirus/",
                "/ePapirus-Dark/",
            ],
        }
    }

    /// True when `path` lies in one of `installations` or carries a family
    /// marker segment.
    pub fn owns(&self, path: &Path, installations: &[ThemeInstallation]) -> bool {
        let text = path.to_string_lossy();

        if let Some(found) = installations
            .iter()
            .find(|install| text.contains(&*install.path.to_string_lossy()))
        {
            debug!("{} lies in installation {}", text, found.path.display());
            return true;
        }

        if let Some(marker) = self.markers.iter().find(|m| text.contains(*m)) {
            debug!("{} carries marker {}", text, marker);
            return true;
        }

        false
    }
}

impl Default for ThemeFamily {
    fn default() -> Self {
        Self::papirus()
    }
}

/// One on-disk copy of a theme in the target family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThemeInstallation {
    pub path: PathBuf,
}

/// Keep the candidates that exist, in order, without duplicates.
pub fn locate(candidates: &[PathBuf]) -> Vec<ThemeInstallation> {
    let mut found: Vec<ThemeInstallation> = Vec::new();

    for candidate in candidates {
        if !candidate.exists() || found.iter().any(|i| &i.path == candidate) {
            continue;
        }
        debug!("Found theme installation at: {}", candidate.display());
        found.push(ThemeInstallation {
            path: candidate.clone(),
        });
    }

    if found.is_empty() {
        warn!("No target icon theme installation found on this system");
    }

    found
}

/// Best-effort name of the theme a resolved icon file belongs to.
pub fn theme_label(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return "unknown".to_string();
    };
    let text = path.to_string_lossy();

    if let Some((_, label)) = THEME_INDICATORS
        .iter()
        .find(|(indicator, _)| text.contains(indicator))
    {
        return label.to_string();
    }

    // /usr/share/icons/THEME_NAME/...
    if let Some((_, rest)) = text.split_once("/icons/") {
        if let Some(theme) = rest.split('/').next() {
            return theme.to_string();
        }
    }

    "unknown theme".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_keeps_order_and_drops_missing_and_duplicates() {
        let root = tempfile::tempdir().unwrap();
        let dark = root.path().join("Papirus-Dark");
        let light = root.path().join("Papirus-Light");
        std::fs::create_dir(&dark).unwrap();
        std::fs::create_dir(&light).unwrap();

        let found = locate(&[
            root.path().join("Papirus"),
            dark.clone(),
            light.clone(),
            dark.clone(),
        ]);

        let paths: Vec<_> = found.into_iter().map(|i| i.path).collect();
        assert_eq!(paths, vec![dark, light]);
    }

    #[test]
    fn empty_candidates_locate_nothing() {
        assert!(locate(&[]).is_empty());
    }

    #[test]
    fn owns_matches_installation_substring() {
        let family = ThemeFamily::papirus();
        let installs = [ThemeInstallation {
            path: PathBuf::from("/opt/custom/my-icons"),
        }];

        assert!(family.owns(
            Path::new("/opt/custom/my-icons/48x48/apps/foo.svg"),
            &installs
        ));
        assert!(!family.owns(Path::new("/usr/share/icons/hicolor/48x48/apps/foo.png"), &installs));
    }

    #[test]
    fn owns_matches_marker_without_installation() {
        let family = ThemeFamily::papirus();
        assert!(family.owns(Path::new("/opt/prefix/icons/ePapirus/64x64/apps/x.svg"), &[]));
        assert!(!family.owns(Path::new("/opt/prefix/icons/PapirusFake/apps/x.svg"), &[]));
    }

    #[test]
    fn labels_follow_indicator_priority() {
        assert_eq!(theme_label(None), "unknown");
        assert_eq!(
            theme_label(Some(Path::new("/usr/share/icons/Papirus-Dark/64x64/apps/a.svg"))),
            "Papirus-Dark"
        );
        assert_eq!(
            theme_label(Some(Path::new("/usr/share/icons/breeze/apps/48/a.svg"))),
            "Breeze"
        );
        assert_eq!(
            theme_label(Some(Path::new("/usr/share/icons/Yaru/48x48/apps/a.png"))),
            "Yaru"
        );
        assert_eq!(
            theme_label(Some(Path::new("/usr/share/pixmaps/a.png"))),
            "unknown theme"
        );
    }
}
