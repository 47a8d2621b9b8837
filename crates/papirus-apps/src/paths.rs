//! Path helpers for XDG directories and the filesystem layout of one scan.

use crate::config::AuditConfig;
use crate::desktop_entry::PackageOrigin;
use crate::theme::ThemeFamily;
use std::path::{Path, PathBuf};

/// Every filesystem location a scan reads from or writes to.
///
/// Built once per session from the environment ([`SystemLayout::detect`]) or
/// assembled by hand when the scan must run against another root (tests,
/// chroots).
#[derive(Clone, Debug)]
pub struct SystemLayout {
    /// Candidate theme installation directories, in priority order.
    pub theme_candidates: Vec<PathBuf>,
    /// Directories holding `.desktop` files, in scan order.
    pub application_dirs: Vec<PathBuf>,
    /// Per-user applications directory; overrides are written here.
    pub user_applications_dir: PathBuf,
    /// Base directories searched by the theme index lookup.
    pub icon_base_dirs: Vec<PathBuf>,
}

impl SystemLayout {
    /// Resolve the layout from `HOME`, `XDG_DATA_HOME` and `XDG_DATA_DIRS`.
    pub fn detect(family: &ThemeFamily) -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        let data_home = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"));
        let data_dirs = std::env::var("XDG_DATA_DIRS")
            .unwrap_or_else(|_| "/usr/local/share:/usr/share".to_string());

        Self {
            theme_candidates: theme_candidates(family, &home, &data_home),
            application_dirs: application_directories(&data_home),
            user_applications_dir: data_home.join("applications"),
            icon_base_dirs: icon_base_directories(&home, &data_home, &data_dirs),
        }
    }

    /// Append the extra directories listed in the configuration file.
    pub fn with_config(mut self, config: &AuditConfig) -> Self {
        for path in &config.extra_theme_paths {
            if !self.theme_candidates.contains(path) {
                self.theme_candidates.push(path.clone());
            }
        }
        for path in &config.extra_application_dirs {
            if !self.application_dirs.contains(path) {
                self.application_dirs.push(path.clone());
            }
        }
        self
    }

    /// Package origin of a desktop file, judged purely from its path.
    pub fn classify_origin(&self, path: &Path) -> PackageOrigin {
        let text = path.to_string_lossy();
        if text.contains("/snap") {
            PackageOrigin::Snap
        } else if text.contains("/flatpak") {
            PackageOrigin::Flatpak
        } else if path.starts_with(&self.user_applications_dir) {
            PackageOrigin::User
        } else {
            PackageOrigin::Apt
        }
    }
}

/// Candidate installation directories for every variant of the theme family.
fn theme_candidates(family: &ThemeFamily, home: &Path, data_home: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    for variant in family.system_variants {
        candidates.push(PathBuf::from("/usr/share/icons").join(variant));
    }
    for root in [home.join(".icons"), data_home.join("icons")] {
        for variant in family.user_variants {
            candidates.push(root.join(variant));
        }
    }

    candidates
}

/// Get all application .desktop file directories (APT, Flatpak, Snap, user).
fn application_directories(data_home: &Path) -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/applications"),
        PathBuf::from("/usr/local/share/applications"),
        PathBuf::from("/var/lib/flatpak/exports/share/applications"),
        data_home.join("flatpak/exports/share/applications"),
        PathBuf::from("/var/lib/snapd/desktop/applications"),
        data_home.join("applications"),
    ]
}

/// Get base icon directories (XDG + Flatpak + Snap).
fn icon_base_directories(home: &Path, data_home: &Path, data_dirs: &str) -> Vec<PathBuf> {
    let mut dirs = vec![data_home.join("icons"), home.join(".icons")];

    for data_dir in data_dirs.split(':') {
        if !data_dir.is_empty() {
            dirs.push(PathBuf::from(data_dir).join("icons"));
            dirs.push(PathBuf::from(data_dir).join("pixmaps"));
        }
    }

    // Standard fallback
    let pixmaps = PathBuf::from("/usr/share/pixmaps");
    if !dirs.contains(&pixmaps) {
        dirs.push(pixmaps);
    }

    dirs.push(PathBuf::from("/var/lib/flatpak/exports/share/icons"));
    dirs.push(data_home.join("flatpak/exports/share/icons"));
    dirs.push(PathBuf::from("/var/lib/snapd/desktop/icons"));

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SystemLayout {
        SystemLayout {
            theme_candidates: Vec::new(),
            application_dirs: Vec::new(),
            user_applications_dir: PathBuf::from("/home/ada/.local/share/applications"),
            icon_base_dirs: Vec::new(),
        }
    }

    #[test]
    fn origin_follows_path_segments() {
        let layout = layout();
        let cases = [
            ("/var/lib/snapd/desktop/applications/x.desktop", PackageOrigin::Snap),
            ("/var/lib/flatpak/exports/share/applications/x.desktop", PackageOrigin::Flatpak),
            (
                "/home/ada/.local/share/flatpak/exports/share/applications/x.desktop",
                PackageOrigin::Flatpak,
            ),
            ("/home/ada/.local/share/applications/x.desktop", PackageOrigin::User),
            ("/usr/share/applications/x.desktop", PackageOrigin::Apt),
            ("/home/ada/other/x.desktop", PackageOrigin::Apt),
        ];

        for (path, expected) in cases {
            assert_eq!(layout.classify_origin(Path::new(path)), expected, "{path}");
        }
    }

    #[test]
    fn candidates_cover_system_and_home_variants() {
        let family = ThemeFamily::papirus();
        let candidates = theme_candidates(
            &family,
            Path::new("/home/ada"),
            Path::new("/home/ada/.local/share"),
        );

        assert_eq!(candidates.len(), 11);
        assert_eq!(candidates[0], PathBuf::from("/usr/share/icons/Papirus"));
        assert_eq!(candidates[4], PathBuf::from("/usr/share/icons/ePapirus-Dark"));
        assert_eq!(candidates[5], PathBuf::from("/home/ada/.icons/Papirus"));
        assert_eq!(
            candidates[10],
            PathBuf::from("/home/ada/.local/share/icons/Papirus-Light")
        );
    }

    #[test]
    fn config_extras_are_appended_once() {
        let config = AuditConfig {
            extra_theme_paths: vec![PathBuf::from("/opt/icons/Papirus")],
            extra_application_dirs: vec![
                PathBuf::from("/opt/apps"),
                PathBuf::from("/opt/apps"),
            ],
            ..AuditConfig::default()
        };

        let layout = layout().with_config(&config);
        assert_eq!(layout.theme_candidates, vec![PathBuf::from("/opt/icons/Papirus")]);
        assert_eq!(layout.application_dirs, vec![PathBuf::from("/opt/apps")]);
    }
}
