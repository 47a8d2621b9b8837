//! Search for replacement icons inside the target theme.

use crate::desktop_entry::AppDescriptor;
use crate::icons::strip_icon_extension;
use crate::theme::ThemeInstallation;
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Size buckets probed in priority order.
pub const SIZE_DIRS: &[&str] = &[
    "scalable", "64x64", "48x48", "32x32", "24x24", "22x22", "16x16",
];

/// Icon context directories probed in priority order.
pub const CATEGORY_DIRS: &[&str] = &[
    "apps",
    "mimetypes",
    "actions",
    "devices",
    "places",
    "status",
    "categories",
];

const PROBE_EXTENSIONS: &[&str] = &["svg", "png"];

/// Coarse kind of application, used to pick generic icons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Browser,
    Editor,
    Media,
    System,
    Terminal,
    Files,
    Office,
    Graphics,
    Network,
    Development,
    Game,
    Audio,
    Video,
}

/// Substrings of the lowercased `Categories` value.
const CATEGORY_TYPES: &[(&str, AppType)] = &[
    ("webbrowser", AppType::Browser),
    ("texteditor", AppType::Editor),
    ("audioplayer", AppType::Audio),
    ("videoplayer", AppType::Video),
    ("graphics", AppType::Graphics),
    ("office", AppType::Office),
    ("development", AppType::Development),
    ("system", AppType::System),
    ("network", AppType::Network),
    ("game", AppType::Game),
    ("consoleonly", AppType::Terminal),
];

impl AppType {
    /// Every type, in keyword matching order.
    pub const ALL: [AppType; 13] = [
        AppType::Browser,
        AppType::Editor,
        AppType::Media,
        AppType::System,
        AppType::Terminal,
        AppType::Files,
        AppType::Office,
        AppType::Graphics,
        AppType::Network,
        AppType::Development,
        AppType::Game,
        AppType::Audio,
        AppType::Video,
    ];

    /// Words in name, comment or command line hinting at this type.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Browser => &["browser", "firefox", "chrome", "chromium", "web", "safari", "opera"],
            Self::Editor => &["editor", "vim", "nano", "code", "atom", "vscode", "sublime", "gedit"],
            Self::Media => &["player", "vlc", "mpv", "music", "video", "audio", "spotify", "media"],
            Self::System => &["settings", "control", "monitor", "disk", "system", "update", "upgrade"],
            Self::Terminal => &["terminal", "console", "shell", "bash", "cmd"],
            Self::Files => &["files", "nautilus", "dolphin", "thunar", "manager", "explorer"],
            Self::Office => &["writer", "calc", "word", "excel", "document", "office", "libreoffice"],
            Self::Graphics => &["gimp", "image", "photo", "graphics", "paint", "inkscape", "krita"],
            Self::Network => &["network", "wifi", "ethernet", "connection", "vpn"],
            Self::Development => &["develop", "ide", "compiler", "debug", "git"],
            Self::Game => &["game", "steam", "play", "gaming"],
            Self::Audio => &["audio", "sound", "music", "podcast", "radio"],
            Self::Video => &["video", "movie", "film", "stream", "youtube"],
        }
    }

    /// Generic icon names for this type, best first.
    pub fn generic_icons(self) -> &'static [&'static str] {
        match self {
            Self::Browser => &["web-browser", "applications-internet", "internet-web-browser"],
            Self::Editor => &["text-editor", "accessories-text-editor", "applications-development"],
            Self::Media => &["multimedia-player", "applications-multimedia", "media-player"],
            Self::System => &["applications-system", "preferences-system", "system-software-update"],
            Self::Terminal => &["utilities-terminal", "terminal", "applications-utilities"],
            Self::Files => &["file-manager", "folder", "applications-accessories"],
            Self::Office => &["applications-office", "office-writer", "text-x-generic"],
            Self::Graphics => &["applications-graphics", "image-x-generic", "graphics-viewer"],
            Self::Network => &["applications-internet", "network-workgroup", "applications-system"],
            Self::Development => &["applications-development", "text-editor", "utilities-terminal"],
            Self::Game => &["applications-games", "input-gaming", "applications-other"],
            Self::Audio => &["applications-multimedia", "audio-x-generic", "multimedia-player"],
            Self::Video => &["applications-multimedia", "video-x-generic", "multimedia-player"],
        }
    }
}

/// Infer application types from categories, then from keywords in name,
/// comment and command line. Every match counts; order is first match.
pub fn detect_app_types(app: &AppDescriptor) -> Vec<AppType> {
    let mut types = Vec::new();

    let categories = app.categories.to_lowercase();
    for (keyword, app_type) in CATEGORY_TYPES {
        if categories.contains(keyword) {
            push_unique(&mut types, *app_type);
        }
    }

    let text = format!("{} {} {}", app.name, app.comment, app.exec).to_lowercase();
    for app_type in AppType::ALL {
        if app_type.keywords().iter().any(|k| text.contains(k)) {
            push_unique(&mut types, app_type);
        }
    }

    types
}

/// Looks for icon names that exist in the located theme installations.
pub struct AlternativeFinder<'a> {
    installations: &'a [ThemeInstallation],
}

impl<'a> AlternativeFinder<'a> {
    pub fn new(installations: &'a [ThemeInstallation]) -> Self {
        Self { installations }
    }

    /// First existing `<install>/<size>/<category>/<name>.<ext>`, in
    /// installation, size, category, extension priority.
    pub fn find_in_theme(&self, icon_name: &str) -> Option<PathBuf> {
        let base = strip_icon_extension(icon_name);
        if base.is_empty() || base.contains('/') {
            return None;
        }

        for install in self.installations {
            for size in SIZE_DIRS {
                for category in CATEGORY_DIRS {
                    let dir = install.path.join(size).join(category);
                    for ext in PROBE_EXTENSIONS {
                        let candidate = dir.join(format!("{base}.{ext}"));
                        if candidate.exists() {
                            return Some(candidate);
                        }
                    }
                }
            }
        }

        None
    }

    /// Ordered replacement candidates for `app`, closest match first.
    ///
    /// A single-element result equal to `app.icon` means the icon already
    /// exists in the theme.
    pub fn suggest(&self, app: &AppDescriptor) -> Vec<String> {
        if self.find_in_theme(&app.icon).is_some() {
            return vec![app.icon.clone()];
        }

        let mut suggestions = Vec::new();
        for variation in name_variations(&app.icon) {
            if self.find_in_theme(&variation).is_some() {
                push_unique(&mut suggestions, variation);
            }
        }

        if suggestions.is_empty() {
            let types = detect_app_types(app);
            debug!("Detected app types for {}: {:?}", app.name, types);

            for app_type in types {
                for generic in app_type.generic_icons() {
                    if self.find_in_theme(generic).is_some() {
                        push_unique(&mut suggestions, generic.to_string());
                    }
                }
            }
        }

        suggestions
    }
}

/// Spelling variations of an icon name, in probing order.
pub fn name_variations(icon: &str) -> Vec<String> {
    let base = icon_base_name(icon);
    if base.is_empty() {
        return Vec::new();
    }

    let mut variations = vec![
        base.to_string(),
        base.to_lowercase(),
        base.replace('-', "_"),
        base.replace('_', "-"),
        base.replace(' ', "-"),
        base.replace(' ', "_"),
    ];

    // Reverse-DNS names usually end with the application name.
    if let Some((_, app_name)) = base.rsplit_once('.') {
        if !app_name.is_empty() {
            variations.extend([
                app_name.to_string(),
                app_name.to_lowercase(),
                format!("utilities-{app_name}"),
                format!("applications-{app_name}"),
                format!("{app_name}-icon"),
            ]);
        }
    }

    let mut unique = Vec::with_capacity(variations.len());
    for variation in variations {
        push_unique(&mut unique, variation);
    }
    unique
}

/// Icon name without image extension; absolute paths reduce to their file
/// name.
fn icon_base_name(icon: &str) -> &str {
    let name = if icon.starts_with('/') {
        Path::new(icon)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    } else {
        icon
    };
    strip_icon_extension(name)
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
