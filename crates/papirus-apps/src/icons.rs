//! Icon name resolution.
//!
//! Resolution goes through an [`IconLookup`] capability. The default one,
//! [`ThemeIndexLookup`], indexes the active theme and the themes it inherits
//! from; [`NoLookup`] stands in when no lookup is possible and leaves every
//! icon unresolved.

use crate::theme::theme_label;
use log::{debug, warn};
use std::cell::Cell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Image extensions stripped from icon names before lookup.
pub const ICON_EXTENSIONS: &[&str] = &["svg", "png", "xpm", "ico"];

/// Maps a symbolic icon name to a file at a pixel size.
pub trait IconLookup {
    fn lookup(&self, name: &str, size: u32) -> Option<PathBuf>;

    /// False when this lookup can never resolve anything.
    fn is_available(&self) -> bool {
        true
    }
}

/// Lookup used when no icon theme can be consulted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLookup;

impl IconLookup for NoLookup {
    fn lookup(&self, _name: &str, _size: u32) -> Option<PathBuf> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

impl<F> IconLookup for F
where
    F: Fn(&str, u32) -> Option<PathBuf>,
{
    fn lookup(&self, name: &str, size: u32) -> Option<PathBuf> {
        self(name, size)
    }
}

/// Strip one trailing image extension, leaving reverse-DNS dots alone.
///
/// `org.example.CoolApp.svg` becomes `org.example.CoolApp`, while
/// `org.example.CoolApp` is returned unchanged.
pub fn strip_icon_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if ICON_EXTENSIONS.contains(&ext) => stem,
        _ => name,
    }
}

/// Outcome of resolving one icon name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub path: Option<PathBuf>,
    /// Label of the theme owning `path`.
    pub theme: String,
}

impl ResolvedIcon {
    fn unresolved() -> Self {
        Self {
            path: None,
            theme: theme_label(None),
        }
    }

    fn found(path: PathBuf) -> Self {
        let theme = theme_label(Some(&path));
        Self {
            path: Some(path),
            theme,
        }
    }
}

/// Resolves declared icon names to files through an [`IconLookup`].
pub struct IconResolver {
    lookup: Box<dyn IconLookup>,
    size: u32,
    warned: Cell<bool>,
}

impl IconResolver {
    pub fn new(lookup: Box<dyn IconLookup>, size: u32) -> Self {
        Self {
            lookup,
            size,
            warned: Cell::new(false),
        }
    }

    pub fn is_available(&self) -> bool {
        self.lookup.is_available()
    }

    pub fn resolve(&self, icon_name: &str) -> ResolvedIcon {
        if icon_name.is_empty() {
            return ResolvedIcon::unresolved();
        }

        let base = strip_icon_extension(icon_name);
        debug!("Resolving icon '{}' (base: '{}')", icon_name, base);

        if icon_name.starts_with('/') {
            let path = PathBuf::from(icon_name);
            if path.exists() {
                debug!("Icon is an existing absolute path: {}", icon_name);
                return ResolvedIcon::found(path);
            }
        }

        if !self.lookup.is_available() {
            if !self.warned.replace(true) {
                warn!("No icon lookup available; icons cannot be classified");
            }
            return ResolvedIcon::unresolved();
        }

        match self.lookup.lookup(base, self.size) {
            Some(path) => {
                debug!("Resolved '{}' to: {}", base, path.display());
                ResolvedIcon::found(path)
            }
            None => {
                debug!("Could not resolve '{}'", base);
                ResolvedIcon::unresolved()
            }
        }
    }
}

/// Size metadata of one theme subdirectory, from `index.theme`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DirSize {
    size: u32,
    min: u32,
    max: u32,
    scalable: bool,
}

impl DirSize {
    /// Directories without metadata sort after every described one.
    const UNKNOWN: DirSize = DirSize {
        size: 0,
        min: 0,
        max: 0,
        scalable: false,
    };

    fn distance(&self, target: u32) -> u32 {
        if *self == Self::UNKNOWN {
            return u32::MAX;
        }
        if self.scalable && self.min <= target && target <= self.max {
            return 0;
        }
        self.size.abs_diff(target)
    }
}

/// Parsed index.theme content.
#[derive(Debug, Default)]
struct ParsedIconTheme {
    directories: Vec<String>,
    inherits: Vec<String>,
    sizes: HashMap<String, DirSize>,
}

fn parse_icon_theme_index(theme_root: &Path) -> Option<ParsedIconTheme> {
    let content = fs::read_to_string(theme_root.join("index.theme")).ok()?;
    let mut parsed = ParsedIconTheme::default();
    let mut section = String::new();
    let mut raw: HashMap<String, HashMap<String, String>> = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_string();
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let (k, v) = (k.trim(), v.trim());

        if section.eq_ignore_ascii_case("Icon Theme") {
            let list = || v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
            match k {
                "Directories" => parsed.directories = list().collect(),
                "Inherits" => parsed.inherits = list().collect(),
                _ => {}
            }
        } else {
            raw.entry(section.clone())
                .or_default()
                .insert(k.to_string(), v.to_string());
        }
    }

    for dir in &parsed.directories {
        let Some(keys) = raw.get(dir) else { continue };
        let Some(size) = keys.get("Size").and_then(|s| s.parse().ok()) else {
            continue;
        };
        let scalable = keys.get("Type").is_some_and(|t| t == "Scalable");
        let min = keys.get("MinSize").and_then(|s| s.parse().ok()).unwrap_or(size);
        let max = keys.get("MaxSize").and_then(|s| s.parse().ok()).unwrap_or(size);
        parsed.sizes.insert(
            dir.clone(),
            DirSize {
                size,
                min,
                max,
                scalable,
            },
        );
    }

    Some(parsed)
}

#[derive(Clone, Debug)]
struct IndexedIcon {
    /// Position of the owning theme in the search order.
    theme_rank: usize,
    dir: DirSize,
    path: PathBuf,
}

/// Icon lookup backed by an in-memory index of the installed themes.
///
/// The first theme in inheritance order that has the name wins; inside that
/// theme the directory whose size is closest to the request wins.
pub struct ThemeIndexLookup {
    index: HashMap<String, Vec<IndexedIcon>>,
    themes_found: usize,
}

impl ThemeIndexLookup {
    /// Index `active_theme` (or Adwaita), everything it inherits from, and
    /// finally hicolor, across `base_dirs`.
    pub fn build(active_theme: Option<&str>, base_dirs: &[PathBuf]) -> Self {
        let start = active_theme
            .filter(|t| !t.is_empty())
            .unwrap_or("Adwaita")
            .to_string();

        let mut themes = resolve_theme_inheritance(vec![start], base_dirs);
        if !themes.iter().any(|t| t == "hicolor") {
            themes.push("hicolor".to_string());
        }
        debug!("Icon theme search order: {:?}", themes);

        let mut lookup = Self {
            index: HashMap::new(),
            themes_found: 0,
        };

        for (rank, theme) in themes.iter().enumerate() {
            for base_dir in base_dirs {
                let theme_root = base_dir.join(theme);
                if !theme_root.is_dir() {
                    continue;
                }
                lookup.themes_found += 1;

                if let Some(parsed) = parse_icon_theme_index(&theme_root) {
                    for relative in &parsed.directories {
                        let dir = parsed
                            .sizes
                            .get(relative)
                            .copied()
                            .unwrap_or(DirSize::UNKNOWN);
                        lookup.index_dir(&theme_root.join(relative), rank, dir, 1);
                    }
                } else {
                    // Fallback for directories without index.theme
                    lookup.index_dir(&theme_root, rank, DirSize::UNKNOWN, 10);
                }
            }
        }

        // Unthemed icons (pixmaps, icons root) come last.
        for dir in base_dirs {
            lookup.index_dir(dir, themes.len(), DirSize::UNKNOWN, 1);
        }

        debug!(
            "Indexed {} icon names from {} theme directories",
            lookup.index.len(),
            lookup.themes_found
        );
        lookup
    }

    fn index_dir(&mut self, dir: &Path, theme_rank: usize, size: DirSize, depth: usize) {
        if !dir.is_dir() {
            return;
        }

        let walker = walkdir::WalkDir::new(dir)
            .follow_links(true)
            .max_depth(depth)
            .sort_by_file_name();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let known = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| matches!(e, "png" | "svg" | "xpm"));
            if !known {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            self.index
                .entry(stem.to_string())
                .or_default()
                .push(IndexedIcon {
                    theme_rank,
                    dir: size,
                    path: path.to_path_buf(),
                });
        }
    }
}

impl IconLookup for ThemeIndexLookup {
    fn lookup(&self, name: &str, size: u32) -> Option<PathBuf> {
        let candidates = self.index.get(name)?;
        let best_rank = candidates.iter().map(|c| c.theme_rank).min()?;

        candidates
            .iter()
            .filter(|c| c.theme_rank == best_rank)
            .min_by_key(|c| c.dir.distance(size))
            .map(|c| c.path.clone())
    }

    fn is_available(&self) -> bool {
        self.themes_found > 0
    }
}

fn resolve_theme_inheritance(start_themes: Vec<String>, base_dirs: &[PathBuf]) -> Vec<String> {
    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from(start_themes);

    while let Some(theme) = queue.pop_front() {
        if !visited.insert(theme.clone()) {
            continue;
        }
        result.push(theme.clone());

        for base in base_dirs {
            if let Some(parsed) = parse_icon_theme_index(&base.join(&theme)) {
                for parent in parsed.inherits {
                    if !visited.contains(&parent) {
                        queue.push_back(parent);
                    }
                }
                break; // Only parse first found theme instance
            }
        }
    }

    result
}
