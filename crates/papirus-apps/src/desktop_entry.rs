//! Desktop entry parsing and in-place editing.

use crate::error::DesktopEntryError;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Group holding the application keys.
pub const DESKTOP_ENTRY_GROUP: &str = "Desktop Entry";

/// Where an application was installed from, derived from its file path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackageOrigin {
    Apt,
    User,
    Flatpak,
    Snap,
}

impl fmt::Display for PackageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Apt => "APT",
            Self::User => "USER",
            Self::Flatpak => "FLATPAK",
            Self::Snap => "SNAP",
        };
        f.write_str(label)
    }
}

/// parsed from .desktop files.
#[derive(Clone, Debug, Serialize)]
pub struct AppDescriptor {
    pub name: String,
    /// Icon name or absolute path; empty when the entry declares none.
    pub icon: String,
    pub exec: String,
    /// Raw `Categories` value, `;`-delimited.
    pub categories: String,
    pub comment: String,
    pub file_path: PathBuf,
    pub origin: PackageOrigin,
}

/// Parse a .desktop file into an AppDescriptor.
///
/// Returns `Ok(None)` for valid files that do not describe a visible
/// application (no `[Desktop Entry]`, `Type` other than `Application`, or
/// `NoDisplay=true`).
pub fn parse_desktop_file(
    path: &Path,
    origin: PackageOrigin,
) -> Result<Option<AppDescriptor>, DesktopEntryError> {
    let file = DesktopFile::read(path)?;

    if !file.has_group(DESKTOP_ENTRY_GROUP) {
        return Ok(None);
    }
    let get = |key| file.get(DESKTOP_ENTRY_GROUP, key).unwrap_or_default();

    if !get("Type").eq_ignore_ascii_case("application") {
        return Ok(None);
    }
    if get("NoDisplay").eq_ignore_ascii_case("true") {
        return Ok(None);
    }

    let name = match file.get(DESKTOP_ENTRY_GROUP, "Name") {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Ok(Some(AppDescriptor {
        name,
        icon: get("Icon").to_string(),
        exec: get("Exec").to_string(),
        categories: get("Categories").to_string(),
        comment: get("Comment").to_string(),
        file_path: path.to_path_buf(),
        origin,
    }))
}

#[derive(Clone, Debug)]
struct Entry {
    key: String,
    value: String,
    line: usize,
}

#[derive(Clone, Debug)]
struct Group {
    name: String,
    header_line: usize,
    entries: Vec<Entry>,
}

impl Group {
    fn last_line(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.line)
            .max()
            .unwrap_or(self.header_line)
    }
}

/// A desktop file kept line by line so that edits touch only the lines they
/// change. Values are taken literally; `%` field codes are never expanded.
#[derive(Clone, Debug)]
pub struct DesktopFile {
    /// Raw lines including their terminators.
    lines: Vec<String>,
    groups: Vec<Group>,
}

impl DesktopFile {
    pub fn read(path: &Path) -> Result<Self, DesktopEntryError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, DesktopEntryError> {
        let lines: Vec<String> = content.split_inclusive('\n').map(String::from).collect();
        let mut groups: Vec<Group> = Vec::new();

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].to_string();
                if groups.iter().any(|g| g.name == name) {
                    return Err(DesktopEntryError::DuplicateGroup {
                        line: idx + 1,
                        group: name,
                    });
                }
                groups.push(Group {
                    name,
                    header_line: idx,
                    entries: Vec::new(),
                });
                continue;
            }

            let invalid = || DesktopEntryError::InvalidLine {
                line: idx + 1,
                content: line.to_string(),
            };
            let (key, value) = line.split_once('=').ok_or_else(invalid)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(invalid());
            }
            // Entries before the first group header have nowhere to live.
            let group = groups.last_mut().ok_or_else(invalid)?;
            if group.entries.iter().any(|e| e.key == key) {
                return Err(DesktopEntryError::DuplicateKey {
                    line: idx + 1,
                    group: group.name.clone(),
                    key: key.to_string(),
                });
            }
            group.entries.push(Entry {
                key: key.to_string(),
                value: value.trim().to_string(),
                line: idx,
            });
        }

        Ok(Self { lines, groups })
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }

    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group)?
            .entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Set `key` in `group`, rewriting its line or appending a new line after
    /// the group's last entry. Returns false when the group does not exist.
    pub fn set(&mut self, group: &str, key: &str, value: &str) -> bool {
        let Some(group_idx) = self.groups.iter().position(|g| g.name == group) else {
            return false;
        };

        if let Some(entry) = self.groups[group_idx]
            .entries
            .iter_mut()
            .find(|e| e.key == key)
        {
            let terminator = line_terminator(&self.lines[entry.line]);
            self.lines[entry.line] = format!("{key}={value}{terminator}");
            entry.value = value.to_string();
            return true;
        }

        let after = self.groups[group_idx].last_line();
        if !self.lines[after].ends_with('\n') {
            self.lines[after].push('\n');
        }
        let insert_at = after + 1;
        self.lines.insert(insert_at, format!("{key}={value}\n"));

        for g in &mut self.groups {
            if g.header_line >= insert_at {
                g.header_line += 1;
            }
            for e in &mut g.entries {
                if e.line >= insert_at {
                    e.line += 1;
                }
            }
        }
        self.groups[group_idx].entries.push(Entry {
            key: key.to_string(),
            value: value.to_string(),
            line: insert_at,
        });

        true
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.to_string())
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl fmt::Display for DesktopFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn line_terminator(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}
