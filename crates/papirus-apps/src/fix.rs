//! Rewriting desktop files to use a suggested icon.

use crate::config::OverridePolicy;
use crate::desktop_entry::{DESKTOP_ENTRY_GROUP, DesktopFile, PackageOrigin};
use crate::error::AuditError;
use crate::paths::SystemLayout;
use crate::scan::UnmatchedApp;
use log::{debug, info};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with one entry in interactive mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// Apply the suggestion at this index.
    Apply(usize),
    Skip,
}

/// Source of user decisions during an interactive fix.
pub trait FixPrompt {
    /// Asked once before any file is touched.
    fn confirm_batch(&mut self, count: usize) -> bool;

    /// Asked for every entry that has at least one suggestion.
    fn choose(&mut self, entry: &UnmatchedApp) -> Choice;
}

pub enum FixMode<'p> {
    /// Apply the first suggestion everywhere without asking.
    Auto,
    Interactive(&'p mut dyn FixPrompt),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum FixOutcome {
    Fixed,
    Failed(String),
}

/// Result of fixing one application.
#[derive(Clone, Debug, Serialize)]
pub struct FixRecord {
    pub name: String,
    pub icon: String,
    /// The file actually written; a user override when the original was
    /// not writable.
    pub target: PathBuf,
    /// Origin of `target`, which differs from the scanned origin for
    /// overrides.
    pub origin: PackageOrigin,
    pub outcome: FixOutcome,
}

/// Everything that happened during one fix batch.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FixReport {
    pub records: Vec<FixRecord>,
    /// Applications without any suggestion.
    pub no_alternative: Vec<String>,
    /// Applications whose only suggestion is their current icon name.
    pub unchanged: Vec<String>,
    /// Applications skipped by the user.
    pub skipped: Vec<String>,
    /// The user declined the whole batch.
    pub cancelled: bool,
}

impl FixReport {
    pub fn fixed(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == FixOutcome::Fixed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.fixed()
    }
}

/// Applies chosen icons to desktop files, writing per-user overrides and
/// one-time backups.
pub struct FixApplier<'a> {
    layout: &'a SystemLayout,
    policy: OverridePolicy,
}

impl<'a> FixApplier<'a> {
    pub fn new(layout: &'a SystemLayout, policy: OverridePolicy) -> Self {
        Self { layout, policy }
    }

    pub fn apply(&self, entries: &[UnmatchedApp], mode: FixMode<'_>) -> FixReport {
        let mut report = FixReport::default();
        let mut prompt = match mode {
            FixMode::Auto => None,
            FixMode::Interactive(prompt) => Some(prompt),
        };

        let fixable = entries
            .iter()
            .filter(|e| !e.suggestions.is_empty())
            .count();
        if fixable == 0 {
            info!("No applications need icon fixes");
        } else if let Some(prompt) = prompt.as_mut() {
            if !prompt.confirm_batch(fixable) {
                debug!("Fix batch declined");
                report.cancelled = true;
                return report;
            }
        }

        for entry in entries {
            let app = &entry.app;
            let Some(best) = entry.best_suggestion() else {
                report.no_alternative.push(app.name.clone());
                continue;
            };
            if entry.suggestions.len() == 1 && best == app.icon {
                debug!("{} already names an icon of the theme", app.name);
                report.unchanged.push(app.name.clone());
                continue;
            }

            let icon = match prompt.as_mut().map(|p| p.choose(entry)) {
                None => best,
                Some(Choice::Apply(idx)) => match entry.suggestions.get(idx) {
                    Some(icon) => icon.as_str(),
                    None => best,
                },
                Some(Choice::Skip) => {
                    report.skipped.push(app.name.clone());
                    continue;
                }
            };

            let record = match self.update_icon(&app.file_path, icon) {
                Ok(target) => {
                    debug!("Fixed: {} → {}", app.name, icon);
                    FixRecord {
                        name: app.name.clone(),
                        icon: icon.to_string(),
                        origin: self.layout.classify_origin(&target),
                        target,
                        outcome: FixOutcome::Fixed,
                    }
                }
                Err(e) => {
                    debug!("Failed to update {}: {}", app.file_path.display(), e);
                    FixRecord {
                        name: app.name.clone(),
                        icon: icon.to_string(),
                        target: app.file_path.clone(),
                        origin: app.origin,
                        outcome: FixOutcome::Failed(e.to_string()),
                    }
                }
            };
            report.records.push(record);
        }

        report
    }

    /// Point the `Icon` key of `desktop_file` (or its user override) at
    /// `icon`. Returns the path that was written.
    pub fn update_icon(&self, desktop_file: &Path, icon: &str) -> Result<PathBuf, AuditError> {
        let target = if self.policy == OverridePolicy::Always || !is_writable(desktop_file) {
            self.user_override(desktop_file)?
        } else {
            desktop_file.to_path_buf()
        };

        let mut file = DesktopFile::read(&target).map_err(|source| AuditError::Parse {
            path: target.clone(),
            source,
        })?;

        if !file.has_group(DESKTOP_ENTRY_GROUP) {
            return Err(AuditError::MissingDesktopEntry(target));
        }

        let backup = backup_path(&target);
        if !backup.exists() {
            fs::copy(&target, &backup).map_err(|e| AuditError::io(&backup, e))?;
            debug!("Created backup: {}", backup.display());
        }

        file.set(DESKTOP_ENTRY_GROUP, "Icon", icon);
        file.write(&target).map_err(|e| AuditError::io(&target, e))?;
        debug!("Updated icon in {} to '{}'", target.display(), icon);

        Ok(target)
    }

    /// Copy of `desktop_file` in the user applications directory. An
    /// existing copy is reused as is.
    fn user_override(&self, desktop_file: &Path) -> Result<PathBuf, AuditError> {
        let user_dir = &self.layout.user_applications_dir;
        let name = desktop_file
            .file_name()
            .ok_or_else(|| AuditError::NoFileName(desktop_file.to_path_buf()))?;
        let override_file = user_dir.join(name);

        if override_file == desktop_file || override_file.exists() {
            return Ok(override_file);
        }

        fs::create_dir_all(user_dir).map_err(|e| AuditError::io(user_dir, e))?;
        fs::copy(desktop_file, &override_file).map_err(|e| AuditError::io(&override_file, e))?;
        make_owner_writable(&override_file)?;
        debug!("Created user override: {}", override_file.display());

        Ok(override_file)
    }
}

/// `<file>.backup` next to `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".backup");
    PathBuf::from(name)
}

fn is_writable(path: &Path) -> bool {
    fs::OpenOptions::new().append(true).open(path).is_ok()
}

#[cfg(unix)]
fn make_owner_writable(path: &Path) -> Result<(), AuditError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| AuditError::io(path, e))?
        .permissions();
    perms.set_mode(perms.mode() | 0o200);
    fs::set_permissions(path, perms).map_err(|e| AuditError::io(path, e))
}

#[cfg(not(unix))]
fn make_owner_writable(_path: &Path) -> Result<(), AuditError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop_entry::AppDescriptor;

    const ENTRY: &str = "[Desktop Entry]\nType=Application\nName=Tool\nIcon=tool-old\n\
                         Exec=tool %F\n\n[Desktop Action window]\nName=New Window\nExec=tool -n\n";

    struct Fixture {
        _root: tempfile::TempDir,
        system: PathBuf,
        layout: SystemLayout,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let system = root.path().join("usr/share/applications");
        fs::create_dir_all(&system).unwrap();
        let layout = SystemLayout {
            theme_candidates: Vec::new(),
            application_dirs: vec![system.clone()],
            user_applications_dir: root.path().join("home/.local/share/applications"),
            icon_base_dirs: Vec::new(),
        };
        Fixture {
            _root: root,
            system,
            layout,
        }
    }

    fn entry(path: &Path, icon: &str, suggestions: &[&str]) -> UnmatchedApp {
        UnmatchedApp {
            app: AppDescriptor {
                name: path.file_stem().unwrap().to_string_lossy().into_owned(),
                icon: icon.to_string(),
                exec: String::new(),
                categories: String::new(),
                comment: String::new(),
                file_path: path.to_path_buf(),
                origin: PackageOrigin::Apt,
            },
            resolved_path: None,
            current_theme: "unknown".to_string(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }

    struct Scripted {
        accept: bool,
        choices: Vec<Choice>,
        asked: usize,
    }

    impl FixPrompt for Scripted {
        fn confirm_batch(&mut self, _count: usize) -> bool {
            self.accept
        }

        fn choose(&mut self, _entry: &UnmatchedApp) -> Choice {
            let choice = self.choices[self.asked];
            self.asked += 1;
            choice
        }
    }

    #[test]
    fn rewrites_icon_in_place_and_keeps_other_lines() {
        let fx = fixture();
        let path = fx.system.join("tool.desktop");
        fs::write(&path, ENTRY).unwrap();

        let applier = FixApplier::new(&fx.layout, OverridePolicy::WhenReadOnly);
        let report = applier.apply(&[entry(&path, "tool-old", &["tool-new", "other"])], FixMode::Auto);

        assert_eq!(report.fixed(), 1);
        assert_eq!(report.records[0].target, path);
        assert_eq!(report.records[0].origin, PackageOrigin::Apt);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            ENTRY.replace("Icon=tool-old", "Icon=tool-new")
        );
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), ENTRY);
    }

    #[test]
    fn second_fix_keeps_first_backup() {
        let fx = fixture();
        let path = fx.system.join("tool.desktop");
        fs::write(&path, ENTRY).unwrap();
        let applier = FixApplier::new(&fx.layout, OverridePolicy::WhenReadOnly);

        applier.update_icon(&path, "first").unwrap();
        applier.update_icon(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), ENTRY);
        let backups = fs::read_dir(&fx.system)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".backup"))
            .count();
        assert_eq!(backups, 1);
        assert!(fs::read_to_string(&path).unwrap().contains("Icon=second\n"));
    }

    #[test]
    fn override_policy_leaves_original_untouched() {
        let fx = fixture();
        let path = fx.system.join("tool.desktop");
        fs::write(&path, ENTRY).unwrap();

        let applier = FixApplier::new(&fx.layout, OverridePolicy::Always);
        let report = applier.apply(&[entry(&path, "tool-old", &["tool-new"])], FixMode::Auto);

        let override_file = fx.layout.user_applications_dir.join("tool.desktop");
        assert_eq!(report.records[0].target, override_file);
        assert_eq!(report.records[0].origin, PackageOrigin::User);
        assert_eq!(fs::read_to_string(&path).unwrap(), ENTRY);
        assert!(!backup_path(&path).exists());
        assert!(
            fs::read_to_string(&override_file)
                .unwrap()
                .contains("Icon=tool-new\n")
        );
        assert_eq!(fs::read_to_string(backup_path(&override_file)).unwrap(), ENTRY);

        // A second run edits the existing override instead of recopying.
        applier.update_icon(&path, "tool-newer").unwrap();
        assert!(
            fs::read_to_string(&override_file)
                .unwrap()
                .contains("Icon=tool-newer\n")
        );
        assert_eq!(fs::read_to_string(backup_path(&override_file)).unwrap(), ENTRY);
    }

    #[test]
    fn missing_icon_key_is_inserted() {
        let fx = fixture();
        let path = fx.system.join("bare.desktop");
        fs::write(&path, "[Desktop Entry]\nType=Application\nName=Bare\n").unwrap();

        FixApplier::new(&fx.layout, OverridePolicy::WhenReadOnly)
            .update_icon(&path, "generic")
            .unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[Desktop Entry]\nType=Application\nName=Bare\nIcon=generic\n"
        );
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let fx = fixture();
        let good = fx.system.join("good.desktop");
        let no_group = fx.system.join("nogroup.desktop");
        fs::write(&good, ENTRY).unwrap();
        fs::write(&no_group, "[Other]\nIcon=x\n").unwrap();
        let missing = fx.system.join("missing.desktop");

        let report = FixApplier::new(&fx.layout, OverridePolicy::WhenReadOnly).apply(
            &[
                entry(&missing, "a", &["b"]),
                entry(&no_group, "x", &["y"]),
                entry(&good, "tool-old", &["tool-new"]),
            ],
            FixMode::Auto,
        );

        assert_eq!(report.records.len(), 3);
        assert!(matches!(report.records[0].outcome, FixOutcome::Failed(_)));
        assert!(matches!(report.records[1].outcome, FixOutcome::Failed(_)));
        assert_eq!(report.records[2].outcome, FixOutcome::Fixed);
        assert_eq!(report.fixed(), 1);
        assert_eq!(report.failed(), 2);
        assert!(matches!(
            &report.records[1].outcome,
            FixOutcome::Failed(reason) if reason.contains("Desktop Entry")
        ));
        assert!(!backup_path(&no_group).exists());
        assert!(!backup_path(&missing).exists());
        assert!(backup_path(&good).exists());
    }

    #[test]
    fn entries_without_real_alternative_are_not_written() {
        let fx = fixture();
        let none = fx.system.join("none.desktop");
        let same = fx.system.join("same.desktop");
        fs::write(&none, ENTRY).unwrap();
        fs::write(&same, ENTRY).unwrap();

        let report = FixApplier::new(&fx.layout, OverridePolicy::WhenReadOnly).apply(
            &[entry(&none, "tool-old", &[]), entry(&same, "tool-old", &["tool-old"])],
            FixMode::Auto,
        );

        assert!(report.records.is_empty());
        assert_eq!(report.no_alternative, vec!["none"]);
        assert_eq!(report.unchanged, vec!["same"]);
        assert!(!backup_path(&none).exists());
        assert!(!backup_path(&same).exists());
    }

    #[test]
    fn interactive_choices_pick_skip_or_cancel() {
        let fx = fixture();
        let first = fx.system.join("first.desktop");
        let second = fx.system.join("second.desktop");
        fs::write(&first, ENTRY).unwrap();
        fs::write(&second, ENTRY).unwrap();
        let entries = [
            entry(&first, "tool-old", &["a", "b"]),
            entry(&second, "tool-old", &["c"]),
        ];
        let applier = FixApplier::new(&fx.layout, OverridePolicy::WhenReadOnly);

        let mut declined = Scripted {
            accept: false,
            choices: Vec::new(),
            asked: 0,
        };
        let report = applier.apply(&entries, FixMode::Interactive(&mut declined));
        assert!(report.cancelled);
        assert_eq!(fs::read_to_string(&first).unwrap(), ENTRY);

        let mut prompt = Scripted {
            accept: true,
            choices: vec![Choice::Apply(1), Choice::Skip],
            asked: 0,
        };
        let report = applier.apply(&entries, FixMode::Interactive(&mut prompt));
        assert_eq!(report.fixed(), 1);
        assert_eq!(report.records[0].icon, "b");
        assert_eq!(report.skipped, vec!["second"]);
        assert_eq!(fs::read_to_string(&second).unwrap(), ENTRY);
    }
}
