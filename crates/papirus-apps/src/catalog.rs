//! Enumeration of installed application descriptors.

use crate::desktop_entry::{AppDescriptor, parse_desktop_file};
use crate::paths::SystemLayout;
use log::{debug, info};
use std::path::Path;

/// Reads every visible application from the layout's application
/// directories.
pub struct DescriptorStore<'a> {
    layout: &'a SystemLayout,
}

impl<'a> DescriptorStore<'a> {
    pub fn new(layout: &'a SystemLayout) -> Self {
        Self { layout }
    }

    /// All descriptors, directory by directory in layout order, files sorted
    /// by name. Unparsable files are skipped.
    pub fn enumerate(&self) -> Vec<AppDescriptor> {
        let mut apps = Vec::new();

        for dir in &self.layout.application_dirs {
            if !dir.is_dir() {
                continue;
            }
            info!("Checking {}...", dir.display());
            self.scan_dir(dir, &mut apps);
        }

        apps
    }

    fn scan_dir(&self, dir: &Path, apps: &mut Vec<AppDescriptor>) {
        let walker = walkdir::WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("desktop") {
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let origin = self.layout.classify_origin(path);
            match parse_desktop_file(path, origin) {
                Ok(Some(app)) => apps.push(app),
                Ok(None) => debug!("Skipping {}: not a visible application", path.display()),
                Err(e) => debug!("Error parsing {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop_entry::PackageOrigin;
    use std::fs;
    use std::path::PathBuf;

    fn layout(dirs: Vec<PathBuf>, user: PathBuf) -> SystemLayout {
        SystemLayout {
            theme_candidates: Vec::new(),
            application_dirs: dirs,
            user_applications_dir: user,
            icon_base_dirs: Vec::new(),
        }
    }

    #[test]
    fn enumerates_in_directory_then_name_order() {
        let root = tempfile::tempdir().unwrap();
        let system = root.path().join("usr/share/applications");
        let user = root.path().join("home/.local/share/applications");
        fs::create_dir_all(&system).unwrap();
        fs::create_dir_all(&user).unwrap();

        fs::write(system.join("b.desktop"), "[Desktop Entry]\nType=Application\nName=B\n").unwrap();
        fs::write(system.join("a.desktop"), "[Desktop Entry]\nType=Application\nName=A\n").unwrap();
        fs::write(system.join("notes.txt"), "[Desktop Entry]\nType=Application\n").unwrap();
        fs::write(user.join("c.desktop"), "[Desktop Entry]\nType=Application\nName=C\n").unwrap();

        let layout = layout(
            vec![root.path().join("missing"), system, user.clone()],
            user,
        );
        let apps = DescriptorStore::new(&layout).enumerate();

        let names: Vec<_> = apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(apps[0].origin, PackageOrigin::Apt);
        assert_eq!(apps[2].origin, PackageOrigin::User);
    }

    #[test]
    fn skips_hidden_invalid_and_nested_files() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("applications");
        fs::create_dir_all(dir.join("nested")).unwrap();

        fs::write(dir.join("hidden.desktop"), "[Desktop Entry]\nType=Application\nNoDisplay=true\n").unwrap();
        fs::write(dir.join("broken.desktop"), "this is not a desktop file\n").unwrap();
        fs::write(dir.join("binary.desktop"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.join("dir.desktop"), "[Desktop Entry]\nType=Directory\n").unwrap();
        fs::write(
            dir.join("nested/deep.desktop"),
            "[Desktop Entry]\nType=Application\nName=Deep\n",
        )
        .unwrap();
        fs::write(dir.join("ok.desktop"), "[Desktop Entry]\nType=Application\nName=Ok\n").unwrap();

        let layout = layout(vec![dir], root.path().join("user"));
        let apps = DescriptorStore::new(&layout).enumerate();

        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "Ok");
    }
}
