//! State shared by every component during one scan invocation.

use crate::alternatives::AlternativeFinder;
use crate::catalog::DescriptorStore;
use crate::config::AuditConfig;
use crate::fix::FixApplier;
use crate::icons::{IconLookup, IconResolver};
use crate::paths::SystemLayout;
use crate::scan::{ScanCoordinator, ScanResult};
use crate::theme::{self, ThemeFamily, ThemeInstallation};
use std::path::Path;

/// One scan run: located installations, the lookup capability and the
/// filesystem layout. Components borrow from it; nothing outlives it.
pub struct ScanSession {
    config: AuditConfig,
    layout: SystemLayout,
    family: ThemeFamily,
    installations: Vec<ThemeInstallation>,
    resolver: IconResolver,
}

impl ScanSession {
    /// Locate the family's installations and wrap `lookup` in a resolver.
    pub fn new(
        config: AuditConfig,
        layout: SystemLayout,
        family: ThemeFamily,
        lookup: Box<dyn IconLookup>,
    ) -> Self {
        let installations = theme::locate(&layout.theme_candidates);
        let resolver = IconResolver::new(lookup, config.lookup_size);

        Self {
            config,
            layout,
            family,
            installations,
            resolver,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn layout(&self) -> &SystemLayout {
        &self.layout
    }

    pub fn family(&self) -> &ThemeFamily {
        &self.family
    }

    pub fn installations(&self) -> &[ThemeInstallation] {
        &self.installations
    }

    pub fn resolver(&self) -> &IconResolver {
        &self.resolver
    }

    /// True when `path` belongs to a located installation or carries one of
    /// the family's directory markers.
    pub fn is_target_theme(&self, path: &Path) -> bool {
        self.family.owns(path, &self.installations)
    }

    pub fn descriptors(&self) -> DescriptorStore<'_> {
        DescriptorStore::new(&self.layout)
    }

    pub fn finder(&self) -> AlternativeFinder<'_> {
        AlternativeFinder::new(&self.installations)
    }

    pub fn scan(&self) -> ScanResult {
        ScanCoordinator::new(self).run()
    }

    pub fn fixer(&self) -> FixApplier<'_> {
        FixApplier::new(&self.layout, self.config.override_policy)
    }
}
