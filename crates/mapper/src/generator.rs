use infomap_core::{ReconcileReport, Reconciliation, SlideResolver};

use crate::config::Config;
use crate::manifest::{is_current, load_persisted, save_mapping, PersistedStatus};
use crate::scanner::{scan_assets, to_discovered};

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Reconcile and report without touching the mapping file.
    pub dry_run: bool,
    /// Like `dry_run`, but the outcome says whether the file is stale.
    pub check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Written,
    Unchanged,
    DryRun,
    Stale,
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub reconciliation: Reconciliation,
    pub persisted: PersistedStatus,
    pub action: WriteAction,
}

impl GenerateOutcome {
    pub fn report(&self) -> &ReconcileReport {
        &self.reconciliation.report
    }
}

/// Discover assets, reconcile them against the mapping on disk, and write the result.
///
/// With a `resolver`, new assets are numbered by it instead of automatically.
pub fn generate(
    config: &Config,
    options: &GenerateOptions,
    resolver: Option<&mut dyn SlideResolver>,
) -> anyhow::Result<GenerateOutcome> {
    let scanned = scan_assets(&config.assets_dir, &config.scan_options()?)?;
    let discovered = to_discovered(&scanned);
    if discovered.is_empty() {
        anyhow::bail!(
            "no assets with extensions [{}] in {}",
            config.extensions.join(", "),
            config.assets_dir.display()
        );
    }
    tracing::info!(count = discovered.len(), dir = %config.assets_dir.display(), "discovered assets");

    let mapping_path = config.mapping_path();
    let persisted = load_persisted(&mapping_path, &config.classifier());
    let reconciler = config.reconciler()?;

    let reconciliation = match resolver {
        Some(resolver) => {
            reconciler.reconcile_with_resolver(&discovered, &persisted.mapping, resolver)?
        }
        None => reconciler.reconcile(&discovered, &persisted.mapping)?,
    };

    let action = if options.check {
        if is_current(&mapping_path, &reconciliation.mapping)? {
            WriteAction::Unchanged
        } else {
            WriteAction::Stale
        }
    } else if options.dry_run {
        WriteAction::DryRun
    } else if is_current(&mapping_path, &reconciliation.mapping)? {
        WriteAction::Unchanged
    } else {
        save_mapping(&mapping_path, &reconciliation.mapping)?;
        tracing::info!(path = %mapping_path.display(), "mapping written");
        WriteAction::Written
    };

    Ok(GenerateOutcome {
        reconciliation,
        persisted: persisted.status,
        action,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use infomap_core::{Category, Retention};
    use std::fs;
    use tempfile::TempDir;

    fn assets_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"img").unwrap();
        }
        dir
    }

    #[test]
    fn first_run_writes_then_settles() {
        let dir = assets_dir(&["b_steps_bcore.PNG", "a_timeline_bcore.PNG"]);
        let config = Config::new(dir.path());

        let first = generate(&config, &GenerateOptions::default(), None).unwrap();
        assert_eq!(first.action, WriteAction::Written);
        assert_eq!(first.persisted, PersistedStatus::Missing);

        let second = generate(&config, &GenerateOptions::default(), None).unwrap();
        assert_eq!(second.action, WriteAction::Unchanged);
        assert_eq!(second.persisted, PersistedStatus::Loaded(2));
        assert_eq!(first.reconciliation.mapping, second.reconciliation.mapping);
    }

    #[test]
    fn dry_run_leaves_disk_alone() {
        let dir = assets_dir(&["a_bcore.PNG"]);
        let config = Config::new(dir.path());
        let options = GenerateOptions {
            dry_run: true,
            ..Default::default()
        };

        let outcome = generate(&config, &options, None).unwrap();

        assert_eq!(outcome.action, WriteAction::DryRun);
        assert!(!config.mapping_path().exists());
    }

    #[test]
    fn check_reports_stale_mapping() {
        let dir = assets_dir(&["a_bcore.PNG"]);
        let config = Config::new(dir.path());
        let check = GenerateOptions {
            check: true,
            ..Default::default()
        };

        assert_eq!(generate(&config, &check, None).unwrap().action, WriteAction::Stale);
        generate(&config, &GenerateOptions::default(), None).unwrap();
        assert_eq!(generate(&config, &check, None).unwrap().action, WriteAction::Unchanged);

        fs::write(dir.path().join("b_bcore.PNG"), b"img").unwrap();
        assert_eq!(generate(&config, &check, None).unwrap().action, WriteAction::Stale);
    }

    #[test]
    fn additive_config_keeps_removed_assets() {
        let dir = assets_dir(&["a_ring_bcore.PNG", "b_ring_bcore.PNG"]);
        let mut config = Config::new(dir.path());
        generate(&config, &GenerateOptions::default(), None).unwrap();

        fs::remove_file(dir.path().join("a_ring_bcore.PNG")).unwrap();
        config.retention = Retention::Additive;
        let outcome = generate(&config, &GenerateOptions::default(), None).unwrap();

        let mapping = &outcome.reconciliation.mapping;
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.find_by_filename("a_ring.png").unwrap().slide_number, 1);
        assert_eq!(mapping.find_by_filename("b_ring.png").unwrap().category, Category::Business);
    }

    #[test]
    fn resolver_numbers_new_assets() {
        let dir = assets_dir(&["a_bcore.PNG", "b_bcore.PNG"]);
        let config = Config::new(dir.path());
        let mut next: u32 = 100;
        let mut resolver = |_: &str| -> Option<u32> {
            next += 10;
            Some(next)
        };

        let outcome = generate(&config, &GenerateOptions::default(), Some(&mut resolver)).unwrap();

        let slides: Vec<u32> = outcome
            .reconciliation
            .mapping
            .iter()
            .map(|a| a.slide_number)
            .collect();
        assert_eq!(slides, vec![110, 120]);
    }

    #[test]
    fn flat_discovery_skips_light_variants() {
        let dir = assets_dir(&["chart_bcore.PNG", "chart.png", "notes.png"]);
        let config = Config::new(dir.path());

        let outcome = generate(&config, &GenerateOptions::default(), None).unwrap();

        let names: Vec<&str> = outcome
            .reconciliation
            .mapping
            .iter()
            .map(|a| a.filename.as_str())
            .collect();
        assert_eq!(names, vec!["chart.png"]);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = assets_dir(&["readme.txt"]);
        let config = Config::new(dir.path());

        assert!(generate(&config, &GenerateOptions::default(), None).is_err());
    }
}
