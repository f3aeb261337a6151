use anyhow::Context;
use infomap_core::{
    default_rules, CategoryPolicy, CategoryRule, KeyNormalizer, ReconcileOptions, Reconciler,
    Retention, RuleBasedClassifier, DEFAULT_THEME_SUFFIX,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::{Layout, ScanOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assets_dir: PathBuf,
    /// Defaults to `mapping.json` inside `assets_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_path: Option<PathBuf>,
    pub layout: Layout,
    pub extensions: Vec<String>,
    /// Regex matched against the file stem.
    pub theme_suffix: String,
    pub canonical_extension: Option<String>,
    /// Flat layout only: discover just the files carrying the theme suffix.
    pub primary_theme_only: bool,
    pub category_policy: CategoryPolicy,
    pub retention: Retention,
    pub rules: Vec<CategoryRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Config {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            mapping_path: None,
            layout: Layout::Flat,
            extensions: default_extensions(),
            theme_suffix: DEFAULT_THEME_SUFFIX.to_string(),
            canonical_extension: None,
            primary_theme_only: true,
            category_policy: CategoryPolicy::Preserve,
            retention: Retention::Replace,
            rules: default_rules(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(Into::into)
        } else {
            serde_json::from_str(&content).map_err(Into::into)
        }
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content).map_err(Into::into)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.mapping_path
            .clone()
            .unwrap_or_else(|| self.assets_dir.join("mapping.json"))
    }

    pub fn key_normalizer(&self) -> anyhow::Result<KeyNormalizer> {
        KeyNormalizer::new(&self.theme_suffix, self.canonical_extension.as_deref())
            .with_context(|| format!("invalid theme suffix pattern `{}`", self.theme_suffix))
    }

    pub fn classifier(&self) -> RuleBasedClassifier {
        RuleBasedClassifier::new(self.rules.clone())
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            category_policy: self.category_policy,
            retention: self.retention,
        }
    }

    pub fn reconciler(&self) -> anyhow::Result<Reconciler> {
        Ok(Reconciler::new(self.reconcile_options())
            .with_keys(self.key_normalizer()?)
            .with_classifier(self.classifier()))
    }

    pub fn scan_options(&self) -> anyhow::Result<ScanOptions> {
        Ok(ScanOptions {
            layout: self.layout,
            extensions: self.extensions.clone(),
            theme_only: (self.primary_theme_only && self.layout == Layout::Flat)
                .then(|| self.key_normalizer())
                .transpose()?,
            include_hidden: false,
        })
    }
}

fn default_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "svg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
