use infomap_core::{Category, DiscoveredAsset, KeyNormalizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Assets directly inside the directory.
    #[default]
    Flat,
    /// One subdirectory per category.
    Categorized,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub layout: Layout,
    pub extensions: Vec<String>,
    /// When set, only files whose stem carries the theme suffix are kept.
    pub theme_only: Option<KeyNormalizer>,
    pub include_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Flat,
            extensions: vec!["png".into(), "jpg".into(), "jpeg".into(), "svg".into()],
            theme_only: None,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAsset {
    pub path: PathBuf,
    pub category: Option<String>,
}

impl ScannedAsset {
    pub fn filename(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    pub fn to_discovered(&self) -> Option<DiscoveredAsset> {
        self.filename().map(|name| DiscoveredAsset {
            filename: name.to_string(),
            title: None,
            category_hint: self.category.as_deref().map(Category::from),
            slide_number: None,
        })
    }
}

/// Discovers assets under `path`, ordered by filename.
pub fn scan_assets(path: &Path, options: &ScanOptions) -> anyhow::Result<Vec<ScannedAsset>> {
    if !path.is_dir() {
        anyhow::bail!("asset directory not found: {}", path.display());
    }

    let depth = match options.layout {
        Layout::Flat => 1,
        Layout::Categorized => 2,
    };

    let is_candidate = |entry: &walkdir::DirEntry| -> bool {
        entry.file_type().is_file()
            && entry.depth() == depth
            && (options.include_hidden || !is_hidden(entry.path()))
            && has_extension(entry.path(), &options.extensions)
            && options
                .theme_only
                .as_ref()
                .map(|keys| {
                    entry
                        .file_name()
                        .to_str()
                        .map(|n| keys.has_theme_suffix(n))
                        .unwrap_or(false)
                })
                .unwrap_or(true)
    };

    let mut assets: Vec<ScannedAsset> = WalkDir::new(path)
        .max_depth(depth)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || options.include_hidden || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(is_candidate)
        .map(|entry| ScannedAsset {
            category: match options.layout {
                Layout::Flat => None,
                Layout::Categorized => parent_name(entry.path()),
            },
            path: entry.into_path(),
        })
        .collect();

    assets.sort_by(|a, b| a.filename().cmp(&b.filename()).then_with(|| a.path.cmp(&b.path)));
    Ok(assets)
}

pub fn to_discovered(assets: &[ScannedAsset]) -> Vec<DiscoveredAsset> {
    assets.iter().filter_map(ScannedAsset::to_discovered).collect()
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn parent_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(String::from)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
