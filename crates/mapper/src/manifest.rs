use anyhow::Context;
use infomap_core::{
    fingerprint, hash_content, render, title_from_filename, Asset, Category, Classifier,
    MappingSet, Theme,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistedStatus {
    Loaded(usize),
    Missing,
    /// Unreadable or invalid; the run starts from an empty baseline.
    Malformed(String),
}

#[derive(Debug, Clone)]
pub struct PersistedLoad {
    pub mapping: MappingSet,
    pub status: PersistedStatus,
}

#[derive(Debug, Deserialize)]
struct MappingRecord {
    filename: String,
    #[serde(default)]
    title: Option<String>,
    slide_number: u32,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    theme: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MappingFile {
    Records(Vec<MappingRecord>),
    /// Older files were a plain `{"filename": slide}` object.
    Legacy(BTreeMap<String, u32>),
}

impl MappingFile {
    fn into_records(self) -> Vec<MappingRecord> {
        match self {
            Self::Records(records) => records,
            Self::Legacy(map) => map
                .into_iter()
                .map(|(filename, slide_number)| MappingRecord {
                    filename,
                    title: None,
                    slide_number,
                    category: None,
                    theme: None,
                })
                .collect(),
        }
    }
}

impl MappingRecord {
    fn into_asset(self, classifier: &dyn Classifier) -> Asset {
        let category = self
            .category
            .map(Category::from)
            .filter(|c| !c.is_blank())
            .unwrap_or_else(|| classifier.classify(&self.filename));

        Asset {
            title: self
                .title
                .unwrap_or_else(|| title_from_filename(&self.filename)),
            filename: self.filename,
            slide_number: self.slide_number,
            category,
            theme: self.theme.filter(|t| !t.trim().is_empty()).map(Theme::from),
        }
    }
}

/// Parses mapping JSON, completing records that lack a title or category.
pub fn parse_mapping(content: &str, classifier: &dyn Classifier) -> anyhow::Result<MappingSet> {
    let file: MappingFile = serde_json::from_str(content)?;
    let assets = file
        .into_records()
        .into_iter()
        .map(|r| r.into_asset(classifier))
        .collect();
    MappingSet::new(assets).map_err(Into::into)
}

/// Loads the previous mapping. Never fails: a missing file is an empty
/// baseline and a malformed one is an empty baseline plus a warning.
pub fn load_persisted(path: &Path, classifier: &dyn Classifier) -> PersistedLoad {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no previous mapping");
            return PersistedLoad {
                mapping: MappingSet::empty(),
                status: PersistedStatus::Missing,
            };
        }
        Err(e) => return malformed(path, e.to_string()),
    };

    match parse_mapping(&content, classifier) {
        Ok(mapping) => {
            tracing::info!(path = %path.display(), entries = mapping.len(), "loaded previous mapping");
            PersistedLoad {
                status: PersistedStatus::Loaded(mapping.len()),
                mapping,
            }
        }
        Err(e) => malformed(path, e.to_string()),
    }
}

fn malformed(path: &Path, reason: String) -> PersistedLoad {
    tracing::warn!(path = %path.display(), %reason, "ignoring unreadable mapping, starting fresh");
    PersistedLoad {
        mapping: MappingSet::empty(),
        status: PersistedStatus::Malformed(reason),
    }
}

/// Writes through a sibling temp file so a failed write leaves the old mapping intact.
pub fn save_mapping(path: &Path, mapping: &MappingSet) -> anyhow::Result<()> {
    let content = render(mapping)?;
    let tmp = temp_path(path);

    std::fs::write(&tmp, content).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))
}

/// True when the file on disk already holds exactly this mapping.
pub fn is_current(path: &Path, mapping: &MappingSet) -> anyhow::Result<bool> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(hash_content(&bytes) == fingerprint(mapping)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("mapping.json");
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infomap_core::RuleBasedClassifier;
    use std::fs;
    use tempfile::TempDir;

    fn classifier() -> RuleBasedClassifier {
        RuleBasedClassifier::default()
    }

    #[test]
    fn missing_file_is_empty_baseline() {
        let dir = TempDir::new().unwrap();
        let load = load_persisted(&dir.path().join("mapping.json"), &classifier());

        assert_eq!(load.status, PersistedStatus::Missing);
        assert!(load.mapping.is_empty());
    }

    #[test]
    fn malformed_file_is_empty_baseline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        fs::write(&path, "{ not json").unwrap();

        let load = load_persisted(&path, &classifier());

        assert!(matches!(load.status, PersistedStatus::Malformed(_)));
        assert!(load.mapping.is_empty());
    }

    #[test]
    fn duplicate_slides_count_as_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        fs::write(
            &path,
            r#"[{"filename":"a.png","slide_number":1},{"filename":"b.png","slide_number":1}]"#,
        )
        .unwrap();

        let load = load_persisted(&path, &classifier());

        match load.status {
            PersistedStatus::Malformed(reason) => assert!(reason.contains("slide 1")),
            other => panic!("unexpected status {other:?}"),
        }
    }

    #[test]
    fn completes_legacy_records() {
        let set = parse_mapping(
            r#"[{"filename":"growth_timeline.png","slide_number":2,"category":""}]"#,
            &classifier(),
        )
        .unwrap();

        let asset = &set.assets()[0];
        assert_eq!(asset.title, "growth timeline");
        assert_eq!(asset.category, Category::Timeline);
    }

    #[test]
    fn reads_filename_to_slide_object() {
        let set = parse_mapping(r#"{"b.png": 5, "a.jpg": 2}"#, &classifier()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.assets()[0].filename, "a.jpg");
        assert_eq!(set.assets()[1].slide_number, 5);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        let set = MappingSet::new(vec![
            Asset::new("b.png", 4, Category::Process),
            Asset::new("a.png", 1, Category::new("Featured")),
        ])
        .unwrap();

        save_mapping(&path, &set).unwrap();
        let load = load_persisted(&path, &classifier());

        assert_eq!(load.status, PersistedStatus::Loaded(2));
        assert_eq!(load.mapping, set);
        assert!(!temp_path(&path).exists());
        assert!(is_current(&path, &set).unwrap());
    }

    #[test]
    fn is_current_detects_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        let set = MappingSet::new(vec![Asset::new("a.png", 1, Category::Business)]).unwrap();

        assert!(!is_current(&path, &set).unwrap());

        save_mapping(&path, &set).unwrap();
        let changed = MappingSet::new(vec![Asset::new("a.png", 2, Category::Business)]).unwrap();
        assert!(!is_current(&path, &changed).unwrap());
    }

    #[test]
    fn written_file_is_sorted_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        let set = MappingSet::new(vec![
            Asset::new("z.png", 9, Category::Business),
            Asset::new("y.png", 3, Category::Business),
        ])
        .unwrap();

        save_mapping(&path, &set).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(raw[0]["slide_number"], 3);
        assert_eq!(raw[1]["slide_number"], 9);
    }
}
