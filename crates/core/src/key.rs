use regex::Regex;
use std::path::Path;

pub const DEFAULT_THEME_SUFFIX: &str = "(?i)_bcore$";

/// Collapses theme variants of one logical asset onto a single base key.
#[derive(Debug, Clone)]
pub struct KeyNormalizer {
    theme_suffix: Regex,
    canonical_extension: Option<String>,
}

impl KeyNormalizer {
    /// `theme_suffix` is matched against the file stem.
    pub fn new(theme_suffix: &str, canonical_extension: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            theme_suffix: Regex::new(theme_suffix)?,
            canonical_extension: canonical_extension
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty()),
        })
    }

    /// "chart_bcore.PNG" -> "chart.png"
    pub fn base_key(&self, filename: &str) -> String {
        let (stem, ext) = split_name(filename);
        let stem = self.theme_suffix.replace(stem, "");

        match self.canonical_extension.as_deref().or(ext) {
            Some(ext) => format!("{}.{}", stem, ext.to_lowercase()),
            None => stem.into_owned(),
        }
    }

    /// Lowercased base key without extension, for extension-insensitive lookups.
    pub fn stem_key(&self, filename: &str) -> String {
        let (stem, _) = split_name(filename);
        self.theme_suffix.replace(stem, "").to_lowercase()
    }

    pub fn has_theme_suffix(&self, filename: &str) -> bool {
        self.theme_suffix.is_match(split_name(filename).0)
    }
}

impl Default for KeyNormalizer {
    fn default() -> Self {
        Self {
            theme_suffix: Regex::new(DEFAULT_THEME_SUFFIX).expect("built-in pattern is valid"),
            canonical_extension: None,
        }
    }
}

fn split_name(filename: &str) -> (&str, Option<&str>) {
    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let ext = path.extension().and_then(|e| e.to_str());
    (stem, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_theme_suffix_and_lowercases_extension() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.base_key("chart_bcore.PNG"), "chart.png");
        assert_eq!(keys.base_key("chart_BCORE.png"), "chart.png");
        assert_eq!(keys.base_key("sales_circle.svg"), "sales_circle.svg");
        assert_eq!(keys.base_key("bcore_intro.png"), "bcore_intro.png");
    }

    #[test]
    fn canonical_extension_is_forced() {
        let keys = KeyNormalizer::new(DEFAULT_THEME_SUFFIX, Some(".PNG")).unwrap();
        assert_eq!(keys.base_key("chart_bcore.jpg"), "chart.png");
        assert_eq!(keys.base_key("chart"), "chart.png");
    }

    #[test]
    fn stem_key_ignores_extension_and_case() {
        let keys = KeyNormalizer::default();
        assert_eq!(keys.stem_key("Growth_Timeline_bcore.PNG"), "growth_timeline");
        assert_eq!(keys.stem_key("growth_timeline.svg"), "growth_timeline");
    }

    #[test]
    fn detects_theme_suffix() {
        let keys = KeyNormalizer::default();
        assert!(keys.has_theme_suffix("chart_bcore.PNG"));
        assert!(!keys.has_theme_suffix("chart.png"));
        assert!(!keys.has_theme_suffix("chart_bcore_old.png"));
    }

    #[test]
    fn custom_suffix_pattern() {
        let keys = KeyNormalizer::new("(?i)_(dark|light)$", None).unwrap();
        assert_eq!(keys.base_key("logo_dark.svg"), "logo.svg");
        assert_eq!(keys.base_key("logo_Light.svg"), "logo.svg");
    }

    #[test]
    fn rejects_invalid_pattern() {
        assert!(KeyNormalizer::new("(", None).is_err());
    }
}
