use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::MappingError;
use crate::types::{Asset, Theme};

/// Validated, slide-ordered collection of assets.
///
/// Filenames and slide numbers are unique within each theme; untagged assets
/// form their own group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MappingSet {
    assets: Vec<Asset>,
}

impl MappingSet {
    pub fn new(assets: Vec<Asset>) -> Result<Self, MappingError> {
        validate(&assets)?;

        let mut assets = assets;
        assets.sort_by(|a, b| {
            a.slide_number
                .cmp(&b.slide_number)
                .then_with(|| a.theme.cmp(&b.theme))
        });

        Ok(Self { assets })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn into_assets(self) -> Vec<Asset> {
        self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn max_slide(&self) -> Option<u32> {
        self.assets.iter().map(|a| a.slide_number).max()
    }

    pub fn find_by_filename(&self, filename: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.filename == filename)
    }

    /// Returns new MappingSet holding only assets tagged with `theme`.
    pub fn filter_theme(&self, theme: &Theme) -> Self {
        Self {
            assets: self
                .assets
                .iter()
                .filter(|a| a.theme.as_ref() == Some(theme))
                .cloned()
                .collect(),
        }
    }

    pub fn count_by_category(&self) -> BTreeMap<String, usize> {
        self.assets.iter().fold(BTreeMap::new(), |mut acc, asset| {
            *acc.entry(asset.category.to_string()).or_default() += 1;
            acc
        })
    }

    pub fn themes(&self) -> Vec<&Theme> {
        let mut themes: Vec<&Theme> = self.assets.iter().filter_map(|a| a.theme.as_ref()).collect();
        themes.sort();
        themes.dedup();
        themes
    }
}

impl<'de> Deserialize<'de> for MappingSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let assets = Vec::<Asset>::deserialize(deserializer)?;
        Self::new(assets).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

fn validate(assets: &[Asset]) -> Result<(), MappingError> {
    let mut filenames: HashMap<(Option<&Theme>, &str), &Asset> = HashMap::new();
    let mut slides: HashMap<(Option<&Theme>, u32), &Asset> = HashMap::new();

    for asset in assets {
        let theme = asset.theme.as_ref();

        if filenames
            .insert((theme, asset.filename.as_str()), asset)
            .is_some()
        {
            return Err(MappingError::DuplicateFilename {
                filename: asset.filename.clone(),
                theme: theme.map(Theme::to_string),
            });
        }

        if let Some(first) = slides.insert((theme, asset.slide_number), asset) {
            return Err(MappingError::DuplicateSlide {
                slide: asset.slide_number,
                first: first.filename.clone(),
                second: asset.filename.clone(),
                theme: theme.map(Theme::to_string),
            });
        }
    }

    Ok(())
}
