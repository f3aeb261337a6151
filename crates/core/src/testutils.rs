use crate::mapping::MappingSet;
use crate::types::{Asset, Category, DiscoveredAsset};

/// Discovery records for bare filenames.
pub fn discovered(names: &[&str]) -> Vec<DiscoveredAsset> {
    names.iter().map(|n| DiscoveredAsset::new(*n)).collect()
}

/// A persisted mapping from (filename, slide, category) triples.
pub fn persisted(entries: &[(&str, u32, &str)]) -> MappingSet {
    MappingSet::new(
        entries
            .iter()
            .map(|(name, slide, category)| Asset::new(*name, *slide, Category::new(*category)))
            .collect(),
    )
    .unwrap()
}
