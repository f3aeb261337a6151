pub mod classifier;
pub mod error;
pub mod fingerprint;
pub mod key;
pub mod mapping;
pub mod reconcile;
#[cfg(test)]
mod testutils;
pub mod types;

pub use classifier::{classify, default_rules, CategoryRule, Classifier, RuleBasedClassifier};
pub use error::MappingError;
pub use fingerprint::{fingerprint, hash_content, render};
pub use key::{KeyNormalizer, DEFAULT_THEME_SUFFIX};
pub use mapping::MappingSet;
pub use reconcile::{
    reconcile, CategoryPolicy, MatchKind, ReconcileOptions, ReconcileReport, Reconciler,
    Reconciliation, Retention, SlideResolver,
};
pub use types::{title_from_filename, Asset, Category, DiscoveredAsset, Theme};
