use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::classifier::{Classifier, RuleBasedClassifier};
use crate::error::MappingError;
use crate::key::KeyNormalizer;
use crate::mapping::MappingSet;
use crate::types::{title_from_filename, Asset, Category, DiscoveredAsset};

/// What happens to a category that an earlier run already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    #[default]
    Preserve,
    Recompute,
}

/// What happens to persisted assets that discovery no longer finds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    #[default]
    Replace,
    Additive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub category_policy: CategoryPolicy,
    pub retention: Retention,
}

/// Supplies slide numbers for unmatched assets when automatic numbering is off.
pub trait SlideResolver {
    /// `None` aborts the run.
    fn resolve_missing_id(&mut self, filename: &str) -> Option<u32>;
}

impl<F> SlideResolver for F
where
    F: FnMut(&str) -> Option<u32>,
{
    fn resolve_missing_id(&mut self, filename: &str) -> Option<u32> {
        self(filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    /// Same stem, different extension or letter case.
    Stem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// (discovered base key, persisted filename, kind)
    pub matched: Vec<(String, String, MatchKind)>,
    pub assigned: Vec<(String, u32)>,
    pub pinned: Vec<(String, u32)>,
    pub retained: Vec<String>,
    pub retired: Vec<String>,
}

impl ReconcileReport {
    pub fn new_count(&self) -> usize {
        self.assigned.len() + self.pinned.len()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub mapping: MappingSet,
    pub report: ReconcileReport,
}

pub struct Reconciler {
    keys: KeyNormalizer,
    classifier: Box<dyn Classifier>,
    options: ReconcileOptions,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileOptions::default())
    }
}

struct Keyed<'a> {
    key: String,
    stem: String,
    asset: &'a DiscoveredAsset,
}

enum Slot {
    Matched(usize, MatchKind),
    Pinned(u32),
    New,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            keys: KeyNormalizer::default(),
            classifier: Box::new(RuleBasedClassifier::default()),
            options,
        }
    }

    pub fn with_keys(mut self, keys: KeyNormalizer) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn options(&self) -> ReconcileOptions {
        self.options
    }

    /// Numbers new assets consecutively after the highest slide in use.
    pub fn reconcile(
        &self,
        discovered: &[DiscoveredAsset],
        persisted: &MappingSet,
    ) -> Result<Reconciliation, MappingError> {
        self.run(discovered, persisted, None)
    }

    /// Asks `resolver` for the slide number of every new asset.
    pub fn reconcile_with_resolver(
        &self,
        discovered: &[DiscoveredAsset],
        persisted: &MappingSet,
        resolver: &mut dyn SlideResolver,
    ) -> Result<Reconciliation, MappingError> {
        self.run(discovered, persisted, Some(resolver))
    }

    fn run(
        &self,
        discovered: &[DiscoveredAsset],
        persisted: &MappingSet,
        mut resolver: Option<&mut dyn SlideResolver>,
    ) -> Result<Reconciliation, MappingError> {
        let keyed = self.key_discovered(discovered)?;
        let prior = persisted.assets();
        let (slots, claimed) = self.match_persisted(&keyed, prior);

        let mut report = ReconcileReport::default();
        let mut taken: HashMap<u32, String> = HashMap::new();
        let mut assets = Vec::with_capacity(keyed.len());

        for (entry, slot) in keyed.iter().zip(&slots) {
            if let Slot::Matched(idx, kind) = slot {
                let old = &prior[*idx];
                report
                    .matched
                    .push((entry.key.clone(), old.filename.clone(), *kind));
                taken.insert(old.slide_number, entry.key.clone());
                assets.push(self.build(entry, old.slide_number, Some(old)));
            }
        }

        // Theme variants of one asset share a base key; only the first is kept.
        let mut emitted: HashSet<String> = keyed
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| matches!(slot, Slot::Matched(..)))
            .map(|(entry, _)| entry.key.clone())
            .collect();

        for (old, _) in prior.iter().zip(&claimed).filter(|(_, c)| !**c) {
            if !emitted.insert(self.keys.base_key(&old.filename)) {
                continue;
            }
            match self.options.retention {
                Retention::Additive => {
                    claim_slide(&mut taken, old.slide_number, &old.filename)?;
                    report.retained.push(old.filename.clone());
                    assets.push(Asset {
                        theme: None,
                        ..old.clone()
                    });
                }
                Retention::Replace => report.retired.push(old.filename.clone()),
            }
        }

        for (entry, slot) in keyed.iter().zip(&slots) {
            if let Slot::Pinned(slide) = slot {
                claim_slide(&mut taken, *slide, &entry.key)?;
                report.pinned.push((entry.key.clone(), *slide));
                assets.push(self.build(entry, *slide, None));
            }
        }

        let pinned_max = report.pinned.iter().map(|(_, s)| *s).max();
        let mut next_id = persisted.max_slide().max(pinned_max).unwrap_or(0).checked_add(1);

        for (entry, slot) in keyed.iter().zip(&slots) {
            if !matches!(slot, Slot::New) {
                continue;
            }
            let slide = match resolver.as_deref_mut() {
                Some(resolver) => resolver
                    .resolve_missing_id(&entry.asset.filename)
                    .ok_or_else(|| MappingError::Unresolved(entry.asset.filename.clone()))?,
                None => {
                    let slide = next_id
                        .ok_or_else(|| MappingError::SlideOverflow(entry.asset.filename.clone()))?;
                    next_id = slide.checked_add(1);
                    slide
                }
            };
            claim_slide(&mut taken, slide, &entry.key)?;
            report.assigned.push((entry.key.clone(), slide));
            assets.push(self.build(entry, slide, None));
        }

        Ok(Reconciliation {
            mapping: MappingSet::new(assets)?,
            report,
        })
    }

    /// Normalizes and orders discovery; two assets on one key is an error.
    fn key_discovered<'a>(
        &self,
        discovered: &'a [DiscoveredAsset],
    ) -> Result<Vec<Keyed<'a>>, MappingError> {
        let mut keyed: Vec<Keyed> = discovered
            .iter()
            .map(|asset| Keyed {
                key: self.keys.base_key(&asset.filename),
                stem: self.keys.stem_key(&asset.filename),
                asset,
            })
            .collect();

        keyed.sort_by(|a, b| {
            a.key
                .cmp(&b.key)
                .then_with(|| a.asset.filename.cmp(&b.asset.filename))
        });

        if let Some(pair) = keyed.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(MappingError::DuplicateKey {
                key: pair[0].key.clone(),
                first: pair[0].asset.filename.clone(),
                second: pair[1].asset.filename.clone(),
            });
        }

        Ok(keyed)
    }

    /// Exact base-key matches are settled before any stem match, and each
    /// persisted entry is claimed at most once.
    fn match_persisted(&self, keyed: &[Keyed], prior: &[Asset]) -> (Vec<Slot>, Vec<bool>) {
        let exact = prior
            .iter()
            .enumerate()
            .fold(HashMap::<&str, usize>::new(), |mut acc, (i, a)| {
                acc.entry(a.filename.as_str()).or_insert(i);
                acc
            });
        let by_stem = prior
            .iter()
            .enumerate()
            .fold(HashMap::<String, Vec<usize>>::new(), |mut acc, (i, a)| {
                acc.entry(self.keys.stem_key(&a.filename)).or_default().push(i);
                acc
            });

        let mut claimed = vec![false; prior.len()];
        let mut slots: Vec<Option<Slot>> = Vec::with_capacity(keyed.len());
        for entry in keyed {
            let hit = exact
                .get(entry.key.as_str())
                .copied()
                .filter(|&i| !claimed[i]);
            if let Some(i) = hit {
                claimed[i] = true;
            }
            slots.push(hit.map(|i| Slot::Matched(i, MatchKind::Exact)));
        }

        for (entry, slot) in keyed.iter().zip(slots.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let candidate = by_stem
                .get(&entry.stem)
                .and_then(|ids| ids.iter().copied().find(|&i| !claimed[i]));

            *slot = Some(match (candidate, entry.asset.slide_number) {
                (Some(i), _) => {
                    claimed[i] = true;
                    Slot::Matched(i, MatchKind::Stem)
                }
                (None, Some(slide)) => Slot::Pinned(slide),
                (None, None) => Slot::New,
            });
        }

        let slots = slots.into_iter().map(|s| s.unwrap_or(Slot::New)).collect();
        (slots, claimed)
    }

    fn build(&self, entry: &Keyed, slide_number: u32, previous: Option<&Asset>) -> Asset {
        Asset {
            filename: entry.key.clone(),
            title: entry
                .asset
                .title
                .clone()
                .or_else(|| previous.map(|a| a.title.clone()))
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| title_from_filename(&entry.key)),
            slide_number,
            category: self.category_for(entry, previous),
            theme: None,
        }
    }

    fn category_for(&self, entry: &Keyed, previous: Option<&Asset>) -> Category {
        let kept = match self.options.category_policy {
            CategoryPolicy::Preserve => previous
                .map(|a| &a.category)
                .filter(|c| !c.is_blank())
                .cloned(),
            CategoryPolicy::Recompute => None,
        };

        kept.or_else(|| {
            entry
                .asset
                .category_hint
                .clone()
                .filter(|c| !c.is_blank())
        })
        .unwrap_or_else(|| self.classifier.classify(&entry.asset.filename))
    }
}

fn claim_slide(
    taken: &mut HashMap<u32, String>,
    slide: u32,
    filename: &str,
) -> Result<(), MappingError> {
    match taken.get(&slide) {
        Some(existing) => Err(MappingError::SlideCollision {
            slide,
            filename: filename.to_string(),
            existing: existing.clone(),
        }),
        None => {
            taken.insert(slide, filename.to_string());
            Ok(())
        }
    }
}

/// Reconciles with default options and automatic numbering.
pub fn reconcile(
    discovered: &[DiscoveredAsset],
    persisted: &MappingSet,
) -> Result<MappingSet, MappingError> {
    Reconciler::default()
        .reconcile(discovered, persisted)
        .map(|r| r.mapping)
}
