use serde::{Deserialize, Serialize};

use crate::types::Category;

/// Matches when the lowercased filename contains any of `keywords`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub category: Category,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            category,
        }
    }

    fn matches(&self, filename_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| filename_lower.contains(kw.as_str()))
    }
}

/// Built-in rules, highest priority first.
pub fn default_rules() -> Vec<CategoryRule> {
    let table: &[(Category, &[&str])] = &[
        // "timelnie" is a historical misspelling still present in asset names
        (Category::Timeline, &["timeline", "timelnie"]),
        (Category::Percentage, &["percentage", "disk", "pineapple"]),
        (Category::Process, &["process", "steps", "arrow"]),
        (Category::Network, &["network", "bubbles"]),
        (
            Category::Business,
            &[
                "platform", "market", "product", "circle", "ring", "3d", "box", "mountain",
            ],
        ),
    ];

    table
        .iter()
        .map(|(category, keywords)| CategoryRule::new(category.clone(), keywords))
        .collect()
}

pub const FALLBACK_CATEGORY: Category = Category::Business;

pub trait Classifier {
    fn classify(&self, filename: &str) -> Category;
}

pub struct RuleBasedClassifier {
    rules: Vec<CategoryRule>,
}

impl RuleBasedClassifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier for RuleBasedClassifier {
    fn classify(&self, filename: &str) -> Category {
        let lower = filename.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map(|rule| rule.category.clone())
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

pub fn classify(filename: &str) -> Category {
    RuleBasedClassifier::default().classify(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_rule_matches_its_keywords() {
        assert_eq!(classify("growth_timeline.svg"), Category::Timeline);
        assert_eq!(classify("roadmap_timelnie_bcore.PNG"), Category::Timeline);
        assert_eq!(classify("pineapple_chart.png"), Category::Percentage);
        assert_eq!(classify("disk_fill.png"), Category::Percentage);
        assert_eq!(classify("five_steps.png"), Category::Process);
        assert_eq!(classify("curved_arrow.png"), Category::Process);
        assert_eq!(classify("team_bubbles.png"), Category::Network);
        assert_eq!(classify("market_share.png"), Category::Business);
        assert_eq!(classify("3d_pyramid.png"), Category::Business);
    }

    #[test]
    fn unmatched_falls_back_to_business() {
        assert_eq!(classify("random_shape.png"), Category::Business);
        assert_eq!(classify(""), Category::Business);
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(classify("TIMELINE_x"), classify("timeline_x"));
        assert_eq!(classify("Network_Map.PNG"), Category::Network);
    }

    #[test]
    fn earlier_rule_wins() {
        assert_eq!(classify("timeline_process.svg"), Category::Timeline);
        assert_eq!(classify("process_network.svg"), Category::Process);
        assert_eq!(classify("percentage_ring.svg"), Category::Percentage);
    }

    #[test]
    fn always_returns_a_builtin_label() {
        let labels = [
            Category::Timeline,
            Category::Percentage,
            Category::Process,
            Category::Network,
            Category::Business,
        ];
        for name in ["", "x", "ÄÖÜ.png", "timeline", "..", "a b c"] {
            assert!(labels.contains(&classify(name)), "{name}");
        }
    }

    #[test]
    fn custom_rules_are_ordered() {
        let classifier = RuleBasedClassifier::new(vec![
            CategoryRule::new(Category::new("Maps"), &["MAP"]),
            CategoryRule::new(Category::Network, &["network"]),
        ]);

        assert_eq!(
            classifier.classify("network_map.png"),
            Category::new("Maps")
        );
        assert_eq!(classifier.classify("network.png"), Category::Network);
        assert_eq!(classifier.classify("other.png"), Category::Business);
    }
}
