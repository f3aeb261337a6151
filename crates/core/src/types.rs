use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Timeline,
    Percentage,
    Process,
    Network,
    Business,
    /// Curated label that no classifier rule produces.
    Custom(String),
}

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        match label.as_str() {
            "Timeline" => Self::Timeline,
            "Percentage" => Self::Percentage,
            "Process" => Self::Process,
            "Network" => Self::Network,
            "Business" => Self::Business,
            _ => Self::Custom(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Timeline => "Timeline",
            Self::Percentage => "Percentage",
            Self::Process => "Process",
            Self::Network => "Network",
            Self::Business => "Business",
            Self::Custom(label) => label,
        }
    }

    /// An empty curated label counts as "no category".
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Custom(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Theme(String);

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Theme {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Theme> for String {
    fn from(t: Theme) -> Self {
        t.0
    }
}

/// One entry of a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub filename: String,
    pub title: String,
    pub slide_number: u32,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Asset {
    pub fn new(filename: impl Into<String>, slide_number: u32, category: Category) -> Self {
        let filename = filename.into();
        Self {
            title: title_from_filename(&filename),
            filename,
            slide_number,
            category,
            theme: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_theme(mut self, theme: impl Into<Theme>) -> Self {
        self.theme = Some(theme.into());
        self
    }
}

/// An asset found by discovery, before it has been given a slide number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredAsset {
    pub filename: String,
    pub title: Option<String>,
    pub category_hint: Option<Category>,
    pub slide_number: Option<u32>,
}

impl DiscoveredAsset {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category_hint = Some(category.into());
        self
    }

    pub fn with_slide_number(mut self, slide_number: u32) -> Self {
        self.slide_number = Some(slide_number);
        self
    }
}

/// "growth_timeline-v2.png" -> "growth timeline v2"
pub fn title_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .replace(['_', '-'], " ")
}
