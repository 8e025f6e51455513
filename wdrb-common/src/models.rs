//! Wardrobe data model
//!
//! Types shared between the ingestion coordinator, the catalog refresher and
//! the command-line front end. Items are owned by the backend; the client only
//! ever holds projections of them.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Wardrobe category label
///
/// Serialized as the display label (e.g. `"Upper Wear"`), which is also what
/// the backend services expect on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Spectacles,
    UpperWear,
    LowerWear,
    Accessory,
    Socks,
    Shoes,
    Uncategorized,
}

impl Category {
    /// All categories in wardrobe display order
    pub const ALL: [Category; 7] = [
        Category::Spectacles,
        Category::UpperWear,
        Category::LowerWear,
        Category::Accessory,
        Category::Socks,
        Category::Shoes,
        Category::Uncategorized,
    ];

    /// Display label, as sent to and received from the backend
    pub fn label(&self) -> &'static str {
        match self {
            Category::Spectacles => "Spectacles",
            Category::UpperWear => "Upper Wear",
            Category::LowerWear => "Lower Wear",
            Category::Accessory => "Accessory",
            Category::Socks => "Socks",
            Category::Shoes => "Shoes",
            Category::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Accepts the display label in any case, its kebab/snake form
    /// (`upper-wear`, `upper_wear`) and the old "Watch or Bracelet" card name.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c.to_ascii_lowercase() })
            .collect();

        if normalized == "watch or bracelet" {
            return Ok(Category::Accessory);
        }

        Category::ALL
            .into_iter()
            .find(|c| c.label().to_ascii_lowercase() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown category: {:?}", s)))
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

/// Category filter applied to catalog queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Whether an item of `category` is visible under this filter
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }

    /// Category label for the query string, `None` for `All`
    pub fn as_label(&self) -> Option<&'static str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(c) => Some(c.label()),
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(c) => write!(f, "{}", c),
        }
    }
}

/// Opaque user identifier supplied by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for empty or whitespace-only ids
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage key issued together with an upload URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(pub String);

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Time-limited write authorization returned by the upload-URL service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrant {
    /// Pre-signed URL accepting a single direct upload
    pub upload_url: String,
    /// Key the object will be stored under
    pub key: StorageKey,
}

/// Wardrobe item as indexed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    /// Backend-assigned identifier
    pub id: String,
    /// Owning user (not every catalog response echoes it)
    #[serde(default)]
    pub user_id: Option<String>,
    /// Unknown labels from the backend fall back to `Uncategorized`
    #[serde(default = "uncategorized", deserialize_with = "lenient_category")]
    pub category: Category,
    /// Image URL resolvable by the viewer
    pub image_url: String,
    /// Original file name, display only
    #[serde(default)]
    pub file_name: Option<String>,
}

fn uncategorized() -> Category {
    Category::Uncategorized
}

fn lenient_category<'de, D>(deserializer: D) -> std::result::Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label
        .and_then(|l| l.parse().ok())
        .unwrap_or(Category::Uncategorized))
}

/// Client-local projection of the catalog under one filter
///
/// Rebuilt from every catalog query; never the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogView {
    filter: CategoryFilter,
    items: Vec<WardrobeItem>,
}

impl CatalogView {
    /// Build a view from items in arrival order
    ///
    /// Duplicate ids keep their first occurrence; items outside the filter
    /// are dropped.
    pub fn from_items(filter: CategoryFilter, items: Vec<WardrobeItem>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| filter.matches(item.category))
            .filter(|item| seen.insert(item.id.clone()))
            .collect();

        Self { filter, items }
    }

    pub fn empty(filter: CategoryFilter) -> Self {
        Self {
            filter,
            items: Vec::new(),
        }
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn items(&self) -> &[WardrobeItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Items present in this view but not in `baseline`
    pub fn new_since<'a>(&'a self, baseline: &CatalogView) -> Vec<&'a WardrobeItem> {
        self.items
            .iter()
            .filter(|item| !baseline.contains_id(&item.id))
            .collect()
    }
}
