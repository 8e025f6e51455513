//! Per-category wardrobe counts
//!
//! Backs the wardrobe overview ("3 Spectacles in Wardrobe"). Counts come from
//! a catalog view, so they lag uploads exactly as much as the view does.

use std::collections::BTreeMap;
use std::fmt;
use wdrb_common::models::CatalogView;
use wdrb_common::Category;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WardrobeSummary {
    counts: BTreeMap<Category, usize>,
}

impl WardrobeSummary {
    /// Count the items of `view` by category
    ///
    /// Every category is present, with zero where the view has none.
    pub fn from_view(view: &CatalogView) -> Self {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();

        for item in view.items() {
            *counts.entry(item.category).or_default() += 1;
        }

        Self { counts }
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(category, count)` in wardrobe display order
    pub fn entries(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// Noun used on the overview card, pluralized by count
fn card_noun(category: Category, count: usize) -> &'static str {
    let singular = count == 1;
    match category {
        Category::Spectacles => "Spectacles",
        Category::UpperWear if singular => "Upper Wear",
        Category::UpperWear => "Upper Wears",
        Category::LowerWear if singular => "Lower Wear",
        Category::LowerWear => "Lower Wears",
        Category::Accessory if singular => "Accessory",
        Category::Accessory => "Accessories",
        Category::Socks => "Socks",
        Category::Shoes => "Shoes",
        Category::Uncategorized if singular => "Uncategorized Item",
        Category::Uncategorized => "Uncategorized Items",
    }
}

impl fmt::Display for WardrobeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (category, count) in self.entries() {
            writeln!(f, "{} {} in Wardrobe", count, card_noun(category, count))?;
        }
        write!(f, "{} items total", self.total())
    }
}
