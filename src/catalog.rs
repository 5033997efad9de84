//! Marketplace catalog filtering and sorting.
//!
//! [`query`] is pure: it borrows the catalog, never mutates it, and yields
//! the same ordered view for the same inputs.

use std::cmp::Ordering;

use crate::model::DataBundle;

/// Category choices offered by the marketplace filter, `"all"` first.
pub const MARKETPLACE_CATEGORIES: [&str; 6] =
    ["all", "Location", "Behavior", "Health", "Social", "Financial"];

/// Which categories a query admits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Exact, case-sensitive match on [`DataBundle::category`].
    Only(String),
}

impl CategoryFilter {
    /// Parse a filter value as the marketplace UI submits it.
    ///
    /// `"all"` (and the empty string) admit everything; anything else is
    /// an exact category name.
    pub fn parse(value: &str) -> Self {
        match value {
            "" | "all" => CategoryFilter::All,
            other => CategoryFilter::Only(other.to_owned()),
        }
    }

    fn admits(&self, bundle: &DataBundle) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => bundle.category == *category,
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending price.
    PriceLow,
    /// Descending price.
    PriceHigh,
    /// Descending rating.
    Rating,
    /// Descending sample count.
    Samples,
    /// Descending creation time.
    #[default]
    Newest,
}

impl SortKey {
    /// Parse a sort key as the marketplace UI submits it.
    ///
    /// Unrecognized keys fall back to [`SortKey::Newest`].
    pub fn parse(value: &str) -> Self {
        match value {
            "price-low" => SortKey::PriceLow,
            "price-high" => SortKey::PriceHigh,
            "rating" => SortKey::Rating,
            "samples" => SortKey::Samples,
            "newest" => SortKey::Newest,
            other => {
                tracing::debug!(sort_key = %other, "unknown sort key; using newest");
                SortKey::Newest
            }
        }
    }

    /// The wire name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::Rating => "rating",
            SortKey::Samples => "samples",
            SortKey::Newest => "newest",
        }
    }

    fn compare(&self, a: &DataBundle, b: &DataBundle) -> Ordering {
        match self {
            SortKey::PriceLow => a.price.total_cmp(&b.price),
            SortKey::PriceHigh => b.price.total_cmp(&a.price),
            SortKey::Rating => b.rating.total_cmp(&a.rating),
            SortKey::Samples => b.samples.cmp(&a.samples),
            SortKey::Newest => b.created.cmp(&a.created),
        }
    }
}

/// A marketplace search: free-text term, category filter, and ordering.
///
/// The default query matches every bundle, newest first.
///
/// # Examples
///
/// ```
/// use datacoop_store::{CatalogQuery, SortKey};
///
/// let q = CatalogQuery::new("mobility").category("Location").sort(SortKey::PriceLow);
/// assert_eq!(q.term, "mobility");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring; empty matches everything.
    pub term: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl CatalogQuery {
    /// Start a query for `term` across all categories, newest first.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Restrict to a category, parsed like [`CategoryFilter::parse`].
    pub fn category(mut self, category: &str) -> Self {
        self.category = CategoryFilter::parse(category);
        self
    }

    /// Set the ordering.
    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Returns `true` if `needle` (already lowercased) occurs in the bundle's
/// title, description, or any tag, ignoring case.
fn matches_term(bundle: &DataBundle, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    bundle.title.to_lowercase().contains(needle)
        || bundle.description.to_lowercase().contains(needle)
        || bundle.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// Filter and order the catalog.
///
/// A bundle is included when it matches both the term and the category
/// filter. The sort is stable, so ties keep their catalog order.
pub fn query<'a>(catalog: &'a [DataBundle], q: &CatalogQuery) -> Vec<&'a DataBundle> {
    let needle = q.term.to_lowercase();
    let mut hits: Vec<&DataBundle> = catalog
        .iter()
        .filter(|bundle| matches_term(bundle, &needle) && q.category.admits(bundle))
        .collect();
    hits.sort_by(|a, b| q.sort.compare(a, b));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    fn catalog() -> Vec<DataBundle> {
        Seed::demo().into_state().bundles
    }

    fn ids(hits: &[&DataBundle]) -> Vec<String> {
        hits.iter().map(|b| b.id.clone()).collect()
    }

    #[test]
    fn default_query_returns_newest_first() {
        let catalog = catalog();
        let hits = query(&catalog, &CatalogQuery::default());
        assert_eq!(ids(&hits), ["1", "2", "3"]);
    }

    #[test]
    fn price_low_orders_ascending() {
        let catalog = catalog();
        let hits = query(&catalog, &CatalogQuery::default().sort(SortKey::PriceLow));
        let prices: Vec<f64> = hits.iter().map(|b| b.price).collect();
        assert_eq!(prices, [67.50, 89.99, 134.99]);
    }

    #[test]
    fn price_high_rating_and_samples() {
        let catalog = catalog();
        let by = |sort| ids(&query(&catalog, &CatalogQuery::default().sort(sort)));
        assert_eq!(by(SortKey::PriceHigh), ["2", "1", "3"]);
        assert_eq!(by(SortKey::Rating), ["2", "1", "3"]);
        assert_eq!(by(SortKey::Samples), ["1", "3", "2"]);
    }

    #[test]
    fn shopping_matches_only_bundle_two() {
        let catalog = catalog();
        let hits = query(&catalog, &CatalogQuery::new("shopping"));
        assert_eq!(ids(&hits), ["2"]);
    }

    #[test]
    fn term_is_case_insensitive_and_searches_tags() {
        let catalog = catalog();
        assert_eq!(ids(&query(&catalog, &CatalogQuery::new("WELLNESS"))), ["3"]);
        assert_eq!(ids(&query(&catalog, &CatalogQuery::new("Transport"))), ["1"]);
    }

    #[test]
    fn category_filter_is_exact() {
        let catalog = catalog();
        let q = CatalogQuery::default().category("Health");
        assert_eq!(ids(&query(&catalog, &q)), ["3"]);
        let q = CatalogQuery::default().category("health");
        assert!(query(&catalog, &q).is_empty());
    }

    #[test]
    fn term_and_category_are_conjunctive() {
        let catalog = catalog();
        let q = CatalogQuery::new("patterns").category("Location");
        assert_eq!(ids(&query(&catalog, &q)), ["1"]);
        let q = CatalogQuery::new("patterns").category("Health");
        assert!(query(&catalog, &q).is_empty());
    }

    #[test]
    fn ties_keep_catalog_order() {
        let mut catalog = catalog();
        for bundle in &mut catalog {
            bundle.price = 10.0;
        }
        let hits = query(&catalog, &CatalogQuery::default().sort(SortKey::PriceHigh));
        assert_eq!(ids(&hits), ["1", "2", "3"]);
    }

    #[test]
    fn unknown_sort_key_falls_back_to_newest() {
        assert_eq!(SortKey::parse("popularity"), SortKey::Newest);
        assert_eq!(SortKey::parse(""), SortKey::Newest);
        assert_eq!(SortKey::parse("price-low"), SortKey::PriceLow);
    }

    #[test]
    fn sort_key_names_roundtrip() {
        for key in [
            SortKey::PriceLow,
            SortKey::PriceHigh,
            SortKey::Rating,
            SortKey::Samples,
            SortKey::Newest,
        ] {
            assert_eq!(SortKey::parse(key.as_str()), key);
        }
    }

    #[test]
    fn category_parse_treats_all_as_wildcard() {
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Social"),
            CategoryFilter::Only("Social".into())
        );
        assert_eq!(MARKETPLACE_CATEGORIES[0], "all");
    }

    #[test]
    fn query_does_not_mutate_catalog() {
        let catalog = catalog();
        let before = catalog.clone();
        let _ = query(&catalog, &CatalogQuery::new("data").sort(SortKey::Samples));
        assert_eq!(catalog, before);
    }
}
