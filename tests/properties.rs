//! Property-based tests for catalog queries and cart set semantics.
//!
//! Catalog invariants:
//! 1. A query never yields more bundles than the catalog holds.
//! 2. Every result satisfies both the term and the category predicate.
//! 3. Without price ties, price-low is the reverse of price-high.
//! 4. The default query orders by descending creation time, stably.
//!
//! Cart invariants: adding is idempotent and no id ever appears twice.

use proptest::prelude::*;

use chrono::{DateTime, TimeZone, Utc};
use datacoop_store::{
    CatalogQuery, CategoryFilter, DataBundle, MarketStore, MarketStoreBuilder, MemorySlotStorage,
    Preview, SortKey, query,
};

// =============================================================================
// Strategy helpers
// =============================================================================

static CATEGORIES: [&str; 4] = ["Location", "Behavior", "Health", "Social"];
static WORDS: [&str; 6] = ["gps", "Shopping", "fitness", "commute", "SLEEP", "retail"];

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(&WORDS[..]).prop_map(str::to_owned)
}

fn created() -> impl Strategy<Value = DateTime<Utc>> {
    // A small range so equal timestamps occur.
    (0i64..20).prop_map(|day| {
        Utc.timestamp_opt(1_700_000_000 + day * 86_400, 0)
            .single()
            .expect("in range")
    })
}

/// Generate a catalog of up to `max` bundles with unique ids.
fn catalog_strategy(max: usize) -> impl Strategy<Value = Vec<DataBundle>> {
    prop::collection::vec(
        (
            word(),
            word(),
            prop::sample::select(&CATEGORIES[..]),
            prop::collection::vec(word(), 0..3),
            0u32..20_000,
            0u32..=50,
            0u64..100_000,
            created(),
        ),
        0..=max,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(
                |(i, (title, description, category, tags, cents, rating, samples, created))| {
                    DataBundle {
                        id: i.to_string(),
                        title,
                        description: format!("{description} data"),
                        price: f64::from(cents) / 100.0,
                        category: category.to_owned(),
                        tags,
                        samples,
                        seller: "prop".into(),
                        rating: f64::from(rating) / 10.0,
                        preview: Preview::Usage(Vec::new()),
                        created,
                    }
                },
            )
            .collect()
    })
}

fn query_strategy() -> impl Strategy<Value = CatalogQuery> {
    (
        prop_oneof![Just(String::new()), word(), word().prop_map(|w| w.to_uppercase())],
        prop_oneof![
            Just("all"),
            prop::sample::select(&CATEGORIES[..]),
            Just("Financial")
        ],
        prop::sample::select(vec![
            SortKey::PriceLow,
            SortKey::PriceHigh,
            SortKey::Rating,
            SortKey::Samples,
            SortKey::Newest,
        ]),
    )
        .prop_map(|(term, category, sort)| CatalogQuery::new(term).category(category).sort(sort))
}

fn matches_term(bundle: &DataBundle, term: &str) -> bool {
    let needle = term.to_lowercase();
    bundle.title.to_lowercase().contains(&needle)
        || bundle.description.to_lowercase().contains(&needle)
        || bundle.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

fn memory_store() -> MarketStore {
    MarketStoreBuilder::new()
        .storage(MemorySlotStorage::new())
        .open()
        .expect("failed to open store")
}

// =============================================================================
// Catalog properties
// =============================================================================

proptest! {
    #[test]
    fn results_never_exceed_catalog(catalog in catalog_strategy(12), q in query_strategy()) {
        prop_assert!(query(&catalog, &q).len() <= catalog.len());
    }

    #[test]
    fn results_satisfy_both_predicates(catalog in catalog_strategy(12), q in query_strategy()) {
        for bundle in query(&catalog, &q) {
            prop_assert!(matches_term(bundle, &q.term));
            if let CategoryFilter::Only(category) = &q.category {
                prop_assert_eq!(&bundle.category, category);
            }
        }
    }

    #[test]
    fn results_are_complete(catalog in catalog_strategy(12), q in query_strategy()) {
        let expected = catalog
            .iter()
            .filter(|b| matches_term(b, &q.term))
            .filter(|b| match &q.category {
                CategoryFilter::All => true,
                CategoryFilter::Only(c) => b.category == *c,
            })
            .count();
        prop_assert_eq!(query(&catalog, &q).len(), expected);
    }

    #[test]
    fn price_orders_reverse_without_ties(catalog in catalog_strategy(12)) {
        let mut prices: Vec<u64> = catalog.iter().map(|b| b.price.to_bits()).collect();
        prices.sort_unstable();
        prices.dedup();
        prop_assume!(prices.len() == catalog.len());

        let ids = |sort| -> Vec<String> {
            query(&catalog, &CatalogQuery::default().sort(sort))
                .iter()
                .map(|b| b.id.clone())
                .collect()
        };
        let mut high = ids(SortKey::PriceHigh);
        high.reverse();
        prop_assert_eq!(ids(SortKey::PriceLow), high);
    }

    #[test]
    fn default_query_is_newest_first_and_stable(catalog in catalog_strategy(12)) {
        let hits = query(&catalog, &CatalogQuery::default());
        prop_assert_eq!(hits.len(), catalog.len());
        for pair in hits.windows(2) {
            prop_assert!(pair[0].created >= pair[1].created);
            if pair[0].created == pair[1].created {
                // Ids are catalog positions, so ties must stay ascending.
                let a: usize = pair[0].id.parse().expect("numeric id");
                let b: usize = pair[1].id.parse().expect("numeric id");
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn unknown_sort_keys_behave_as_newest(key in "[a-z]{3,12}") {
        prop_assume!(!matches!(
            key.as_str(),
            "rating" | "samples" | "newest"
        ));
        prop_assert_eq!(SortKey::parse(&key), SortKey::Newest);
    }
}

// =============================================================================
// Cart properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cart_never_holds_duplicates(ops in prop::collection::vec((any::<bool>(), 0u8..6), 0..40)) {
        let store = memory_store();
        for (add, id) in ops {
            let id = id.to_string();
            let _ = if add {
                store.add_to_cart(&id)
            } else {
                store.remove_from_cart(&id)
            };
        }
        let cart = store.state().cart.clone();
        let mut unique = cart.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), cart.len());
    }

    #[test]
    fn add_is_idempotent(ids in prop::collection::vec("[0-9]{1,2}", 1..10), again in 0usize..10) {
        let store = memory_store();
        for id in &ids {
            let _ = store.add_to_cart(id);
        }
        let before = store.state();
        let pick = &ids[again % ids.len()];
        prop_assert!(!store.add_to_cart(pick).changed());
        prop_assert_eq!(&*store.state(), &*before);
    }
}
