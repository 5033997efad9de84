//! Set-semantics cart management over the store's `cart` field.

use crate::model::DataBundle;
use crate::store::{MarketStore, WriteOutcome};

/// Returns `true` if `cart` holds `bundle_id`.
pub fn contains(cart: &[String], bundle_id: &str) -> bool {
    cart.iter().any(|id| id == bundle_id)
}

/// Append `bundle_id` unless it is already present.
///
/// # Returns
///
/// `true` if the id was appended.
pub fn insert_unique(cart: &mut Vec<String>, bundle_id: &str) -> bool {
    if contains(cart, bundle_id) {
        return false;
    }
    cart.push(bundle_id.to_owned());
    true
}

/// Sum of the prices of catalog bundles in the cart.
///
/// Ids with no catalog entry contribute nothing.
pub fn cart_total(catalog: &[DataBundle], cart: &[String]) -> f64 {
    catalog
        .iter()
        .filter(|bundle| contains(cart, &bundle.id))
        .map(|bundle| bundle.price)
        .sum()
}

/// Cart operations bound to a store.
///
/// Every write goes through the store, so observers and persistence see
/// cart changes exactly like any other mutation.
#[derive(Debug, Clone, Copy)]
pub struct Cart<'a> {
    store: &'a MarketStore,
}

impl<'a> Cart<'a> {
    /// Bind cart operations to `store`.
    pub fn new(store: &'a MarketStore) -> Self {
        Self { store }
    }

    /// Add `bundle_id`; repeated adds are no-ops.
    pub fn add(&self, bundle_id: &str) -> WriteOutcome {
        self.store.add_to_cart(bundle_id)
    }

    /// Remove `bundle_id`; absent ids are no-ops.
    pub fn remove(&self, bundle_id: &str) -> WriteOutcome {
        self.store.remove_from_cart(bundle_id)
    }

    /// Remove every id.
    pub fn clear(&self) -> WriteOutcome {
        self.store.clear_cart()
    }

    /// Returns `true` if the current cart holds `bundle_id`.
    pub fn contains(&self, bundle_id: &str) -> bool {
        contains(&self.store.state().cart, bundle_id)
    }

    /// The cart's ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.store.state().cart.clone()
    }

    /// Number of distinct ids in the cart.
    pub fn len(&self) -> usize {
        self.store.state().cart.len()
    }

    /// Returns `true` if the cart holds no ids.
    pub fn is_empty(&self) -> bool {
        self.store.state().cart.is_empty()
    }

    /// Total price of the cart against the store's current catalog.
    pub fn total(&self) -> f64 {
        let state = self.store.state();
        cart_total(&state.bundles, &state.cart)
    }
}
