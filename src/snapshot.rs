//! Snapshot persistence for the application state.
//!
//! A snapshot is the whole [`AppState`] serialized as one JSON object with
//! keys `user`, `bundles`, `cart`, `earnings`, stored in a single
//! [`SlotStorage`] slot. Snapshots that fail to decode or validate are
//! treated like an absent slot so the store can fall back to its seed.

use std::collections::HashSet;
use std::io;

use crate::error::{PersistError, SnapshotError};
use crate::model::{AppState, UserProfile};
use crate::storage::SlotStorage;

/// Check the catalog and cart invariants of a state.
///
/// # Errors
///
/// Returns the first violation found: a duplicate bundle id, a duplicate
/// cart id, a negative price, a rating outside `[0, 5]`, or negative user
/// earnings.
pub fn validate(state: &AppState) -> Result<(), SnapshotError> {
    let mut seen = HashSet::with_capacity(state.bundles.len());
    for bundle in &state.bundles {
        if !seen.insert(bundle.id.as_str()) {
            return Err(SnapshotError::DuplicateBundleId(bundle.id.clone()));
        }
        if bundle.price.is_nan() || bundle.price < 0.0 {
            return Err(SnapshotError::InvalidBundle {
                id: bundle.id.clone(),
                reason: "negative price",
            });
        }
        if !(0.0..=5.0).contains(&bundle.rating) {
            return Err(SnapshotError::InvalidBundle {
                id: bundle.id.clone(),
                reason: "rating outside [0, 5]",
            });
        }
    }

    let mut in_cart = HashSet::with_capacity(state.cart.len());
    for id in &state.cart {
        if !in_cart.insert(id.as_str()) {
            return Err(SnapshotError::DuplicateCartId(id.clone()));
        }
    }

    match &state.user {
        Some(user) => validate_user(user),
        None => Ok(()),
    }
}

/// Check that a user profile can be persisted and restored.
///
/// # Errors
///
/// Returns [`SnapshotError::InvalidUser`] if the earnings are negative or
/// not a number. JSON has no NaN, so such a profile would not survive a
/// restart.
pub fn validate_user(user: &UserProfile) -> Result<(), SnapshotError> {
    if user.earnings.is_nan() || user.earnings < 0.0 {
        return Err(SnapshotError::InvalidUser(user.id.clone()));
    }
    Ok(())
}

/// Serialize a state to snapshot bytes.
///
/// # Errors
///
/// Returns [`PersistError::Encode`] if serialization fails.
pub fn encode(state: &AppState) -> Result<Vec<u8>, PersistError> {
    Ok(serde_json::to_vec(state)?)
}

/// Deserialize and validate snapshot bytes.
///
/// # Errors
///
/// Returns [`SnapshotError::Decode`] for malformed JSON or unknown preview
/// tags, or the violation reported by [`validate`].
pub fn decode(bytes: &[u8]) -> Result<AppState, SnapshotError> {
    let state: AppState = serde_json::from_slice(bytes)?;
    validate(&state)?;
    Ok(state)
}

/// Write a snapshot of `state` to the slot `key`.
///
/// # Errors
///
/// Returns [`PersistError`] if encoding or the slot write fails.
pub fn save_snapshot(
    storage: &dyn SlotStorage,
    key: &str,
    state: &AppState,
) -> Result<(), PersistError> {
    let bytes = encode(state)?;
    storage.write(key, &bytes)?;
    Ok(())
}

/// Load the snapshot stored in slot `key`.
///
/// # Returns
///
/// - `Ok(Some(state))` if the slot exists and holds a valid snapshot.
/// - `Ok(None)` if the slot is absent, or holds a snapshot that fails to
///   decode or validate. Rejections are logged as warnings via
///   `tracing::warn!`.
///
/// # Errors
///
/// Returns `io::Error` only for slot read failures.
pub fn load_snapshot(storage: &dyn SlotStorage, key: &str) -> io::Result<Option<AppState>> {
    let Some(bytes) = storage.read(key)? else {
        return Ok(None);
    };

    match decode(&bytes) {
        Ok(state) => Ok(Some(state)),
        Err(e) => {
            tracing::warn!(
                slot = %key,
                error = %e,
                "rejected persisted snapshot; treating as absent"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;
    use crate::storage::MemorySlotStorage;

    fn demo() -> AppState {
        Seed::demo().into_state()
    }

    #[test]
    fn save_then_load_roundtrips() {
        let storage = MemorySlotStorage::new();
        let mut state = demo();
        state.cart.push("2".into());

        save_snapshot(&storage, "slot", &state).expect("save should succeed");
        let loaded = load_snapshot(&storage, "slot")
            .expect("load should succeed")
            .expect("snapshot should exist");
        assert_eq!(loaded, state);
    }

    #[test]
    fn load_absent_returns_none() {
        let storage = MemorySlotStorage::new();
        assert!(load_snapshot(&storage, "slot").expect("load").is_none());
    }

    #[test]
    fn load_corrupt_json_returns_none() {
        let storage = MemorySlotStorage::with_slot("slot", b"this is not valid json!!!".to_vec());
        let result = load_snapshot(&storage, "slot").expect("load should succeed (not Err)");
        assert!(result.is_none(), "corrupt JSON should return Ok(None)");
    }

    #[test]
    fn load_unknown_preview_tag_returns_none() {
        let mut value = serde_json::to_value(demo()).unwrap();
        value["bundles"][0]["preview"]["type"] = "biometric".into();
        let storage = MemorySlotStorage::with_slot("slot", serde_json::to_vec(&value).unwrap());
        assert!(load_snapshot(&storage, "slot").expect("load").is_none());
    }

    #[test]
    fn decode_reports_duplicate_cart_ids() {
        let mut state = demo();
        state.cart = vec!["1".into(), "3".into(), "1".into()];
        let bytes = serde_json::to_vec(&state).unwrap();
        match decode(&bytes) {
            Err(SnapshotError::DuplicateCartId(id)) => assert_eq!(id, "1"),
            other => panic!("expected DuplicateCartId, got {other:?}"),
        }
    }

    #[test]
    fn validate_tolerates_cart_ids_missing_from_catalog() {
        let mut state = demo();
        state.cart = vec!["deleted-bundle".into()];
        assert!(validate(&state).is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_rating() {
        let mut state = demo();
        state.bundles[2].rating = 5.5;
        assert!(matches!(
            validate(&state),
            Err(SnapshotError::InvalidBundle { ref id, .. }) if id == "3"
        ));
    }

    #[test]
    fn validate_rejects_nan_price() {
        let mut state = demo();
        state.bundles[0].price = f64::NAN;
        assert!(validate(&state).is_err());
    }

    #[test]
    fn validate_rejects_negative_earnings() {
        let mut state = demo();
        if let Some(user) = state.user.as_mut() {
            user.earnings = -1.0;
        }
        assert!(matches!(validate(&state), Err(SnapshotError::InvalidUser(_))));
    }

    #[test]
    fn validate_user_rejects_nan_earnings() {
        let mut user = demo().user.expect("demo user");
        user.earnings = f64::NAN;
        assert!(matches!(validate_user(&user), Err(SnapshotError::InvalidUser(_))));
    }

    #[test]
    fn validate_accepts_logged_out_state() {
        let mut state = demo();
        state.user = None;
        assert!(validate(&state).is_ok());
    }
}
