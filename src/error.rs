//! Crate-level error types for persistence, snapshot restore, seeding, and
//! the creation wizard.

/// Error returned when writing a snapshot to its durable slot fails.
///
/// Never fatal to a mutation: the store keeps the updated in-memory state
/// and reports this through [`WriteOutcome::MemoryOnly`](crate::WriteOutcome).
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Disk I/O failure.
    ///
    /// The slot directory could not be created, or the temp file could not
    /// be written or renamed into place.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state could not be serialized to JSON.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reason a persisted snapshot was rejected during restore.
///
/// The store recovers from every variant by reseeding; this type exists so
/// the rejection can be logged and tested precisely.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The slot held bytes that are not a valid `AppState` document,
    /// including preview payloads with an unknown `type` tag.
    #[error("snapshot decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Two catalog entries share the same id.
    #[error("duplicate bundle id in catalog: {0}")]
    DuplicateBundleId(String),

    /// The cart lists the same id more than once.
    #[error("duplicate bundle id in cart: {0}")]
    DuplicateCartId(String),

    /// A catalog entry carries an out-of-range price or rating.
    #[error("bundle {id} is invalid: {reason}")]
    InvalidBundle {
        /// Offending bundle id.
        id: String,
        /// Which field is out of range.
        reason: &'static str,
    },

    /// The user profile carries negative or non-numeric earnings.
    #[error("user {0} has invalid earnings")]
    InvalidUser(String),
}

/// Error returned when loading a seed override file fails.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The seed file is not a valid state document.
    #[error("seed decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The seed decoded but violates a catalog or cart invariant.
    #[error("seed is invalid: {0}")]
    Invalid(#[source] SnapshotError),
}

/// Error returned by a rejected wizard transition or draft edit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Step 1 cannot be left until a bundle type is chosen.
    #[error("select a bundle type before continuing")]
    TypeNotSelected,

    /// The named data source is not one of the connectable sources.
    #[error("unknown data source: {0}")]
    UnknownDataSource(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_error_io_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let err = PersistError::from(io_err);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn snapshot_error_decode_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = SnapshotError::from(json_err);
        assert!(err.to_string().starts_with("snapshot decoding failed"));
    }

    #[test]
    fn invalid_bundle_display_names_the_field() {
        let err = SnapshotError::InvalidBundle {
            id: "7".into(),
            reason: "rating outside [0, 5]",
        };
        assert_eq!(err.to_string(), "bundle 7 is invalid: rating outside [0, 5]");
    }

    #[test]
    fn wizard_error_display() {
        assert_eq!(
            WizardError::TypeNotSelected.to_string(),
            "select a bundle type before continuing"
        );
        assert_eq!(
            WizardError::UnknownDataSource("Fax Logs".into()).to_string(),
            "unknown data source: Fax Logs"
        );
    }

    // Errors are returned from a store shared across threads.
    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<PersistError>();
            assert_send_sync::<SnapshotError>();
            assert_send_sync::<SeedError>();
            assert_send_sync::<WizardError>();
        }
    };
}
