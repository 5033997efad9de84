//! Snapshot-persisted application state for the DataCo-op marketplace,
//! with pure catalog, cart, and dashboard views over it.

pub mod cart;
mod catalog;
pub mod dashboard;
mod error;
mod model;
mod seed;
pub mod snapshot;
mod storage;
mod store;
pub mod wizard;

pub use cart::{Cart, cart_total};
pub use catalog::{CatalogQuery, CategoryFilter, MARKETPLACE_CATEGORIES, SortKey, query};
pub use dashboard::{Activity, ActivityKind, ChartPoint, earnings_chart_series};
pub use error::{PersistError, SeedError, SnapshotError, WizardError};
pub use model::{
    AgeSteps, AppState, DataBundle, EarningsSeries, LocationPoint, Preview, UsageShare,
    UserProfile, Verification,
};
pub use seed::Seed;
pub use storage::{FileSlotStorage, MemorySlotStorage, SlotStorage};
pub use store::{
    DEFAULT_NAMESPACE, MarketStore, MarketStoreBuilder, SubscriptionId, WriteOutcome,
};
pub use wizard::{BundleDraft, CreationWizard};
