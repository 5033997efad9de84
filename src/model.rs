//! Domain types held by the store and persisted in its snapshot.
//!
//! Field names match the JSON layout of the persisted slot exactly, so
//! every type here serializes without renames except where noted.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identity verification status of a [`UserProfile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    /// Documents submitted, not yet reviewed.
    #[default]
    Pending,
    /// Identity confirmed.
    Verified,
    /// Verification was refused.
    Rejected,
}

/// The signed-in seller/buyer.
///
/// Replaced wholesale through [`MarketStore::set_user`](crate::MarketStore::set_user);
/// there is no partial-field mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user id.
    pub id: String,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Avatar image reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Cumulative earnings in USD.
    pub earnings: f64,
    /// Number of bundles the user owns.
    pub bundles: u32,
    /// Verification status.
    pub verification: Verification,
}

/// One point of a location heat map preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub lat: f64,
    pub lng: f64,
    pub count: u64,
}

/// Share of activity attributed to one usage category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageShare {
    pub category: String,
    pub value: f64,
}

/// Average daily steps for one age bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeSteps {
    /// Age bracket label, e.g. `"18-25"`.
    pub age: String,
    pub steps: u64,
}

/// Sample payload shown on a marketplace card.
///
/// Serialized adjacently tagged as `{"type": "location", "data": [...]}`.
/// A tag outside the three known shapes fails deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Preview {
    Location(Vec<LocationPoint>),
    Usage(Vec<UsageShare>),
    Demographic(Vec<AgeSteps>),
}

impl Preview {
    /// The wire tag of this preview shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Preview::Location(_) => "location",
            Preview::Usage(_) => "usage",
            Preview::Demographic(_) => "demographic",
        }
    }

    /// Number of records in the preview.
    pub fn len(&self) -> usize {
        match self {
            Preview::Location(points) => points.len(),
            Preview::Usage(shares) => shares.len(),
            Preview::Demographic(rows) => rows.len(),
        }
    }

    /// Returns `true` if the preview carries no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A catalog entry: a sellable package of anonymized data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBundle {
    /// Unique within the catalog.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Price in USD.
    pub price: f64,
    /// Free-form, conventionally one of
    /// [`MARKETPLACE_CATEGORIES`](crate::MARKETPLACE_CATEGORIES).
    pub category: String,
    /// Display order is preserved; matching ignores it.
    pub tags: Vec<String>,
    /// Number of samples in the bundle.
    pub samples: u64,
    /// Seller identifier.
    pub seller: String,
    /// Average rating in `[0, 5]`.
    pub rating: f64,
    pub preview: Preview,
    /// Listing time, written as RFC 3339. Timestamps without an offset are
    /// read as UTC.
    #[serde(deserialize_with = "deserialize_created")]
    pub created: DateTime<Utc>,
}

fn deserialize_created<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Historical earnings totals at three granularities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsSeries {
    pub daily: Vec<f64>,
    pub weekly: Vec<f64>,
    pub monthly: Vec<f64>,
}

/// The full application state: the unit of persistence and observation.
///
/// Serialized with top-level keys `user`, `bundles`, `cart`, `earnings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// `None` when logged out.
    pub user: Option<UserProfile>,
    /// The bundle catalog.
    pub bundles: Vec<DataBundle>,
    /// Bundle ids in insertion order, without duplicates.
    pub cart: Vec<String>,
    pub earnings: EarningsSeries,
}

impl AppState {
    /// Look up a catalog entry by id.
    pub fn bundle(&self, id: &str) -> Option<&DataBundle> {
        self.bundles.iter().find(|b| b.id == id)
    }
}
