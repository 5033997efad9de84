//! Display-ready aggregates for the earnings dashboard.

use serde::{Deserialize, Serialize};

use crate::model::EarningsSeries;

/// One bar/point of the weekly earnings chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Project a weekly series into chart points labelled `"Week 1"`,
/// `"Week 2"`, and so on.
pub fn earnings_chart_series(weekly: &[f64]) -> Vec<ChartPoint> {
    weekly
        .iter()
        .enumerate()
        .map(|(i, &value)| ChartPoint {
            label: format!("Week {}", i + 1),
            value,
        })
        .collect()
}

/// Whether a connected data stream is currently producing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Active,
    Inactive,
}

/// A data source the user has connected, with its revenue to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStream {
    pub name: String,
    pub enabled: bool,
    pub samples: u64,
    /// Revenue in USD.
    pub revenue: f64,
    /// Period-over-period change as displayed, e.g. `"+12%"`.
    pub trend: String,
    pub status: StreamStatus,
}

/// The demo streams shown on the dashboard.
pub fn demo_streams() -> Vec<DataStream> {
    let stream = |name: &str, enabled: bool, samples: u64, revenue: f64, trend: &str| DataStream {
        name: name.to_owned(),
        enabled,
        samples,
        revenue,
        trend: trend.to_owned(),
        status: if enabled {
            StreamStatus::Active
        } else {
            StreamStatus::Inactive
        },
    };
    vec![
        stream("Location Data", true, 15_420, 234.50, "+12%"),
        stream("App Usage", true, 8_960, 156.30, "+8%"),
        stream("Calendar Events", false, 0, 0.0, "0%"),
        stream("Social Activity", true, 5_430, 89.20, "+15%"),
    ]
}

/// Totals across all data streams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub total_revenue: f64,
    pub total_samples: u64,
    /// Streams with [`StreamStatus::Active`].
    pub active_streams: usize,
}

/// Sum revenue and samples and count active streams.
pub fn summarize_streams(streams: &[DataStream]) -> StreamSummary {
    streams
        .iter()
        .fold(StreamSummary::default(), |mut acc, stream| {
            acc.total_revenue += stream.revenue;
            acc.total_samples = acc.total_samples.saturating_add(stream.samples);
            if stream.status == StreamStatus::Active {
                acc.active_streams += 1;
            }
            acc
        })
}

/// Sum of each earnings granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsTotals {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

/// Sum each granularity of the earnings history. Empty series sum to zero.
pub fn earnings_totals(earnings: &EarningsSeries) -> EarningsTotals {
    EarningsTotals {
        daily: earnings.daily.iter().sum(),
        weekly: earnings.weekly.iter().sum(),
        monthly: earnings.monthly.iter().sum(),
    }
}

/// What happened in a recent-activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// A buyer purchased one of the user's bundles.
    Sale,
    /// Earnings were paid out.
    Payout,
    /// The user created a bundle.
    Bundle,
}

/// One row of the dashboard's recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    /// Amount credited in USD; `None` for entries that move no money.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Relative time as displayed, e.g. `"2 hours ago"`.
    pub time: String,
    /// Abbreviated on-chain signature of the entry.
    pub signature: String,
}

/// The demo activity feed, newest first.
pub fn demo_activity() -> Vec<Activity> {
    let entry = |id: u32,
                 kind: ActivityKind,
                 description: &str,
                 amount: Option<f64>,
                 time: &str,
                 signature: &str| Activity {
        id,
        kind,
        description: description.to_owned(),
        amount,
        time: time.to_owned(),
        signature: signature.to_owned(),
    };
    vec![
        entry(
            1,
            ActivityKind::Sale,
            "Urban Mobility Bundle purchased by RetailCorp",
            Some(45.99),
            "2 hours ago",
            "0xa1b2c3...",
        ),
        entry(
            2,
            ActivityKind::Payout,
            "Weekly payout processed",
            Some(234.50),
            "1 day ago",
            "0xd4e5f6...",
        ),
        entry(
            3,
            ActivityKind::Bundle,
            "New Shopping Behavior bundle created",
            None,
            "3 days ago",
            "0x789abc...",
        ),
        entry(
            4,
            ActivityKind::Sale,
            "Health Metrics Bundle purchased by HealthTech",
            Some(67.20),
            "5 days ago",
            "0xdef123...",
        ),
    ]
}

/// Sum of the amounts credited by `kind` entries, or by all entries when
/// `kind` is `None`.
pub fn activity_total(feed: &[Activity], kind: Option<ActivityKind>) -> f64 {
    feed.iter()
        .filter(|entry| kind.is_none_or(|k| entry.kind == k))
        .filter_map(|entry| entry.amount)
        .sum()
}

/// Display form of an activity amount, e.g. `"+$45.99"`.
pub fn format_amount(amount: f64) -> String {
    format!("+${amount:.2}")
}
