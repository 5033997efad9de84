//! The bundle-creation wizard.
//!
//! A linear five-step flow over a transient [`BundleDraft`]. The wizard
//! exclusively owns its draft; nothing else can write to it, and it is
//! never merged into the store's catalog. [`CreationWizard::publish`]
//! consumes the wizard and yields only a confirmation.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

/// One page of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// 1-based position.
    pub id: usize,
    pub title: &'static str,
    pub description: &'static str,
}

/// The wizard's pages, in order.
pub const STEPS: [Step; 5] = [
    Step {
        id: 1,
        title: "Bundle Type",
        description: "Choose what type of data bundle to create",
    },
    Step {
        id: 2,
        title: "Data Selection",
        description: "Select and configure your data sources",
    },
    Step {
        id: 3,
        title: "AI Anonymization",
        description: "Preview and configure privacy protection",
    },
    Step {
        id: 4,
        title: "Bundle Details",
        description: "Set pricing and description",
    },
    Step {
        id: 5,
        title: "Review & Publish",
        description: "Final review before publishing",
    },
];

/// Kind of data a new bundle packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Location,
    Behavior,
    Health,
    Calendar,
}

/// Market information displayed for a [`BundleType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleTypeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub demand: &'static str,
    pub avg_price: &'static str,
}

impl BundleType {
    pub const ALL: [BundleType; 4] = [
        BundleType::Location,
        BundleType::Behavior,
        BundleType::Health,
        BundleType::Calendar,
    ];

    pub fn info(&self) -> BundleTypeInfo {
        match self {
            BundleType::Location => BundleTypeInfo {
                name: "Location Data",
                description: "GPS coordinates, movement patterns, location visits",
                demand: "High",
                avg_price: "$45-120",
            },
            BundleType::Behavior => BundleTypeInfo {
                name: "Behavioral Data",
                description: "App usage, browsing patterns, interaction data",
                demand: "Very High",
                avg_price: "$60-180",
            },
            BundleType::Health => BundleTypeInfo {
                name: "Health & Fitness",
                description: "Steps, heart rate, sleep patterns, workout data",
                demand: "Medium",
                avg_price: "$30-90",
            },
            BundleType::Calendar => BundleTypeInfo {
                name: "Calendar Events",
                description: "Meeting patterns, availability, time management",
                demand: "Medium",
                avg_price: "$25-70",
            },
        }
    }
}

/// Exposure risk of including a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Risk {
    Low,
    Medium,
    High,
}

/// A data source the draft may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSource {
    pub name: &'static str,
    pub samples: u64,
    pub connected: bool,
    pub risk: Risk,
}

/// The fixed list of selectable data sources.
pub const DATA_SOURCES: [DataSource; 4] = [
    DataSource {
        name: "GPS Location History",
        samples: 15_420,
        connected: true,
        risk: Risk::Low,
    },
    DataSource {
        name: "App Usage Statistics",
        samples: 8_960,
        connected: true,
        risk: Risk::Low,
    },
    DataSource {
        name: "Search History",
        samples: 12_350,
        connected: false,
        risk: Risk::Medium,
    },
    DataSource {
        name: "Contact Interactions",
        samples: 3_240,
        connected: false,
        risk: Risk::High,
    },
];

/// How aggressively identifiers are stripped before publishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymizationLevel {
    /// Some identifiers removed.
    Basic,
    /// Most identifiers removed.
    Standard,
    /// All identifiers removed, plus noise.
    #[default]
    High,
    /// Differential privacy applied.
    Maximum,
}

/// The wizard's bundle-in-progress.
///
/// Text fields hold what the user typed; nothing is parsed until review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BundleDraft {
    pub bundle_type: Option<BundleType>,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Price as typed, e.g. `"49.99"`.
    pub price: String,
    /// Comma-separated tags as typed.
    pub tags: String,
    /// Names from [`DATA_SOURCES`], in selection order.
    pub data_sources: Vec<String>,
    pub anonymization_level: AnonymizationLevel,
    pub include_metadata: bool,
}

impl BundleDraft {
    /// Split the tag text on commas, trimming and dropping empty entries.
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// The typed price, if it parses as a non-negative number.
    pub fn parsed_price(&self) -> Option<f64> {
        self.price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Confirmation returned by [`CreationWizard::publish`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedDraft {
    pub draft: BundleDraft,
    pub message: &'static str,
}

/// Step-by-step state machine for creating a bundle.
///
/// The step index moves by exactly one within `[1, STEPS.len()]`; leaving
/// step 1 requires a selected [`BundleType`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreationWizard {
    step: usize,
    draft: BundleDraft,
}

impl Default for CreationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationWizard {
    /// Start at step 1 with an empty draft.
    pub fn new() -> Self {
        Self {
            step: 1,
            draft: BundleDraft::default(),
        }
    }

    /// Current 1-based step index.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Metadata of the current step.
    pub fn current(&self) -> Step {
        STEPS[self.step - 1]
    }

    pub fn is_last_step(&self) -> bool {
        self.step == STEPS.len()
    }

    /// Completion percentage shown in the progress bar.
    pub fn progress(&self) -> f64 {
        self.step as f64 / STEPS.len() as f64 * 100.0
    }

    pub fn draft(&self) -> &BundleDraft {
        &self.draft
    }

    /// Advance one step. A no-op on the last step.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::TypeNotSelected`] on step 1 when no bundle
    /// type has been chosen.
    pub fn advance(&mut self) -> Result<usize, WizardError> {
        if self.step == 1 && self.draft.bundle_type.is_none() {
            return Err(WizardError::TypeNotSelected);
        }
        if self.step < STEPS.len() {
            self.step += 1;
        }
        Ok(self.step)
    }

    /// Go back one step. A no-op on step 1.
    pub fn back(&mut self) -> usize {
        if self.step > 1 {
            self.step -= 1;
        }
        self.step
    }

    pub fn select_type(&mut self, bundle_type: BundleType) {
        self.draft.bundle_type = Some(bundle_type);
    }

    /// Select a data source, or deselect it if already selected.
    ///
    /// # Returns
    ///
    /// `true` if the source is selected after the call.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::UnknownDataSource`] if `name` is not in
    /// [`DATA_SOURCES`].
    pub fn toggle_source(&mut self, name: &str) -> Result<bool, WizardError> {
        if !DATA_SOURCES.iter().any(|source| source.name == name) {
            return Err(WizardError::UnknownDataSource(name.to_owned()));
        }
        let sources = &mut self.draft.data_sources;
        if let Some(pos) = sources.iter().position(|s| s == name) {
            sources.remove(pos);
            Ok(false)
        } else {
            sources.push(name.to_owned());
            Ok(true)
        }
    }

    pub fn set_anonymization(&mut self, level: AnonymizationLevel) {
        self.draft.anonymization_level = level;
    }

    pub fn set_include_metadata(&mut self, include: bool) {
        self.draft.include_metadata = include;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.draft.category = category.into();
    }

    pub fn set_price(&mut self, price: impl Into<String>) {
        self.draft.price = price.into();
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.draft.tags = tags.into();
    }

    /// Finish the flow and discard the wizard.
    ///
    /// Produces a confirmation only; the draft is not added to any catalog.
    pub fn publish(self) -> PublishedDraft {
        tracing::info!(
            title = %self.draft.title,
            sources = self.draft.data_sources.len(),
            "bundle draft published"
        );
        PublishedDraft {
            draft: self.draft,
            message: "Bundle published successfully! It will appear in the marketplace shortly.",
        }
    }
}
