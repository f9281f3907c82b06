//! Resource domain model.
//!
//! # Responsibility
//! - Define the canonical assignable-resource record.
//! - Enforce the closed category set at the model boundary.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another resource.
//! - `name` functions as a secondary lookup key; the store keeps it unique.
//! - Unset measurements are `None`; zero is a valid measured value.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a resource.
pub type ResourceId = Uuid;

/// Closed set of physical resource categories.
///
/// Anything outside this set is rejected at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    ProbeTip,
    Spindle,
    Mask,
    Head,
    Generator,
}

impl ResourceCategory {
    /// All members, in canonical listing order.
    pub const ALL: [ResourceCategory; 5] = [
        ResourceCategory::ProbeTip,
        ResourceCategory::Spindle,
        ResourceCategory::Mask,
        ResourceCategory::Head,
        ResourceCategory::Generator,
    ];

    /// Canonical external label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ProbeTip => "Probe-tip",
            Self::Spindle => "Spindle",
            Self::Mask => "Mask",
            Self::Head => "Head",
            Self::Generator => "Generator",
        }
    }

    /// Parses an external category label.
    ///
    /// Matching is case-insensitive and accepts `-` or `_` in `Probe-tip`.
    ///
    /// # Errors
    /// - [`ResourceValidationError::UnknownCategory`] listing the closed set.
    pub fn parse(value: &str) -> Result<Self, ResourceValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "probe-tip" | "probe_tip" => Ok(Self::ProbeTip),
            "spindle" => Ok(Self::Spindle),
            "mask" => Ok(Self::Mask),
            "head" => Ok(Self::Head),
            "generator" => Ok(Self::Generator),
            _ => Err(ResourceValidationError::UnknownCategory(
                value.trim().to_string(),
            )),
        }
    }
}

impl Display for ResourceCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failures for resource write models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValidationError {
    /// Category value is not in the closed set.
    UnknownCategory(String),
    /// Name is blank after trimming.
    BlankName,
}

impl Display for ResourceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCategory(value) => {
                let known = ResourceCategory::ALL
                    .iter()
                    .map(|category| category.label())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "unknown resource category `{value}`; expected one of: {known}"
                )
            }
            Self::BlankName => write!(f, "resource name must not be blank"),
        }
    }
}

impl Error for ResourceValidationError {}

/// Canonical assignable-resource record.
///
/// Measurement fields keep `Option` semantics end to end, so callers can
/// distinguish "measured as zero" from "not measured".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable global ID used for lookups and assignment references.
    pub uuid: ResourceId,
    /// Unique display name; secondary lookup key.
    pub name: String,
    /// Closed-set category.
    pub category: ResourceCategory,
    /// Warehouse tag, free-form.
    pub warehouse: String,
    /// Pitch measurement, unset when never measured.
    pub pitch: Option<f64>,
    /// Center-to-center distance measurement.
    pub center_to_center: Option<f64>,
    /// Diameter measurement.
    pub diameter: Option<f64>,
    /// Maximum-value bound for this resource.
    pub max_value: Option<f64>,
    /// Vendor model designation.
    pub model: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Resource {
    /// Creates a new resource with a generated stable ID.
    ///
    /// Optional measurement and text fields start unset.
    pub fn new(
        name: impl Into<String>,
        category: ResourceCategory,
        warehouse: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, category, warehouse)
    }

    /// Creates a new resource with a caller-provided stable ID.
    pub fn with_id(
        uuid: ResourceId,
        name: impl Into<String>,
        category: ResourceCategory,
        warehouse: impl Into<String>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            category,
            warehouse: warehouse.into(),
            pitch: None,
            center_to_center: None,
            diameter: None,
            max_value: None,
            model: None,
            notes: None,
        }
    }

    /// Checks the model invariants.
    pub fn validate(&self) -> Result<(), ResourceValidationError> {
        if self.name.trim().is_empty() {
            return Err(ResourceValidationError::BlankName);
        }
        Ok(())
    }
}
