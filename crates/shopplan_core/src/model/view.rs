//! External-facing view records.
//!
//! # Responsibility
//! - Project internal entities into the fixed-shape records handed to the
//!   automation adapter.
//!
//! # Invariants
//! - Projection is total and lossless for set fields.
//! - Unset optional fields stay `None` (JSON `null`), never a coerced zero
//!   or empty string.

use crate::model::resource::{Resource, ResourceCategory};
use crate::model::task::Task;
use serde::{Deserialize, Serialize};

/// Caller-facing task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub name: String,
    /// Outline position rendered dot-joined, e.g. `2.1`.
    pub outline: String,
    pub start_ms: i64,
    pub finish_ms: i64,
    pub warehouse: String,
    pub manager: String,
    /// Names of all assigned resources, in assignment order.
    pub resources: Vec<String>,
}

impl TaskView {
    /// Projects one task together with its derived outline position and the
    /// names of its assigned resources.
    pub fn project(task: &Task, outline_path: &[u32], resources: Vec<String>) -> Self {
        Self {
            name: task.name.clone(),
            outline: render_outline(outline_path),
            start_ms: task.start_ms,
            finish_ms: task.finish_ms,
            warehouse: task.warehouse.clone(),
            manager: task.manager.clone(),
            resources,
        }
    }
}

/// Caller-facing resource record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceView {
    pub name: String,
    pub category: ResourceCategory,
    pub model: Option<String>,
    pub pitch: Option<f64>,
    pub center_to_center: Option<f64>,
    pub diameter: Option<f64>,
    pub max_value: Option<f64>,
    pub warehouse: String,
    pub notes: Option<String>,
}

impl ResourceView {
    /// Projects one resource, preserving every unset field as `None`.
    pub fn project(resource: &Resource) -> Self {
        Self {
            name: resource.name.clone(),
            category: resource.category,
            model: resource.model.clone(),
            pitch: resource.pitch,
            center_to_center: resource.center_to_center,
            diameter: resource.diameter,
            max_value: resource.max_value,
            warehouse: resource.warehouse.clone(),
            notes: resource.notes.clone(),
        }
    }
}

/// Renders an outline path dot-joined (`[2, 1]` -> `"2.1"`).
pub fn render_outline(path: &[u32]) -> String {
    path.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::render_outline;

    #[test]
    fn render_outline_joins_components_with_dots() {
        assert_eq!(render_outline(&[2, 1]), "2.1");
        assert_eq!(render_outline(&[3]), "3");
        assert_eq!(render_outline(&[1, 4, 2]), "1.4.2");
    }

    #[test]
    fn render_outline_of_empty_path_is_empty() {
        assert_eq!(render_outline(&[]), "");
    }
}
