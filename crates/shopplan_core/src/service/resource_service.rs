//! Resource use-case service.
//!
//! # Responsibility
//! - Append resources with closed-set category validation.
//! - Provide lookup, field-update, listing and delete entry points.
//!
//! # Invariants
//! - Category validation precedes any persistence; the rejection lists
//!   the closed set.
//! - Optional measurement fields pass through untouched; an omitted
//!   value stays unset.

use crate::model::resource::{Resource, ResourceCategory, ResourceId, ResourceValidationError};
use crate::model::view::ResourceView;
use crate::repo::resource_repo::{ResourceRepoError, ResourceRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request model for appending one resource.
///
/// `category` carries the external label and is checked against the
/// closed set.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendResourceRequest {
    pub name: String,
    pub category: String,
    pub warehouse: String,
    pub diameter: Option<f64>,
    pub pitch: Option<f64>,
    pub center_to_center: Option<f64>,
    pub model: Option<String>,
    pub max_value: Option<f64>,
    pub notes: Option<String>,
}

impl AppendResourceRequest {
    /// Creates a request with the mandatory fields and everything else
    /// unset.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        warehouse: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            warehouse: warehouse.into(),
            diameter: None,
            pitch: None,
            center_to_center: None,
            model: None,
            max_value: None,
            notes: None,
        }
    }
}

/// Errors from resource use-case operations.
#[derive(Debug)]
pub enum ResourceServiceError {
    /// Target resource does not exist.
    ResourceNotFound(ResourceId),
    /// Another stored resource already carries this name.
    NameTaken(String),
    /// Request model failed validation (unknown category, blank name).
    Validation(ResourceValidationError),
    /// Persistence-layer failure.
    Repo(ResourceRepoError),
}

impl Display for ResourceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResourceNotFound(id) => write!(f, "resource not found: {id}"),
            Self::NameTaken(name) => {
                write!(f, "resource name `{name}` is already in use")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResourceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceRepoError> for ResourceServiceError {
    fn from(value: ResourceRepoError) -> Self {
        match value {
            ResourceRepoError::NotFound(id) => Self::ResourceNotFound(id),
            ResourceRepoError::NameTaken(name) => Self::NameTaken(name),
            ResourceRepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Resource service facade.
pub struct ResourceService<R: ResourceRepository> {
    repo: R,
}

impl<R: ResourceRepository> ResourceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends one resource.
    ///
    /// # Contract
    /// - The category label is parsed against the closed set before any
    ///   row is written; the rejection message lists the valid members.
    /// - Omitted optional fields are stored unset, never as zero.
    /// - Returns the resource as stored.
    pub fn append_resource(
        &self,
        request: &AppendResourceRequest,
    ) -> Result<Resource, ResourceServiceError> {
        let category = ResourceCategory::parse(&request.category)
            .map_err(ResourceServiceError::Validation)?;

        let mut resource = Resource::new(request.name.clone(), category, request.warehouse.clone());
        resource.diameter = request.diameter;
        resource.pitch = request.pitch;
        resource.center_to_center = request.center_to_center;
        resource.model = request.model.clone();
        resource.max_value = request.max_value;
        resource.notes = request.notes.clone();

        self.repo.create_resource(&resource)?;
        Ok(resource)
    }

    /// Replaces every mutable field of one stored resource.
    pub fn update_resource(&self, resource: &Resource) -> Result<(), ResourceServiceError> {
        Ok(self.repo.update_resource(resource)?)
    }

    /// Loads one resource by ID.
    pub fn get_resource(&self, id: ResourceId) -> Result<Option<Resource>, ResourceServiceError> {
        Ok(self.repo.get_resource(id)?)
    }

    /// Finds one resource by its unique name.
    pub fn find_resource_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Resource>, ResourceServiceError> {
        Ok(self.repo.find_resource_by_name(name)?)
    }

    /// Projects every resource into its caller-facing view, in insertion
    /// order.
    pub fn list_resource_views(&self) -> Result<Vec<ResourceView>, ResourceServiceError> {
        let resources = self.repo.list_resources()?;
        Ok(resources.iter().map(ResourceView::project).collect())
    }

    /// Deletes one resource by ID. Returns `false` when the ID is unknown.
    pub fn delete_resource(&self, id: ResourceId) -> Result<bool, ResourceServiceError> {
        let deleted = self.repo.delete_resource(id)?;
        if deleted {
            info!("event=resource_delete module=service status=ok resource={id}");
        }
        Ok(deleted)
    }
}
