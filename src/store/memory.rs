use anyhow::Result;
use itertools::Itertools;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::DocError;
use crate::model::{
    ApiVersion, ApiVersionWithProject, Endpoint, Feedback, Id, Project, ProjectUpdate,
    VersionStatus,
};
use crate::store::traits::{ApiVersionStore, EndpointStore, FeedbackStore, ProjectStore, Store};

#[derive(Debug, Default)]
struct Tables {
    projects: HashMap<Id, Project>,
    versions: HashMap<Id, ApiVersion>,
    endpoints: HashMap<Id, Endpoint>,
    feedback: HashMap<Id, Feedback>,
}

/// Process-local record store, used for development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProjectStore for MemoryStore {
    async fn get_project(&self, id: &Id) -> Result<Option<Project>> {
        Ok(self.tables.read().projects.get(id).cloned())
    }

    async fn list_projects_by_owner(&self, owner_id: &Id) -> Result<Vec<Project>> {
        let tables = self.tables.read();
        Ok(tables
            .projects
            .values()
            .filter(|p| &p.owner_id == owner_id)
            .sorted_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)))
            .cloned()
            .collect())
    }

    async fn create_project(&self, project: Project) -> Result<Project> {
        let mut tables = self.tables.write();
        if tables.projects.contains_key(&project.id) {
            return Err(DocError::Conflict(format!("Project '{}' already exists", project.id)).into());
        }
        tables.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: &Id, update: ProjectUpdate) -> Result<Option<Project>> {
        let mut tables = self.tables.write();
        let Some(project) = tables.projects.get_mut(id) else {
            return Ok(None);
        };
        project.apply_update(update);
        Ok(Some(project.clone()))
    }
}

#[async_trait::async_trait]
impl ApiVersionStore for MemoryStore {
    async fn get_api_version(&self, id: &Id) -> Result<Option<ApiVersion>> {
        Ok(self.tables.read().versions.get(id).cloned())
    }

    async fn get_api_version_with_project(&self, id: &Id) -> Result<Option<ApiVersionWithProject>> {
        let tables = self.tables.read();
        let Some(version) = tables.versions.get(id) else {
            return Ok(None);
        };
        let project_name = tables
            .projects
            .get(&version.project_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        Ok(Some(ApiVersionWithProject {
            version: version.clone(),
            project_name,
        }))
    }

    async fn list_api_versions_by_project(&self, project_id: &Id) -> Result<Vec<ApiVersion>> {
        let tables = self.tables.read();
        Ok(tables
            .versions
            .values()
            .filter(|v| &v.project_id == project_id)
            .sorted_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned()
            .collect())
    }

    async fn create_api_version(&self, version: ApiVersion) -> Result<ApiVersion> {
        let mut tables = self.tables.write();
        let duplicate = tables
            .versions
            .values()
            .any(|v| v.project_id == version.project_id && v.version_name == version.version_name);
        if duplicate {
            return Err(DocError::Conflict(format!(
                "Version '{}' already exists in project '{}'",
                version.version_name, version.project_id
            ))
            .into());
        }
        tables.versions.insert(version.id.clone(), version.clone());
        Ok(version)
    }

    async fn update_api_version(&self, version: ApiVersion, expected_status: VersionStatus) -> Result<()> {
        let mut tables = self.tables.write();
        match tables.versions.get_mut(&version.id) {
            Some(existing) if existing.status != expected_status => Err(DocError::Conflict(format!(
                "Version '{}' is {}, expected {}",
                existing.version_name, existing.status, expected_status
            ))
            .into()),
            Some(existing) => {
                *existing = version;
                Ok(())
            }
            None => Err(DocError::not_found("Version", version.id).into()),
        }
    }
}

#[async_trait::async_trait]
impl EndpointStore for MemoryStore {
    async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>> {
        Ok(self.tables.read().endpoints.get(id).cloned())
    }

    async fn list_endpoints_by_version(&self, api_version_id: &Id) -> Result<Vec<Endpoint>> {
        let tables = self.tables.read();
        Ok(tables
            .endpoints
            .values()
            .filter(|e| &e.api_version_id == api_version_id)
            .sorted_by(|a, b| {
                a.path
                    .cmp(&b.path)
                    .then_with(|| a.method.as_str().cmp(b.method.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint> {
        let mut tables = self.tables.write();
        let duplicate = tables.endpoints.values().any(|e| {
            e.api_version_id == endpoint.api_version_id
                && e.path == endpoint.path
                && e.method == endpoint.method
        });
        if duplicate {
            return Err(DocError::Conflict(format!(
                "{} {} is already documented in this version",
                endpoint.method, endpoint.path
            ))
            .into());
        }
        tables.endpoints.insert(endpoint.id.clone(), endpoint.clone());
        Ok(endpoint)
    }
}

#[async_trait::async_trait]
impl FeedbackStore for MemoryStore {
    async fn create_feedback(&self, feedback: Feedback) -> Result<Feedback> {
        self.tables
            .write()
            .feedback
            .insert(feedback.id.clone(), feedback.clone());
        Ok(feedback)
    }

    async fn list_feedback_for_version(&self, api_version_id: &Id) -> Result<Vec<Feedback>> {
        let tables = self.tables.read();
        Ok(tables
            .feedback
            .values()
            .filter(|f| f.api_version_id.as_ref() == Some(api_version_id))
            .sorted_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned()
            .collect())
    }

    async fn list_feedback_for_endpoint(&self, endpoint_id: &Id) -> Result<Vec<Feedback>> {
        let tables = self.tables.read();
        Ok(tables
            .feedback
            .values()
            .filter(|f| f.endpoint_id.as_ref() == Some(endpoint_id))
            .sorted_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned()
            .collect())
    }
}

impl Store for MemoryStore {}
