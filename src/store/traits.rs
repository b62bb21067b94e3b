use crate::model::{
    ApiVersion, ApiVersionWithProject, Endpoint, Feedback, Id, Project, ProjectUpdate,
    VersionStatus,
};
use anyhow::Result;

#[async_trait::async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get_project(&self, id: &Id) -> Result<Option<Project>>;
    /// Projects owned by a user, most recently updated first
    async fn list_projects_by_owner(&self, owner_id: &Id) -> Result<Vec<Project>>;
    async fn create_project(&self, project: Project) -> Result<Project>;
    /// Apply an owner edit; returns None if the project does not exist
    async fn update_project(&self, id: &Id, update: ProjectUpdate) -> Result<Option<Project>>;
}

#[async_trait::async_trait]
pub trait ApiVersionStore: Send + Sync {
    async fn get_api_version(&self, id: &Id) -> Result<Option<ApiVersion>>;
    /// Same as `get_api_version`, joined with the owning project's name
    async fn get_api_version_with_project(&self, id: &Id) -> Result<Option<ApiVersionWithProject>>;
    /// Versions of a project, newest first
    async fn list_api_versions_by_project(&self, project_id: &Id) -> Result<Vec<ApiVersion>>;
    /// Fails with `DocError::Conflict` if the project already has a version with this name
    async fn create_api_version(&self, version: ApiVersion) -> Result<ApiVersion>;
    /// Persist status and timestamp changes made by the lifecycle manager.
    /// Only applied while the stored status is still `expected_status`; otherwise
    /// fails with `DocError::Conflict`.
    async fn update_api_version(&self, version: ApiVersion, expected_status: VersionStatus) -> Result<()>;
}

#[async_trait::async_trait]
pub trait EndpointStore: Send + Sync {
    async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>>;
    /// Endpoints of a version ordered by path ascending, then method
    async fn list_endpoints_by_version(&self, api_version_id: &Id) -> Result<Vec<Endpoint>>;
    /// Fails with `DocError::Conflict` if the version already documents this path and method
    async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint>;
}

#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn create_feedback(&self, feedback: Feedback) -> Result<Feedback>;
    async fn list_feedback_for_version(&self, api_version_id: &Id) -> Result<Vec<Feedback>>;
    async fn list_feedback_for_endpoint(&self, endpoint_id: &Id) -> Result<Vec<Feedback>>;
}

pub trait Store: ProjectStore + ApiVersionStore + EndpointStore + FeedbackStore + Send + Sync {}
