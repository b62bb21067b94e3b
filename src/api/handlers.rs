use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Json as RequestJson,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::DocsConfig;
use crate::error::DocError;
use crate::logic::{
    DocumentationPage, DocumentationRenderer, ExampleSynthesizer, Language, VersionLifecycle,
    ViewStatus,
};
use crate::model::{
    ApiVersion, ApiVersionWithProject, BadgeColor, Endpoint, Feedback, Id, NewApiVersion,
    NewEndpoint, NewFeedback, NewProject, Profile, Project, ProjectUpdate, VersionStatus,
};
use crate::store::traits::Store;

/// Shared state of the HTTP service
pub struct AppState<S: ?Sized> {
    pub store: Arc<S>,
    pub renderer: DocumentationRenderer<S>,
}

impl<S: ?Sized> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            renderer: self.renderer.clone(),
        }
    }
}

impl<S: Store + ?Sized> AppState<S> {
    pub fn new(store: Arc<S>, docs: &DocsConfig) -> Self {
        let renderer = DocumentationRenderer::new(
            Arc::clone(&store),
            ExampleSynthesizer::new(&docs.base_url),
            docs.default_language,
        );
        Self { store, renderer }
    }
}

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn status_for(err: &DocError) -> StatusCode {
    match err {
        DocError::NotFound { .. } => StatusCode::NOT_FOUND,
        DocError::InvalidTransition { .. } | DocError::Conflict(_) => StatusCode::CONFLICT,
        DocError::Validation(_) | DocError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
        DocError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn api_error(err: DocError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (status, Json(ErrorResponse::new(&err.to_string())))
}

fn store_error(err: anyhow::Error) -> ApiError {
    api_error(DocError::from_store(err))
}

async fn require_project<S: Store + ?Sized>(store: &S, project_id: &Id) -> Result<Project, ApiError> {
    store
        .get_project(project_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| api_error(DocError::not_found("Project", project_id.as_str())))
}

async fn require_version<S: Store + ?Sized>(store: &S, version_id: &Id) -> Result<ApiVersion, ApiError> {
    store
        .get_api_version(version_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| api_error(DocError::not_found("Version", version_id.as_str())))
}

/// Version row as shown in project listings
#[derive(Debug, Clone, Serialize)]
pub struct VersionSummary {
    pub id: Id,
    pub version_name: String,
    pub status: VersionStatus,
    pub status_badge: BadgeColor,
    pub created_at: String,
}

impl From<&ApiVersion> for VersionSummary {
    fn from(version: &ApiVersion) -> Self {
        Self {
            id: version.id.clone(),
            version_name: version.version_name.clone(),
            status: version.status,
            status_badge: version.status.badge_color(),
            created_at: version.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectOverview {
    pub project: Project,
    pub versions: Vec<VersionSummary>,
    /// The three most recently created versions
    pub recent_activity: Vec<VersionSummary>,
}

/// GET /projects
pub async fn list_projects<S: Store + ?Sized>(
    profile: Profile,
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<Project>> {
    let projects = state
        .store
        .list_projects_by_owner(&profile.id)
        .await
        .map_err(store_error)?;
    Ok(Json(projects.into()))
}

/// POST /projects
pub async fn create_project<S: Store + ?Sized>(
    profile: Profile,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<NewProject>,
) -> ApiResult<Project> {
    if req.name.trim().is_empty() {
        return Err(api_error(DocError::Validation("Project name must not be empty".to_string())));
    }

    let project = state
        .store
        .create_project(req.into_project(profile.id.clone()))
        .await
        .map_err(store_error)?;
    info!("Project '{}' created by {}", project.name, profile.display_name());
    Ok(Json(project))
}

/// GET /projects/:project_id
pub async fn get_project<S: Store + ?Sized>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<Project> {
    Ok(Json(require_project(&*state.store, &project_id).await?))
}

/// PATCH /projects/:project_id
pub async fn update_project<S: Store + ?Sized>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(update): RequestJson<ProjectUpdate>,
) -> ApiResult<Project> {
    state
        .store
        .update_project(&project_id, update)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| api_error(DocError::not_found("Project", project_id.as_str())))
}

/// GET /projects/:project_id/overview
pub async fn get_project_overview<S: Store + ?Sized>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ProjectOverview> {
    let project = require_project(&*state.store, &project_id).await?;
    let versions = state
        .store
        .list_api_versions_by_project(&project_id)
        .await
        .map_err(store_error)?;

    let versions: Vec<VersionSummary> = versions.iter().map(VersionSummary::from).collect();
    let recent_activity = versions.iter().take(3).cloned().collect();

    Ok(Json(ProjectOverview {
        project,
        versions,
        recent_activity,
    }))
}

/// GET /projects/:project_id/versions
pub async fn list_versions<S: Store + ?Sized>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<ApiVersion>> {
    require_project(&*state.store, &project_id).await?;
    let versions = state
        .store
        .list_api_versions_by_project(&project_id)
        .await
        .map_err(store_error)?;
    Ok(Json(versions.into()))
}

/// POST /projects/:project_id/versions
pub async fn create_version<S: Store + ?Sized>(
    Path(project_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<NewApiVersion>,
) -> ApiResult<ApiVersion> {
    if req.version_name.trim().is_empty() {
        return Err(api_error(DocError::Validation("Version name must not be empty".to_string())));
    }
    require_project(&*state.store, &project_id).await?;

    let version = state
        .store
        .create_api_version(req.into_api_version(project_id))
        .await
        .map_err(store_error)?;
    Ok(Json(version))
}

/// GET /versions/:version_id
pub async fn get_version<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ApiVersionWithProject> {
    state
        .store
        .get_api_version_with_project(&version_id)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| api_error(DocError::not_found("Version", version_id.as_str())))
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: VersionStatus,
}

async fn change_status<S: Store + ?Sized>(
    state: &AppState<S>,
    version_id: &Id,
    target: VersionStatus,
) -> ApiResult<ApiVersion> {
    VersionLifecycle::apply(&*state.store, version_id, target)
        .await
        .map(Json)
        .map_err(api_error)
}

/// POST /versions/:version_id/publish
pub async fn publish_version<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ApiVersion> {
    change_status(&state, &version_id, VersionStatus::Published).await
}

/// POST /versions/:version_id/deprecate
pub async fn deprecate_version<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ApiVersion> {
    change_status(&state, &version_id, VersionStatus::Deprecated).await
}

/// PUT /versions/:version_id/status
pub async fn set_version_status<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<StatusChangeRequest>,
) -> ApiResult<ApiVersion> {
    change_status(&state, &version_id, req.status).await
}

/// GET /versions/:version_id/endpoints
pub async fn list_endpoints<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<Endpoint>> {
    require_version(&*state.store, &version_id).await?;
    let endpoints = state
        .store
        .list_endpoints_by_version(&version_id)
        .await
        .map_err(store_error)?;
    Ok(Json(endpoints.into()))
}

/// POST /versions/:version_id/endpoints
pub async fn create_endpoint<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<NewEndpoint>,
) -> ApiResult<Endpoint> {
    req.validate().map_err(|e| api_error(DocError::Validation(e)))?;
    require_version(&*state.store, &version_id).await?;

    let endpoint = state
        .store
        .create_endpoint(req.into_endpoint(version_id))
        .await
        .map_err(store_error)?;
    Ok(Json(endpoint))
}

#[derive(Debug, Deserialize)]
pub struct DocsQuery {
    pub endpoint: Option<Id>,
    pub language: Option<String>,
}

/// GET /versions/:version_id/docs
/// Rendered documentation page, optionally with a selected endpoint and language
pub async fn get_documentation<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    Query(query): Query<DocsQuery>,
    State(state): State<AppState<S>>,
) -> Result<(StatusCode, Json<DocumentationPage>), ApiError> {
    let language = query
        .language
        .as_deref()
        .map(str::parse::<Language>)
        .transpose()
        .map_err(api_error)?;

    let session = state.renderer.session();
    session.load(&version_id).await;

    match session.status() {
        ViewStatus::NotFound => {
            return Err(api_error(DocError::not_found("Version", version_id.as_str())))
        }
        ViewStatus::Failed(_) => return Ok((StatusCode::SERVICE_UNAVAILABLE, Json(session.page()))),
        ViewStatus::Ready | ViewStatus::Loading => {}
    }

    if let Some(language) = language {
        session.select_language(language);
    }
    if let Some(endpoint_id) = query.endpoint.as_deref() {
        session.select_endpoint(endpoint_id).map_err(api_error)?;
    }

    Ok((StatusCode::OK, Json(session.page())))
}

/// GET /versions/:version_id/endpoints/:endpoint_id/examples/:language
/// Plain-text example; unknown languages produce an empty body
pub async fn get_example<S: Store + ?Sized>(
    Path((version_id, endpoint_id, language)): Path<(Id, Id, String)>,
    State(state): State<AppState<S>>,
) -> Result<Response, ApiError> {
    let endpoint = state
        .store
        .get_endpoint(&endpoint_id)
        .await
        .map_err(store_error)?
        .filter(|e| e.api_version_id == version_id)
        .ok_or_else(|| api_error(DocError::not_found("Endpoint", endpoint_id.as_str())))?;

    let code = state.renderer.synthesizer().synthesize(&endpoint, &language);
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], code).into_response())
}

/// GET /versions/:version_id/feedback
pub async fn list_feedback<S: Store + ?Sized>(
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
) -> ApiResult<ListResponse<Feedback>> {
    require_version(&*state.store, &version_id).await?;
    let feedback = state
        .store
        .list_feedback_for_version(&version_id)
        .await
        .map_err(store_error)?;
    Ok(Json(feedback.into()))
}

/// POST /versions/:version_id/feedback
pub async fn submit_feedback<S: Store + ?Sized>(
    profile: Profile,
    Path(version_id): Path<Id>,
    State(state): State<AppState<S>>,
    RequestJson(req): RequestJson<NewFeedback>,
) -> ApiResult<Feedback> {
    if req.content.trim().is_empty() {
        return Err(api_error(DocError::Validation("Feedback must not be empty".to_string())));
    }
    require_version(&*state.store, &version_id).await?;

    if let Some(endpoint_id) = &req.endpoint_id {
        let belongs = state
            .store
            .get_endpoint(endpoint_id)
            .await
            .map_err(store_error)?
            .map(|e| e.api_version_id == version_id)
            .unwrap_or(false);
        if !belongs {
            return Err(api_error(DocError::not_found("Endpoint", endpoint_id.as_str())));
        }
    }

    let feedback = state
        .store
        .create_feedback(req.into_feedback(profile.id, Some(version_id)))
        .await
        .map_err(store_error)?;
    Ok(Json(feedback))
}
