use log::{debug, error};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DocError, DocResult};
use crate::logic::synthesizer::{ExampleSynthesizer, Language};
use crate::model::{
    ApiVersionWithProject, BadgeColor, Endpoint, HttpMethod, Id, VersionStatus,
};
use crate::store::traits::Store;

/// Selection state of one documentation session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub active_endpoint: Option<Id>,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    Loading,
    Ready,
    /// Terminal: the requested version does not exist
    NotFound,
    /// The record store failed; the view stays usable but empty
    Failed(String),
}

/// Documentation of one API version plus the reader's current selection
#[derive(Debug, Clone)]
pub struct DocumentationView {
    version: Option<ApiVersionWithProject>,
    endpoints: Vec<Endpoint>,
    state: ViewState,
    status: ViewStatus,
    examples: HashMap<(Id, Language), String>,
    synthesizer: ExampleSynthesizer,
}

impl DocumentationView {
    fn empty(synthesizer: ExampleSynthesizer, language: Language, status: ViewStatus) -> Self {
        Self {
            version: None,
            endpoints: Vec::new(),
            state: ViewState {
                active_endpoint: None,
                language,
            },
            status,
            examples: HashMap::new(),
            synthesizer,
        }
    }

    /// Build a ready view; the first endpoint (by path) becomes active
    pub fn ready(
        version: ApiVersionWithProject,
        endpoints: Vec<Endpoint>,
        synthesizer: ExampleSynthesizer,
        language: Language,
    ) -> Self {
        let mut view = Self::empty(synthesizer, language, ViewStatus::Ready);
        view.state.active_endpoint = endpoints.first().map(|e| e.id.clone());
        view.version = Some(version);
        view.endpoints = endpoints;
        view.ensure_active_example();
        view
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn version(&self) -> Option<&ApiVersionWithProject> {
        self.version.as_ref()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn active_endpoint(&self) -> Option<&Endpoint> {
        let active = self.state.active_endpoint.as_ref()?;
        self.endpoints.iter().find(|e| &e.id == active)
    }

    /// Example for the active endpoint in the current language; `None` when nothing is active
    pub fn active_example(&self) -> Option<&str> {
        let active = self.state.active_endpoint.clone()?;
        self.examples
            .get(&(active, self.state.language))
            .map(String::as_str)
    }

    /// Number of examples synthesized so far in this session
    pub fn cached_examples(&self) -> usize {
        self.examples.len()
    }

    pub fn select_endpoint(&mut self, endpoint_id: &str) -> DocResult<()> {
        if !self.endpoints.iter().any(|e| e.id == endpoint_id) {
            return Err(DocError::not_found("Endpoint", endpoint_id));
        }
        self.state.active_endpoint = Some(endpoint_id.to_string());
        self.ensure_active_example();
        Ok(())
    }

    pub fn select_language(&mut self, language: Language) {
        self.state.language = language;
        self.ensure_active_example();
    }

    fn ensure_active_example(&mut self) {
        let Some(endpoint) = self.active_endpoint() else {
            return;
        };
        let key = (endpoint.id.clone(), self.state.language);
        if self.examples.contains_key(&key) {
            return;
        }
        let code = self.synthesizer.synthesize_for(endpoint, self.state.language);
        self.examples.insert(key, code);
    }

    pub fn page(&self) -> DocumentationPage {
        let active = self.active_endpoint().map(|endpoint| {
            let code = self
                .active_example()
                .map(str::to_string)
                .unwrap_or_else(|| self.synthesizer.synthesize_for(endpoint, self.state.language));

            EndpointDetail {
                id: endpoint.id.clone(),
                method: endpoint.method,
                method_badge: endpoint.method.badge_color(),
                path: endpoint.path.clone(),
                summary: endpoint.summary.clone(),
                description: endpoint.description.clone(),
                request: endpoint.request_body().map(|body| body.to_pretty_string()),
                response: endpoint
                    .response_schema
                    .as_ref()
                    .filter(|schema| !schema.is_null())
                    .map(|schema| schema.to_pretty_string()),
                code_example: CodeExample {
                    language: self.state.language,
                    label: self.state.language.label(),
                    highlight_syntax: self.state.language.highlight_syntax(),
                    code,
                },
            }
        });

        DocumentationPage {
            status: self.status.clone(),
            title: self
                .version
                .as_ref()
                .map(|v| format!("{} - {}", v.project_name, v.version.version_name)),
            version_status: self.version.as_ref().map(|v| v.version.status),
            status_badge: self.version.as_ref().map(|v| v.version.status.badge_color()),
            sidebar: self
                .endpoints
                .iter()
                .map(|e| SidebarEntry {
                    id: e.id.clone(),
                    method: e.method,
                    method_badge: e.method.badge_color(),
                    path: e.path.clone(),
                    active: self.state.active_endpoint.as_ref() == Some(&e.id),
                })
                .collect(),
            active,
            languages: Language::ALL
                .iter()
                .map(|language| LanguageOption {
                    id: *language,
                    label: language.label(),
                    selected: *language == self.state.language,
                })
                .collect(),
            state: self.state.clone(),
        }
    }
}

/// Serializable view model of a documentation page
#[derive(Debug, Clone, Serialize)]
pub struct DocumentationPage {
    pub status: ViewStatus,
    /// "<project> - <version>"
    pub title: Option<String>,
    pub version_status: Option<VersionStatus>,
    pub status_badge: Option<BadgeColor>,
    pub sidebar: Vec<SidebarEntry>,
    /// None renders as "No endpoint selected"
    pub active: Option<EndpointDetail>,
    pub languages: Vec<LanguageOption>,
    pub state: ViewState,
}

#[derive(Debug, Clone, Serialize)]
pub struct SidebarEntry {
    pub id: Id,
    pub method: HttpMethod,
    pub method_badge: BadgeColor,
    pub path: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointDetail {
    pub id: Id,
    pub method: HttpMethod,
    pub method_badge: BadgeColor,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub request: Option<String>,
    pub response: Option<String>,
    pub code_example: CodeExample,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeExample {
    pub language: Language,
    pub label: &'static str,
    pub highlight_syntax: &'static str,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    pub id: Language,
    pub label: &'static str,
    pub selected: bool,
}

/// Loads documentation views from the record store. Read-only with respect to the store.
pub struct DocumentationRenderer<S: ?Sized> {
    store: Arc<S>,
    synthesizer: ExampleSynthesizer,
    default_language: Language,
}

impl<S: ?Sized> Clone for DocumentationRenderer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            synthesizer: self.synthesizer.clone(),
            default_language: self.default_language,
        }
    }
}

impl<S: Store + ?Sized> DocumentationRenderer<S> {
    pub fn new(store: Arc<S>, synthesizer: ExampleSynthesizer, default_language: Language) -> Self {
        Self {
            store,
            synthesizer,
            default_language,
        }
    }

    pub fn synthesizer(&self) -> &ExampleSynthesizer {
        &self.synthesizer
    }

    /// Load a version and its endpoints. Never fails: a missing version yields a
    /// `NotFound` view and store errors yield a `Failed` view.
    pub async fn load(&self, version_id: &Id) -> DocumentationView {
        self.load_with_language(version_id, self.default_language).await
    }

    pub async fn load_with_language(&self, version_id: &Id, language: Language) -> DocumentationView {
        let version = match self.store.get_api_version_with_project(version_id).await {
            Ok(Some(version)) => version,
            Ok(None) => {
                debug!("Documentation requested for unknown version '{}'", version_id);
                return DocumentationView::empty(self.synthesizer.clone(), language, ViewStatus::NotFound);
            }
            Err(e) => {
                error!("Error fetching documentation for version '{}': {:#}", version_id, e);
                return DocumentationView::empty(
                    self.synthesizer.clone(),
                    language,
                    ViewStatus::Failed(DocError::from_store(e).to_string()),
                );
            }
        };

        match self.store.list_endpoints_by_version(version_id).await {
            Ok(endpoints) => {
                DocumentationView::ready(version, endpoints, self.synthesizer.clone(), language)
            }
            Err(e) => {
                error!("Error fetching endpoints for version '{}': {:#}", version_id, e);
                let mut view = DocumentationView::empty(
                    self.synthesizer.clone(),
                    language,
                    ViewStatus::Failed(DocError::from_store(e).to_string()),
                );
                view.version = Some(version);
                view
            }
        }
    }

    /// Open a new session with its own selection state
    pub fn session(&self) -> ViewSession<S> {
        ViewSession::new(self.clone())
    }
}

struct SessionInner {
    view: DocumentationView,
    generation: u64,
    disposed: bool,
}

/// A reader's documentation session.
///
/// Cloning yields another handle to the same session. A load result is only
/// applied if no newer load was started and the session was not disposed
/// while the load was in flight.
pub struct ViewSession<S: ?Sized> {
    renderer: DocumentationRenderer<S>,
    inner: Arc<Mutex<SessionInner>>,
}

impl<S: ?Sized> Clone for ViewSession<S> {
    fn clone(&self) -> Self {
        Self {
            renderer: self.renderer.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store + ?Sized> ViewSession<S> {
    fn new(renderer: DocumentationRenderer<S>) -> Self {
        let view = DocumentationView::empty(
            renderer.synthesizer.clone(),
            renderer.default_language,
            ViewStatus::Loading,
        );
        Self {
            renderer,
            inner: Arc::new(Mutex::new(SessionInner {
                view,
                generation: 0,
                disposed: false,
            })),
        }
    }

    /// Returns whether the loaded view was applied to the session
    pub async fn load(&self, version_id: &Id) -> bool {
        let (generation, language) = {
            let mut inner = self.inner.lock();
            if inner.disposed {
                return false;
            }
            inner.generation += 1;
            inner.view.status = ViewStatus::Loading;
            (inner.generation, inner.view.state.language)
        };

        let view = self.renderer.load_with_language(version_id, language).await;

        let mut inner = self.inner.lock();
        if inner.disposed || inner.generation != generation {
            debug!(
                "Discarding stale documentation load for version '{}' (generation {})",
                version_id, generation
            );
            return false;
        }
        // Keep a language chosen while the load was in flight
        let current_language = inner.view.state.language;
        inner.view = view;
        inner.view.select_language(current_language);
        true
    }

    /// Tear the session down; outstanding loads are dropped on completion
    pub fn dispose(&self) {
        self.inner.lock().disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }

    pub fn select_endpoint(&self, endpoint_id: &str) -> DocResult<()> {
        self.inner.lock().view.select_endpoint(endpoint_id)
    }

    pub fn select_language(&self, language: Language) {
        self.inner.lock().view.select_language(language);
    }

    pub fn state(&self) -> ViewState {
        self.inner.lock().view.state.clone()
    }

    pub fn status(&self) -> ViewStatus {
        self.inner.lock().view.status.clone()
    }

    pub fn active_example(&self) -> Option<String> {
        self.inner.lock().view.active_example().map(str::to_string)
    }

    pub fn page(&self) -> DocumentationPage {
        self.inner.lock().view.page()
    }

    pub fn with_view<R>(&self, f: impl FnOnce(&DocumentationView) -> R) -> R {
        f(&self.inner.lock().view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ApiVersion, Document, Feedback, Project, ProjectUpdate,
    };
    use crate::store::traits::{ApiVersionStore, EndpointStore, FeedbackStore, ProjectStore};
    use crate::store::MemoryStore;
    use anyhow::{anyhow, Result};
    use tokio::sync::Notify;

    /// Memory store with switchable failures and an optional gate on endpoint listing
    #[derive(Default)]
    struct TestStore {
        inner: MemoryStore,
        fail_versions: bool,
        fail_endpoints: bool,
        gate: Option<Gate>,
    }

    struct Gate {
        version_id: Id,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl ProjectStore for TestStore {
        async fn get_project(&self, id: &Id) -> Result<Option<Project>> {
            self.inner.get_project(id).await
        }
        async fn list_projects_by_owner(&self, owner_id: &Id) -> Result<Vec<Project>> {
            self.inner.list_projects_by_owner(owner_id).await
        }
        async fn create_project(&self, project: Project) -> Result<Project> {
            self.inner.create_project(project).await
        }
        async fn update_project(&self, id: &Id, update: ProjectUpdate) -> Result<Option<Project>> {
            self.inner.update_project(id, update).await
        }
    }

    #[async_trait::async_trait]
    impl ApiVersionStore for TestStore {
        async fn get_api_version(&self, id: &Id) -> Result<Option<ApiVersion>> {
            self.inner.get_api_version(id).await
        }
        async fn get_api_version_with_project(&self, id: &Id) -> Result<Option<ApiVersionWithProject>> {
            if self.fail_versions {
                return Err(anyhow!("connection refused"));
            }
            self.inner.get_api_version_with_project(id).await
        }
        async fn list_api_versions_by_project(&self, project_id: &Id) -> Result<Vec<ApiVersion>> {
            self.inner.list_api_versions_by_project(project_id).await
        }
        async fn create_api_version(&self, version: ApiVersion) -> Result<ApiVersion> {
            self.inner.create_api_version(version).await
        }
        async fn update_api_version(&self, version: ApiVersion, expected_status: VersionStatus) -> Result<()> {
            self.inner.update_api_version(version, expected_status).await
        }
    }

    #[async_trait::async_trait]
    impl EndpointStore for TestStore {
        async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>> {
            self.inner.get_endpoint(id).await
        }
        async fn list_endpoints_by_version(&self, api_version_id: &Id) -> Result<Vec<Endpoint>> {
            if self.fail_endpoints {
                return Err(anyhow!("statement timeout"));
            }
            if let Some(gate) = self.gate.as_ref().filter(|g| &g.version_id == api_version_id) {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            self.inner.list_endpoints_by_version(api_version_id).await
        }
        async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint> {
            self.inner.create_endpoint(endpoint).await
        }
    }

    #[async_trait::async_trait]
    impl FeedbackStore for TestStore {
        async fn create_feedback(&self, feedback: Feedback) -> Result<Feedback> {
            self.inner.create_feedback(feedback).await
        }
        async fn list_feedback_for_version(&self, api_version_id: &Id) -> Result<Vec<Feedback>> {
            self.inner.list_feedback_for_version(api_version_id).await
        }
        async fn list_feedback_for_endpoint(&self, endpoint_id: &Id) -> Result<Vec<Feedback>> {
            self.inner.list_feedback_for_endpoint(endpoint_id).await
        }
    }

    impl Store for TestStore {}

    async fn seed_version(store: &TestStore, name: &str, paths: &[(&str, HttpMethod)]) -> Id {
        let project = store
            .create_project(Project::new("owner-1".to_string(), "Payments".to_string(), None))
            .await
            .unwrap();
        let version = store
            .create_api_version(ApiVersion::new(project.id, name.to_string(), None))
            .await
            .unwrap();
        for (path, method) in paths {
            let mut endpoint = Endpoint::new(version.id.clone(), path.to_string(), *method);
            if *method == HttpMethod::Post {
                endpoint = endpoint.with_request_body(Document::object([("name", Document::from("Ada"))]));
            }
            store.create_endpoint(endpoint).await.unwrap();
        }
        version.id
    }

    fn renderer(store: TestStore) -> DocumentationRenderer<TestStore> {
        DocumentationRenderer::new(Arc::new(store), ExampleSynthesizer::default(), Language::Curl)
    }

    #[tokio::test]
    async fn test_first_endpoint_by_path_is_active() {
        let store = TestStore::default();
        let version_id = seed_version(
            &store,
            "v1",
            &[("/b", HttpMethod::Get), ("/a", HttpMethod::Get), ("/c", HttpMethod::Get)],
        )
        .await;

        let view = renderer(store).load(&version_id).await;
        assert_eq!(view.status(), &ViewStatus::Ready);
        let paths: Vec<&str> = view.endpoints().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
        assert_eq!(view.active_endpoint().unwrap().path, "/a");
        assert_eq!(
            view.active_example(),
            Some("curl -X GET \"https://api.example.com/a\"")
        );
    }

    #[tokio::test]
    async fn test_version_without_endpoints_has_no_active_example() {
        let store = TestStore::default();
        let version_id = seed_version(&store, "v1", &[]).await;

        let mut view = renderer(store).load(&version_id).await;
        assert_eq!(view.status(), &ViewStatus::Ready);
        assert!(view.active_endpoint().is_none());
        assert!(view.active_example().is_none());

        view.select_language(Language::Python);
        assert!(view.active_example().is_none());
        assert_eq!(view.cached_examples(), 0);

        let page = view.page();
        assert!(page.active.is_none());
        assert_eq!(page.title.as_deref(), Some("Payments - v1"));
    }

    #[tokio::test]
    async fn test_missing_version_is_not_found() {
        let view = renderer(TestStore::default()).load(&"missing".to_string()).await;
        assert_eq!(view.status(), &ViewStatus::NotFound);
        assert!(view.version().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_failed_view() {
        let store = TestStore {
            fail_versions: true,
            ..Default::default()
        };
        let view = renderer(store).load(&"v1".to_string()).await;
        match view.status() {
            ViewStatus::Failed(message) => assert!(message.contains("connection refused")),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(view.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_endpoint_failure_keeps_version_header() {
        let mut store = TestStore::default();
        let version_id = seed_version(&store, "v3", &[("/a", HttpMethod::Get)]).await;
        store.fail_endpoints = true;

        let view = renderer(store).load(&version_id).await;
        assert!(matches!(view.status(), ViewStatus::Failed(_)));
        assert_eq!(view.page().title.as_deref(), Some("Payments - v3"));
        assert!(view.endpoints().is_empty());
    }

    #[tokio::test]
    async fn test_selection_and_language_use_example_cache() {
        let store = TestStore::default();
        let version_id = seed_version(
            &store,
            "v1",
            &[("/users", HttpMethod::Get), ("/users", HttpMethod::Post)],
        )
        .await;

        let mut view = renderer(store).load(&version_id).await;
        assert_eq!(view.cached_examples(), 1);
        let post_id = view
            .endpoints()
            .iter()
            .find(|e| e.method == HttpMethod::Post)
            .unwrap()
            .id
            .clone();

        view.select_endpoint(&post_id).unwrap();
        assert_eq!(view.cached_examples(), 2);
        assert!(view.active_example().unwrap().contains("-d '{"));

        view.select_language(Language::Python);
        assert_eq!(view.cached_examples(), 3);
        assert!(view.active_example().unwrap().contains("requests.post("));

        // Returning to a pair already seen reuses the cache
        view.select_language(Language::Curl);
        assert_eq!(view.cached_examples(), 3);

        let err = view.select_endpoint("no-such-endpoint").unwrap_err();
        assert!(matches!(err, DocError::NotFound { .. }));
        assert_eq!(view.state().active_endpoint.as_ref(), Some(&post_id));
    }

    #[tokio::test]
    async fn test_page_marks_active_sidebar_entry() {
        let store = TestStore::default();
        let version_id = seed_version(
            &store,
            "v1",
            &[("/orders", HttpMethod::Delete), ("/accounts", HttpMethod::Post)],
        )
        .await;

        let view = renderer(store).load(&version_id).await;
        let page = view.page();
        assert_eq!(page.sidebar.len(), 2);
        assert!(page.sidebar[0].active);
        assert_eq!(page.sidebar[0].path, "/accounts");
        assert_eq!(page.sidebar[1].method_badge, BadgeColor::Red);

        let active = page.active.unwrap();
        assert_eq!(active.request.as_deref(), Some("{\n  \"name\": \"Ada\"\n}"));
        assert_eq!(active.code_example.highlight_syntax, "bash");
        assert!(page.languages.iter().any(|l| l.selected && l.id == Language::Curl));
        assert_eq!(page.version_status, Some(VersionStatus::Draft));
    }

    #[tokio::test]
    async fn test_sessions_have_independent_state() {
        let store = TestStore::default();
        let version_id = seed_version(&store, "v1", &[("/a", HttpMethod::Get)]).await;
        let renderer = renderer(store);

        let first = renderer.session();
        let second = renderer.session();
        assert!(first.load(&version_id).await);
        assert!(second.load(&version_id).await);

        first.select_language(Language::JavaScript);
        assert_eq!(first.state().language, Language::JavaScript);
        assert_eq!(second.state().language, Language::Curl);

        let serialized = serde_json::to_value(first.state()).unwrap();
        assert_eq!(serialized["language"], "javascript");
    }

    #[tokio::test]
    async fn test_disposed_session_discards_in_flight_load() {
        let mut store = TestStore::default();
        let version_id = seed_version(&store, "v1", &[("/a", HttpMethod::Get)]).await;
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        store.gate = Some(Gate {
            version_id: version_id.clone(),
            entered: entered.clone(),
            release: release.clone(),
        });

        let session = renderer(store).session();
        let loader = session.clone();
        let id = version_id.clone();
        let task = tokio::spawn(async move { loader.load(&id).await });

        entered.notified().await;
        session.dispose();
        release.notify_one();

        assert!(!task.await.unwrap());
        assert_eq!(session.status(), ViewStatus::Loading);
        assert!(session.with_view(|view| view.endpoints().is_empty()));
        assert!(!session.load(&version_id).await);
    }

    #[tokio::test]
    async fn test_newer_load_wins_over_stale_one() {
        let mut store = TestStore::default();
        let slow_version = seed_version(&store, "v1", &[("/slow", HttpMethod::Get)]).await;
        let fast_version = seed_version(&store, "v2", &[("/fast", HttpMethod::Get)]).await;
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        store.gate = Some(Gate {
            version_id: slow_version.clone(),
            entered: entered.clone(),
            release: release.clone(),
        });

        let session = renderer(store).session();
        let loader = session.clone();
        let task = tokio::spawn(async move { loader.load(&slow_version).await });

        entered.notified().await;
        assert!(session.load(&fast_version).await);
        release.notify_one();

        assert!(!task.await.unwrap());
        assert_eq!(
            session.with_view(|view| view.active_endpoint().map(|e| e.path.clone())),
            Some("/fast".to_string())
        );
    }
}
