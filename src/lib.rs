pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{DocError, DocResult};

// Export logic types
pub use logic::{
    DocumentationPage, DocumentationRenderer, DocumentationView, ExampleSynthesizer, Language,
    VersionLifecycle, ViewSession, ViewState, ViewStatus,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;

/// Router with state attached, ready to be served
pub fn build_app<S: Store + 'static>(store: Arc<S>, docs: &config::DocsConfig) -> axum::Router {
    api::routes::create_router().with_state(api::handlers::AppState::new(store, docs))
}
