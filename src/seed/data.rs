use crate::api::user_extractor::DEV_USER_ID;
use crate::logic::VersionLifecycle;
use crate::model::{ApiVersion, Document, Endpoint, HttpMethod, Id, Project, VersionStatus};
use crate::store::traits::Store;
use anyhow::Result;
use serde_json::json;

/// Demo project owned by the development user: `v1` published, `v2` still a draft
pub async fn load_seed_data<S: Store + ?Sized>(store: &S) -> Result<Id> {
    let project = store
        .create_project(Project::new(
            DEV_USER_ID.to_string(),
            "Bookstore API".to_string(),
            Some("Catalogue and ordering API for the demo bookstore".to_string()),
        ))
        .await?;

    let mut v1 = store
        .create_api_version(ApiVersion::new(project.id.clone(), "v1".to_string(), None))
        .await?;
    for endpoint in bookstore_endpoints(&v1.id) {
        store.create_endpoint(endpoint).await?;
    }
    VersionLifecycle::publish(&mut v1)?;
    store.update_api_version(v1, VersionStatus::Draft).await?;

    let v2 = store
        .create_api_version(ApiVersion::new(project.id.clone(), "v2".to_string(), None))
        .await?;
    for endpoint in bookstore_endpoints(&v2.id) {
        store.create_endpoint(endpoint).await?;
    }
    store
        .create_endpoint(
            Endpoint::new(v2.id.clone(), "/books/{id}/reviews".to_string(), HttpMethod::Get)
                .with_summary("List reviews of a book"),
        )
        .await?;

    Ok(project.id)
}

fn bookstore_endpoints(version_id: &Id) -> Vec<Endpoint> {
    let book_schema = Document::from(json!({
        "id": "string",
        "title": "string",
        "author": "string",
        "price": "number",
        "in_stock": "boolean"
    }));

    vec![
        Endpoint::new(version_id.clone(), "/books".to_string(), HttpMethod::Get)
            .with_summary("List books")
            .with_response_schema(Document::Array(vec![book_schema.clone()])),
        Endpoint::new(version_id.clone(), "/books".to_string(), HttpMethod::Post)
            .with_summary("Add a book to the catalogue")
            .with_request_body(Document::from(json!({
                "title": "Notes on the Analytical Engine",
                "author": "Ada Lovelace",
                "price": 12.5,
                "in_stock": true
            })))
            .with_response_schema(book_schema.clone()),
        Endpoint::new(version_id.clone(), "/books/{id}".to_string(), HttpMethod::Delete)
            .with_summary("Remove a book"),
        Endpoint::new(version_id.clone(), "/orders".to_string(), HttpMethod::Post)
            .with_summary("Place an order")
            .with_request_body(Document::from(json!({
                "book_id": "string",
                "quantity": 1
            }))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::{ApiVersionStore, EndpointStore};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_seed_creates_published_and_draft_versions() {
        let store = MemoryStore::new();
        let project_id = load_seed_data(&store).await.unwrap();

        let versions = store.list_api_versions_by_project(&project_id).await.unwrap();
        assert_eq!(versions.len(), 2);
        let v1 = versions.iter().find(|v| v.version_name == "v1").unwrap();
        let v2 = versions.iter().find(|v| v.version_name == "v2").unwrap();
        assert_eq!(v1.status, VersionStatus::Published);
        assert_eq!(v2.status, VersionStatus::Draft);

        let endpoints = store.list_endpoints_by_version(&v1.id).await.unwrap();
        assert_eq!(endpoints.len(), 4);
        assert_eq!(endpoints[0].path, "/books");
        assert_eq!(store.list_endpoints_by_version(&v2.id).await.unwrap().len(), 5);
    }
}
