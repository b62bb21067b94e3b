use api_docs_engine::build_app;
use api_docs_engine::config::DocsConfig;
use api_docs_engine::store::MemoryStore;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    /// Serves a fresh in-memory instance on an ephemeral port
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let app = build_app(Arc::new(MemoryStore::new()), &DocsConfig::default());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{}", address),
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .expect("request failed")
    }

    async fn post_empty(&self, path: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request failed")
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .expect("request failed")
    }

    async fn patch(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .patch(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .expect("request failed")
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request failed")
    }

    async fn json(&self, response: reqwest::Response) -> Value {
        let status = response.status();
        assert!(status.is_success(), "unexpected status {}", status);
        response.json().await.expect("invalid json")
    }
}

async fn create_project_with_version(client: &TestClient) -> (String, String) {
    let project = client
        .json(
            client
                .post("/projects", json!({"name": "Users API", "description": "Accounts"}))
                .await,
        )
        .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    let version = client
        .json(
            client
                .post(
                    &format!("/projects/{}/versions", project_id),
                    json!({"version_name": "v1"}),
                )
                .await,
        )
        .await;
    assert_eq!(version["status"], "draft");
    (project_id, version["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_documentation_workflow() {
    let client = TestClient::spawn().await;
    let (project_id, version_id) = create_project_with_version(&client).await;

    for path in ["/b", "/a", "/c"] {
        client
            .json(
                client
                    .post(
                        &format!("/versions/{}/endpoints", version_id),
                        json!({"path": path, "method": "GET"}),
                    )
                    .await,
            )
            .await;
    }
    let create_user = client
        .json(
            client
                .post(
                    &format!("/versions/{}/endpoints", version_id),
                    json!({
                        "path": "/users",
                        "method": "POST",
                        "summary": "Create a user",
                        "request_body": {"name": "Ada"}
                    }),
                )
                .await,
        )
        .await;
    let create_user_id = create_user["id"].as_str().unwrap();

    // Sidebar is ordered by path and the first entry is active
    let page = client
        .json(client.get(&format!("/versions/{}/docs", version_id)).await)
        .await;
    assert_eq!(page["title"], "Users API - v1");
    assert_eq!(page["status"]["state"], "ready");
    let paths: Vec<&str> = page["sidebar"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/a", "/b", "/c", "/users"]);
    assert_eq!(page["active"]["path"], "/a");
    assert_eq!(page["active"]["code_example"]["language"], "curl");
    assert_eq!(
        page["active"]["code_example"]["code"],
        "curl -X GET \"https://api.example.com/a\""
    );

    // Selecting an endpoint and a language
    let page = client
        .json(
            client
                .get(&format!(
                    "/versions/{}/docs?endpoint={}&language=python",
                    version_id, create_user_id
                ))
                .await,
        )
        .await;
    assert_eq!(page["active"]["path"], "/users");
    assert_eq!(page["active"]["request"], "{\n  \"name\": \"Ada\"\n}");
    assert_eq!(page["active"]["code_example"]["highlight_syntax"], "python");
    assert!(page["active"]["code_example"]["code"]
        .as_str()
        .unwrap()
        .starts_with("import requests\n\nresponse = requests.post("));

    // Plain-text examples
    let curl = client
        .get(&format!(
            "/versions/{}/endpoints/{}/examples/curl",
            version_id, create_user_id
        ))
        .await;
    assert_eq!(curl.status(), StatusCode::OK);
    assert_eq!(
        curl.text().await.unwrap(),
        "curl -X POST \"https://api.example.com/users\" -H \"Content-Type: application/json\" -d '{\n  \"name\": \"Ada\"\n}'"
    );
    let unknown = client
        .get(&format!(
            "/versions/{}/endpoints/{}/examples/cobol",
            version_id, create_user_id
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(unknown.text().await.unwrap(), "");

    // Lifecycle
    let published = client
        .json(client.post_empty(&format!("/versions/{}/publish", version_id)).await)
        .await;
    assert_eq!(published["status"], "published");
    let again = client.post_empty(&format!("/versions/{}/publish", version_id)).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let deprecated = client
        .json(client.post_empty(&format!("/versions/{}/deprecate", version_id)).await)
        .await;
    assert_eq!(deprecated["status"], "deprecated");
    let back_to_draft = client
        .put(&format!("/versions/{}/status", version_id), json!({"status": "draft"}))
        .await;
    assert_eq!(back_to_draft.status(), StatusCode::CONFLICT);

    let overview = client
        .json(client.get(&format!("/projects/{}/overview", project_id)).await)
        .await;
    assert_eq!(overview["versions"][0]["status"], "deprecated");
}

#[tokio::test]
async fn test_missing_records_and_validation() {
    let client = TestClient::spawn().await;

    assert_eq!(
        client.get("/versions/missing/docs").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.get("/projects/missing").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.post_empty("/versions/missing/publish").await.status(),
        StatusCode::NOT_FOUND
    );

    let (project_id, version_id) = create_project_with_version(&client).await;

    let duplicate = client
        .post(
            &format!("/projects/{}/versions", project_id),
            json!({"version_name": "v1"}),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let bad_path = client
        .post(
            &format!("/versions/{}/endpoints", version_id),
            json!({"path": "users", "method": "GET"}),
        )
        .await;
    assert_eq!(bad_path.status(), StatusCode::BAD_REQUEST);

    let bad_language = client
        .get(&format!("/versions/{}/docs?language=cobol", version_id))
        .await;
    assert_eq!(bad_language.status(), StatusCode::BAD_REQUEST);

    // A version without endpoints renders an empty sidebar
    let page = client
        .json(client.get(&format!("/versions/{}/docs", version_id)).await)
        .await;
    assert_eq!(page["sidebar"], json!([]));
    assert!(page["active"].is_null());

    let renamed = client
        .json(
            client
                .patch(&format!("/projects/{}", project_id), json!({"name": "Accounts API"}))
                .await,
        )
        .await;
    assert_eq!(renamed["name"], "Accounts API");
}

#[tokio::test]
async fn test_feedback_is_attributed_to_caller() {
    let client = TestClient::spawn().await;
    let (_, version_id) = create_project_with_version(&client).await;

    let response = client
        .client
        .post(&format!("{}/versions/{}/feedback", client.base_url, version_id))
        .header("x-user-id", "reader-7")
        .json(&json!({"feedback_type": "question", "content": "Is paging supported?"}))
        .send()
        .await
        .unwrap();
    let feedback = client.json(response).await;
    assert_eq!(feedback["user_id"], "reader-7");
    assert_eq!(feedback["status"], "open");

    let unknown_endpoint = client
        .post(
            &format!("/versions/{}/feedback", version_id),
            json!({"endpoint_id": "nope", "feedback_type": "bug", "content": "Broken"}),
        )
        .await;
    assert_eq!(unknown_endpoint.status(), StatusCode::NOT_FOUND);

    let listed = client
        .json(client.get(&format!("/versions/{}/feedback", version_id)).await)
        .await;
    assert_eq!(listed["total"], 1);
}
