use anyhow::{Context, Result};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::error::DocError;
use crate::model::{
    ApiVersion, ApiVersionWithProject, Document, Endpoint, Feedback, Id, Project, ProjectUpdate,
    VersionStatus,
};
use crate::store::traits::{ApiVersionStore, EndpointStore, FeedbackStore, ProjectStore, Store};

const UNIQUE_VIOLATION: &str = "23505";

const VERSION_COLUMNS: &str =
    "v.id, v.project_id, v.version_name, v.spec, v.generated_docs, v.status, v.created_at, v.updated_at";

const ENDPOINT_COLUMNS: &str = "id, api_version_id, path, method, summary, description, request_body, response_schema, examples, created_at, updated_at";

const FEEDBACK_COLUMNS: &str =
    "id, user_id, endpoint_id, api_version_id, feedback_type, content, status, created_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// Documents are stored as TEXT so object key order survives the round trip.
fn encode_document(document: &Option<Document>) -> Result<Option<String>> {
    document
        .as_ref()
        .map(|doc| serde_json::to_string(doc).context("Failed to encode document"))
        .transpose()
}

fn decode_document(row: &PgRow, column: &str) -> Result<Option<Document>> {
    decode_document_text(row.try_get(column)?, column)
}

fn decode_document_text(raw: Option<String>, column: &str) -> Result<Option<Document>> {
    raw.map(|text| {
        serde_json::from_str(&text).with_context(|| format!("Corrupt document in column '{}'", column))
    })
    .transpose()
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.try_get(column)?;
    parse_text(&raw, column)
}

fn parse_text<T>(raw: &str, column: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value in column '{}': {}", column, e))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false)
}

fn project_from_row(row: &PgRow) -> Result<Project> {
    Ok(Project {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        logo_url: row.try_get("logo_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn version_from_row(row: &PgRow) -> Result<ApiVersion> {
    Ok(ApiVersion {
        id: row.try_get("id")?,
        project_id: row.try_get("project_id")?,
        version_name: row.try_get("version_name")?,
        spec: decode_document(row, "spec")?,
        generated_docs: decode_document(row, "generated_docs")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn endpoint_from_row(row: &PgRow) -> Result<Endpoint> {
    Ok(Endpoint {
        id: row.try_get("id")?,
        api_version_id: row.try_get("api_version_id")?,
        path: row.try_get("path")?,
        method: parse_column(row, "method")?,
        summary: row.try_get("summary")?,
        description: row.try_get("description")?,
        request_body: decode_document(row, "request_body")?,
        response_schema: decode_document(row, "response_schema")?,
        examples: decode_document(row, "examples")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn feedback_from_row(row: &PgRow) -> Result<Feedback> {
    Ok(Feedback {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        endpoint_id: row.try_get("endpoint_id")?,
        api_version_id: row.try_get("api_version_id")?,
        feedback_type: parse_column(row, "feedback_type")?,
        content: row.try_get("content")?,
        status: parse_column(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl ProjectStore for PostgresStore {
    async fn get_project(&self, id: &Id) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch project")?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn list_projects_by_owner(&self, owner_id: &Id) -> Result<Vec<Project>> {
        let rows = sqlx::query("SELECT * FROM projects WHERE owner_id = $1 ORDER BY updated_at DESC, id")
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")?;

        rows.iter().map(project_from_row).collect()
    }

    async fn create_project(&self, project: Project) -> Result<Project> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, owner_id, name, description, logo_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&project.id)
        .bind(&project.owner_id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.logo_url)
        .bind(&project.created_at)
        .bind(&project.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create project")?;

        Ok(project)
    }

    async fn update_project(&self, id: &Id, update: ProjectUpdate) -> Result<Option<Project>> {
        let Some(mut project) = self.get_project(id).await? else {
            return Ok(None);
        };
        project.apply_update(update);

        sqlx::query(
            "UPDATE projects SET name = $2, description = $3, logo_url = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.logo_url)
        .bind(&project.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to update project")?;

        Ok(Some(project))
    }
}

#[async_trait::async_trait]
impl ApiVersionStore for PostgresStore {
    async fn get_api_version(&self, id: &Id) -> Result<Option<ApiVersion>> {
        let row = sqlx::query(&format!("SELECT {} FROM api_versions v WHERE v.id = $1", VERSION_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch API version")?;

        row.as_ref().map(version_from_row).transpose()
    }

    async fn get_api_version_with_project(&self, id: &Id) -> Result<Option<ApiVersionWithProject>> {
        let row = sqlx::query(&format!(
            "SELECT {}, p.name AS project_name FROM api_versions v JOIN projects p ON p.id = v.project_id WHERE v.id = $1",
            VERSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch API version")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(ApiVersionWithProject {
            version: version_from_row(&row)?,
            project_name: row.try_get("project_name")?,
        }))
    }

    async fn list_api_versions_by_project(&self, project_id: &Id) -> Result<Vec<ApiVersion>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM api_versions v WHERE v.project_id = $1 ORDER BY v.created_at DESC, v.id",
            VERSION_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list API versions")?;

        rows.iter().map(version_from_row).collect()
    }

    async fn create_api_version(&self, version: ApiVersion) -> Result<ApiVersion> {
        let result = sqlx::query(
            r#"
            INSERT INTO api_versions (id, project_id, version_name, spec, generated_docs, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&version.id)
        .bind(&version.project_id)
        .bind(&version.version_name)
        .bind(encode_document(&version.spec)?)
        .bind(encode_document(&version.generated_docs)?)
        .bind(version.status.as_str())
        .bind(&version.created_at)
        .bind(&version.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(version),
            Err(e) if is_unique_violation(&e) => Err(DocError::Conflict(format!(
                "Version '{}' already exists in project '{}'",
                version.version_name, version.project_id
            ))
            .into()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to create API version")),
        }
    }

    async fn update_api_version(&self, version: ApiVersion, expected_status: VersionStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE api_versions
            SET version_name = $2, spec = $3, generated_docs = $4, status = $5, updated_at = $6
            WHERE id = $1 AND status = $7
            "#,
        )
        .bind(&version.id)
        .bind(&version.version_name)
        .bind(encode_document(&version.spec)?)
        .bind(encode_document(&version.generated_docs)?)
        .bind(version.status.as_str())
        .bind(&version.updated_at)
        .bind(expected_status.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to update API version")?;

        if result.rows_affected() > 0 {
            return Ok(());
        }
        match self.get_api_version(&version.id).await? {
            Some(current) => Err(DocError::Conflict(format!(
                "Version '{}' is {}, expected {}",
                current.version_name, current.status, expected_status
            ))
            .into()),
            None => Err(DocError::not_found("Version", version.id).into()),
        }
    }
}

#[async_trait::async_trait]
impl EndpointStore for PostgresStore {
    async fn get_endpoint(&self, id: &Id) -> Result<Option<Endpoint>> {
        let row = sqlx::query(&format!("SELECT {} FROM endpoints WHERE id = $1", ENDPOINT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch endpoint")?;

        row.as_ref().map(endpoint_from_row).transpose()
    }

    async fn list_endpoints_by_version(&self, api_version_id: &Id) -> Result<Vec<Endpoint>> {
        // Byte-wise collation so ordering matches plain string comparison
        let rows = sqlx::query(&format!(
            r#"SELECT {} FROM endpoints WHERE api_version_id = $1 ORDER BY path COLLATE "C", method COLLATE "C""#,
            ENDPOINT_COLUMNS
        ))
        .bind(api_version_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list endpoints")?;

        rows.iter().map(endpoint_from_row).collect()
    }

    async fn create_endpoint(&self, endpoint: Endpoint) -> Result<Endpoint> {
        let result = sqlx::query(
            r#"
            INSERT INTO endpoints (id, api_version_id, path, method, summary, description,
                                   request_body, response_schema, examples, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&endpoint.id)
        .bind(&endpoint.api_version_id)
        .bind(&endpoint.path)
        .bind(endpoint.method.as_str())
        .bind(&endpoint.summary)
        .bind(&endpoint.description)
        .bind(encode_document(&endpoint.request_body)?)
        .bind(encode_document(&endpoint.response_schema)?)
        .bind(encode_document(&endpoint.examples)?)
        .bind(&endpoint.created_at)
        .bind(&endpoint.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(endpoint),
            Err(e) if is_unique_violation(&e) => Err(DocError::Conflict(format!(
                "{} {} is already documented in this version",
                endpoint.method, endpoint.path
            ))
            .into()),
            Err(e) => Err(anyhow::Error::new(e).context("Failed to create endpoint")),
        }
    }
}

#[async_trait::async_trait]
impl FeedbackStore for PostgresStore {
    async fn create_feedback(&self, feedback: Feedback) -> Result<Feedback> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, user_id, endpoint_id, api_version_id, feedback_type, content, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&feedback.id)
        .bind(&feedback.user_id)
        .bind(&feedback.endpoint_id)
        .bind(&feedback.api_version_id)
        .bind(feedback.feedback_type.to_string())
        .bind(&feedback.content)
        .bind(feedback.status.to_string())
        .bind(&feedback.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create feedback")?;

        Ok(feedback)
    }

    async fn list_feedback_for_version(&self, api_version_id: &Id) -> Result<Vec<Feedback>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM feedback WHERE api_version_id = $1 ORDER BY created_at DESC",
            FEEDBACK_COLUMNS
        ))
        .bind(api_version_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list feedback")?;

        rows.iter().map(feedback_from_row).collect()
    }

    async fn list_feedback_for_endpoint(&self, endpoint_id: &Id) -> Result<Vec<Feedback>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM feedback WHERE endpoint_id = $1 ORDER BY created_at DESC",
            FEEDBACK_COLUMNS
        ))
        .bind(endpoint_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list feedback")?;

        rows.iter().map(feedback_from_row).collect()
    }
}

impl Store for PostgresStore {}
