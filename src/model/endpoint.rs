use crate::model::{generate_id, now_timestamp, BadgeColor, Document, Id};
use serde::{Deserialize, Serialize};

/// HTTP verbs an endpoint can be documented under.
///
/// Parsing is case-insensitive; the canonical form is uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Lowercase verb, as used by client libraries such as `requests.get`
    pub fn verb(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    pub fn badge_color(&self) -> BadgeColor {
        match self {
            HttpMethod::Get => BadgeColor::Green,
            HttpMethod::Post => BadgeColor::Blue,
            HttpMethod::Put => BadgeColor::Yellow,
            HttpMethod::Delete => BadgeColor::Red,
            HttpMethod::Patch => BadgeColor::Purple,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(format!("Unknown HTTP method: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: Id,
    pub api_version_id: Id,
    pub path: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub request_body: Option<Document>,
    pub response_schema: Option<Document>,
    pub examples: Option<Document>,
    pub created_at: String,
    pub updated_at: String,
}

impl Endpoint {
    pub fn new(api_version_id: Id, path: String, method: HttpMethod) -> Self {
        let now = now_timestamp();
        Self {
            id: generate_id(),
            api_version_id,
            path,
            method,
            summary: None,
            description: None,
            request_body: None,
            response_schema: None,
            examples: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_request_body(mut self, body: Document) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn with_response_schema(mut self, schema: Document) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    /// A JSON `null` body counts as no body
    pub fn request_body(&self) -> Option<&Document> {
        self.request_body.as_ref().filter(|body| !body.is_null())
    }
}

/// Input model for authoring an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEndpoint {
    pub path: String,
    pub method: HttpMethod,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub request_body: Option<Document>,
    #[serde(default)]
    pub response_schema: Option<Document>,
    #[serde(default)]
    pub examples: Option<Document>,
}

impl NewEndpoint {
    pub fn validate(&self) -> Result<(), String> {
        if !self.path.starts_with('/') {
            return Err(format!("Endpoint path '{}' must begin with '/'", self.path));
        }
        if self.path.chars().any(char::is_whitespace) {
            return Err(format!("Endpoint path '{}' must not contain whitespace", self.path));
        }
        Ok(())
    }

    pub fn into_endpoint(self, api_version_id: Id) -> Endpoint {
        let mut endpoint = Endpoint::new(api_version_id, self.path, self.method);
        endpoint.summary = self.summary;
        endpoint.description = self.description;
        endpoint.request_body = self.request_body;
        endpoint.response_schema = self.response_schema;
        endpoint.examples = self.examples;
        endpoint
    }
}
