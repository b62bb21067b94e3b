use crate::model::{generate_id, now_timestamp, BadgeColor, Document, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,      // Being authored, not visible to consumers
    Published,  // Live documentation
    Deprecated, // Still readable, scheduled for removal
}

impl VersionStatus {
    pub fn badge_color(&self) -> BadgeColor {
        match self {
            VersionStatus::Published => BadgeColor::Green,
            VersionStatus::Draft => BadgeColor::Yellow,
            VersionStatus::Deprecated => BadgeColor::Slate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Published => "published",
            VersionStatus::Deprecated => "deprecated",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VersionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(VersionStatus::Draft),
            "published" => Ok(VersionStatus::Published),
            "deprecated" => Ok(VersionStatus::Deprecated),
            _ => Err(format!("Unknown version status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiVersion {
    pub id: Id,
    pub project_id: Id,
    pub version_name: String,
    pub spec: Option<Document>,
    pub generated_docs: Option<Document>,
    pub status: VersionStatus,
    pub created_at: String, // ISO 8601 timestamp
    pub updated_at: String,
}

impl ApiVersion {
    /// New versions always start as drafts
    pub fn new(project_id: Id, version_name: String, spec: Option<Document>) -> Self {
        let now = now_timestamp();
        Self {
            id: generate_id(),
            project_id,
            version_name,
            spec,
            generated_docs: None,
            status: VersionStatus::Draft,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// A version joined with the name of its owning project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiVersionWithProject {
    #[serde(flatten)]
    pub version: ApiVersion,
    pub project_name: String,
}

/// Input model for creating a new version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApiVersion {
    pub version_name: String,
    #[serde(default)]
    pub spec: Option<Document>,
}

impl NewApiVersion {
    pub fn into_api_version(self, project_id: Id) -> ApiVersion {
        ApiVersion::new(project_id, self.version_name, self.spec)
    }
}
