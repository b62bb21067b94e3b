use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub owner_id: Id,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: String, // ISO 8601 timestamp
    pub updated_at: String,
}

impl Project {
    pub fn new(owner_id: Id, name: String, description: Option<String>) -> Self {
        let now = now_timestamp();
        Self {
            id: generate_id(),
            owner_id,
            name,
            description,
            logo_url: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Apply an owner edit; only provided fields change
    pub fn apply_update(&mut self, update: ProjectUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(logo_url) = update.logo_url {
            self.logo_url = Some(logo_url);
        }
        self.updated_at = now_timestamp();
    }
}

/// Input model for creating a new project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

impl NewProject {
    pub fn into_project(self, owner_id: Id) -> Project {
        Project::new(owner_id, self.name, self.description)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}
