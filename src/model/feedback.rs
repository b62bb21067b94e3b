use crate::model::{generate_id, now_timestamp, Id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Bug,
    Suggestion,
    Question,
    Praise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    Open,
    Acknowledged,
    Resolved,
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FeedbackType::Bug => write!(f, "bug"),
            FeedbackType::Suggestion => write!(f, "suggestion"),
            FeedbackType::Question => write!(f, "question"),
            FeedbackType::Praise => write!(f, "praise"),
        }
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bug" => Ok(FeedbackType::Bug),
            "suggestion" => Ok(FeedbackType::Suggestion),
            "question" => Ok(FeedbackType::Question),
            "praise" => Ok(FeedbackType::Praise),
            _ => Err(format!("Unknown feedback type: {}", s)),
        }
    }
}

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FeedbackStatus::Open => write!(f, "open"),
            FeedbackStatus::Acknowledged => write!(f, "acknowledged"),
            FeedbackStatus::Resolved => write!(f, "resolved"),
        }
    }
}

impl std::str::FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(FeedbackStatus::Open),
            "acknowledged" => Ok(FeedbackStatus::Acknowledged),
            "resolved" => Ok(FeedbackStatus::Resolved),
            _ => Err(format!("Unknown feedback status: {}", s)),
        }
    }
}

/// Reader feedback attached to a version, one of its endpoints, or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Id,
    pub user_id: Id,
    pub endpoint_id: Option<Id>,
    pub api_version_id: Option<Id>,
    pub feedback_type: FeedbackType,
    pub content: String,
    pub status: FeedbackStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub endpoint_id: Option<Id>,
    pub feedback_type: FeedbackType,
    pub content: String,
}

impl NewFeedback {
    pub fn into_feedback(self, user_id: Id, api_version_id: Option<Id>) -> Feedback {
        Feedback {
            id: generate_id(),
            user_id,
            endpoint_id: self.endpoint_id,
            api_version_id,
            feedback_type: self.feedback_type,
            content: self.content,
            status: FeedbackStatus::default(),
            created_at: now_timestamp(),
        }
    }
}
