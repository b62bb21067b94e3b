use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};

use crate::model::{Profile, UserType};

pub const DEV_USER_ID: &str = "dev-user";

/// Axum extractor for the caller's profile.
///
/// Identity comes from headers set by the authenticating proxy:
/// - X-User-Id: user identifier
/// - X-User-Name: optional display name
/// - X-User-Type: optional `developer` | `consumer` (defaults to developer)
///
/// Without headers a development profile is returned.
#[async_trait]
impl<S> FromRequestParts<S> for Profile
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let user_type = match extract_header_value(headers, "x-user-type").as_deref() {
            None | Some("developer") => UserType::Developer,
            Some("consumer") => UserType::Consumer,
            Some(_) => return Err(StatusCode::BAD_REQUEST),
        };

        let id = extract_header_value(headers, "x-user-id").unwrap_or_else(|| DEV_USER_ID.to_string());

        Ok(Profile {
            id,
            user_type,
            full_name: extract_header_value(headers, "x-user-name"),
            avatar_url: None,
        })
    }
}

fn extract_header_value(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
