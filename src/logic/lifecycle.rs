use log::{info, warn};

use crate::error::{DocError, DocResult};
use crate::model::{ApiVersion, Id, VersionStatus};
use crate::store::traits::ApiVersionStore;

impl VersionStatus {
    /// Only `draft -> published` and `published -> deprecated` are defined.
    /// Nothing ever returns to `draft`.
    pub fn can_transition_to(&self, target: VersionStatus) -> bool {
        matches!(
            (self, target),
            (VersionStatus::Draft, VersionStatus::Published)
                | (VersionStatus::Published, VersionStatus::Deprecated)
        )
    }

    /// Whether readers outside the owning project may browse this version
    pub fn is_public(&self) -> bool {
        match self {
            VersionStatus::Draft => false,
            VersionStatus::Published | VersionStatus::Deprecated => true,
        }
    }
}

/// Owns the `status` field of an [`ApiVersion`]
pub struct VersionLifecycle;

impl VersionLifecycle {
    /// Move a version to `target`, refreshing `updated_at`.
    /// On failure the version is left untouched.
    pub fn transition(version: &mut ApiVersion, target: VersionStatus) -> DocResult<()> {
        if !version.status.can_transition_to(target) {
            warn!(
                "Rejected status change of version '{}' ({}): {} -> {}",
                version.version_name, version.id, version.status, target
            );
            return Err(DocError::InvalidTransition {
                from: version.status,
                to: target,
            });
        }

        version.status = target;
        version.touch();
        Ok(())
    }

    pub fn publish(version: &mut ApiVersion) -> DocResult<()> {
        Self::transition(version, VersionStatus::Published)
    }

    pub fn deprecate(version: &mut ApiVersion) -> DocResult<()> {
        Self::transition(version, VersionStatus::Deprecated)
    }

    /// Load a version, apply the transition and persist the result
    pub async fn apply<S: ApiVersionStore + ?Sized>(
        store: &S,
        version_id: &Id,
        target: VersionStatus,
    ) -> DocResult<ApiVersion> {
        let mut version = store
            .get_api_version(version_id)
            .await
            .map_err(DocError::from_store)?
            .ok_or_else(|| DocError::not_found("Version", version_id.as_str()))?;

        let prior = version.status;
        Self::transition(&mut version, target)?;

        store
            .update_api_version(version.clone(), prior)
            .await
            .map_err(DocError::from_store)?;

        info!(
            "Version '{}' ({}) is now {}",
            version.version_name, version.id, version.status
        );
        Ok(version)
    }
}
