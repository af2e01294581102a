use std::sync::Arc;

use crate::core::embedding::Embedder;
use crate::core::matcher::Matcher;
use crate::error::MatchError;
use crate::models::{MatchResult, UserId};
use crate::services::Storage;

/// End-to-end matching for a stored user
///
/// Owns handles to the store and the shared embedder; both are injected by the
/// service root so tests can substitute an in-memory store and a stub encoder.
#[derive(Clone)]
pub struct MatchPipeline {
    storage: Arc<dyn Storage>,
    embedder: Arc<dyn Embedder>,
    matcher: Matcher,
}

impl MatchPipeline {
    pub fn new(storage: Arc<dyn Storage>, embedder: Arc<dyn Embedder>, matcher: Matcher) -> Self {
        Self {
            storage,
            embedder,
            matcher,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Compute the top matches for a user
    ///
    /// Single pass, no retries: a missing user is `MatchError::NotFound`, any
    /// other storage failure is `MatchError::StorageUnavailable`. No eligible
    /// scholarship is an empty result, not an error.
    pub async fn compute_matches(&self, user_id: UserId) -> Result<Vec<MatchResult>, MatchError> {
        let user = self.storage.get_user(user_id).await?;
        let catalog = self.storage.list_scholarships().await?;

        let outcome = self
            .matcher
            .find_matches(&user, catalog, self.embedder.as_ref());

        if outcome.skipped > 0 {
            tracing::warn!(
                "{} eligible scholarships lack a usable embedding",
                outcome.skipped
            );
        }

        tracing::info!(
            "Returning {} matches for user {} ({} eligible of {} scholarships)",
            outcome.matches.len(),
            user_id,
            outcome.eligible,
            outcome.total_candidates
        );

        Ok(outcome.matches)
    }
}
