use crate::core::{
    embedding::Embedder,
    filters::filter_eligible,
    scoring::calculate_confidence,
    similarity::{cosine_similarity, profile_text},
};
use crate::error::MatchError;
use crate::models::{BonusWeights, MatchResult, Scholarship, UserProfile};

/// Number of matches returned per request
pub const DEFAULT_TOP_K: usize = 3;

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    pub eligible: usize,
    /// Eligible scholarships dropped for lacking a usable embedding
    pub skipped: usize,
}

impl MatchOutcome {
    fn empty(total_candidates: usize) -> Self {
        Self {
            matches: Vec::new(),
            total_candidates,
            eligible: 0,
            skipped: 0,
        }
    }
}

/// Matching orchestrator over an already loaded catalog
///
/// # Pipeline Stages
/// 1. Eligibility filtering (GPA, country, education level)
/// 2. Profile encoding (once per request, only when something is eligible)
/// 3. Cosine similarity against each precomputed scholarship embedding
/// 4. Bonus aggregation, stable ranking and truncation to top-K
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: BonusWeights,
    top_k: usize,
}

impl Matcher {
    pub fn new(weights: BonusWeights, top_k: usize) -> Self {
        Self { weights, top_k }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: BonusWeights::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn weights(&self) -> &BonusWeights {
        &self.weights
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Find the best scholarships for a student
    ///
    /// # Arguments
    /// * `user` - The student's profile
    /// * `candidates` - The full catalog, in catalog order
    /// * `embedder` - Encoder used for the profile text
    ///
    /// # Returns
    /// MatchOutcome with at most `top_k` matches, best first
    pub fn find_matches(
        &self,
        user: &UserProfile,
        candidates: Vec<Scholarship>,
        embedder: &dyn Embedder,
    ) -> MatchOutcome {
        let total_candidates = candidates.len();

        let eligible = filter_eligible(user, candidates);
        if eligible.is_empty() {
            return MatchOutcome::empty(total_candidates);
        }

        let eligible_count = eligible.len();
        let user_embedding = embedder.encode(&profile_text(user));
        let (matches, skipped) = self.rank(user, &user_embedding, embedder.model_name(), eligible);

        MatchOutcome {
            matches,
            total_candidates,
            eligible: eligible_count,
            skipped,
        }
    }

    /// Score and rank eligible scholarships against an encoded profile
    ///
    /// Returns the top-K matches and the number of scholarships skipped for
    /// a missing, wrongly sized or foreign-model embedding. Equal confidences
    /// keep catalog order.
    pub fn rank(
        &self,
        user: &UserProfile,
        user_embedding: &[f32],
        model: &str,
        eligible: Vec<Scholarship>,
    ) -> (Vec<MatchResult>, usize) {
        let mut skipped = 0;

        let mut ranked: Vec<MatchResult> = eligible
            .into_iter()
            .filter_map(|mut scholarship| {
                let embedding = match usable_embedding(&scholarship, model, user_embedding.len()) {
                    Ok(embedding) => embedding,
                    Err(e) => {
                        tracing::warn!("Skipping scholarship {}: {}", scholarship.id, e);
                        skipped += 1;
                        return None;
                    }
                };

                let similarity = cosine_similarity(user_embedding, embedding);
                let confidence = calculate_confidence(similarity, user, &scholarship, &self.weights);

                scholarship.embedding = None;
                Some(MatchResult {
                    scholarship,
                    confidence,
                })
            })
            .collect();

        // Vec::sort_by is stable
        ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        ranked.truncate(self.top_k);

        (ranked, skipped)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn usable_embedding<'a>(
    scholarship: &'a Scholarship,
    model: &str,
    dimension: usize,
) -> Result<&'a [f32], MatchError> {
    // Vectors from different models are not comparable, even at equal length
    if scholarship.embedding_model.as_deref() != Some(model) {
        return Err(MatchError::InvalidEmbeddingState {
            scholarship: scholarship.name.clone(),
            reason: format!(
                "embedded by {}, profiles are encoded by {}",
                scholarship.embedding_model.as_deref().unwrap_or("an unrecorded model"),
                model
            ),
        });
    }

    match scholarship.embedding.as_deref() {
        None => Err(MatchError::InvalidEmbeddingState {
            scholarship: scholarship.name.clone(),
            reason: "no precomputed embedding".to_string(),
        }),
        Some(embedding) if embedding.len() != dimension => Err(MatchError::InvalidEmbeddingState {
            scholarship: scholarship.name.clone(),
            reason: format!("expected {} dimensions, found {}", dimension, embedding.len()),
        }),
        Some(embedding) => Ok(embedding),
    }
}
