// Core algorithm exports
pub mod embedding;
pub mod filters;
pub mod matcher;
pub mod pipeline;
pub mod scoring;
pub mod similarity;

pub use embedding::{build_embedder, Embedder, EmbeddingBackend, EmbeddingError, HashingEmbedder};
pub use filters::{filter_eligible, is_eligible};
pub use matcher::{MatchOutcome, Matcher, DEFAULT_TOP_K};
pub use pipeline::MatchPipeline;
pub use scoring::{calculate_confidence, confidence_from_parts, field_bonus, financial_bonus};
pub use similarity::{cosine_similarity, profile_text, scholarship_text};
