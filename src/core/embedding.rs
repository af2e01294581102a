//! Embedding providers
//!
//! An [`Embedder`] turns free text into a fixed-length vector. It is built once
//! at startup, shared behind an `Arc`, and only ever read afterwards.

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Output dimension of all-MiniLM-L6-v2, used as the default everywhere
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Errors raised while constructing an embedder
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("Embedding backend '{0}' is not compiled in")]
    BackendUnavailable(String),

    #[error("Invalid embedding dimension: {0}")]
    InvalidDimension(usize),
}

/// Text-to-vector encoder
///
/// Implementations must be deterministic and must never fail: text that cannot
/// be encoded (including the empty string) maps to the zero vector.
pub trait Embedder: Send + Sync {
    /// Model identifier, reported by the health endpoint
    fn model_name(&self) -> &str;

    /// Length of every vector returned by [`Embedder::encode`]
    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Vec<f32>;

    fn encode_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

/// Which embedder the service should construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Hashing,
    Fastembed,
}

/// Build the configured embedder
pub fn build_embedder(
    backend: EmbeddingBackend,
    dimension: usize,
    cache_dir: Option<PathBuf>,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match backend {
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::new(dimension)?)),
        #[cfg(feature = "fastembed")]
        EmbeddingBackend::Fastembed => Ok(Arc::new(FastEmbedder::new(cache_dir)?)),
        #[cfg(not(feature = "fastembed"))]
        EmbeddingBackend::Fastembed => {
            let _ = cache_dir;
            Err(EmbeddingError::BackendUnavailable("fastembed".to_string()))
        }
    }
}

/// Feature-hashing embedder
///
/// Each lowercase word adds 2.0 and each character trigram adds 1.0 to a bucket
/// chosen by its blake3 hash; the result is L2-normalised. blake3 keeps the
/// bucket assignment identical across builds, so stored catalog embeddings
/// stay comparable with freshly encoded profiles.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(dimension));
        }
        Ok(Self { dimension })
    }

    #[inline]
    fn bucket(&self, feature: &str) -> usize {
        let hash = blake3::hash(feature.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(prefix) % self.dimension as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let normalized = text.to_lowercase();

        let words = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty());

        for word in words {
            vector[self.bucket(word)] += 2.0;

            let chars: Vec<char> = format!(" {} ", word).chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(&trigram)] += 1.0;
            }
        }

        let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }

        vector
    }
}

/// all-MiniLM-L6-v2 sentence embeddings through the ONNX runtime
#[cfg(feature = "fastembed")]
pub struct FastEmbedder {
    model: fastembed::TextEmbedding,
}

#[cfg(feature = "fastembed")]
impl FastEmbedder {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;

        tracing::info!("Loaded sentence-transformers/all-MiniLM-L6-v2");
        Ok(Self { model })
    }
}

#[cfg(feature = "fastembed")]
impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        "sentence-transformers/all-MiniLM-L6-v2"
    }

    fn dimension(&self) -> usize {
        DEFAULT_EMBEDDING_DIM
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return vec![0.0; DEFAULT_EMBEDDING_DIM];
        }

        match self.model.embed(vec![text], None) {
            Ok(mut vectors) => vectors
                .pop()
                .unwrap_or_else(|| vec![0.0; DEFAULT_EMBEDDING_DIM]),
            Err(e) => {
                tracing::warn!("Embedding failed, using zero vector: {}", e);
                vec![0.0; DEFAULT_EMBEDDING_DIM]
            }
        }
    }

    fn encode_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        encode_non_empty(texts, DEFAULT_EMBEDDING_DIM, |batch| {
            match self.model.embed(batch.clone(), None) {
                Ok(vectors) => vectors,
                Err(e) => {
                    tracing::warn!("Batch embedding failed, encoding one by one: {}", e);
                    batch.iter().map(|text| self.encode(text)).collect()
                }
            }
        })
    }
}

/// Run a batch encoder over the non-blank texts only
///
/// Blank texts get the zero vector without reaching `embed`, as does any
/// position the encoder fails to return a vector for.
#[cfg_attr(not(feature = "fastembed"), allow(dead_code))]
fn encode_non_empty<'a, F>(texts: &[&'a str], dimension: usize, embed: F) -> Vec<Vec<f32>>
where
    F: FnOnce(Vec<&'a str>) -> Vec<Vec<f32>>,
{
    let batch: Vec<&str> = texts.iter().copied().filter(|t| !t.trim().is_empty()).collect();
    let mut encoded = if batch.is_empty() {
        Vec::new().into_iter()
    } else {
        embed(batch).into_iter()
    };

    texts
        .iter()
        .map(|text| {
            if text.trim().is_empty() {
                vec![0.0; dimension]
            } else {
                encoded.next().unwrap_or_else(|| vec![0.0; dimension])
            }
        })
        .collect()
}
