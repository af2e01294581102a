//! Catalog maintenance: embedding new scholarships and loading the sample fixture.
//!
//! Not part of the matching path. Embeddings are computed here exactly once per
//! scholarship, when it enters the catalog.

use chrono::NaiveDate;

use crate::core::embedding::Embedder;
use crate::core::similarity::scholarship_text;
use crate::error::MatchError;
use crate::models::{
    CreateScholarshipRequest, EducationLevel, FinancialNeed, NewScholarship, ScholarshipId,
    GLOBAL_COUNTRY,
};
use crate::services::storage::Storage;

/// Turn a request into a catalog record carrying `embedding`
///
/// The record is stamped with the embedder's model name so vectors from a
/// different model are never scored against it.
pub fn prepare_scholarship(
    req: CreateScholarshipRequest,
    embedding: Vec<f32>,
    embedder: &dyn Embedder,
) -> Result<NewScholarship, MatchError> {
    let dimension = embedder.dimension();
    if embedding.len() != dimension {
        return Err(MatchError::InvalidEmbeddingState {
            scholarship: req.name,
            reason: format!("expected {} dimensions, found {}", dimension, embedding.len()),
        });
    }

    Ok(NewScholarship {
        name: req.name,
        description: req.description,
        amount: req.amount,
        deadline: req.deadline,
        country: Some(req.country),
        min_gpa: req.min_gpa,
        education_level: Some(req.education_level),
        field_of_study: req.field_of_study,
        financial_criteria: req.financial_criteria,
        apply_url: req.apply_url,
        embedding,
        embedding_model: embedder.model_name().to_string(),
    })
}

/// Embed and insert a single scholarship
pub async fn add_scholarship(
    storage: &dyn Storage,
    embedder: &dyn Embedder,
    req: CreateScholarshipRequest,
) -> Result<ScholarshipId, MatchError> {
    let text = scholarship_text(req.description.as_deref(), req.field_of_study.as_deref());
    let embedding = embedder.encode(&text);
    let record = prepare_scholarship(req, embedding, embedder)?;

    Ok(storage.insert_scholarship(&record).await?)
}

/// Insert the sample catalog when the store holds no scholarships yet
///
/// Returns the number of scholarships inserted (0 if the catalog was not empty).
pub async fn seed_if_empty(storage: &dyn Storage, embedder: &dyn Embedder) -> Result<usize, MatchError> {
    let existing = storage.count_scholarships().await?;
    if existing > 0 {
        tracing::info!("Catalog already holds {} scholarships, skipping seed", existing);
        return Ok(0);
    }

    let fixtures = sample_catalog();
    let texts: Vec<String> = fixtures
        .iter()
        .map(|req| scholarship_text(req.description.as_deref(), req.field_of_study.as_deref()))
        .collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let embeddings = embedder.encode_batch(&text_refs);

    let records = fixtures
        .into_iter()
        .zip(embeddings)
        .map(|(req, embedding)| prepare_scholarship(req, embedding, embedder))
        .collect::<Result<Vec<_>, _>>()?;

    // Rechecks emptiness atomically; another replica may have seeded meanwhile
    let inserted = storage.seed_scholarships(&records).await?;
    if inserted == 0 {
        tracing::info!("Catalog was seeded concurrently, skipping seed");
        return Ok(0);
    }

    tracing::info!("Seeded catalog with {} scholarships", inserted);

    Ok(inserted)
}

/// The eight sample scholarships the service ships with
pub fn sample_catalog() -> Vec<CreateScholarshipRequest> {
    use EducationLevel::{Both, Undergraduate, Graduate};
    use FinancialNeed::{High, Medium};

    let fixtures = [
        (
            "Global Excellence Scholarship",
            "Supporting outstanding students pursuing STEM fields with focus on innovation and research",
            15000, "2025-06-15", GLOBAL_COUNTRY, 3.5, Undergraduate,
            "Computer Science, Engineering, Mathematics, Physics", High,
            "https://example.com/apply/global-excellence",
        ),
        (
            "Innovation Leaders Award",
            "For creative students in technology and business who demonstrate leadership potential",
            10000, "2025-05-30", "USA", 3.0, Graduate,
            "Business, Technology, Innovation, Entrepreneurship", Medium,
            "https://example.com/apply/innovation-leaders",
        ),
        (
            "Future Scientists Grant",
            "Encouraging the next generation of researchers in life sciences and medical fields",
            8000, "2025-07-10", GLOBAL_COUNTRY, 3.2, Both,
            "Biology, Chemistry, Physics, Medicine, Biotechnology", High,
            "https://example.com/apply/future-scientists",
        ),
        (
            "Creative Arts Fellowship",
            "Supporting artistic and creative endeavors in visual arts, music, and creative writing",
            12000, "2025-04-20", GLOBAL_COUNTRY, 2.8, Both,
            "Art, Design, Creative Writing, Music, Film, Theater", Medium,
            "https://example.com/apply/creative-arts",
        ),
        (
            "Social Impact Scholarship",
            "For students working on social change projects and community development initiatives",
            7500, "2025-08-15", GLOBAL_COUNTRY, 3.0, Both,
            "Social Work, Psychology, Public Policy, Sociology, International Relations", High,
            "https://example.com/apply/social-impact",
        ),
        (
            "International Student Aid",
            "Supporting international students in higher education with focus on cultural exchange",
            9000, "2025-09-01", "USA", 3.3, Both,
            "Any field of study welcome", High,
            "https://example.com/apply/international-aid",
        ),
        (
            "Tech Diversity Initiative",
            "Promoting diversity in technology fields with mentorship and career support",
            11000, "2025-03-31", GLOBAL_COUNTRY, 3.1, Both,
            "Computer Science, Software Engineering, Data Science, Cybersecurity", Medium,
            "https://example.com/apply/tech-diversity",
        ),
        (
            "Environmental Leadership Grant",
            "For students passionate about environmental conservation and sustainable development",
            6500, "2025-10-15", GLOBAL_COUNTRY, 2.9, Both,
            "Environmental Science, Sustainability, Climate Studies, Green Technology", High,
            "https://example.com/apply/environmental-leadership",
        ),
    ];

    fixtures
        .into_iter()
        .map(
            |(name, description, amount, deadline, country, min_gpa, level, fields, criteria, url)| {
                CreateScholarshipRequest {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    amount: Some(amount),
                    deadline: NaiveDate::parse_from_str(deadline, "%Y-%m-%d").ok(),
                    country: country.to_string(),
                    min_gpa: Some(min_gpa),
                    education_level: level,
                    field_of_study: Some(fields.to_string()),
                    financial_criteria: Some(criteria),
                    apply_url: Some(url.to_string()),
                }
            },
        )
        .collect()
}
