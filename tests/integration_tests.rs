// Integration tests for Scholar Match

use async_trait::async_trait;
use scholar_match::core::{
    cosine_similarity, filter_eligible, is_eligible, field_bonus, financial_bonus, Embedder,
    HashingEmbedder, MatchPipeline, Matcher,
};
use scholar_match::error::MatchError;
use scholar_match::models::{
    BonusWeights, EducationLevel, FeedbackId, FinancialNeed, NewFeedback, NewScholarship,
    ProfileUpdate, Scholarship, ScholarshipId, UserId, UserProfile,
};
use scholar_match::services::catalog::{prepare_scholarship, sample_catalog, seed_if_empty};
use scholar_match::services::{InMemoryStore, Storage, StorageError};
use std::sync::Arc;

/// Encodes every non-empty text to the x axis, so similarity is fully
/// determined by the stored scholarship vectors
struct AxisEmbedder;

impl Embedder for AxisEmbedder {
    fn model_name(&self) -> &str {
        "axis-stub"
    }

    fn dimension(&self) -> usize {
        2
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        if text.is_empty() {
            vec![0.0, 0.0]
        } else {
            vec![1.0, 0.0]
        }
    }
}

/// Store whose backend is always down
struct UnavailableStore;

#[async_trait]
impl Storage for UnavailableStore {
    async fn get_user(&self, _id: UserId) -> Result<UserProfile, StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn list_scholarships(&self) -> Result<Vec<Scholarship>, StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn update_user(&self, _id: UserId, _update: &ProfileUpdate) -> Result<(), StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn insert_feedback(&self, _feedback: &NewFeedback) -> Result<FeedbackId, StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn insert_scholarship(&self, _s: &NewScholarship) -> Result<ScholarshipId, StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn seed_scholarships(&self, _records: &[NewScholarship]) -> Result<usize, StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn count_scholarships(&self) -> Result<i64, StorageError> {
        Err(StorageError::SqlxError(sqlx::Error::PoolTimedOut))
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(false)
    }
}

fn create_student(gpa: f64, country: &str, level: EducationLevel, field: &str, need: FinancialNeed) -> UserProfile {
    UserProfile {
        id: 0,
        name: "Student".to_string(),
        email: "student@example.com".to_string(),
        age: Some(20),
        gpa: Some(gpa),
        country: Some(country.to_string()),
        education_level: Some(level),
        field_of_study: Some(field.to_string()),
        financial_need: Some(need),
        created_at: None,
    }
}

fn reference_student() -> UserProfile {
    create_student(3.6, "USA", EducationLevel::Undergraduate, "Computer Science", FinancialNeed::High)
}

/// Sample catalog where every scholarship has similarity 0.6 to any profile
async fn axis_catalog(store: &InMemoryStore) {
    for req in sample_catalog() {
        let record = prepare_scholarship(req, vec![0.6, 0.8], &AxisEmbedder).unwrap();
        store.insert_scholarship(&record).await.unwrap();
    }
}

#[tokio::test]
async fn test_integration_end_to_end_matching() {
    let store = Arc::new(InMemoryStore::new());
    axis_catalog(&store).await;
    let user_id = store.add_user(reference_student()).await;

    let pipeline = MatchPipeline::new(store.clone(), Arc::new(AxisEmbedder), Matcher::with_default_weights());
    let matches = pipeline.compute_matches(user_id).await.unwrap();

    let names: Vec<&str> = matches.iter().map(|m| m.scholarship.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Global Excellence Scholarship", // field + financial bonus
            "Tech Diversity Initiative",     // field bonus only
            "Future Scientists Grant",       // first of the financial-only ties
        ]
    );

    // (0.6 + 0.3) * 100 lands on 89 or 90 depending on f32 rounding
    assert!((89..=90).contains(&matches[0].confidence));
    assert!(matches[0].confidence > matches[1].confidence);
    assert!(matches[1].confidence > matches[2].confidence);
    assert!(matches.iter().all(|m| m.scholarship.embedding.is_none()));
}

#[tokio::test]
async fn test_global_excellence_scenario() {
    let user = reference_student();
    let weights = BonusWeights::default();
    let store = InMemoryStore::new();
    seed_if_empty(&store, &HashingEmbedder::default()).await.unwrap();

    let catalog = store.list_scholarships().await.unwrap();
    let global = catalog
        .iter()
        .find(|s| s.name == "Global Excellence Scholarship")
        .unwrap();

    assert!(is_eligible(&user, global));
    assert_eq!(field_bonus(&user, global, &weights), 0.2);
    assert_eq!(financial_bonus(&user, global, &weights), 0.1);

    // USA-only graduate award is out for an undergraduate
    let innovation = catalog
        .iter()
        .find(|s| s.name == "Innovation Leaders Award")
        .unwrap();
    assert!(!is_eligible(&user, innovation));
}

#[tokio::test]
async fn test_low_gpa_excluded_everywhere() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(HashingEmbedder::default());
    seed_if_empty(store.as_ref(), embedder.as_ref()).await.unwrap();

    // Field text identical to a scholarship's tags maximises similarity
    let user = create_student(
        2.0,
        "USA",
        EducationLevel::Undergraduate,
        "Art, Design, Creative Writing, Music, Film, Theater",
        FinancialNeed::Medium,
    );
    let catalog = store.list_scholarships().await.unwrap();
    assert!(catalog.iter().all(|s| s.min_gpa.unwrap() > 2.0));
    assert!(filter_eligible(&user, catalog).is_empty());

    let user_id = store.add_user(user).await;
    let pipeline = MatchPipeline::new(store.clone(), embedder, Matcher::with_default_weights());

    assert!(pipeline.compute_matches(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_catalog_returns_empty() {
    let store = Arc::new(InMemoryStore::new());
    let user_id = store.add_user(reference_student()).await;

    let pipeline = MatchPipeline::new(store, Arc::new(HashingEmbedder::default()), Matcher::default());

    let matches = pipeline.compute_matches(user_id).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn test_unknown_user_not_found() {
    let store = Arc::new(InMemoryStore::new());
    let pipeline = MatchPipeline::new(store, Arc::new(HashingEmbedder::default()), Matcher::default());

    let result = pipeline.compute_matches(404).await;
    assert!(matches!(result, Err(MatchError::NotFound(_))));
}

#[tokio::test]
async fn test_storage_failure_surfaces() {
    let pipeline = MatchPipeline::new(
        Arc::new(UnavailableStore),
        Arc::new(HashingEmbedder::default()),
        Matcher::default(),
    );

    let result = pipeline.compute_matches(1).await;
    assert!(matches!(result, Err(MatchError::StorageUnavailable(_))));
}

#[tokio::test]
async fn test_unembedded_scholarship_skipped() {
    let store = Arc::new(InMemoryStore::new());
    axis_catalog(&store).await;

    let mut legacy = store.list_scholarships().await.unwrap().remove(0);
    legacy.name = "Legacy Award".to_string();
    legacy.embedding = None;
    store.add_scholarship(legacy).await;

    let user_id = store.add_user(reference_student()).await;
    let pipeline = MatchPipeline::new(store.clone(), Arc::new(AxisEmbedder), Matcher::default());

    let matches = pipeline.compute_matches(user_id).await.unwrap();
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().all(|m| m.scholarship.name != "Legacy Award"));
}

#[tokio::test]
async fn test_catalog_from_another_model_not_scored() {
    /// Same dimension as the hashing embedder, different model
    struct OtherModel(HashingEmbedder);

    impl Embedder for OtherModel {
        fn model_name(&self) -> &str {
            "other-model"
        }

        fn dimension(&self) -> usize {
            self.0.dimension()
        }

        fn encode(&self, text: &str) -> Vec<f32> {
            self.0.encode(&text.to_uppercase())
        }
    }

    let store = Arc::new(InMemoryStore::new());
    seed_if_empty(store.as_ref(), &HashingEmbedder::default()).await.unwrap();
    let user_id = store.add_user(reference_student()).await;

    let switched = MatchPipeline::new(
        store.clone(),
        Arc::new(OtherModel(HashingEmbedder::default())),
        Matcher::default(),
    );
    assert!(switched.compute_matches(user_id).await.unwrap().is_empty());

    let original = MatchPipeline::new(store, Arc::new(HashingEmbedder::default()), Matcher::default());
    assert_eq!(original.compute_matches(user_id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_profile_update_enables_matching() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(HashingEmbedder::default());
    seed_if_empty(store.as_ref(), embedder.as_ref()).await.unwrap();

    // Freshly registered: no GPA, country or level yet
    let mut registered = reference_student();
    registered.gpa = None;
    registered.country = None;
    registered.education_level = None;
    let user_id = store.add_user(registered).await;

    let pipeline = MatchPipeline::new(store.clone(), embedder, Matcher::default());
    assert!(pipeline.compute_matches(user_id).await.unwrap().is_empty());

    let update = ProfileUpdate {
        age: Some(22),
        country: "Germany".to_string(),
        education_level: EducationLevel::Graduate,
        gpa: 3.4,
        field_of_study: "Biology".to_string(),
        financial_need: FinancialNeed::High,
    };
    store.update_user(user_id, &update).await.unwrap();

    let matches = pipeline.compute_matches(user_id).await.unwrap();
    assert_eq!(matches.len(), 3);
    assert!(matches
        .iter()
        .all(|m| m.scholarship.country.as_deref() == Some("Global")));
}

#[tokio::test]
async fn test_ranking_properties_hold_for_many_profiles() {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(HashingEmbedder::default());
    seed_if_empty(store.as_ref(), embedder.as_ref()).await.unwrap();
    let catalog = store.list_scholarships().await.unwrap();

    let countries = ["USA", "India", "Brazil"];
    let levels = [EducationLevel::Undergraduate, EducationLevel::Graduate, EducationLevel::Both];
    let fields = ["Computer Science", "Music", "Public Policy", "Law"];
    let needs = [FinancialNeed::Low, FinancialNeed::Medium, FinancialNeed::High];
    let gpas = [2.0, 2.85, 3.0, 3.25, 3.5, 4.0];

    let mut users = Vec::new();
    for country in countries {
        for level in levels {
            for (i, field) in fields.iter().enumerate() {
                for gpa in gpas {
                    users.push(create_student(gpa, country, level, field, needs[i % needs.len()]));
                }
            }
        }
    }

    let pipeline = MatchPipeline::new(store.clone(), embedder, Matcher::default());

    for user in users {
        // Filter is a subset and idempotent
        let once = filter_eligible(&user, catalog.clone());
        let twice = filter_eligible(&user, once.clone());
        assert_eq!(once, twice);
        assert!(once.iter().all(|s| catalog.contains(s)));

        let eligible = once.len();
        let user_id = store.add_user(user).await;
        let matches = pipeline.compute_matches(user_id).await.unwrap();

        assert!(matches.len() <= 3);
        assert!(matches.len() <= eligible);
        assert_eq!(matches.len(), eligible.min(3));
        assert!(matches.iter().all(|m| (30..=100).contains(&m.confidence)));
        for pair in matches.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }
}

#[test]
fn test_identical_text_similarity_is_one() {
    let embedder = HashingEmbedder::default();
    let text = "Computer Science High Undergraduate student interested in academic excellence";

    let a = embedder.encode(text);
    let b = embedder.encode(text);

    assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
}
