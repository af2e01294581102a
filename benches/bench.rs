// Criterion benchmarks for Scholar Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scholar_match::core::{
    cosine_similarity, filter_eligible, scholarship_text, Embedder, HashingEmbedder, Matcher,
};
use scholar_match::models::{EducationLevel, FinancialNeed, Scholarship, UserProfile, GLOBAL_COUNTRY};

const FIELDS: [&str; 5] = [
    "Computer Science, Engineering, Mathematics",
    "Biology, Chemistry, Medicine",
    "Art, Design, Music",
    "Social Work, Psychology, Public Policy",
    "Environmental Science, Sustainability",
];

fn create_scholarship(id: usize, embedder: &HashingEmbedder) -> Scholarship {
    let fields = FIELDS[id % FIELDS.len()];
    let description = format!("Scholarship {} for motivated students", id);
    let embedding = embedder.encode(&scholarship_text(Some(&description), Some(fields)));

    Scholarship {
        id: id as i64,
        name: format!("Scholarship {}", id),
        description: Some(description),
        amount: Some(1000 + (id as i32 % 20) * 500),
        deadline: None,
        country: Some(if id % 4 == 0 { "USA" } else { GLOBAL_COUNTRY }.to_string()),
        min_gpa: Some(2.5 + (id % 15) as f64 * 0.1),
        education_level: Some(match id % 3 {
            0 => EducationLevel::Undergraduate,
            1 => EducationLevel::Graduate,
            _ => EducationLevel::Both,
        }),
        field_of_study: Some(fields.to_string()),
        financial_criteria: Some(if id % 2 == 0 { FinancialNeed::High } else { FinancialNeed::Medium }),
        apply_url: None,
        embedding: Some(embedding),
        embedding_model: Some(embedder.model_name().to_string()),
        created_at: None,
    }
}

fn create_student() -> UserProfile {
    UserProfile {
        id: 1,
        name: "Bench Student".to_string(),
        email: "bench@example.com".to_string(),
        age: Some(20),
        gpa: Some(3.6),
        country: Some("USA".to_string()),
        education_level: Some(EducationLevel::Undergraduate),
        field_of_study: Some("Computer Science".to_string()),
        financial_need: Some(FinancialNeed::High),
        created_at: None,
    }
}

fn bench_cosine_similarity(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    let a = embedder.encode("Computer Science High Undergraduate student");
    let b = embedder.encode("Supporting outstanding students pursuing STEM fields");

    c.bench_function("cosine_similarity_384", |bench| {
        bench.iter(|| cosine_similarity(black_box(&a), black_box(&b)));
    });
}

fn bench_encode(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();

    c.bench_function("hashing_embedder_encode", |b| {
        b.iter(|| {
            embedder.encode(black_box(
                "Computer Science High Undergraduate student interested in academic excellence",
            ))
        });
    });
}

fn bench_matching(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    let matcher = Matcher::with_default_weights();
    let student = create_student();

    let mut group = c.benchmark_group("matching");

    for catalog_size in [10, 100, 1000].iter() {
        let catalog: Vec<Scholarship> = (0..*catalog_size)
            .map(|i| create_scholarship(i, &embedder))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", catalog_size),
            catalog_size,
            |b, _| {
                b.iter(|| {
                    matcher.find_matches(
                        black_box(&student),
                        black_box(catalog.clone()),
                        black_box(&embedder),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_eligibility_filter(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    let student = create_student();
    let catalog: Vec<Scholarship> = (0..100).map(|i| create_scholarship(i, &embedder)).collect();

    c.bench_function("eligibility_filter_100_scholarships", |b| {
        b.iter(|| black_box(filter_eligible(&student, catalog.clone())));
    });
}

criterion_group!(
    benches,
    bench_cosine_similarity,
    bench_encode,
    bench_matching,
    bench_eligibility_filter
);

criterion_main!(benches);
