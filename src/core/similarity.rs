use crate::models::UserProfile;

/// Fixed tail of every synthesized profile text
pub const PROFILE_SUFFIX: &str = "student interested in academic excellence";

/// Cosine similarity between two vectors
///
/// Returns a value in [-1, 1]. A zero-magnitude vector, or vectors of different
/// length, have similarity 0.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Build the text that represents a student for embedding
///
/// `"{field_of_study} {financial_need} {education_level} student interested in academic excellence"`.
///
/// Attributes that are not set are left out. Financial need and field of study
/// play no part in eligibility, so a student missing them can still be ranked;
/// their text then omits the word instead of carrying a literal "None" token
/// that would pull the profile towards unrelated catalog text.
pub fn profile_text(user: &UserProfile) -> String {
    let financial = user.financial_need.map(|n| n.as_str());
    let education = user.education_level.map(|l| l.as_str());

    [user.field_of_study.as_deref(), financial, education, Some(PROFILE_SUFFIX)]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the text a scholarship is embedded from: `"{description} {field_of_study}"`
pub fn scholarship_text(description: Option<&str>, field_of_study: Option<&str>) -> String {
    [description, field_of_study]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
