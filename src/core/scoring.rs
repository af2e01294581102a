use crate::models::{BonusWeights, Scholarship, UserProfile};

/// Calculate the confidence score for a scholarship
///
/// Scoring formula:
/// confidence = trunc(clamp(
///     (similarity                # cosine of profile and scholarship embeddings
///      + field_bonus             # field of study overlap
///      + financial_bonus)        # financial tier matches exactly
///     * 100, min_confidence, max_confidence))
pub fn calculate_confidence(
    similarity: f64,
    user: &UserProfile,
    scholarship: &Scholarship,
    weights: &BonusWeights,
) -> u8 {
    let field = field_bonus(user, scholarship, weights);
    let financial = financial_bonus(user, scholarship, weights);

    confidence_from_parts(similarity, field, financial, weights)
}

/// Combine a similarity and bonuses into a bounded integer score
#[inline]
pub fn confidence_from_parts(
    similarity: f64,
    field_bonus: f64,
    financial_bonus: f64,
    weights: &BonusWeights,
) -> u8 {
    let raw = (similarity + field_bonus + financial_bonus) * 100.0;
    let min = weights.min_confidence as f64;
    let max = weights.max_confidence as f64;

    // NaN falls to the floor
    let bounded = if raw.is_nan() { min } else { raw.min(max).max(min) };

    bounded.trunc() as u8
}

/// Field of study bonus
///
/// Granted when the student's field appears inside the scholarship's field
/// text, or when any of the scholarship's comma-separated tags appears inside
/// the student's field. Both comparisons are case-insensitive substring tests.
#[inline]
pub fn field_bonus(user: &UserProfile, scholarship: &Scholarship, weights: &BonusWeights) -> f64 {
    match (user.field_of_study.as_deref(), scholarship.field_of_study.as_deref()) {
        (Some(user_field), Some(scholarship_fields)) if fields_overlap(user_field, scholarship_fields) => {
            weights.field
        }
        _ => 0.0,
    }
}

#[inline]
fn fields_overlap(user_field: &str, scholarship_fields: &str) -> bool {
    let user_field = user_field.to_lowercase();

    scholarship_fields.to_lowercase().contains(&user_field)
        || scholarship_fields
            .split(',')
            .any(|tag| user_field.contains(&tag.trim().to_lowercase()))
}

/// Financial need bonus: the scholarship targets exactly the student's tier
#[inline]
pub fn financial_bonus(user: &UserProfile, scholarship: &Scholarship, weights: &BonusWeights) -> f64 {
    match (user.financial_need, scholarship.financial_criteria) {
        (Some(need), Some(criteria)) if need == criteria => weights.financial,
        _ => 0.0,
    }
}
