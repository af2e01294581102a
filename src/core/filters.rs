use crate::models::{EducationLevel, Scholarship, UserProfile};

/// Check whether a student may apply for a scholarship
///
/// All three hard rules must hold:
/// 1. the student's GPA reaches the scholarship minimum
/// 2. the scholarship is global or in the student's country
/// 3. the scholarship is open to both levels or to the student's level
///
/// A value missing on either side fails the rule it is needed for.
#[inline]
pub fn is_eligible(user: &UserProfile, scholarship: &Scholarship) -> bool {
    meets_gpa(user, scholarship) && matches_country(user, scholarship) && matches_education(user, scholarship)
}

#[inline]
fn meets_gpa(user: &UserProfile, scholarship: &Scholarship) -> bool {
    match (user.gpa, scholarship.min_gpa) {
        (Some(gpa), Some(min_gpa)) => gpa >= min_gpa,
        _ => false,
    }
}

#[inline]
fn matches_country(user: &UserProfile, scholarship: &Scholarship) -> bool {
    if scholarship.is_global() {
        return true;
    }

    match (user.country.as_deref(), scholarship.country.as_deref()) {
        (Some(user_country), Some(country)) => user_country == country,
        _ => false,
    }
}

#[inline]
fn matches_education(user: &UserProfile, scholarship: &Scholarship) -> bool {
    match scholarship.education_level {
        Some(EducationLevel::Both) => true,
        Some(level) => user.education_level == Some(level),
        None => false,
    }
}

/// Reduce a catalog to the scholarships a student is eligible for
///
/// Catalog order is preserved, which the ranking relies on for tie-breaking.
pub fn filter_eligible(user: &UserProfile, scholarships: Vec<Scholarship>) -> Vec<Scholarship> {
    scholarships
        .into_iter()
        .filter(|scholarship| is_eligible(user, scholarship))
        .collect()
}
