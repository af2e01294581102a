use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type ScholarshipId = i64;
pub type FeedbackId = i64;

/// Country value meaning "open to applicants from any country"
pub const GLOBAL_COUNTRY: &str = "Global";

/// Education level of a student, or the level a scholarship is open to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    Undergraduate,
    Graduate,
    Both,
}

impl EducationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Undergraduate => "Undergraduate",
            EducationLevel::Graduate => "Graduate",
            EducationLevel::Both => "Both",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Undergraduate" => Ok(EducationLevel::Undergraduate),
            "Graduate" => Ok(EducationLevel::Graduate),
            "Both" => Ok(EducationLevel::Both),
            other => Err(ParseEnumError::new("education level", other)),
        }
    }
}

/// Financial need tier of a student, or the tier a scholarship targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinancialNeed {
    Low,
    Medium,
    High,
}

impl FinancialNeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialNeed::Low => "Low",
            FinancialNeed::Medium => "Medium",
            FinancialNeed::High => "High",
        }
    }
}

impl fmt::Display for FinancialNeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinancialNeed {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(FinancialNeed::Low),
            "Medium" => Ok(FinancialNeed::Medium),
            "High" => Ok(FinancialNeed::High),
            other => Err(ParseEnumError::new("financial tier", other)),
        }
    }
}

/// A textual enum column held a value outside the known set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Student profile
///
/// A user row exists from registration onwards, but the academic attributes
/// are only filled in by a profile update, so all of them are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub financial_need: Option<FinancialNeed>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Scholarship catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: ScholarshipId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<i32>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub min_gpa: Option<f64>,
    #[serde(default)]
    pub education_level: Option<EducationLevel>,
    /// Comma-separated field tags, e.g. "Computer Science, Engineering"
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub financial_criteria: Option<FinancialNeed>,
    #[serde(default)]
    pub apply_url: Option<String>,
    /// Precomputed at catalog insertion; never part of the external representation
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    /// Name of the model that produced `embedding`
    #[serde(default, skip_serializing)]
    pub embedding_model: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Scholarship {
    /// Whether the scholarship is open to applicants from any country
    pub fn is_global(&self) -> bool {
        self.country.as_deref() == Some(GLOBAL_COUNTRY)
    }
}

/// Scholarship ready to be written to the catalog, embedding included
#[derive(Debug, Clone, PartialEq)]
pub struct NewScholarship {
    pub name: String,
    pub description: Option<String>,
    pub amount: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub country: Option<String>,
    pub min_gpa: Option<f64>,
    pub education_level: Option<EducationLevel>,
    pub field_of_study: Option<String>,
    pub financial_criteria: Option<FinancialNeed>,
    pub apply_url: Option<String>,
    pub embedding: Vec<f32>,
    pub embedding_model: String,
}

/// Full replacement of the academic part of a profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub age: Option<i32>,
    pub country: String,
    pub education_level: EducationLevel,
    pub gpa: f64,
    pub field_of_study: String,
    pub financial_need: FinancialNeed,
}

/// Relevance rating a student gives a suggested scholarship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackRating {
    NotRelevant = 0,
    Relevant = 1,
}

impl FeedbackRating {
    pub fn from_score(score: i16) -> Option<Self> {
        match score {
            0 => Some(FeedbackRating::NotRelevant),
            1 => Some(FeedbackRating::Relevant),
            _ => None,
        }
    }

    pub fn score(&self) -> i16 {
        *self as i16
    }
}

/// Feedback to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub user_id: UserId,
    pub scholarship_id: ScholarshipId,
    pub rating: FeedbackRating,
}

/// Ranked match returned to callers
///
/// Serializes as the scholarship's fields plus `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub scholarship: Scholarship,
    pub confidence: u8,
}

/// Bonus weights and confidence bounds used by the aggregator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonusWeights {
    pub field: f64,
    pub financial: f64,
    pub min_confidence: u8,
    pub max_confidence: u8,
}

impl Default for BonusWeights {
    fn default() -> Self {
        Self {
            field: 0.2,
            financial: 0.1,
            min_confidence: 30,
            max_confidence: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing_is_exact() {
        assert_eq!("Graduate".parse::<EducationLevel>(), Ok(EducationLevel::Graduate));
        assert_eq!("High".parse::<FinancialNeed>(), Ok(FinancialNeed::High));
        assert!("graduate".parse::<EducationLevel>().is_err());
        assert!("Very High".parse::<FinancialNeed>().is_err());
    }

    #[test]
    fn test_match_result_hides_embedding() {
        let result = MatchResult {
            scholarship: Scholarship {
                id: 7,
                name: "Test".to_string(),
                description: None,
                amount: Some(1000),
                deadline: NaiveDate::from_ymd_opt(2025, 6, 15),
                country: Some(GLOBAL_COUNTRY.to_string()),
                min_gpa: Some(3.0),
                education_level: Some(EducationLevel::Both),
                field_of_study: None,
                financial_criteria: Some(FinancialNeed::High),
                apply_url: None,
                embedding: Some(vec![0.5, 0.5]),
                embedding_model: Some("feature-hashing".to_string()),
                created_at: None,
            },
            confidence: 87,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("embedding").is_none());
        assert_eq!(json["deadline"], "2025-06-15");
        assert_eq!(json["confidence"], 87);
        assert_eq!(json["education_level"], "Both");
    }

    #[test]
    fn test_feedback_rating_scores() {
        assert_eq!(FeedbackRating::from_score(1), Some(FeedbackRating::Relevant));
        assert_eq!(FeedbackRating::from_score(0), Some(FeedbackRating::NotRelevant));
        assert_eq!(FeedbackRating::from_score(5), None);
        assert_eq!(FeedbackRating::Relevant.score(), 1);
    }
}
