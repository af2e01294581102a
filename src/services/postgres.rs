use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgExecutor, PgPool, Row};
use std::str::FromStr;
use std::time::Duration;

use crate::models::{
    FeedbackId, NewFeedback, NewScholarship, ProfileUpdate, Scholarship, ScholarshipId, UserId,
    UserProfile,
};
use crate::services::storage::{Storage, StorageError};

/// Advisory lock key held while seeding the sample catalog
const SEED_LOCK_KEY: i64 = 0x5343_484f_4c41_5253;

/// PostgreSQL-backed store for users, the scholarship catalog and feedback
///
/// Each operation checks a connection out of the pool and hands it back when
/// the query future completes or is dropped, so no handle outlives a request.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL at {}", redact_url(url));

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool (migrations are assumed to have run)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PostgresStore {
    async fn get_user(&self, id: UserId) -> Result<UserProfile, StorageError> {
        let query = r#"
            SELECT id, name, email, age, country, education_level,
                   gpa::float8 AS gpa, field_of_study, financial_need, created_at
            FROM users
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {}", id)))?;

        user_from_row(&row)
    }

    async fn list_scholarships(&self) -> Result<Vec<Scholarship>, StorageError> {
        let query = r#"
            SELECT id, name, description, amount, deadline, country,
                   min_gpa::float8 AS min_gpa, education_level, field_of_study,
                   financial_criteria, apply_url, embedding, embedding_model, created_at
            FROM scholarships
            ORDER BY id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let scholarships = rows
            .iter()
            .map(scholarship_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} scholarships", scholarships.len());

        Ok(scholarships)
    }

    async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> Result<(), StorageError> {
        let query = r#"
            UPDATE users
            SET age = $1, country = $2, education_level = $3,
                gpa = CAST($4 AS NUMERIC(3, 2)), field_of_study = $5, financial_need = $6
            WHERE id = $7
        "#;

        let result = sqlx::query(query)
            .bind(update.age)
            .bind(&update.country)
            .bind(update.education_level.as_str())
            .bind(update.gpa)
            .bind(&update.field_of_study)
            .bind(update.financial_need.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("user {}", id)));
        }

        tracing::debug!("Updated profile for user {}", id);

        Ok(())
    }

    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackId, StorageError> {
        let query = r#"
            INSERT INTO feedback (user_id, scholarship_id, rating)
            VALUES ($1, $2, $3)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(feedback.user_id)
            .bind(feedback.scholarship_id)
            .bind(feedback.rating.score())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => StorageError::NotFound(
                    format!(
                        "user {} or scholarship {}",
                        feedback.user_id, feedback.scholarship_id
                    ),
                ),
                other => StorageError::SqlxError(other),
            })?;

        Ok(row.try_get("id")?)
    }

    async fn insert_scholarship(&self, scholarship: &NewScholarship) -> Result<ScholarshipId, StorageError> {
        let id = insert_scholarship_row(&self.pool, scholarship).await?;
        tracing::info!("Inserted scholarship {} ({})", id, scholarship.name);

        Ok(id)
    }

    async fn seed_scholarships(&self, records: &[NewScholarship]) -> Result<usize, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Serializes seeding across replicas; released at commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let existing: i64 = sqlx::query("SELECT COUNT(*) AS total FROM scholarships")
            .fetch_one(&mut *tx)
            .await?
            .try_get("total")?;
        if existing > 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        for record in records {
            insert_scholarship_row(&mut *tx, record).await?;
        }

        tx.commit().await?;

        Ok(records.len())
    }

    async fn count_scholarships(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM scholarships")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("total")?)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StorageError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

async fn insert_scholarship_row<'e, E>(executor: E, scholarship: &NewScholarship) -> Result<ScholarshipId, StorageError>
where
    E: PgExecutor<'e>,
{
    let query = r#"
        INSERT INTO scholarships
            (name, description, amount, deadline, country, min_gpa, education_level,
             field_of_study, financial_criteria, apply_url, embedding, embedding_model)
        VALUES ($1, $2, $3, $4, $5, CAST($6 AS NUMERIC(3, 2)), $7, $8, $9, $10, $11, $12)
        RETURNING id
    "#;

    let row = sqlx::query(query)
        .bind(&scholarship.name)
        .bind(&scholarship.description)
        .bind(scholarship.amount)
        .bind(scholarship.deadline)
        .bind(&scholarship.country)
        .bind(scholarship.min_gpa)
        .bind(scholarship.education_level.map(|l| l.as_str()))
        .bind(&scholarship.field_of_study)
        .bind(scholarship.financial_criteria.map(|c| c.as_str()))
        .bind(&scholarship.apply_url)
        .bind(&scholarship.embedding)
        .bind(&scholarship.embedding_model)
        .fetch_one(executor)
        .await?;

    Ok(row.try_get("id")?)
}

fn user_from_row(row: &PgRow) -> Result<UserProfile, StorageError> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        age: row.try_get("age")?,
        gpa: row.try_get("gpa")?,
        country: row.try_get("country")?,
        education_level: parse_column(row, "education_level")?,
        field_of_study: row.try_get("field_of_study")?,
        financial_need: parse_column(row, "financial_need")?,
        created_at: row.try_get("created_at")?,
    })
}

fn scholarship_from_row(row: &PgRow) -> Result<Scholarship, StorageError> {
    Ok(Scholarship {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        amount: row.try_get("amount")?,
        deadline: row.try_get("deadline")?,
        country: row.try_get("country")?,
        min_gpa: row.try_get("min_gpa")?,
        education_level: parse_column(row, "education_level")?,
        field_of_study: row.try_get("field_of_study")?,
        financial_criteria: parse_column(row, "financial_criteria")?,
        apply_url: row.try_get("apply_url")?,
        embedding: row.try_get("embedding")?,
        embedding_model: row.try_get("embedding_model")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Read a textual enum column; values outside the known set count as missing
fn parse_column<T>(row: &PgRow, column: &str) -> Result<Option<T>, StorageError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = row.try_get(column)?;

    Ok(raw.and_then(|value| match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring {} value in column {}: {}", value, column, e);
            None
        }
    }))
}

/// Strip the password from a connection URL before logging it
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
