// Trip record store: PostgreSQL persistence for calculated trips.
// Identity comes from the external authentication provider; every query is
// scoped to the caller's user id.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};

use crate::models::{EmissionsReport, TripInputs, TripRecord};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Trip not found: {0}")]
    NotFound(i64),

    #[error("Invalid trip data: {0}")]
    InvalidData(String),
}

/// Caller identity as reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
struct TripRow {
    id: i64,
    user_id: String,
    user_email: Option<String>,
    inputs: sqlx::types::JsonValue,
    report: sqlx::types::JsonValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TripRow> for TripRecord {
    type Error = DatabaseError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let inputs = serde_json::from_value(row.inputs).map_err(|e| {
            DatabaseError::InvalidData(format!("trip {} has unreadable inputs: {e}", row.id))
        })?;
        let report = serde_json::from_value(row.report).map_err(|e| {
            DatabaseError::InvalidData(format!("trip {} has unreadable report: {e}", row.id))
        })?;
        Ok(TripRecord {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            inputs,
            report,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct TripDatabase {
    pool: PgPool,
}

impl TripDatabase {
    /// Create a connection pool for `database_url`.
    ///
    /// # Errors
    /// Returns DatabaseError if the connection fails
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        // raw_sql accepts the multiple statements in the migration file
        let mut conn = self.pool.acquire().await?;
        let migration_sql = include_str!("../migrations/20250301_create_trip_records.sql");
        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    pub async fn create_trip(
        &self,
        user: &UserIdentity,
        inputs: &TripInputs,
        report: &EmissionsReport,
    ) -> Result<TripRecord, DatabaseError> {
        let (inputs_json, report_json) = encode(inputs, report)?;

        let row = sqlx::query_as::<_, TripRow>(
            r#"
            INSERT INTO trip_records (user_id, user_email, inputs, report)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, user_email, inputs, report, created_at, updated_at
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(inputs_json)
        .bind(report_json)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Trip saved for user {} (ID: {})", user.user_id, row.id);
        row.try_into()
    }

    /// All trips of a user, most recent first.
    pub async fn list_trips(&self, user_id: &str) -> Result<Vec<TripRecord>, DatabaseError> {
        let rows = sqlx::query_as::<_, TripRow>(
            r#"
            SELECT id, user_id, user_email, inputs, report, created_at, updated_at
            FROM trip_records
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::info!("Retrieved {} trips for user {}", rows.len(), user_id);
        rows.into_iter().map(TripRecord::try_from).collect()
    }

    pub async fn update_trip(
        &self,
        id: i64,
        user_id: &str,
        inputs: &TripInputs,
        report: &EmissionsReport,
    ) -> Result<TripRecord, DatabaseError> {
        let (inputs_json, report_json) = encode(inputs, report)?;

        let row = sqlx::query_as::<_, TripRow>(
            r#"
            UPDATE trip_records
            SET inputs = $1, report = $2, updated_at = NOW()
            WHERE id = $3 AND user_id = $4
            RETURNING id, user_id, user_email, inputs, report, created_at, updated_at
            "#,
        )
        .bind(inputs_json)
        .bind(report_json)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::NotFound(id))?;

        tracing::info!("Trip updated: ID {}", id);
        row.try_into()
    }

    pub async fn delete_trip(&self, id: i64, user_id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM trip_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(id));
        }

        tracing::info!("Trip deleted: ID {}", id);
        Ok(())
    }
}

fn encode(
    inputs: &TripInputs,
    report: &EmissionsReport,
) -> Result<(sqlx::types::JsonValue, sqlx::types::JsonValue), DatabaseError> {
    let inputs_json =
        serde_json::to_value(inputs).map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
    let report_json =
        serde_json::to_value(report).map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
    Ok((inputs_json, report_json))
}
