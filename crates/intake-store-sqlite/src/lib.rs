//! SQLite implementation of the intake [`Store`].
//!
//! Structured sections of a record (company, applicant, inventors, prefill metadata,
//! history) are kept as JSON text columns; everything queried on is a real column.
//! Timestamps are stored as Unix milliseconds.

use chrono::{DateTime, Utc};
use intake_storage::{
    InvitationFilter, InvitationId, InvitationRecord, InvitationStatus, Store, StoreError,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const SELECT_COLUMNS: &str = "SELECT id, token, email, display_name, status, expires_at, \
     invited_at, submitted_at, last_invitation_sent, company_info, applicant_info, inventors, \
     comments, auto_prefill, history, version, created_at, updated_at FROM invitations";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        // A single long-lived connection keeps `sqlite::memory:` databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await
            .map_err(backend)?;

        MIGRATOR.run(&pool).await.map_err(backend)?;

        Ok(Self { pool })
    }
}

#[derive(sqlx::FromRow)]
struct InvitationRow {
    id: String,
    token: String,
    email: String,
    display_name: Option<String>,
    status: String,
    expires_at: i64,
    invited_at: i64,
    submitted_at: Option<i64>,
    last_invitation_sent: i64,
    company_info: String,
    applicant_info: String,
    inventors: String,
    comments: Option<String>,
    auto_prefill: String,
    history: String,
    version: i64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<InvitationRow> for InvitationRecord {
    type Error = StoreError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(InvitationRecord {
            id: InvitationId(Uuid::try_parse(&row.id).map_err(backend)?),
            token: row.token,
            email: row.email,
            display_name: row.display_name,
            status: row
                .status
                .parse::<InvitationStatus>()
                .map_err(StoreError::Backend)?,
            expires_at: from_millis(row.expires_at)?,
            invited_at: from_millis(row.invited_at)?,
            submitted_at: row.submitted_at.map(from_millis).transpose()?,
            last_invitation_sent: from_millis(row.last_invitation_sent)?,
            company_info: from_json(&row.company_info)?,
            applicant_info: from_json(&row.applicant_info)?,
            inventors: from_json(&row.inventors)?,
            comments: row.comments,
            auto_prefill: from_json(&row.auto_prefill)?,
            history: from_json(&row.history)?,
            version: row.version,
            created_at: from_millis(row.created_at)?,
            updated_at: from_millis(row.updated_at)?,
        })
    }
}

/// JSON-encoded columns of a record, serialized once per write.
struct JsonColumns {
    company_info: String,
    applicant_info: String,
    inventors: String,
    auto_prefill: String,
    history: String,
}

impl JsonColumns {
    fn encode(record: &InvitationRecord) -> Result<Self, StoreError> {
        Ok(Self {
            company_info: to_json(&record.company_info)?,
            applicant_info: to_json(&record.applicant_info)?,
            inventors: to_json(&record.inventors)?,
            auto_prefill: to_json(&record.auto_prefill)?,
            history: to_json(&record.history)?,
        })
    }
}

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn write_error(e: sqlx::Error) -> StoreError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::AlreadyExists,
        _ => backend(e),
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {ms}")))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(backend)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(backend)
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Invitations ─────────────────────────────

    async fn create_invitation(
        &self,
        record: &InvitationRecord,
    ) -> Result<InvitationRecord, StoreError> {
        let json = JsonColumns::encode(record)?;
        sqlx::query(
            "INSERT INTO invitations(id, token, email, display_name, status, expires_at,
                 invited_at, submitted_at, last_invitation_sent, company_info, applicant_info,
                 inventors, comments, auto_prefill, history, version, created_at, updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(record.id.0.to_string())
        .bind(&record.token)
        .bind(&record.email)
        .bind(&record.display_name)
        .bind(record.status.as_str())
        .bind(record.expires_at.timestamp_millis())
        .bind(record.invited_at.timestamp_millis())
        .bind(record.submitted_at.map(|t| t.timestamp_millis()))
        .bind(record.last_invitation_sent.timestamp_millis())
        .bind(&json.company_info)
        .bind(&json.applicant_info)
        .bind(&json.inventors)
        .bind(&record.comments)
        .bind(&json.auto_prefill)
        .bind(&json.history)
        .bind(record.version)
        .bind(record.created_at.timestamp_millis())
        .bind(record.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        self.get_invitation(&record.id).await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<InvitationRecord>, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!("{SELECT_COLUMNS} WHERE token = ?"))
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(InvitationRecord::try_from).transpose()
    }

    async fn find_latest_by_email(
        &self,
        email: &str,
    ) -> Result<Option<InvitationRecord>, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "{SELECT_COLUMNS} WHERE email = ? ORDER BY updated_at DESC, id DESC LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        row.map(InvitationRecord::try_from).transpose()
    }

    async fn get_invitation(&self, id: &InvitationId) -> Result<InvitationRecord, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        match row {
            None => Err(StoreError::NotFound),
            Some(row) => row.try_into(),
        }
    }

    async fn update_in_place(
        &self,
        record: &InvitationRecord,
    ) -> Result<InvitationRecord, StoreError> {
        let json = JsonColumns::encode(record)?;
        let result = sqlx::query(
            "UPDATE invitations SET token = ?, email = ?, display_name = ?, status = ?,
                 expires_at = ?, invited_at = ?, submitted_at = ?, last_invitation_sent = ?,
                 company_info = ?, applicant_info = ?, inventors = ?, comments = ?,
                 auto_prefill = ?, history = ?, updated_at = ?, version = version + 1
             WHERE id = ? AND version = ?",
        )
        .bind(&record.token)
        .bind(&record.email)
        .bind(&record.display_name)
        .bind(record.status.as_str())
        .bind(record.expires_at.timestamp_millis())
        .bind(record.invited_at.timestamp_millis())
        .bind(record.submitted_at.map(|t| t.timestamp_millis()))
        .bind(record.last_invitation_sent.timestamp_millis())
        .bind(&json.company_info)
        .bind(&json.applicant_info)
        .bind(&json.inventors)
        .bind(&record.comments)
        .bind(&json.auto_prefill)
        .bind(&json.history)
        .bind(record.updated_at.timestamp_millis())
        .bind(record.id.0.to_string())
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        if result.rows_affected() == 0 {
            // Distinguish a vanished record from a lost race.
            return match self.get_invitation(&record.id).await {
                Ok(_) => Err(StoreError::Conflict),
                Err(e) => Err(e),
            };
        }

        self.get_invitation(&record.id).await
    }

    async fn delete_invitation(&self, id: &InvitationId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_invitations(
        &self,
        filter: &InvitationFilter,
    ) -> Result<Vec<InvitationRecord>, StoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
        qb.push(" WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(email) = &filter.email {
            qb.push(" AND email = ").push_bind(email.clone());
        }
        qb.push(" ORDER BY updated_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = qb
            .build_query_as::<InvitationRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(InvitationRecord::try_from).collect()
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM invitations WHERE status != 'completed' AND expires_at < ?")
                .bind(cutoff.timestamp_millis())
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        Ok(result.rows_affected())
    }
}
