use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use uuid::Uuid;

use crate::aggregate::WeightedEntry;
use crate::extract::GradeRecord;
use crate::record::CardRecord;
use crate::{Error, Result};

const INIT_SQL: &str = r"
CREATE TABLE IF NOT EXISTS card_records (
    id TEXT PRIMARY KEY,
    file_name TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    identifier TEXT NOT NULL,
    sgpa REAL,
    total_credits REAL,
    semester TEXT,
    exam_month TEXT,
    exam_year TEXT,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_records_hash ON card_records(content_hash);
CREATE INDEX IF NOT EXISTS idx_records_identifier ON card_records(identifier);
";

/// Upload ledger and record store backed by SQLite. The unique index on
/// `content_hash` is the duplicate-prevention guarantee; everything else is
/// plain record keeping.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn open(path: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{path}?mode=rwc"))
            .await?;

        sqlx::query(INIT_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::query(INIT_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn insert(&self, record: &CardRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO card_records
                (id, file_name, content_hash, identifier, sgpa, total_credits,
                 semester, exam_month, exam_year, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(record.id.to_string())
        .bind(&record.file_name)
        .bind(&record.content_hash)
        .bind(&record.identifier)
        .bind(record.grades.sgpa)
        .bind(record.grades.total_credits)
        .bind(&record.grades.semester)
        .bind(&record.grades.exam_month)
        .bind(&record.grades.exam_year)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::DuplicateUpload(record.content_hash.clone())
            }
            other => Error::Database(other),
        })?;

        Ok(())
    }

    /// The dedup check: has a byte-identical upload been recorded before?
    pub async fn contains_hash(&self, content_hash: &str) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM card_records WHERE content_hash = ?")
                .bind(content_hash)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some())
    }

    pub async fn get(&self, id: Uuid) -> Result<CardRecord> {
        let row: RecordRow = sqlx::query_as(
            r"
            SELECT id, file_name, content_hash, identifier, sgpa, total_credits,
                   semester, exam_month, exam_year, created_at
            FROM card_records WHERE id = ?
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::RecordNotFound(id))?;

        parse_record_row(row)
    }

    /// Upload history, optionally scoped to one student identifier.
    pub async fn list(&self, identifier: Option<&str>) -> Result<Vec<CardRecord>> {
        let rows: Vec<RecordRow> = match identifier {
            Some(ident) => {
                sqlx::query_as(
                    r"
                    SELECT id, file_name, content_hash, identifier, sgpa, total_credits,
                           semester, exam_month, exam_year, created_at
                    FROM card_records WHERE identifier = ? ORDER BY created_at
                    ",
                )
                .bind(ident)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r"
                    SELECT id, file_name, content_hash, identifier, sgpa, total_credits,
                           semester, exam_month, exam_year, created_at
                    FROM card_records ORDER BY created_at
                    ",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(parse_record_row).collect()
    }

    /// Rows usable for aggregation: both SGPA and credits present. Rows
    /// missing either field are excluded here rather than zero-filled.
    pub async fn weighted_entries(&self, identifier: &str) -> Result<Vec<WeightedEntry>> {
        let rows: Vec<(f64, f64)> = sqlx::query_as(
            r"
            SELECT sgpa, total_credits FROM card_records
            WHERE identifier = ? AND sgpa IS NOT NULL AND total_credits IS NOT NULL
            ORDER BY created_at
            ",
        )
        .bind(identifier)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(value, weight)| WeightedEntry::new(value, weight))
            .collect())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM card_records WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(id));
        }

        Ok(())
    }
}

type RecordRow = (
    String,
    String,
    String,
    String,
    Option<f64>,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

fn parse_record_row(row: RecordRow) -> Result<CardRecord> {
    let (
        id,
        file_name,
        content_hash,
        identifier,
        sgpa,
        total_credits,
        semester,
        exam_month,
        exam_year,
        created_at,
    ) = row;

    Ok(CardRecord {
        id: id
            .parse()
            .map_err(|_| Error::CorruptRecord(format!("bad id: {id}")))?,
        file_name,
        content_hash,
        identifier,
        grades: GradeRecord {
            sgpa,
            total_credits,
            semester,
            exam_month,
            exam_year,
        },
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|_| Error::CorruptRecord(format!("bad timestamp: {created_at}")))?
            .with_timezone(&Utc),
    })
}
