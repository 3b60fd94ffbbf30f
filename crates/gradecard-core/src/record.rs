use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::extract::GradeRecord;

/// One accepted grade-card upload: the extracted fields plus the provenance
/// the surrounding app needs (file name, content hash, student identifier).
/// Immutable once created; persisted or discarded whole by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: Uuid,
    pub file_name: String,
    pub content_hash: String,
    pub identifier: String,
    pub grades: GradeRecord,
    pub created_at: DateTime<Utc>,
}

impl CardRecord {
    #[must_use]
    pub fn new(
        file_name: String,
        content_hash: String,
        identifier: String,
        grades: GradeRecord,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            file_name,
            content_hash,
            identifier,
            grades,
            created_at: Utc::now(),
        }
    }

    /// Month and year joined the way grade cards print them ("April 2024").
    /// Empty when neither piece was extracted.
    #[must_use]
    pub fn exam_label(&self) -> String {
        match (&self.grades.exam_month, &self.grades.exam_year) {
            (Some(month), Some(year)) => format!("{month} {year}"),
            (Some(month), None) => month.clone(),
            (None, Some(year)) => year.clone(),
            (None, None) => String::new(),
        }
    }
}

/// SHA-256 of the raw uploaded bytes, hex-encoded. The dedup ledger keys
/// on this, so two byte-identical uploads always collide.
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(content_hash(b"hello"), content_hash(b"hello"));
        assert_ne!(content_hash(b"hello"), content_hash(b"world"));
        assert_eq!(content_hash(b"hello").len(), 64);
    }

    #[test]
    fn test_exam_label() {
        let mut record = CardRecord::new(
            "s4.pdf".into(),
            content_hash(b"s4"),
            "KTU22CS001".into(),
            GradeRecord {
                exam_month: Some("April".into()),
                exam_year: Some("2024".into()),
                ..GradeRecord::default()
            },
        );
        assert_eq!(record.exam_label(), "April 2024");

        record.grades.exam_year = None;
        assert_eq!(record.exam_label(), "April");

        record.grades.exam_month = None;
        assert_eq!(record.exam_label(), "");
    }
}
