use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::aggregate::{cumulative_gpa, CumulativeGpa, WeightedEntry};
use crate::extract::CardExtractor;
use crate::reader::{PdfTextSource, TextSource};
use crate::record::{content_hash, CardRecord};
use crate::storage::Storage;
use crate::Error;

/// Why one file in a batch was not turned into a record. Rejections are
/// per-file outcomes reported back to the uploader, never batch failures.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("Duplicate file (already used)")]
    Duplicate,
    #[error("Identifier not found in document text")]
    IdentifierNotFound,
    #[error("Invalid file type (expected a PDF)")]
    InvalidType,
    #[error("Unreadable document: {0}")]
    Unreadable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// One file submitted for processing.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Upload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }
}

/// Result of processing a batch: accepted records plus per-file rejections.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<CardRecord>,
    pub rejected: Vec<(String, RejectReason)>,
}

impl BatchOutcome {
    #[must_use]
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.rejected
            .iter()
            .filter(|(_, reason)| *reason == RejectReason::Duplicate)
            .count()
    }

    /// Credit-weighted GPA over this batch's accepted records.
    #[must_use]
    pub fn cumulative(&self) -> CumulativeGpa {
        cumulative_gpa(
            self.accepted
                .iter()
                .filter_map(|record| WeightedEntry::from_record(&record.grades)),
        )
    }
}

/// Orchestrates one upload end to end: dedup against the ledger, identifier
/// validation against the extracted text, field extraction, persistence.
/// The extraction step itself is pure; everything stateful lives in the
/// ledger behind it.
pub struct CardPipeline {
    text_source: Box<dyn TextSource>,
    extractor: CardExtractor,
    storage: Storage,
}

impl CardPipeline {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            text_source: Box::new(PdfTextSource::new()),
            extractor: CardExtractor::new(),
            storage,
        }
    }

    #[must_use]
    pub fn with_text_source(mut self, text_source: Box<dyn TextSource>) -> Self {
        self.text_source = text_source;
        self
    }

    /// Processes a single file. The checks run in upload order: duplicate
    /// ledger first, then identifier presence, then extraction. Extraction
    /// itself cannot reject a file; missing fields simply come back absent.
    pub async fn process_upload(
        &self,
        identifier: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<CardRecord, RejectReason> {
        let hash = content_hash(data);

        match self.storage.contains_hash(&hash).await {
            Ok(true) => {
                debug!(file_name, "rejecting duplicate upload");
                return Err(RejectReason::Duplicate);
            }
            Ok(false) => {}
            Err(e) => return Err(RejectReason::Storage(e.to_string())),
        }

        let page_text = self
            .text_source
            .extract_text(data)
            .await
            .map_err(|e| RejectReason::Unreadable(e.to_string()))?;

        if page_text.is_empty()
            || !page_text
                .text
                .to_lowercase()
                .contains(&identifier.to_lowercase())
        {
            debug!(file_name, "identifier not present in extracted text");
            return Err(RejectReason::IdentifierNotFound);
        }

        let grades = self.extractor.parse(&page_text.text);
        let record = CardRecord::new(
            file_name.to_string(),
            hash,
            identifier.to_string(),
            grades,
        );

        match self.storage.insert(&record).await {
            Ok(()) => {
                info!(
                    file_name,
                    sgpa = ?record.grades.sgpa,
                    credits = ?record.grades.total_credits,
                    "recorded grade card"
                );
                Ok(record)
            }
            // A concurrent upload of the same bytes can win the race between
            // the ledger check and the insert.
            Err(Error::DuplicateUpload(_)) => Err(RejectReason::Duplicate),
            Err(e) => Err(RejectReason::Storage(e.to_string())),
        }
    }

    /// Processes many files for one identifier. Per-file rejections are
    /// collected, never fatal; an accepted file is persisted before the next
    /// one is examined, so a repeated file within the batch is a duplicate.
    pub async fn process_batch(&self, identifier: &str, uploads: Vec<Upload>) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for upload in uploads {
            match self
                .process_upload(identifier, &upload.file_name, &upload.data)
                .await
            {
                Ok(record) => outcome.accepted.push(record),
                Err(reason) => outcome.rejected.push((upload.file_name, reason)),
            }
        }

        info!(
            accepted = outcome.accepted_count(),
            rejected = outcome.rejected_count(),
            duplicates = outcome.duplicate_count(),
            "batch processed"
        );

        outcome
    }
}
