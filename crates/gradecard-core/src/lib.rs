pub mod aggregate;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod storage;

pub use aggregate::{cumulative_gpa, CumulativeGpa, WeightedEntry};
pub use error::{Error, Result};
pub use extract::{CardExtractor, GradeRecord, SGPA_MAX, SGPA_MIN};
pub use pipeline::{BatchOutcome, CardPipeline, RejectReason, Upload};
pub use reader::{PageText, PdfTextSource, PlainTextSource, ReadError, ReadResult, TextSource};
pub use record::{content_hash, CardRecord};
pub use storage::Storage;
