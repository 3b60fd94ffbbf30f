mod engine;
mod patterns;

pub use engine::{CardExtractor, GradeRecord, SGPA_MAX, SGPA_MIN};
pub use patterns::{FieldPattern, PatternOutcome};
