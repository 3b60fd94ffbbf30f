use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{FieldPattern, PatternOutcome};

/// Plausible bounds for a semester grade-point average on a 10-point scale.
/// The catch-all decimal pattern would otherwise latch onto page numbers,
/// years, or course codes.
pub const SGPA_MIN: f64 = 4.0;
pub const SGPA_MAX: f64 = 10.0;

/// Fields recovered from one grade card. Every field is independently
/// optional; absence means the value could not be located, not a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub sgpa: Option<f64>,
    pub total_credits: Option<f64>,
    pub semester: Option<String>,
    pub exam_month: Option<String>,
    pub exam_year: Option<String>,
}

impl GradeRecord {
    /// True when no field at all could be extracted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.sgpa.is_none()
            && self.total_credits.is_none()
            && self.semester.is_none()
            && self.exam_month.is_none()
            && self.exam_year.is_none()
    }
}

/// Maps raw grade-card text to a [`GradeRecord`] using ordered fallback
/// pattern lists, most specific first. Pattern precedence is load-bearing:
/// several layers can match the same text with different results, and the
/// first accepted candidate wins.
///
/// Stateless and pure; a single extractor can be shared across threads and
/// invoked concurrently on independent documents.
pub struct CardExtractor {
    sgpa_patterns: Vec<FieldPattern>,
    credit_patterns: Vec<FieldPattern>,
    semester_patterns: Vec<FieldPattern>,
    date_regex: Option<Regex>,
}

impl CardExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sgpa_patterns: compile(&[
                // Label plus decimal-or-integer, optional separators.
                (r"SGPA[:\s]*([0-9]+\.?[0-9]*)", 1),
                // Label plus a strict decimal.
                (r"SGPA\s+([0-9]+\.[0-9]+)", 1),
                // Bare decimal anywhere, guarded by the SGPA range check.
                (r"([0-9]+\.[0-9]+)", 1),
            ]),
            credit_patterns: compile(&[
                (r"Total Credits[:\s]*([0-9]+)", 1),
                (r"Total Credits Earned[:\s]*([0-9]+)", 1),
                (r"Total Credits in the Semester[:\s]*([0-9]+)", 1),
            ]),
            // Observed ordering on real grade cards; kept as-is even where
            // the specificity looks inconsistent.
            semester_patterns: compile(&[
                (r"\b(S[1-8])\b", 1),
                (r"Semester\s*([A-Z0-9]+)", 1),
                (r"Semester Grade.*?([A-Z0-9]+)", 1),
                // "Semester <word> <code>": the code is the value.
                (r"Semester\s+(\w+)\s+([A-Z0-9]+)", 2),
                (r"Semester[:\s]*\n?(\S+)", 1),
            ]),
            date_regex: Regex::new(r"([A-Za-z]+)\s+(\d{4})").ok(),
        }
    }

    /// Sole entry point: total over every string input, including empty and
    /// binary-garbage text. Fields that cannot be located come back absent.
    /// Idempotent: the same text always yields the same record.
    #[must_use]
    pub fn parse(&self, text: &str) -> GradeRecord {
        let (exam_month, exam_year) = self.extract_date(text);

        GradeRecord {
            sgpa: self.extract_sgpa(text),
            total_credits: self.extract_credits(text),
            semester: self.extract_semester(text),
            exam_month,
            exam_year,
        }
    }

    /// Ordered fallback with a validity-range guard. Out-of-range and
    /// unparseable candidates continue the search instead of aborting it.
    fn extract_sgpa(&self, text: &str) -> Option<f64> {
        for (layer, pattern) in self.sgpa_patterns.iter().enumerate() {
            match pattern.try_numeric(text, Some((SGPA_MIN, SGPA_MAX))) {
                PatternOutcome::Accepted(value) => {
                    debug!(layer, value, "sgpa accepted");
                    return Some(value);
                }
                PatternOutcome::OutOfRange(value) => {
                    debug!(layer, value, "sgpa candidate out of range, trying next layer");
                }
                PatternOutcome::Unparseable(raw) => {
                    debug!(layer, raw = %raw, "sgpa candidate unparseable, trying next layer");
                }
                PatternOutcome::NoMatch => {}
            }
        }
        None
    }

    /// First matching label variant wins; no range validation, since credit
    /// totals have no fixed upper bound.
    fn extract_credits(&self, text: &str) -> Option<f64> {
        for (layer, pattern) in self.credit_patterns.iter().enumerate() {
            match pattern.try_numeric(text, None) {
                PatternOutcome::Accepted(value) => {
                    debug!(layer, value, "credits accepted");
                    return Some(value);
                }
                PatternOutcome::Unparseable(raw) => {
                    debug!(layer, raw = %raw, "credits candidate unparseable");
                    return None;
                }
                PatternOutcome::OutOfRange(_) | PatternOutcome::NoMatch => {}
            }
        }
        None
    }

    fn extract_semester(&self, text: &str) -> Option<String> {
        self.semester_patterns
            .iter()
            .find_map(|pattern| pattern.capture(text))
            .map(|value| value.trim().to_string())
    }

    /// First "<word> <4-digit-year>" occurrence, independent of the semester
    /// pass. Both pieces are kept as raw substrings, never validated as real
    /// calendar values.
    fn extract_date(&self, text: &str) -> (Option<String>, Option<String>) {
        self.date_regex
            .as_ref()
            .and_then(|re| re.captures(text))
            .map_or((None, None), |caps| {
                (
                    caps.get(1).map(|m| m.as_str().to_string()),
                    caps.get(2).map(|m| m.as_str().to_string()),
                )
            })
    }
}

impl Default for CardExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(specs: &[(&str, usize)]) -> Vec<FieldPattern> {
    let mut patterns = Vec::with_capacity(specs.len());
    for (pattern, group) in specs {
        match FieldPattern::new(pattern, *group) {
            Ok(compiled) => patterns.push(compiled),
            Err(e) => debug!(pattern = %pattern, error = %e, "skipping pattern that failed to compile"),
        }
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> CardExtractor {
        CardExtractor::new()
    }

    #[test]
    fn test_sgpa_labeled() {
        let record = extractor().parse("Register No: KTU123\nSGPA 8.5\n");
        assert_eq!(record.sgpa, Some(8.5));
    }

    #[test]
    fn test_sgpa_label_case_insensitive() {
        assert_eq!(extractor().parse("sgpa: 8.5").sgpa, Some(8.5));
        assert_eq!(extractor().parse("Sgpa:7.03").sgpa, Some(7.03));
    }

    #[test]
    fn test_sgpa_integer_after_label() {
        // Layer 1 allows a bare integer when the label anchors it.
        assert_eq!(extractor().parse("SGPA: 8").sgpa, Some(8.0));
    }

    #[test]
    fn test_sgpa_catch_all_respects_range() {
        // An unlabeled decimal outside [4, 10] must not be taken for a GPA.
        let record = extractor().parse("Page 12.34");
        assert_eq!(record.sgpa, None);
    }

    #[test]
    fn test_sgpa_catch_all_accepts_plausible_decimal() {
        let record = extractor().parse("weighted score 9.12 overall");
        assert_eq!(record.sgpa, Some(9.12));
    }

    #[test]
    fn test_sgpa_out_of_range_label_falls_through() {
        // Layer 1 captures 88.5 (out of range); the colon blocks layer 2 and
        // the catch-all also lands on 88.5 first, so the field stays absent.
        let record = extractor().parse("SGPA: 88.5");
        assert_eq!(record.sgpa, None);
    }

    #[test]
    fn test_sgpa_search_continues_past_unparseable_candidate() {
        // A layer whose value group captures a non-numeric token (a letter
        // grade here) rejects as unparseable; the layers behind it still
        // get their turn.
        let ex = CardExtractor {
            sgpa_patterns: compile(&[(r"Grade[:\s]*(\S+)", 1), (r"([0-9]+\.[0-9]+)", 1)]),
            credit_patterns: Vec::new(),
            semester_patterns: Vec::new(),
            date_regex: None,
        };

        assert_eq!(ex.extract_sgpa("Grade: AB overall 8.5"), Some(8.5));
    }

    #[test]
    fn test_sgpa_boundary_values_inclusive() {
        assert_eq!(extractor().parse("SGPA: 4.0").sgpa, Some(4.0));
        assert_eq!(extractor().parse("SGPA: 10.0").sgpa, Some(10.0));
        assert_eq!(extractor().parse("SGPA: 3.99").sgpa, None);
        assert_eq!(extractor().parse("SGPA: 10.01").sgpa, None);
    }

    #[test]
    fn test_credits_first_variant_wins() {
        let text = "Total Credits: 24\nTotal Credits Earned: 99";
        assert_eq!(extractor().parse(text).total_credits, Some(24.0));
    }

    #[test]
    fn test_credits_fall_back_to_later_variant() {
        // "Total Credits Earned" does not satisfy the first variant because
        // the word breaks the label-digits adjacency.
        let text = "Total Credits Earned: 30";
        assert_eq!(extractor().parse(text).total_credits, Some(30.0));
    }

    #[test]
    fn test_credits_no_range_check() {
        assert_eq!(extractor().parse("Total Credits: 400").total_credits, Some(400.0));
    }

    #[test]
    fn test_semester_short_code() {
        let record = extractor().parse("Grade card for S3 examination");
        assert_eq!(record.semester.as_deref(), Some("S3"));
    }

    #[test]
    fn test_semester_word_token() {
        let record = extractor().parse("Semester 5 results");
        assert_eq!(record.semester.as_deref(), Some("5"));
    }

    #[test]
    fn test_semester_two_token_variant_takes_second_group() {
        // None of the earlier layers match: no S-code token, and the
        // underscore blocks the "Semester <token>" layer. The two-token
        // layer must yield the second capture, not the first.
        let record = extractor().parse("Semester _x THREE");
        assert_eq!(record.semester.as_deref(), Some("THREE"));
    }

    #[test]
    fn test_semester_after_line_break() {
        let record = extractor().parse("Semester:\n#4");
        assert_eq!(record.semester.as_deref(), Some("#4"));
    }

    #[test]
    fn test_date_first_occurrence() {
        let record = extractor().parse("Examination April 2024\nPublished May 2024");
        assert_eq!(record.exam_month.as_deref(), Some("April"));
        assert_eq!(record.exam_year.as_deref(), Some("2024"));
    }

    #[test]
    fn test_date_independent_of_semester() {
        let record = extractor().parse("Results of June 2023");
        assert_eq!(record.semester, None);
        assert_eq!(record.exam_month.as_deref(), Some("June"));
        assert_eq!(record.exam_year.as_deref(), Some("2023"));
    }

    #[test]
    fn test_fields_extracted_independently() {
        let record = extractor().parse("SGPA 8.11 with no other fields");
        assert_eq!(record.sgpa, Some(8.11));
        assert_eq!(record.total_credits, None);
        assert_eq!(record.semester, None);
    }

    #[test]
    fn test_empty_input_yields_empty_record() {
        let record = extractor().parse("");
        assert!(record.is_empty());
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let garbage = "\u{0}\u{fffd}\u{1f4a9}}{)(*&^%$\n\t\r";
        let record = extractor().parse(garbage);
        assert_eq!(record.sgpa, None);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "S2 Semester Grade Card\nSGPA: 7.84\nTotal Credits: 21\nMay 2023";
        let ex = extractor();
        assert_eq!(ex.parse(text), ex.parse(text));
    }

    #[test]
    fn test_full_grade_card() {
        let text = "\
            APJ Abdul Kalam Technological University\n\
            Semester Grade Card\n\
            Register No: KTU22CS001\n\
            Examination held in December 2023\n\
            S4\n\
            Total Credits in the Semester: 22\n\
            SGPA: 9.05\n";

        let record = extractor().parse(text);
        assert_eq!(record.sgpa, Some(9.05));
        assert_eq!(record.total_credits, Some(22.0));
        assert_eq!(record.semester.as_deref(), Some("S4"));
        assert_eq!(record.exam_month.as_deref(), Some("December"));
        assert_eq!(record.exam_year.as_deref(), Some("2023"));
    }
}
