use regex::{Regex, RegexBuilder};

/// One layer of an ordered fallback list: a compiled expression plus the
/// index of the capture group that carries the field value. Most patterns
/// capture in group 1; the "Semester <word> <code>" variant deliberately
/// takes group 2.
pub struct FieldPattern {
    regex: Regex,
    group: usize,
}

/// Result of trying a single pattern against a document. Rejections are
/// ordinary outcomes, never errors: the caller moves on to the next layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternOutcome {
    Accepted(f64),
    OutOfRange(f64),
    Unparseable(String),
    NoMatch,
}

impl FieldPattern {
    /// Compiles a case-insensitive pattern. Grade cards are inconsistent
    /// about casing, so every layer matches case-insensitively.
    pub fn new(pattern: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: RegexBuilder::new(pattern).case_insensitive(true).build()?,
            group,
        })
    }

    /// First occurrence of this pattern's value group in `text`, verbatim.
    #[must_use]
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str())
    }

    /// Numeric attempt on the first occurrence. Only the first match is
    /// considered; a rejected candidate does not trigger a scan for later
    /// occurrences of the same pattern.
    #[must_use]
    pub fn try_numeric(&self, text: &str, range: Option<(f64, f64)>) -> PatternOutcome {
        let Some(raw) = self.capture(text) else {
            return PatternOutcome::NoMatch;
        };

        match raw.parse::<f64>() {
            Ok(value) => match range {
                Some((lo, hi)) if !(lo..=hi).contains(&value) => PatternOutcome::OutOfRange(value),
                _ => PatternOutcome::Accepted(value),
            },
            Err(_) => PatternOutcome::Unparseable(raw.to_string()),
        }
    }
}
