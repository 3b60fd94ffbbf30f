use serde::{Deserialize, Serialize};

use crate::extract::GradeRecord;

/// One document's contribution to the cumulative figure: the semester GPA
/// weighted by the semester's credit total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEntry {
    pub value: f64,
    pub weight: f64,
}

impl WeightedEntry {
    #[must_use]
    pub const fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }

    /// Present only when the record carries both an SGPA and a credit
    /// total. Records missing either field contribute nothing; they are
    /// never counted as zero.
    #[must_use]
    pub fn from_record(record: &GradeRecord) -> Option<Self> {
        match (record.sgpa, record.total_credits) {
            (Some(value), Some(weight)) => Some(Self { value, weight }),
            _ => None,
        }
    }
}

/// Outcome of cumulative aggregation. Zero usable entries is an expected
/// result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CumulativeGpa {
    Weighted(f64),
    InsufficientData,
}

impl CumulativeGpa {
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Weighted(v) => Some(v),
            Self::InsufficientData => None,
        }
    }
}

impl std::fmt::Display for CumulativeGpa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weighted(v) => write!(f, "{v:.2}"),
            Self::InsufficientData => f.write_str("insufficient data"),
        }
    }
}

/// Credit-weighted average over the entries, `sum(v*w) / sum(w)`, rounded
/// to two decimal places (half away from zero). Zero total weight reports
/// [`CumulativeGpa::InsufficientData`] instead of dividing.
pub fn cumulative_gpa<I>(entries: I) -> CumulativeGpa
where
    I: IntoIterator<Item = WeightedEntry>,
{
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for entry in entries {
        weighted_sum += entry.value * entry.weight;
        total_weight += entry.weight;
    }

    if total_weight > 0.0 {
        CumulativeGpa::Weighted(round_two(weighted_sum / total_weight))
    } else {
        CumulativeGpa::InsufficientData
    }
}

fn round_two(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
