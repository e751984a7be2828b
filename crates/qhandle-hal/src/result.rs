//! Measurement results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Histogram of observed outcome bitstrings.
///
/// Keys are kept in lexicographic order so that the serialized form is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` observations of `bitstring`. Repeated inserts accumulate.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        let slot = self.0.entry(bitstring.into()).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Number of observations of `bitstring` (0 if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Sum of all counts, saturating at `u64::MAX`.
    pub fn total_shots(&self) -> u64 {
        self.checked_total().unwrap_or(u64::MAX)
    }

    /// Sum of all counts, or `None` if it does not fit in a `u64`.
    pub fn checked_total(&self) -> Option<u64> {
        self.0
            .values()
            .try_fold(0u64, |total, count| total.checked_add(*count))
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate outcomes in bitstring order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    /// Outcomes sorted by descending count, ties broken by bitstring.
    pub fn sorted(&self) -> Vec<(&String, &u64)> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The most frequently observed outcome.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.sorted()
            .first()
            .map(|(bits, count)| (bits.as_str(), **count))
    }

    /// Observed frequency of `bitstring`, or 0.0 for an empty histogram.
    pub fn probability(&self, bitstring: &str) -> f64 {
        let total = self.total_shots();
        if total == 0 {
            return 0.0;
        }
        self.get(bitstring) as f64 / total as f64
    }

    /// Width shared by all keys, if any outcome was recorded.
    pub fn width(&self) -> Option<usize> {
        self.0.keys().next().map(String::len)
    }

    /// Expectation value of the Z-parity observable over all measured
    /// positions: outcomes with an even number of ones count +1, odd -1.
    pub fn expectation_z(&self) -> Option<f64> {
        let total = self.total_shots();
        if total == 0 {
            return None;
        }
        let signed: i128 = self
            .0
            .iter()
            .map(|(bits, count)| {
                let ones = bits.bytes().filter(|b| *b == b'1').count();
                if ones % 2 == 0 {
                    i128::from(*count)
                } else {
                    -i128::from(*count)
                }
            })
            .sum();
        Some(signed as f64 / total as f64)
    }

    /// Check that every key is a non-empty string of `0`/`1` and that all
    /// keys share one width.
    pub fn validate(&self) -> Result<(), String> {
        let Some(width) = self.width() else {
            return Ok(());
        };
        for bits in self.0.keys() {
            if bits.is_empty() || !bits.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(format!("outcome '{bits}' is not a bitstring"));
            }
            if bits.len() != width {
                return Err(format!(
                    "outcome '{bits}' has width {} but expected {width}",
                    bits.len()
                ));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bits, count) in iter {
            counts.insert(bits, count);
        }
        counts
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(bits, count)| (bits.to_string(), count))
            .collect()
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (bits, count) in &self.0 {
            write!(f, "{bits}:{count} ")?;
        }
        write!(f, "}}")
    }
}

/// Result of a finished job as reported by a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement histogram.
    pub counts: Counts,
    /// Number of shots that produced the histogram.
    pub shots: u32,
    /// Wall-clock execution time on the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a new result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
        }
    }

    /// Attach the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }
}
