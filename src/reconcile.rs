//! Turns a model's free-text reply into a count vector.
//!
//! The reply is expected to be a comma-separated list of integers, one per
//! ranked word. Models do not always comply, so parsing never fails: bad
//! entries become 0 and the list is padded or truncated to the expected
//! length.

/// Result of reconciling a reply against the expected word count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Exactly `expected` counts.
    pub counts: Vec<u64>,
    /// True when an entry failed to parse or the length did not match.
    pub malformed: bool,
}

/// Parse `raw` into exactly `expected` non-negative counts.
pub fn reconcile_counts(raw: &str, expected: usize) -> Reconciled {
    let mut malformed = false;
    let mut counts: Vec<u64> = raw
        .split(',')
        .map(|entry| match entry.trim().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                malformed = true;
                0
            }
        })
        .collect();

    if counts.len() != expected {
        malformed = true;
    }
    counts.resize(expected, 0);

    Reconciled { counts, malformed }
}

/// Pad with zeros or truncate `counts` to `expected` entries.
pub fn fit_length(counts: &[u64], expected: usize) -> Vec<u64> {
    let mut fitted = counts.to_vec();
    fitted.resize(expected, 0);
    fitted
}
