use serde::Serialize;

/// Result of verifying one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Outcome {
    Pending,
    Matched,
    Mismatched,
    /// An I/O error recorded instead of aborting the run.
    Error { message: String },
}

impl Outcome {
    pub fn judge(expected: &[u8], actual: &[u8]) -> Outcome {
        if verify(expected, actual) {
            Outcome::Matched
        } else {
            Outcome::Mismatched
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Outcome::Matched)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }
}

/// Exact byte equality. A short read never matches.
pub fn verify(expected: &[u8], actual: &[u8]) -> bool {
    expected == actual
}

/// Index of the first byte where the buffers disagree, if any.
///
/// A read that is a strict prefix of the payload diverges at its own length.
///
pub fn first_divergence(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}
