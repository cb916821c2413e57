use crate::FailureKind;

/// Interpretation of a service-reported job error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The service confirmed there is simply no data for the key.
    ExpectedEmpty,
    /// A genuine failure of the backend computation.
    Job,
}

impl ErrorClass {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ErrorClass::ExpectedEmpty => FailureKind::NotFoundExpected,
            ErrorClass::Job => FailureKind::JobError,
        }
    }
}

/// Classifies the service's free-text error messages.
///
/// The backend has no structured error codes, only human-readable text,
/// so "no data for this date" is told apart from real failures by
/// substring matching. The pattern set is overridable for when the
/// service's message format changes.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    empty_patterns: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::with_patterns([
            "no flight data",
            "no data available",
            "emissions data not found",
        ])
    }
}

impl ErrorClassifier {
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            empty_patterns: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, message: &str) -> ErrorClass {
        let lowered = message.to_lowercase();
        if self
            .empty_patterns
            .iter()
            .any(|pattern| lowered.contains(pattern))
        {
            ErrorClass::ExpectedEmpty
        } else {
            ErrorClass::Job
        }
    }
}
