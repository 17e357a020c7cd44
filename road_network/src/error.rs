use thiserror::Error;

/// Everything that can stop an analysis. Individual malformed ways aren't errors; they're skipped
/// and counted on the result. An oversized region isn't an error either; it's a warning.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The caller's region or options were unusable. Retrying won't help.
    #[error("Invalid input: {0}")]
    Input(String),
    /// Every endpoint failed, in order. Each attempt is kept for diagnostics.
    #[error("All {} road data endpoints failed. Last error: {}", .attempts.len(), last_message(.attempts))]
    UpstreamFetch { attempts: Vec<EndpointFailure> },
    #[error("Couldn't parse road data: {0}")]
    Parse(String),
    #[error("Image problem: {0}")]
    Image(String),
    /// A finished result couldn't be serialized.
    #[error("Couldn't write road data: {0}")]
    Export(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub message: String,
}

fn last_message(attempts: &[EndpointFailure]) -> String {
    match attempts.last() {
        Some(failure) => format!("{} ({})", failure.message, failure.endpoint),
        None => "no endpoints were tried".to_string(),
    }
}

/// A rough guess at what went wrong, only used to suggest a remedy to people.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Timeout,
    Cors,
    Parse,
    Input,
    Other,
}

impl AnalysisError {
    pub fn input<I: Into<String>>(msg: I) -> AnalysisError {
        AnalysisError::Input(msg.into())
    }

    /// For `UpstreamFetch`, the failure from the final endpoint tried.
    pub fn last_failure(&self) -> Option<&EndpointFailure> {
        match self {
            AnalysisError::UpstreamFetch { attempts } => attempts.last(),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::Input(_) | AnalysisError::Image(_) => ErrorCategory::Input,
            AnalysisError::Parse(_) => ErrorCategory::Parse,
            AnalysisError::Export(_) => ErrorCategory::Other,
            AnalysisError::UpstreamFetch { .. } => categorize_message(&self.to_string()),
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check your internet connection, or try the raster analysis path instead."
            }
            ErrorCategory::Timeout => {
                "The road data servers are slow right now. Try a smaller region, or the raster analysis path instead."
            }
            ErrorCategory::Cors => {
                "The road data server refused the request. Try a different endpoint, or the raster analysis path instead."
            }
            ErrorCategory::Parse => {
                "The road data server sent something unexpected. Try again later, or the raster analysis path instead."
            }
            ErrorCategory::Input => "Check that the region contains at least one valid polygon.",
            ErrorCategory::Other => "Try again, or try the raster analysis path instead.",
        }
    }
}

/// Keyword sniffing over an error message. Order matters; a timed out request also mentions the
/// request failing.
pub fn categorize_message(msg: &str) -> ErrorCategory {
    let msg = msg.to_lowercase();
    if msg.contains("timeout") || msg.contains("timed out") {
        ErrorCategory::Timeout
    } else if msg.contains("cors") || msg.contains("cross-origin") {
        ErrorCategory::Cors
    } else if msg.contains("parse") || msg.contains("json") || msg.contains("expected value") {
        ErrorCategory::Parse
    } else if msg.contains("network")
        || msg.contains("connect")
        || msg.contains("dns")
        || msg.contains("sending request")
        || msg.contains("status")
    {
        ErrorCategory::Network
    } else {
        ErrorCategory::Other
    }
}
