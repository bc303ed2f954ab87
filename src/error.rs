//! Error kinds surfaced by the prediction client.
//!
//! Each kind maps to one recovery path: validation failures keep the user on
//! the search form, prediction failures route to the error page, and a
//! missing result state redirects back to the form.

use crate::form::FormField;
use thiserror::Error;

/// The form was submitted with one or more empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all fields are required (missing: {})", display_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<FormField>,
}

fn display_fields(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The prediction service could not produce a usable result.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("invalid prediction endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("request to prediction service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed prediction payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("prediction request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("failed to encode prediction request: {0}")]
    Encode(String),
}

/// The result route was entered without the state handed over by the search
/// form (e.g. typed in directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("result page opened without a prediction result")]
pub struct MissingResultStateError;

/// The column-oriented recommended-properties payload is inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataIntegrityError {
    #[error("row '{key}' has no {column} value")]
    MissingValue { column: &'static str, key: String },

    #[error("{column} column has row '{key}' not present in Longitude")]
    UnexpectedKey { column: &'static str, key: String },
}

/// Failure while rasterizing or writing an exported report.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot rasterize an empty view ({width}x{height})")]
    EmptyView { width: u32, height: u32 },

    #[error("failed to encode snapshot: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to build document: {0}")]
    Document(#[from] lopdf::Error),

    #[error("I/O error while exporting: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Unknown or malformed navigation path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches '{0}'")]
pub struct RouteError(pub String);

/// Illegal request-state transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {state}")]
pub struct StateError {
    pub action: &'static str,
    pub state: &'static str,
}

/// A configuration value could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Reasons a form submission does not start a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a prediction request is already in flight")]
    InFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_missing_keys() {
        let err = ValidationError {
            missing: vec![FormField::Address, FormField::Landsize],
        };
        assert_eq!(
            err.to_string(),
            "all fields are required (missing: address, landsize)"
        );
    }

    #[test]
    fn test_state_error_message() {
        let err = StateError {
            action: "submit",
            state: "loading",
        };
        assert_eq!(err.to_string(), "cannot submit while loading");
    }
}
