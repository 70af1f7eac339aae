//! Error-to-response translation at the service boundary
//!
//! Every error that escapes a request handler goes through
//! [`ErrorTranslator::translate`]: the client gets a small uniform JSON body,
//! and the full error detail goes to the debug tier for later diagnosis.

use crate::core::{record::iso8601, Level, LogContext, LogRecord, Logger};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use std::error::Error;

pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const DEFAULT_ERROR_MESSAGE: &str = "Internal server error";

/// Error kind that declares the HTTP status it should be answered with
///
/// # Example
///
/// ```
/// use rust_log_router::translator::HttpException;
///
/// let err = HttpException::not_found("user 7 not found");
/// assert_eq!(err.status(), 404);
/// assert_eq!(err.to_string(), "user 7 not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HttpException {
    status: u16,
    message: String,
}

impl HttpException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The parts of the incoming request the translator reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub method: Option<String>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: None,
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// Client-facing error body
///
/// Serializes as `{"statusCode":404,"timestamp":"…","path":"/users/7","message":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub timestamp: String,
    pub path: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn to_json(&self) -> String {
        // plain strings and an integer always serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

/// Turns any error into an [`ErrorResponse`] and one debug record
#[derive(Debug, Clone)]
pub struct ErrorTranslator {
    logger: Logger,
}

impl ErrorTranslator {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Status the error declares, searching its source chain; 500 otherwise
    ///
    /// A declared status outside 100..=599 is not a valid HTTP status and
    /// also resolves to 500.
    pub fn status_of(error: &(dyn Error + 'static)) -> u16 {
        let mut current = Some(error);
        while let Some(err) = current {
            if let Some(declared) = err.downcast_ref::<HttpException>() {
                return match declared.status {
                    100..=599 => declared.status,
                    _ => INTERNAL_SERVER_ERROR,
                };
            }
            current = err.source();
        }
        INTERNAL_SERVER_ERROR
    }

    /// Build the response for `error` and log the diagnostic record
    ///
    /// Total: never fails and never panics on odd errors.
    pub fn translate(&self, error: &(dyn Error + 'static), request: &RequestContext) -> ErrorResponse {
        let status_code = Self::status_of(error);
        let message = client_message(&error.to_string());

        self.respond(status_code, message, error_detail(error), request)
    }

    /// Response for a panic caught at the boundary; always 500
    pub fn translate_panic(&self, payload: &(dyn Any + Send), request: &RequestContext) -> ErrorResponse {
        let raw = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();

        let detail = json!({
            "message": raw,
            "panic": true,
        });

        self.respond(INTERNAL_SERVER_ERROR, client_message(&raw), detail, request)
    }

    fn respond(
        &self,
        status_code: u16,
        message: String,
        detail: Value,
        request: &RequestContext,
    ) -> ErrorResponse {
        let response = ErrorResponse {
            status_code,
            timestamp: iso8601(&Utc::now()),
            path: request.path.clone(),
            message,
        };

        let mut metadata = LogContext::new().with_field("error", detail);
        if let Some(ref method) = request.method {
            metadata.add_field("method", method.clone());
        }

        self.logger.log_record(
            LogRecord::new(
                Level::DEBUG,
                format!("Exception occurred: {}", response.message),
            )
            .with_metadata(metadata)
            .with_path(request.path.clone())
            .with_status_code(status_code),
        );

        response
    }
}

/// `{message, detail, causes}` rendering of an error and its source chain
pub(crate) fn error_detail(error: &(dyn Error + 'static)) -> Value {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(Value::String(cause.to_string()));
        source = cause.source();
    }

    json!({
        "message": error.to_string(),
        "detail": format!("{:?}", error),
        "causes": causes,
    })
}

fn client_message(raw: &str) -> String {
    if raw.trim().is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        raw.to_string()
    }
}
