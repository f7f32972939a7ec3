//! Application error types and HTTP response conversion.
//!
//! Defines a unified error type ([`AppError`]) mapping to HTTP status codes
//! and structured JSON error responses, following the taxonomy:
//!
//! | Variant | Origin | Status | Wire code |
//! |---|---|---|---|
//! | [`AppError::Validation`] | bad input | 400 | `VALIDATION_ERROR` |
//! | [`AppError::NotFound`] | missing entity | 404 | `NOT_FOUND` |
//! | [`AppError::Gone`] | expired/click-limited link | 410 | `GONE` |
//! | [`AppError::AlreadyExists`] | unique violation | 409 | `ALREADY_EXISTS` |
//! | [`AppError::Unauthorized`] | missing/expired credential | 401 | `UNAUTHORIZED` |
//! | [`AppError::Forbidden`] | authorization denied | 403 | `FORBIDDEN` |
//! | [`AppError::PaymentRequired`] | entitlement missing | 402 | `PAYMENT_REQUIRED` |
//! | [`AppError::RateLimited`] | quota exhausted | 429 | `RATE_LIMITED` |
//! | [`AppError::Transient`] | retried at component boundary, never reaches HTTP | 500 | `INTERNAL_ERROR` |
//! | [`AppError::Fatal`] | invariant broken, logged with context | 500 | `INTERNAL_ERROR` |
//!
//! Database errors convert via [`From<sqlx::Error>`]; validation errors via
//! [`From<validator::ValidationErrors>`]. Every database error path emits a
//! `metrics::counter!("database_errors_total", ...)`.

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use sqlx::Error as SqlxError;
use validator::ValidationErrors;

/// Internal structure for JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Structured error information returned in API responses.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Application-level error type with context and HTTP mapping.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Gone { message: String, details: Value },
    AlreadyExists { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    Forbidden { message: String, details: Value },
    PaymentRequired { message: String, details: Value },
    RateLimited { message: String, details: Value, retry_after_secs: u64 },
    Transient { message: String, details: Value },
    Fatal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation { message: message.into(), details }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound { message: message.into(), details }
    }

    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone { message: message.into(), details }
    }

    pub fn already_exists(message: impl Into<String>, details: Value) -> Self {
        Self::AlreadyExists { message: message.into(), details }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized { message: message.into(), details }
    }

    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden { message: message.into(), details }
    }

    pub fn payment_required(feature: &str, minimum_tier: &str) -> Self {
        Self::PaymentRequired {
            message: format!("This feature requires the {minimum_tier} plan or higher"),
            details: json!({ "feature": feature, "minimum_tier": minimum_tier }),
        }
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RateLimited {
            message: "Rate limit exceeded".to_string(),
            details: json!({ "retry_after_secs": retry_after_secs }),
            retry_after_secs,
        }
    }

    pub fn transient(message: impl Into<String>, details: Value) -> Self {
        Self::Transient { message: message.into(), details }
    }

    pub fn fatal(message: impl Into<String>, details: Value) -> Self {
        Self::Fatal { message: message.into(), details }
    }

    /// Legacy alias kept for call sites ported from the internal-error idiom.
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Fatal { message: message.into(), details }
    }

    pub fn to_error_info(self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("VALIDATION_ERROR", message, details),
            AppError::NotFound { message, details } => ("NOT_FOUND", message, details),
            AppError::Gone { message, details } => ("GONE", message, details),
            AppError::AlreadyExists { message, details } => ("ALREADY_EXISTS", message, details),
            AppError::Unauthorized { message, details } => ("UNAUTHORIZED", message, details),
            AppError::Forbidden { message, details } => ("FORBIDDEN", message, details),
            AppError::PaymentRequired { message, details } => ("PAYMENT_REQUIRED", message, details),
            AppError::RateLimited { message, details, .. } => ("RATE_LIMITED", message, details),
            AppError::Transient { message, details } => ("INTERNAL_ERROR", message, details),
            AppError::Fatal { message, details } => ("INTERNAL_ERROR", message, details),
        };

        ErrorInfo { code, message, details }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Fatal { ref message, ref details } = self {
            tracing::error!(message = %message, details = %details, "fatal error surfaced to caller");
        }

        let retry_after = if let AppError::RateLimited { retry_after_secs, .. } = &self {
            Some(*retry_after_secs)
        } else {
            None
        };
        let unauthorized = matches!(self, AppError::Unauthorized { .. });

        let status = match &self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Gone { .. } => StatusCode::GONE,
            AppError::AlreadyExists { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::PaymentRequired { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Transient { .. } | AppError::Fatal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let info = self.to_error_info();
        let body = ErrorBody { error: info };

        let mut headers = HeaderMap::new();
        if unauthorized {
            headers.insert(header::WWW_AUTHENTICATE, "Bearer".parse().unwrap());
        }
        if let Some(secs) = retry_after {
            if let Ok(value) = secs.to_string().parse() {
                headers.insert(header::RETRY_AFTER, value);
            }
        }

        if headers.is_empty() {
            (status, Json(body)).into_response()
        } else {
            (status, headers, Json(body)).into_response()
        }
    }
}

impl From<SqlxError> for AppError {
    fn from(e: SqlxError) -> Self {
        map_sqlx_error(e)
    }
}

/// Maps SQLx errors to application errors with detailed context.
///
/// Handles constraint violations, connection issues, and other database errors
/// with appropriate wire codes and metrics emission.
pub fn map_sqlx_error(e: SqlxError) -> AppError {
    #[cfg(debug_assertions)]
    tracing::debug!(error = ?e, "Full sqlx error in debug mode");

    match &e {
        SqlxError::Database(db_err) => {
            if db_err.is_unique_violation() {
                metrics::counter!("database_errors_total", "type" => "unique_violation")
                    .increment(1);

                let constraint = db_err.constraint().unwrap_or("unknown");
                let (message, field) = match constraint {
                    "links_short_code_key" => ("This short code is already in use", "short_code"),
                    "domains_domain_key" => ("This domain is already claimed", "domain"),
                    "webhooks_url_workspace_key" => ("A webhook for this URL already exists", "url"),
                    "api_keys_key_prefix_key" => ("API key prefix collision, retry", "key_prefix"),
                    _ => {
                        tracing::warn!(constraint = constraint, "Unknown unique constraint violated");
                        ("Resource already exists", constraint)
                    }
                };

                return AppError::already_exists(
                    message,
                    json!({ "field": field, "constraint": constraint, "type": "unique_violation" }),
                );
            }

            if db_err.is_foreign_key_violation() {
                metrics::counter!("database_errors_total", "type" => "foreign_key_violation")
                    .increment(1);

                let constraint = db_err.constraint().unwrap_or("unknown");
                let message = match constraint {
                    "clicks_link_id_fkey" => "The referenced link does not exist",
                    "webhook_deliveries_webhook_id_fkey" => "The referenced webhook does not exist",
                    _ => {
                        tracing::warn!(constraint = constraint, "Unknown foreign key constraint violated");
                        "Referenced resource not found"
                    }
                };

                return AppError::bad_request(
                    message,
                    json!({ "constraint": constraint, "type": "foreign_key_violation" }),
                );
            }

            if db_err.is_check_violation() {
                metrics::counter!("database_errors_total", "type" => "check_violation").increment(1);
                let constraint = db_err.constraint().unwrap_or("unknown");
                tracing::warn!(constraint = constraint, "Check constraint violated");
                return AppError::bad_request(
                    "Data validation failed",
                    json!({ "constraint": constraint, "type": "check_violation" }),
                );
            }

            tracing::error!(
                code = ?db_err.code(),
                message = ?db_err.message(),
                constraint = ?db_err.constraint(),
                "Unhandled database error"
            );
            metrics::counter!("database_errors_total", "type" => "other").increment(1);
            AppError::fatal("Database constraint violation", json!({ "code": db_err.code() }))
        }

        SqlxError::RowNotFound => {
            metrics::counter!("database_errors_total", "type" => "row_not_found").increment(1);
            AppError::not_found("Record not found", json!({}))
        }

        SqlxError::PoolTimedOut => {
            tracing::warn!("Database connection pool timed out");
            metrics::counter!("database_errors_total", "type" => "pool_timeout").increment(1);
            AppError::transient("Service temporarily unavailable", json!({ "type": "pool_timeout" }))
        }

        SqlxError::PoolClosed => {
            tracing::error!("Database connection pool is closed");
            metrics::counter!("database_errors_total", "type" => "pool_closed").increment(1);
            AppError::fatal("Service unavailable", json!({ "type": "pool_closed" }))
        }

        SqlxError::Io(_) => {
            tracing::warn!(error = ?e, "Database I/O error");
            metrics::counter!("database_errors_total", "type" => "io_error").increment(1);
            AppError::transient("Database connection issue", json!({ "type": "io_error" }))
        }

        SqlxError::Protocol(_) => {
            tracing::error!(error = ?e, "Database protocol error");
            metrics::counter!("database_errors_total", "type" => "protocol_error").increment(1);
            AppError::fatal("Database protocol error", json!({ "type": "protocol_error" }))
        }

        _ => {
            tracing::error!(error = ?e, "Unexpected database error");
            metrics::counter!("database_errors_total", "type" => "unknown").increment(1);
            AppError::fatal("Database operation failed", json!({}))
        }
    }
}

impl std::error::Error for AppError {}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation { message, .. } => write!(f, "Validation error: {}", message),
            AppError::NotFound { message, .. } => write!(f, "Not found: {}", message),
            AppError::Gone { message, .. } => write!(f, "Gone: {}", message),
            AppError::AlreadyExists { message, .. } => write!(f, "Already exists: {}", message),
            AppError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
            AppError::Forbidden { message, .. } => write!(f, "Forbidden: {}", message),
            AppError::PaymentRequired { message, .. } => write!(f, "Payment required: {}", message),
            AppError::RateLimited { message, .. } => write!(f, "Rate limited: {}", message),
            AppError::Transient { message, .. } => write!(f, "Transient error: {}", message),
            AppError::Fatal { message, .. } => write!(f, "Fatal error: {}", message),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = json!({
            "fields": errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    (
                        field.to_string(),
                        errors
                            .iter()
                            .map(|e| {
                                json!({
                                    "code": e.code,
                                    "message": e.message.as_ref().map(|m| m.to_string()),
                                    "params": e.params
                                })
                            })
                            .collect::<Vec<_>>()
                    )
                })
                .collect::<std::collections::HashMap<_, _>>()
        });

        AppError::Validation {
            message: "Request validation failed".to_string(),
            details,
        }
    }
}
