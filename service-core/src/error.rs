use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(anyhow::Error),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// One entry of the per-field validation detail list.
#[derive(Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Flatten nested `ValidationErrors` into dotted field paths
/// (`invoice.lineItems[0].unitPrice` style).
///
/// `validator` reports Rust field names; segments are converted to camelCase
/// so the paths name the keys the client actually sent.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    flatten_into("", errors, &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn flatten_into(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let segment = camel_case(field);
        let path = if prefix.is_empty() {
            segment
        } else {
            format!("{}.{}", prefix, segment)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    out.push(FieldError {
                        field: path.clone(),
                        message: err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("failed constraint: {}", err.code)),
                        value: err.params.get("value").cloned(),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_into(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_into(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

fn expose_details() -> bool {
    !crate::config::is_prod()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            success: bool,
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        let (status, error_message, details) = match self {
            AppError::ValidationError(ref err) => {
                let fields = flatten_validation_errors(err);
                (
                    StatusCode::BAD_REQUEST,
                    "Validation failed".to_string(),
                    serde_json::to_value(fields).ok(),
                )
            }
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None),
            AppError::PayloadTooLarge(err) => {
                (StatusCode::PAYLOAD_TOO_LARGE, err.to_string(), None)
            }
            AppError::ExtractionFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                expose_details().then(|| serde_json::Value::String(format!("{:#}", err))),
            ),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                expose_details().then(|| serde_json::Value::String(err.to_string())),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                expose_details().then(|| serde_json::Value::String(err.to_string())),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Inner {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(range(min = 0.0, message = "must be non-negative"))]
        amount: f64,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Outer {
        #[validate(nested)]
        inner: Inner,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn flattens_nested_and_list_errors_with_dotted_paths() {
        let outer = Outer {
            inner: Inner {
                name: String::new(),
                amount: 1.0,
            },
            items: vec![
                Inner {
                    name: "ok".into(),
                    amount: 2.0,
                },
                Inner {
                    name: "ok".into(),
                    amount: -3.0,
                },
            ],
        };

        let errors = outer.validate().unwrap_err();
        let fields = flatten_validation_errors(&errors);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "inner.name");
        assert_eq!(fields[0].message, "must not be empty");
        assert_eq!(fields[1].field, "items[1].amount");
        assert_eq!(fields[1].value, Some(serde_json::json!(-3.0)));
    }

    #[test]
    fn field_paths_use_the_wire_casing() {
        #[derive(Debug, Deserialize, Validate)]
        #[serde(rename_all = "camelCase")]
        struct Details {
            #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
            tax_percent: f64,
        }

        #[derive(Debug, Deserialize, Validate)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            #[validate(nested)]
            invoice: Details,
            #[validate(nested)]
            line_items: Vec<Details>,
        }

        let errors = Payload {
            invoice: Details { tax_percent: 150.0 },
            line_items: vec![Details { tax_percent: -1.0 }],
        }
        .validate()
        .unwrap_err();
        let fields = flatten_validation_errors(&errors);

        assert_eq!(fields[0].field, "invoice.taxPercent");
        assert_eq!(fields[1].field, "lineItems[0].taxPercent");
    }

    #[test]
    fn uses_code_when_no_message_is_set() {
        #[derive(Debug, Validate)]
        struct Plain {
            #[validate(length(min = 1))]
            name: String,
        }

        let errors = Plain {
            name: String::new(),
        }
        .validate()
        .unwrap_err();
        let fields = flatten_validation_errors(&errors);

        assert_eq!(fields[0].field, "name");
        assert!(fields[0].message.contains("length"));
    }
}
