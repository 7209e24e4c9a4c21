//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before responding; clients only see a JSON body of the
//! form `{"error": "..."}` (plus `"fields"` for validation failures).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::checkout::{FieldErrors, SubmitError};
use crate::woocommerce::CommerceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// WooCommerce operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Form fields failed validation.
    #[error("Validation failed ({} fields)", .0.len())]
    Validation(FieldErrors),

    /// The request conflicts with the current state or an in-flight request.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(fields) => Self::Validation(fields),
            SubmitError::Backend(e) => Self::Commerce(e),
            SubmitError::NotAtReview | SubmitError::AlreadySubmitted => {
                Self::Conflict(err.user_message().to_string())
            }
            SubmitError::EmptyCart => Self::BadRequest(err.user_message().to_string()),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Commerce(err) => match err {
                CommerceError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                CommerceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                CommerceError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_) | Self::Commerce(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let body = match self {
            Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Commerce(err) => json!({ "error": err.user_message() }),
            Self::Validation(fields) => json!({
                "error": "Please correct the highlighted fields.",
                "fields": fields,
            }),
            Self::Conflict(msg) | Self::NotFound(msg) | Self::BadRequest(msg) => {
                json!({ "error": msg })
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Validation(FieldErrors::new())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::Timeout)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::NotConfigured)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response = AppError::Internal("pool exhausted at 10.0.0.4".to_string()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_upstream_status_uses_user_copy() {
        let err = AppError::Commerce(CommerceError::Status {
            status: 503,
            body: "<html>maintenance</html>".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"], crate::woocommerce::status_message(503));
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("shippingAddress.email", "Enter a valid email address");
        let response = AppError::Validation(fields).into_response();

        let body = body_json(response).await;
        assert_eq!(
            body["fields"]["shippingAddress.email"],
            "Enter a valid email address"
        );
    }

    #[test]
    fn test_submit_error_mapping() {
        assert!(matches!(
            AppError::from(SubmitError::EmptyCart),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(SubmitError::NotAtReview),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(SubmitError::Invalid(FieldErrors::new())),
            AppError::Validation(_)
        ));
    }
}
