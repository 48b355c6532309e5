//! Unified error handling with Sentry integration.
//!
//! Subsystems return their own `thiserror` enums; anything shown to a visitor
//! or an admin is converted into [`AppError`], whose variants follow how the
//! error should be surfaced:
//!
//! - `Validation` / `InvalidInput`: inline next to the offending input
//! - `Service`: a dismissible notice; the operation can be retried
//! - `NotFound`: an alert on the admin dashboard
//! - `Unauthorized`: the admin gate is still locked
//!
//! Translation failures never reach this type; they degrade to source text.

use thiserror::Error;

use crate::backend::BackendError;
use crate::checkout::{CheckoutError, ValidationError};
use crate::curator::CuratorError;
use crate::store::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Form fields failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A request was malformed in a way not tied to a form field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage or a remote service failed.
    #[error("Service error: {0}")]
    Service(#[source] BoxError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Admin session is locked.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Whether repeating the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    /// Text safe to show to a visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            // Don't expose internal error details
            Self::Service(_) => "Something went wrong on our side. Please try again.".to_string(),
            _ => self.to_string(),
        }
    }

    /// Log the error, capturing service failures to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Service(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Service error"
            );
        } else {
            tracing::debug!(error = %self, "User-facing error");
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::ProductNotFound(id) => Self::NotFound(format!("product {id}")),
            BackendError::InvalidInput(message) => Self::InvalidInput(message),
            err @ (BackendError::Store(_) | BackendError::DataCorruption { .. }) => {
                Self::Service(Box::new(err))
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Service(Box::new(err))
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(e) => Self::Validation(e),
            CheckoutError::Service(e) => e.into(),
            e @ (CheckoutError::EmptyCart | CheckoutError::WrongStep { .. }) => {
                Self::InvalidInput(e.to_string())
            }
        }
    }
}

impl From<CuratorError> for AppError {
    fn from(err: CuratorError) -> Self {
        match err {
            CuratorError::EmptyQuestion => Self::InvalidInput(err.to_string()),
            CuratorError::Catalog(e) => e.into(),
            CuratorError::Unavailable(_) => Self::Service(Box::new(err)),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("admin", "Deleted product", Some(&[("product_id", "p-3")]));
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
mod tests {
    use atelier_core::ProductId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product p-9".to_string());
        assert_eq!(err.to_string(), "Not found: product p-9");

        let err = AppError::Unauthorized("admin session is locked".to_string());
        assert_eq!(err.to_string(), "Unauthorized: admin session is locked");
    }

    #[test]
    fn test_backend_error_mapping() {
        let err: AppError = BackendError::ProductNotFound(ProductId::new("p-9")).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = BackendError::InvalidInput("name is required".to_string()).into();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(!err.is_retryable());

        let err: AppError = StoreError::Unavailable("disk".to_string()).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_service_message_hides_details() {
        let err: AppError = StoreError::Unavailable("/var/lib/atelier is read-only".to_string()).into();
        assert!(!err.user_message().contains("/var/lib"));
    }

    #[test]
    fn test_checkout_error_mapping() {
        let err: AppError = CheckoutError::EmptyCart.into();
        assert_eq!(err.to_string(), "Invalid input: cart is empty");
    }
}
