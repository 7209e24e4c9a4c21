//! WooCommerce REST API client.
//!
//! # Architecture
//!
//! - Plain `reqwest` calls against `{store_url}/wp-json/wc/v3`
//! - WooCommerce is the source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for single products (5 minutes) and the
//!   category listing (configurable, 10 minutes by default)
//! - HTTP Basic authentication from the consumer key and secret; when either is
//!   missing every read fails closed with an empty result
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_storefront::woocommerce::{ProductFilter, WooCommerceClient};
//!
//! let client = WooCommerceClient::new(&config.woocommerce)?;
//!
//! let page = client
//!     .list_products(&ProductFilter {
//!         categories: vec!["hoodies".to_string()],
//!         ..ProductFilter::default()
//!     })
//!     .await?;
//! ```

mod cache;
mod client;
pub mod query;
pub mod types;

pub use client::WooCommerceClient;
pub use query::{ProductFilter, ProductSort};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The request did not complete within the client timeout.
    #[error("Upstream request timed out")]
    Timeout,

    /// Connection or transport failure.
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// API credentials are not configured.
    #[error("WooCommerce credentials are not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for CommerceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}

impl CommerceError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Status { status, .. } => status_message(*status),
            Self::Timeout => "The store took too long to respond. Please try again.",
            Self::Network(_) => "We couldn't reach the store. Check your connection and try again.",
            Self::Parse(_) => "The store sent an unexpected response. Please try again later.",
            Self::NotConfigured => "The store is not available right now.",
        }
    }

    /// Upstream HTTP status, if the failure carried one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// User-facing copy for an upstream status code.
#[must_use]
pub const fn status_message(status: u16) -> &'static str {
    match status {
        503 => "The store is temporarily unavailable. Please try again in a few minutes.",
        500 => "The store ran into a server error. Please try again later.",
        401 => "The store rejected our credentials. Please contact support.",
        403 => "Access to the store was denied.",
        404 => "The requested item could not be found.",
        _ => "Something went wrong while contacting the store. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages_are_distinct() {
        let codes = [503, 500, 401, 403, 404];
        let messages: Vec<&str> = codes.iter().map(|c| status_message(*c)).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(status_message(502), status_message(418));
        assert!(!messages.contains(&status_message(502)));
    }

    #[test]
    fn test_user_message_by_status() {
        let err = CommerceError::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.user_message(), status_message(404));
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Upstream returned HTTP 404");
    }

    #[test]
    fn test_timeout_message_distinct() {
        let timeout = CommerceError::Timeout.user_message();
        assert!(timeout.contains("too long"));
        for code in [503, 500, 401, 403, 404, 400] {
            assert_ne!(timeout, status_message(code));
        }
    }
}
