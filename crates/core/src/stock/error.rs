//! Error types for stock availability checking.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while computing availability.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// A requested product has no stock record.
    #[error("Unknown product {product_name} ({product_id})")]
    UnknownProduct {
        /// The product id that could not be resolved.
        product_id: Uuid,
        /// Product name from the offending line item.
        product_name: String,
    },
}

impl AvailabilityError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownProduct { .. } => 404,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownProduct { .. } => "UNKNOWN_PRODUCT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_product_error() {
        let err = AvailabilityError::UnknownProduct {
            product_id: Uuid::nil(),
            product_name: "Widget".to_string(),
        };
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_PRODUCT");
        assert!(err.to_string().contains("Widget"));
    }
}
