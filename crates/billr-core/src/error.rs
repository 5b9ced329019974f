//! # Error Types
//!
//! Domain-specific error types for billr-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billr-core errors (this file)                                         │
//! │  ├── CoreError        - Invoice lifecycle errors                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  billr-render errors                                                   │
//! │  └── RenderError      - Template / copy selection failures             │
//! │                                                                         │
//! │  billr-db errors                                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → web layer               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator and the number-to-words converter never fail: everything
//! that could make them misbehave is rejected here first.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Invoice lifecycle errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice must carry at least one line item.
    #[error("Invoice {invoice_number} has no line items")]
    EmptyInvoice { invoice_number: String },

    /// The customer record belongs to another account.
    ///
    /// ## When This Occurs
    /// - The web layer resolved a customer id that the signed-in tenant
    ///   does not own
    #[error("Customer {customer_id} does not belong to account {tenant_id}")]
    ForeignCustomer {
        customer_id: String,
        tenant_id: String,
    },

    /// Writing a CSV export failed.
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any calculation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Invalid format (e.g. GSTIN, IFSC, e-way bill).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g. duplicate GSTIN for one account).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: &str) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn out_of_range(
        field: &str,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        ValidationError::OutOfRange {
            field: field.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
