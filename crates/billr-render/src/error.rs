//! # Render Errors
//!
//! Errors raised while producing an invoice document.

use thiserror::Error;

use crate::copies::CopyLabel;

/// Invoice rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template engine failed to write the document.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Multi-copy mode was asked for no copies at all.
    #[error("At least one copy must be requested")]
    NoCopies,

    /// The same copy label was requested twice.
    ///
    /// ## When This Occurs
    /// - Print dialog sent "Duplicate for Transporter" twice
    #[error("Copy '{0}' requested more than once")]
    DuplicateCopyLabel(CopyLabel),
}

/// Convenience type alias for render results.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RenderError::DuplicateCopyLabel(CopyLabel::Duplicate).to_string(),
            "Copy 'Duplicate for Transporter' requested more than once"
        );
        assert_eq!(
            RenderError::NoCopies.to_string(),
            "At least one copy must be requested"
        );
    }
}
