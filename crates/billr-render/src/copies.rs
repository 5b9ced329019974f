//! # Copy Labels
//!
//! A GST invoice is printed in up to three copies, each marked for whoever
//! keeps it.
//!
//! ```text
//! ┌──────────────────────────┐ ┌──────────────────────────┐ ┌──────────────────────────┐
//! │ Original for Recipient   │ │ Duplicate for Transporter│ │ Triplicate for Supplier  │
//! │  (goes with the buyer)   │ │  (travels with the goods)│ │  (kept on file)          │
//! └──────────────────────────┘ └──────────────────────────┘ └──────────────────────────┘
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Which copy of the invoice a page is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyLabel {
    Original,
    Duplicate,
    Triplicate,
}

impl CopyLabel {
    /// All three copies in print order.
    pub const ALL: [CopyLabel; 3] = [
        CopyLabel::Original,
        CopyLabel::Duplicate,
        CopyLabel::Triplicate,
    ];

    /// Text printed at the top of the copy.
    pub const fn label(&self) -> &'static str {
        match self {
            CopyLabel::Original => "Original for Recipient",
            CopyLabel::Duplicate => "Duplicate for Transporter",
            CopyLabel::Triplicate => "Triplicate for Supplier",
        }
    }
}

impl fmt::Display for CopyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejects an empty selection or a label requested twice.
pub(crate) fn check_distinct(copies: &[CopyLabel]) -> RenderResult<()> {
    if copies.is_empty() {
        return Err(RenderError::NoCopies);
    }

    let mut seen = HashSet::new();
    for copy in copies {
        if !seen.insert(*copy) {
            return Err(RenderError::DuplicateCopyLabel(*copy));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(CopyLabel::Original.label(), "Original for Recipient");
        assert_eq!(CopyLabel::Duplicate.to_string(), "Duplicate for Transporter");
        assert_eq!(CopyLabel::Triplicate.label(), "Triplicate for Supplier");
    }

    #[test]
    fn test_check_distinct() {
        assert!(check_distinct(&CopyLabel::ALL).is_ok());
        assert!(check_distinct(&[CopyLabel::Triplicate, CopyLabel::Original]).is_ok());
        assert!(matches!(check_distinct(&[]), Err(RenderError::NoCopies)));
        assert!(matches!(
            check_distinct(&[CopyLabel::Original, CopyLabel::Duplicate, CopyLabel::Duplicate]),
            Err(RenderError::DuplicateCopyLabel(CopyLabel::Duplicate))
        ));
    }

    #[test]
    fn test_serde_names() {
        let parsed: CopyLabel = serde_json::from_str("\"triplicate\"").unwrap();
        assert_eq!(parsed, CopyLabel::Triplicate);
    }
}
