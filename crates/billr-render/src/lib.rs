//! # billr-render: Printable GST Invoices
//!
//! Produces the self-contained HTML document a shop prints or saves as PDF.
//!
//! ## Data Flow
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Invoice    │   │   Customer   │   │   Company    │
//! │ (stored, with│   │  (recipient) │   │ (letterhead, │
//! │  totals)     │   │              │   │  banks)      │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                  InvoiceView (formatted strings)
//!                           │
//!                           ▼
//!                templates/invoice.html (askama)
//!                           │
//!                           ▼
//!              HTML, one page per requested copy
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use billr_render::{render_invoice_copies, CopyLabel};
//!
//! let html = render_invoice_copies(
//!     &invoice,
//!     &customer,
//!     &company,
//!     "https://billr.example.in",
//!     &[CopyLabel::Original, CopyLabel::Duplicate],
//! )?;
//! ```

pub mod copies;
pub mod document;
pub mod error;

pub use copies::CopyLabel;
pub use document::{
    fallback_bank_accounts, render_invoice, render_invoice_copies, InvoiceDocument, InvoiceView,
};
pub use error::{RenderError, RenderResult};
