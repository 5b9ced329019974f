//! # Invoice Document
//!
//! Builds the printable HTML for a stored invoice.
//!
//! ## Document Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ [copy label]                                        (multi-copy only)  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ GSTIN: 09AADFS1992C1Z6      TAX INVOICE          Phone no: 94119...    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ [logo]            Company Name / Company Type / Address                │
//! ├───────────────────────────────────┬─────────────────────────────────────┤
//! │ Detail of Recipient (Purchaser)   │ Invoice Details                     │
//! │ Name / Address / City / GSTIN     │ No / eWayBill? / Date / Broker?     │
//! ├───────────────────────────────────┴─────────────────────────────────────┤
//! │ Sr │ Description of Goods │ HSN │ Unit │ Qty │ Rate │ Amount           │
//! │                                              Gross Amount │ ₹x.xx      │
//! ├───────────────────────────────────┬─────────────────────────────────────┤
//! │ Grand Total (in Words)            │ Subtotal / Discount? / Taxable      │
//! │ BANK DETAILS                      │ CGST + SGST  xor  IGST              │
//! │ Terms & Conditions                │ Round off / Total Amount            │
//! │                                   │ For Company / Authorized Signatory  │
//! ├───────────────────────────────────┴─────────────────────────────────────┤
//! │ Certified that the particulars given above are true & correct.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every string is formatted up front in [`InvoiceView`]; the template only
//! lays it out. Rendering reads the stored invoice and never recomputes its
//! totals.

use askama::Template;
use billr_core::calculator::single_rate;
use billr_core::words::amount_in_words;
use billr_core::{BankAccount, Company, Customer, Invoice, Money, TaxMode};
use tracing::debug;

use crate::copies::{check_distinct, CopyLabel};
use crate::error::RenderResult;

/// Logo file served from the web root.
const LOGO_FILE: &str = "ganesh.png";

/// Printed on every invoice.
pub const TERMS: [&str; 3] = [
    "All subject to Agra Jurisdiction.",
    "Our goods once sold will not be taken back or exchanged.",
    "If the bill is not paid within 45 days, interest @24% P.A will be charged extra.",
];

/// Banks printed when the company has not saved any.
pub fn fallback_bank_accounts() -> Vec<BankAccount> {
    vec![
        BankAccount::new("PUNJAB NATIONAL BANK", "0030002100090414", "PUNB0003000"),
        BankAccount::new("CANARA BANK, SIKANDRA, AGRA", "3306214000016", "CNRB0006030"),
    ]
}

// =============================================================================
// Inputs
// =============================================================================

/// Everything needed to print one invoice.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceDocument<'a> {
    pub invoice: &'a Invoice,
    pub customer: &'a Customer,
    pub company: &'a Company,
    /// Public origin of the web app, e.g. `https://billr.example.in`.
    pub base_url: &'a str,
}

impl<'a> InvoiceDocument<'a> {
    pub fn new(
        invoice: &'a Invoice,
        customer: &'a Customer,
        company: &'a Company,
        base_url: &'a str,
    ) -> Self {
        InvoiceDocument {
            invoice,
            customer,
            company,
            base_url,
        }
    }

    /// Renders a single copy without a copy label.
    pub fn render(&self) -> RenderResult<String> {
        self.render_pages(vec![None])
    }

    /// Renders the requested copies, each with its label, separated by page
    /// breaks.
    ///
    /// ## Errors
    /// - [`crate::RenderError::NoCopies`] for an empty selection
    /// - [`crate::RenderError::DuplicateCopyLabel`] when a label repeats
    pub fn render_copies(&self, copies: &[CopyLabel]) -> RenderResult<String> {
        check_distinct(copies)?;
        self.render_pages(copies.iter().map(|c| Some(c.label())).collect())
    }

    fn render_pages(&self, copies: Vec<Option<&'static str>>) -> RenderResult<String> {
        let template = InvoiceTemplate {
            view: InvoiceView::build(self),
            copies,
        };
        let html = template.render()?;

        debug!(
            invoice_number = %self.invoice.invoice_number,
            copies = template.copies.len(),
            bytes = html.len(),
            "Rendered invoice"
        );

        Ok(html)
    }
}

/// Renders a single copy of an invoice.
pub fn render_invoice(
    invoice: &Invoice,
    customer: &Customer,
    company: &Company,
    base_url: &str,
) -> RenderResult<String> {
    InvoiceDocument::new(invoice, customer, company, base_url).render()
}

/// Renders the given copies of an invoice into one document.
pub fn render_invoice_copies(
    invoice: &Invoice,
    customer: &Customer,
    company: &Company,
    base_url: &str,
    copies: &[CopyLabel],
) -> RenderResult<String> {
    InvoiceDocument::new(invoice, customer, company, base_url).render_copies(copies)
}

// =============================================================================
// View Model
// =============================================================================

/// One printed row of the item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub sr: usize,
    pub description: String,
    pub hsn: String,
    pub unit: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

/// A labelled amount in the totals block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountRow {
    pub label: String,
    pub value: String,
}

/// The invoice with every value already formatted for print.
#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub title: String,
    pub logo_url: String,

    pub gstin: String,
    pub phone1: String,
    pub phone2: Option<String>,
    pub company_name: String,
    pub company_type: String,
    pub company_address: String,

    pub customer_name: String,
    pub customer_address: String,
    pub customer_city: String,
    pub customer_gstin: String,

    pub invoice_number: String,
    pub eway_bill_number: Option<String>,
    pub invoice_date: String,
    pub broker_name: Option<String>,

    pub items: Vec<ItemRow>,
    pub gross_amount: String,

    pub subtotal: String,
    pub discount: Option<AmountRow>,
    pub taxable_amount: String,
    pub tax_rows: Vec<AmountRow>,
    pub round_off: String,
    pub total_amount: String,
    pub amount_in_words: String,

    pub banks: Vec<BankAccount>,
    pub terms: Vec<&'static str>,
}

impl InvoiceView {
    pub fn build(doc: &InvoiceDocument<'_>) -> Self {
        let invoice = doc.invoice;
        let customer = doc.customer;
        let company = doc.company;
        let totals = &invoice.totals;

        let items = invoice
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemRow {
                sr: index + 1,
                description: item.product_name.clone(),
                hsn: item.hsn_code.clone(),
                unit: item.unit.clone(),
                quantity: item.quantity.normalize().to_string(),
                rate: rupees(item.rate),
                amount: rupees(item.amount()),
            })
            .collect();

        let discount = (!totals.discount.is_zero()).then(|| AmountRow {
            label: format!("Less: Discount ({}%)", totals.discount_rate.percent()),
            value: format!("-{}", rupees(totals.discount)),
        });

        let banks = if company.bank_accounts.is_empty() {
            fallback_bank_accounts()
        } else {
            company.bank_accounts.clone()
        };

        InvoiceView {
            title: format!("Invoice {}", invoice.invoice_number),
            logo_url: format!("{}/{}", doc.base_url.trim_end_matches('/'), LOGO_FILE),

            gstin: company.gstin.clone(),
            phone1: company.phone1.clone(),
            phone2: non_blank(company.phone2.as_deref()),
            company_name: company.company_name.clone(),
            company_type: company.company_type.clone(),
            company_address: company.company_address.clone(),

            customer_name: invoice.customer_name.clone(),
            customer_address: customer.address.clone(),
            customer_city: format!("{}, {}", customer.city, customer.state),
            customer_gstin: non_blank(customer.gst_number.as_deref())
                .unwrap_or_else(|| "N/A".to_string()),

            invoice_number: invoice.invoice_number.clone(),
            eway_bill_number: non_blank(invoice.eway_bill_number.as_deref()),
            invoice_date: invoice.invoice_date.format("%d/%m/%Y").to_string(),
            broker_name: non_blank(invoice.broker_name.as_deref()),

            items,
            gross_amount: rupees(totals.subtotal),

            subtotal: rupees(totals.subtotal),
            discount,
            taxable_amount: rupees(totals.taxable_amount),
            tax_rows: tax_rows(invoice),
            round_off: signed_rupees(totals.round_off),
            total_amount: rupees(totals.total_amount),
            amount_in_words: amount_in_words(totals.total_amount),

            banks,
            terms: TERMS.to_vec(),
        }
    }
}

/// CGST + SGST rows for an intra-state invoice, the IGST row otherwise.
///
/// Labels carry the percentage only when every item shares one slab.
fn tax_rows(invoice: &Invoice) -> Vec<AmountRow> {
    let totals = &invoice.totals;
    let slab = single_rate(&invoice.items);

    match invoice.tax_mode() {
        TaxMode::IntraState => {
            let pct = slab
                .map(|rate| format!(" @ {}%", rate.half_percent().normalize()))
                .unwrap_or_default();
            vec![
                AmountRow {
                    label: format!("Add: CGST{pct}"),
                    value: rupees(totals.cgst),
                },
                AmountRow {
                    label: format!("Add: SGST{pct}"),
                    value: rupees(totals.sgst),
                },
            ]
        }
        TaxMode::InterState => {
            let pct = slab
                .map(|rate| format!(" @ {}%", rate.percent()))
                .unwrap_or_default();
            vec![AmountRow {
                label: format!("Add: IGST{pct}"),
                value: rupees(totals.igst),
            }]
        }
    }
}

fn rupees(amount: Money) -> String {
    format!("₹{amount}")
}

/// Round-off always shows its sign: `+₹0.40`, `-₹0.33`.
fn signed_rupees(amount: Money) -> String {
    let sign = if amount.is_negative() { "-" } else { "+" };
    format!("{sign}{}", rupees(amount.abs()))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Template
// =============================================================================

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate {
    view: InvoiceView,
    copies: Vec<Option<&'static str>>,
}

// =============================================================================
// Unit Tests
// =============================================================================
