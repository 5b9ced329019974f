//! # Broker Ledger & Reports
//!
//! Year-wise commission ledger grouped by broker, and the date-range invoice
//! report. Both export to CSV for the accountant.
//!
//! ## Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Invoices in [2025-01-01, 2026-01-01)                                   │
//! │                                                                         │
//! │   INV-0001  Mahesh   ₹1050 ─┐                                          │
//! │   INV-0002  (none)   ₹ 420 ─┼──► "Mahesh":    2 invoices, ₹3150        │
//! │   INV-0003  Mahesh   ₹2100 ─┘    "No Broker": 1 invoice,  ₹ 420        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Brokers come out sorted by name; entries keep the order they were given
//! in (the repository hands them over by invoice date).

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::invoice::Invoice;
use crate::money::Money;
use crate::NO_BROKER;

/// Header row of the broker ledger CSV.
pub const LEDGER_CSV_HEADER: &str = "Broker Name,Invoice Number,Invoice Date,Customer Name,Amount";

/// Header row of the date-range invoice report CSV.
pub const REPORT_CSV_HEADER: &str = "Invoice Number,Date,Biller Name,Amount,E-Way Bill No.";

// =============================================================================
// Ledger Types
// =============================================================================

/// One invoice as it appears under a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BrokerLedgerEntry {
    pub broker_name: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub invoice_date: NaiveDate,
    pub customer_name: String,
    pub amount: Money,
}

impl From<&Invoice> for BrokerLedgerEntry {
    fn from(invoice: &Invoice) -> Self {
        BrokerLedgerEntry {
            broker_name: broker_label(invoice.broker_name.as_deref()).to_string(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date,
            customer_name: invoice.customer_name.clone(),
            amount: invoice.totals.total_amount,
        }
    }
}

/// All invoices credited to one broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BrokerSummary {
    pub broker_name: String,
    pub total_invoices: usize,
    pub total_amount: Money,
    pub invoices: Vec<BrokerLedgerEntry>,
}

/// Display name for an optional broker: blank means "No Broker".
pub fn broker_label(broker_name: Option<&str>) -> &str {
    match broker_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => NO_BROKER,
    }
}

/// Half-open date range covering one calendar year.
///
/// Returns `None` for years chrono cannot represent.
pub fn year_range(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?;
    Some((start, end))
}

// =============================================================================
// Grouping
// =============================================================================

/// Groups invoices by broker, counting them and summing their totals.
pub fn summarize_by_broker(invoices: &[Invoice]) -> Vec<BrokerSummary> {
    let mut by_broker: BTreeMap<String, BrokerSummary> = BTreeMap::new();

    for invoice in invoices {
        let entry = BrokerLedgerEntry::from(invoice);
        let summary = by_broker
            .entry(entry.broker_name.clone())
            .or_insert_with(|| BrokerSummary {
                broker_name: entry.broker_name.clone(),
                total_invoices: 0,
                total_amount: Money::ZERO,
                invoices: Vec::new(),
            });

        summary.total_invoices += 1;
        summary.total_amount += entry.amount;
        summary.invoices.push(entry);
    }

    by_broker.into_values().collect()
}

// =============================================================================
// CSV Export
// =============================================================================

/// Renders the broker ledger as CSV, header first, one row per invoice.
pub fn ledger_to_csv(summaries: &[BrokerSummary]) -> CoreResult<String> {
    let mut writer = csv_writer();
    writer.write_record(LEDGER_CSV_HEADER.split(','))?;

    for entry in summaries.iter().flat_map(|s| s.invoices.iter()) {
        let date = entry.invoice_date.format("%Y-%m-%d").to_string();
        let amount = entry.amount.to_string();
        writer.write_record([
            entry.broker_name.as_str(),
            entry.invoice_number.as_str(),
            date.as_str(),
            entry.customer_name.as_str(),
            amount.as_str(),
        ])?;
    }

    finish_csv(writer)
}

/// Renders every invoice dated within `[start, end]` (both inclusive) as the
/// accountant's report CSV. Dates print as `dd/mm/yyyy`; a missing e-way
/// bill prints as `N/A`.
pub fn invoice_report_csv(
    invoices: &[Invoice],
    start: NaiveDate,
    end: NaiveDate,
) -> CoreResult<String> {
    let mut writer = csv_writer();
    writer.write_record(REPORT_CSV_HEADER.split(','))?;

    for invoice in invoices
        .iter()
        .filter(|inv| inv.invoice_date >= start && inv.invoice_date <= end)
    {
        let date = invoice.invoice_date.format("%d/%m/%Y").to_string();
        let amount = invoice.totals.total_amount.to_string();
        writer.write_record([
            invoice.invoice_number.as_str(),
            date.as_str(),
            invoice.customer_name.as_str(),
            amount.as_str(),
            invoice.eway_bill_number.as_deref().unwrap_or("N/A"),
        ])?;
    }

    finish_csv(writer)
}

/// Comma-separated, `\n` terminated, fields quoted only when needed.
fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> CoreResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        CoreError::Csv(csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountRate, TaxBreakdown};
    use chrono::Utc;

    fn invoice(number: &str, day: u32, broker: Option<&str>, customer: &str, total: i64) -> Invoice {
        Invoice {
            id: format!("id-{number}"),
            tenant_id: "t-1".to_string(),
            invoice_number: number.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            customer_id: "c-1".to_string(),
            customer_name: customer.to_string(),
            broker_name: broker.map(str::to_string),
            eway_bill_number: None,
            items: Vec::new(),
            is_same_state: true,
            totals: TaxBreakdown {
                discount_rate: DiscountRate::NONE,
                total_amount: Money::from_rupees(total),
                ..TaxBreakdown::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_broker_label() {
        assert_eq!(broker_label(Some("Mahesh")), "Mahesh");
        assert_eq!(broker_label(Some("   ")), "No Broker");
        assert_eq!(broker_label(None), "No Broker");
    }

    #[test]
    fn test_year_range_half_open() {
        let (start, end) = year_range(2025).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_summarize_by_broker() {
        let invoices = vec![
            invoice("INV-2025-0001", 1, Some("Mahesh"), "Gupta Textiles", 1050),
            invoice("INV-2025-0002", 2, None, "Jain Cloth House", 420),
            invoice("INV-2025-0003", 3, Some("Mahesh"), "Agarwal Sarees", 2100),
            invoice("INV-2025-0004", 4, Some(""), "Jain Cloth House", 80),
        ];

        let summary = summarize_by_broker(&invoices);
        assert_eq!(summary.len(), 2);

        let mahesh = &summary[0];
        assert_eq!(mahesh.broker_name, "Mahesh");
        assert_eq!(mahesh.total_invoices, 2);
        assert_eq!(mahesh.total_amount, Money::from_rupees(3150));
        assert_eq!(mahesh.invoices[1].invoice_number, "INV-2025-0003");

        let none = &summary[1];
        assert_eq!(none.broker_name, "No Broker");
        assert_eq!(none.total_invoices, 2);
        assert_eq!(none.total_amount, Money::from_rupees(500));
    }

    #[test]
    fn test_ledger_csv_quotes_commas() {
        let invoices = vec![invoice("INV-2025-0001", 5, Some("Mahesh"), "Gupta, Sons & Co", 1050)];
        let csv = ledger_to_csv(&summarize_by_broker(&invoices)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], LEDGER_CSV_HEADER);
        assert_eq!(
            lines[1],
            "Mahesh,INV-2025-0001,2025-03-05,\"Gupta, Sons & Co\",1050.00"
        );
        assert!(!csv.contains('\r'));
    }

    #[test]
    fn test_ledger_csv_escapes_quotes() {
        let invoices = vec![
            invoice("INV-2025-0001", 5, None, "plain", 10),
            invoice("INV-2025-0002", 6, None, "6\" Border", 20),
        ];
        let csv = ledger_to_csv(&summarize_by_broker(&invoices)).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[1], "No Broker,INV-2025-0001,2025-03-05,plain,10.00");
        assert_eq!(lines[2], "No Broker,INV-2025-0002,2025-03-06,\"6\"\" Border\",20.00");
    }

    #[test]
    fn test_csv_reads_back_with_embedded_newline() {
        let invoices = vec![invoice("INV-2025-0001", 5, Some("Mahesh"), "Jain Cloth\nHouse", 420)];
        let csv = ledger_to_csv(&summarize_by_broker(&invoices)).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][3], "Jain Cloth\nHouse");
        assert_eq!(&records[0][4], "420.00");
    }

    #[test]
    fn test_empty_ledger_is_header_only() {
        assert_eq!(ledger_to_csv(&[]).unwrap(), format!("{LEDGER_CSV_HEADER}\n"));
    }

    #[test]
    fn test_invoice_report_filters_inclusive_range() {
        let mut with_eway = invoice("INV-2025-0002", 10, None, "Jain Cloth House", 420);
        with_eway.eway_bill_number = Some("331001234567".to_string());
        let invoices = vec![
            invoice("INV-2025-0001", 1, None, "Gupta Textiles", 1050),
            with_eway,
            invoice("INV-2025-0003", 20, None, "Agarwal Sarees", 2100),
        ];

        let csv = invoice_report_csv(
            &invoices,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        )
        .unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], REPORT_CSV_HEADER);
        assert_eq!(lines[1], "INV-2025-0001,01/03/2025,Gupta Textiles,1050.00,N/A");
        assert_eq!(lines[2], "INV-2025-0002,10/03/2025,Jain Cloth House,420.00,331001234567");
    }
}
