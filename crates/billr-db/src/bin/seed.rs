//! # Demo Account Seeder
//!
//! Populates the database with a demo account and writes a printable
//! invoice for it.
//!
//! ## Usage
//! ```bash
//! # Seed the default database (BILLR_DATABASE_PATH or ./cloudbillr.db)
//! cargo run -p billr-db --bin seed
//!
//! # Specify database path, tenant and HTML output
//! cargo run -p billr-db --bin seed -- --db ./data/demo.db --tenant demo --out ./invoice.html
//! ```
//!
//! ## Generated Data
//! - Company profile with two bank accounts
//! - Three customers (Agra, Kanpur, Surat) and a small cloth catalog
//! - Invoices across brokers, one inter-state with mixed GST slabs
//! - Broker ledger and monthly report printed to stdout

use anyhow::{Context, Result};
use billr_core::{
    BankAccount, Company, Customer, DiscountRate, GstRate, Money, NewInvoice, Product, TaxMode,
};
use billr_db::{BillrConfig, Database, DbConfig};
use billr_render::{render_invoice_copies, CopyLabel};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (business name, city, state, GSTIN)
const CUSTOMERS: &[(&str, &str, &str, Option<&str>)] = &[
    ("Gupta Textiles", "Agra", "Uttar Pradesh", Some("09ABCDE1234F1Z5")),
    ("Mehta Saree Centre", "Kanpur", "Uttar Pradesh", None),
    ("Surat Silk Mills", "Surat", "Gujarat", Some("24AAACS7777K1Z2")),
];

/// (name, HSN, price in rupees, GST slab)
const PRODUCTS: &[(&str, &str, i64, GstRate)] = &[
    ("Cotton Shirting", "5208", 140, GstRate::FIVE),
    ("Polyester Suiting", "5407", 260, GstRate::FIVE),
    ("Silk Saree", "5007", 2400, GstRate::FIVE),
    ("Readymade Kurta", "6206", 1150, GstRate::TWELVE),
];

#[tokio::main]
async fn main() -> Result<()> {
    let config = BillrConfig::load().context("invalid BILLR_* environment")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = config.database_path.clone();
    let mut tenant_id = String::from("demo");
    let mut out_path = PathBuf::from("./invoice.html");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    out_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("CloudBillr Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: BILLR_DATABASE_PATH)");
                println!("  -t, --tenant <ID>    Account to seed (default: demo)");
                println!("  -o, --out <PATH>     Rendered invoice HTML (default: ./invoice.html)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 CloudBillr Demo Seeder");
    println!("=========================");
    println!("Database: {}", db_path.display());
    println!("Account:  {}", tenant_id);
    println!();

    let db_config = DbConfig {
        database_path: db_path.clone(),
        ..config.db_config()
    };
    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.invoices().count(&tenant_id).await?;
    if existing > 0 {
        println!("⚠ Account already has {} invoices", existing);
        println!("  Skipping seed to avoid duplicates.");
    } else {
        seed_account(&db, &tenant_id).await?;
    }

    // Reports
    let year = Utc::now().year();
    let ledger = db.invoices().broker_ledger(&tenant_id, year).await?;
    println!();
    println!("Broker ledger {}:", year);
    for summary in &ledger {
        println!(
            "  {:<20} {:>3} invoices  ₹{}",
            summary.broker_name, summary.total_invoices, summary.total_amount
        );
    }

    let invoices = db.invoices().list(&tenant_id).await?;
    if let (Some(first), Some(last)) = (invoices.last(), invoices.first()) {
        let report = db
            .invoices()
            .invoice_report(&tenant_id, first.invoice_date, last.invoice_date)
            .await?;
        println!();
        println!("{}", report);
    }

    // Render the newest invoice in triplicate
    let Some(latest) = invoices.first() else {
        println!("No invoices to render.");
        return Ok(());
    };
    let customer = db
        .customers()
        .get(&tenant_id, &latest.customer_id)
        .await?
        .context("invoice customer missing")?;
    let company = db.companies().get_or_fallback(&tenant_id).await?;

    let html = render_invoice_copies(latest, &customer, &company, &config.base_url, &CopyLabel::ALL)?;
    std::fs::write(&out_path, html)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    println!("✓ Rendered {} to {}", latest.invoice_number, out_path.display());
    db.close().await;

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

/// Creates the profile, customers, catalog and a handful of invoices.
async fn seed_account(db: &Database, tenant_id: &str) -> Result<()> {
    let now = Utc::now();

    let mut company = Company::fallback(tenant_id);
    company.bank_accounts = vec![
        BankAccount::new("STATE BANK OF INDIA, AGRA", "32145678901", "SBIN0000612"),
        BankAccount::new("HDFC BANK, SANJAY PLACE", "50200012345678", "HDFC0000343"),
    ];
    db.companies().upsert(&company, now).await?;
    println!("✓ Company profile: {}", company.company_name);

    let mut customers = Vec::new();
    for (name, city, state, gstin) in CUSTOMERS {
        let customer = db
            .customers()
            .insert(&Customer {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.to_string(),
                business_name: name.to_string(),
                contact_person: None,
                phone: None,
                address: format!("Main Market, {}", city),
                city: city.to_string(),
                state: state.to_string(),
                gst_number: gstin.map(str::to_string),
                created_at: now,
            })
            .await?;
        customers.push(customer);
    }
    println!("✓ Customers: {}", customers.len());

    let mut catalog = Vec::new();
    for (name, hsn, price, gst) in PRODUCTS {
        let product = db
            .products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.to_string(),
                name: name.to_string(),
                hsn_code: hsn.to_string(),
                default_price: Money::from_rupees(*price),
                default_gst: *gst,
                created_at: now,
            })
            .await?;
        catalog.push(product);
    }
    println!("✓ Products: {}", catalog.len());

    let today = now.date_naive();
    let year = today.year();
    let dated = |month: u32, day: u32| NaiveDate::from_ymd_opt(year, month, day).unwrap_or(today);

    // (customer, date, broker, [(product, quantity, unit)], discount %)
    let plan: [(usize, NaiveDate, Option<&str>, Vec<(usize, Decimal, &str)>, u8); 4] = [
        (
            0,
            dated(1, 8),
            Some("Ramesh Agarwal"),
            vec![(0, Decimal::from(120), "Meter"), (1, Decimal::from(40), "Meter")],
            0,
        ),
        (1, dated(2, 14), None, vec![(2, Decimal::from(6), "Pcs")], 0),
        (
            2,
            dated(3, 3),
            Some("Anil Jain"),
            vec![(2, Decimal::from(10), "Pcs"), (3, Decimal::from(25), "Pcs")],
            5,
        ),
        // 357.5 metres
        (0, dated(3, 20), Some("Ramesh Agarwal"), vec![(0, Decimal::new(3575, 1), "Meter")], 2),
    ];

    for (customer_idx, invoice_date, broker, rows, discount) in plan {
        let customer = &customers[customer_idx];
        let is_same_state = customer
            .gst_number
            .as_deref()
            .and_then(|gstin| TaxMode::between(&company.gstin, gstin))
            .map_or(true, |mode| mode.is_same_state());

        let invoice_number = db.invoices().next_invoice_number(tenant_id, year).await?;
        let input = NewInvoice {
            invoice_number,
            invoice_date,
            broker_name: broker.map(str::to_string),
            eway_bill_number: None,
            items: rows
                .into_iter()
                .map(|(product_idx, quantity, unit)| catalog[product_idx].to_line_item(quantity, unit))
                .collect(),
            discount_rate: DiscountRate::new(discount)?,
            is_same_state,
        };

        let invoice = db
            .invoices()
            .create(tenant_id, &customer.id, input, Utc::now())
            .await?;
        println!(
            "✓ {}  {:<20} ₹{}",
            invoice.invoice_number, invoice.customer_name, invoice.totals.total_amount
        );

        if !invoice.is_same_state {
            db.invoices()
                .attach_eway_bill(tenant_id, &invoice.id, "331001234567", Utc::now())
                .await?;
            info!(invoice_number = %invoice.invoice_number, "Attached demo e-way bill");
        }
    }

    Ok(())
}
