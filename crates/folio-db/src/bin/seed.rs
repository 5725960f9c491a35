//! # Seed Data Generator
//!
//! Populates a database with the records an issuance needs, and optionally
//! issues a batch of invoices against them.
//!
//! ## Usage
//! ```bash
//! # Seed the database named in folio.toml (or the platform default)
//! cargo run -p folio-db --bin seed
//!
//! # Seed a specific file and issue 25 invoices
//! cargo run -p folio-db --bin seed -- --db ./data/folio.db --issue 25
//! ```
//!
//! ## Seeded Records
//! - The walk-in customer and one identified customer with an RTN
//! - One active cashier
//! - A 10% discount
//! - A small catalog across the exempt, 15% and 18% tax rates
//! - One active numbering authorization `000-002-01-`, 1..=500, valid for a
//!   year from today

use std::env;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use folio_core::tax::compute_breakdown;
use folio_core::{
    CartLine, Customer, Discount, IssueInvoiceCommand, NumberingAuthorization, Product,
    SessionContext, TaxRate, Tender, User, WALK_IN_CUSTOMER_ID,
};
use folio_db::{Database, FolioConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const CASHIER: &str = "cajero1";

/// (sku, name, price in cents, tax rate)
const CATALOG: &[(&str, &str, i64, TaxRate)] = &[
    ("RICE-5LB", "Rice 5 lb", 8950, TaxRate::EXEMPT),
    ("BEANS-2LB", "Red beans 2 lb", 4200, TaxRate::EXEMPT),
    ("COFFEE-1LB", "Ground coffee 1 lb", 12000, TaxRate::ISV_15),
    ("SOAP-3PK", "Bar soap 3-pack", 6575, TaxRate::ISV_15),
    ("BLEACH-1L", "Bleach 1 L", 3825, TaxRate::ISV_15),
    ("BEER-6PK", "Beer 6-pack", 19500, TaxRate::ISV_18),
    ("RUM-750", "Rum 750 ml", 34000, TaxRate::ISV_18),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,folio=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut db_path: Option<PathBuf> = None;
    let mut issue_count: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--issue" | "-n" => {
                if i + 1 < args.len() {
                    issue_count = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Folio Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  folio.toml to load (default: platform config dir)");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("  -n, --issue <N>      Issue N cash invoices after seeding");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = FolioConfig::load_or_default(config_path);
    if let Some(path) = db_path {
        config.database.path = path;
    }

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.database.to_db_config()).await?;
    info!(path = %config.database.path.display(), "Connected and migrated");

    if db.products().count().await? > 0 {
        info!("Catalog already present, skipping seed");
    } else {
        seed(&db).await?;
    }

    if issue_count > 0 {
        issue_batch(&db, &config, issue_count).await?;
    }

    db.close().await;
    Ok(())
}

async fn seed(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();

    db.customers()
        .insert(&Customer {
            id: WALK_IN_CUSTOMER_ID.to_string(),
            name: "Consumidor Final".to_string(),
            rtn: None,
            is_active: true,
            created_at: now,
        })
        .await?;

    db.customers()
        .insert(&Customer {
            id: Uuid::new_v4().to_string(),
            name: "Ferreteria Central".to_string(),
            rtn: Some("08019002012345".to_string()),
            is_active: true,
            created_at: now,
        })
        .await?;

    db.users()
        .insert(&User {
            id: Uuid::new_v4().to_string(),
            username: CASHIER.to_string(),
            is_active: true,
            created_at: now,
        })
        .await?;

    db.discounts()
        .insert(&Discount {
            id: Uuid::new_v4().to_string(),
            name: "Ten percent".to_string(),
            percentage_bps: 1000,
            is_active: true,
            created_at: now,
        })
        .await?;

    for (sku, name, price_cents, rate) in CATALOG {
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                sku: sku.to_string(),
                name: name.to_string(),
                price_cents: *price_cents,
                tax_rate_bps: rate.bps(),
                current_stock: 100,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    let today = now.date_naive();
    let mut authorization = NumberingAuthorization::new(
        Uuid::new_v4().to_string(),
        "35A1B2-C3D4E5-F6A7B8-C9D0E1-F2A3B4-C5".to_string(),
        "000-002-01-".to_string(),
        1,
        500,
        today,
        today + Duration::days(365),
        now,
    )?;
    authorization.is_active = true;
    db.numbering().insert(&authorization).await?;

    info!(
        products = CATALOG.len(),
        authorization = %authorization.id,
        "Seed complete"
    );
    Ok(())
}

async fn issue_batch(
    db: &Database,
    config: &FolioConfig,
    count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let authorization = db
        .numbering()
        .get_active()
        .await?
        .ok_or("no active numbering authorization")?;
    let cashier = db
        .users()
        .get_by_username(CASHIER)
        .await?
        .ok_or("seed cashier missing")?;

    let mut products = Vec::with_capacity(CATALOG.len());
    for (sku, ..) in CATALOG {
        if let Some(product) = db.products().get_by_sku(sku).await? {
            products.push(product);
        }
    }
    if products.is_empty() {
        return Err("catalog is empty".into());
    }

    let issuer = db.issuer(config.issuance.clone());
    let start = std::time::Instant::now();
    let mut last = None;

    for n in 0..count {
        let product = &products[n % products.len()];
        let lines = vec![CartLine {
            product_id: product.id.clone(),
            description: product.name.clone(),
            quantity: (n % 3) as i64 + 1,
            tax_id: format!("ISV-{}", product.tax_rate_bps),
            tax_rate: product.tax_rate(),
            unit_price_cents: product.price_cents,
        }];
        let total = compute_breakdown(&lines, 0).total;

        let command = IssueInvoiceCommand {
            date: Utc::now().date_naive(),
            customer_id: config.issuance.walk_in_customer_id.clone(),
            authorization_id: authorization.id.clone(),
            session: SessionContext {
                user_id: cashier.id.clone(),
                cash_register_id: Some("REG-01".to_string()),
            },
            discount: None,
            lines,
            payments: vec![Tender {
                payment_type_id: "cash".to_string(),
                amount_cents: total.cents(),
            }],
            is_credit: false,
            credit_days: None,
        };

        last = Some(issuer.issue(&command).await?);
    }

    info!(count, elapsed = ?start.elapsed(), "Invoices issued");

    if let Some(document) = last {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    Ok(())
}
