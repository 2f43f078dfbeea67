//! # Seed Data Generator
//!
//! Populates the database with a small cafe catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./officecafe_dev.db
//! cargo run -p cafe-db --bin seed
//!
//! # Specify database path
//! cargo run -p cafe-db --bin seed -- --db ./data/officecafe.db
//!
//! # Print every product view (with tax totals) as JSON afterwards
//! cargo run -p cafe-db --bin seed -- --json
//! ```
//!
//! ## Generated Data
//! - Units: piece, cup, plate, kilogram, litre
//! - Taxes: CGST / SGST / IGST for the 5% and 18% GST slabs
//! - Categories with SKU prefixes and HSN codes
//! - Products linked to the instate (CGST + SGST) and interstate (IGST) sets
//!   of their category's slab
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use cafe_core::money::Price;
use cafe_core::{Category, NewProduct, Product, Tax, UnitOfMeasurement};
use cafe_db::{Database, DbConfig};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Units as (name, symbol).
const UNITS: &[(&str, &str)] = &[
    ("Piece", "pc"),
    ("Cup", "cup"),
    ("Plate", "plt"),
    ("Kilogram", "kg"),
    ("Litre", "ltr"),
];

/// GST slabs (total rate, in percent). Each becomes CGST + SGST at half the
/// rate and IGST at the full rate.
const SLABS: &[&str] = &["5", "18"];

struct SeedCategory {
    name: &'static str,
    sku_prefix: &'static str,
    hsn: &'static str,
    unit: &'static str,
    slab: &'static str,
    inclusive: bool,
    /// (name, sku, price, override_hsn)
    products: &'static [(&'static str, &'static str, &'static str, Option<&'static str>)],
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Hot Beverages",
        sku_prefix: "HOT",
        hsn: "0902",
        unit: "cup",
        slab: "5",
        inclusive: true,
        products: &[
            ("Masala Chai", "CHAI", "30", None),
            ("Filter Coffee", "FCOF", "40", Some("0901")),
            ("Green Tea", "GTEA", "45", None),
            ("Hot Chocolate", "HCHO", "90", Some("1806")),
        ],
    },
    SeedCategory {
        name: "Cold Beverages",
        sku_prefix: "COLD",
        hsn: "2202",
        unit: "pc",
        slab: "18",
        inclusive: true,
        products: &[
            ("Cola 330ml", "COLA330", "40", None),
            ("Lemon Soda", "LSODA", "35", None),
            ("Mineral Water 1L", "WATER1L", "20", Some("2201")),
        ],
    },
    SeedCategory {
        name: "Snacks",
        sku_prefix: "SNK",
        hsn: "2106",
        unit: "plt",
        slab: "5",
        inclusive: false,
        products: &[
            ("Samosa", "SAMOSA", "25.500", None),
            ("Veg Sandwich", "VSAND", "80", None),
            ("Paneer Roll", "PROLL", "110", None),
        ],
    },
    SeedCategory {
        name: "Bakery",
        sku_prefix: "BAK",
        hsn: "1905",
        unit: "pc",
        slab: "18",
        inclusive: false,
        products: &[
            ("Butter Croissant", "CROIS", "95", None),
            ("Chocolate Muffin", "MUFFIN", "70", None),
        ],
    },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./officecafe_dev.db");
    let mut print_json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--json" | "-j" => print_json = true,
            "--help" | "-h" => {
                println!("OfficeCafe Catalog Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./officecafe_dev.db)");
                println!("  -j, --json         Print product views as JSON after seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(path = %db_path, "Seeding catalog");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        println!("⚠ Database already has {} products", existing);
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Units
    let mut units = HashMap::new();
    for (name, symbol) in UNITS {
        let unit = db.units().insert(&UnitOfMeasurement::new(name, symbol)?).await?;
        units.insert(*symbol, unit.id);
    }
    println!("✓ {} units", units.len());

    // Taxes, one (instate, interstate) pair of sets per slab
    let mut slabs = HashMap::new();
    for slab in SLABS {
        let rate = Decimal::from_str(slab)?;
        let half = rate / Decimal::TWO;

        let cgst = db.taxes().insert(&Tax::new(&format!("CGST {half}%"), half)?).await?;
        let sgst = db.taxes().insert(&Tax::new(&format!("SGST {half}%"), half)?).await?;
        let igst = db.taxes().insert(&Tax::new(&format!("IGST {rate}%"), rate)?).await?;

        slabs.insert(*slab, (vec![cgst.id, sgst.id], vec![igst.id]));
    }
    println!("✓ {} tax slabs", slabs.len());

    // Categories and products
    let mut seeded = Vec::new();
    for seed in CATEGORIES {
        let unit_id = units
            .get(seed.unit)
            .cloned()
            .ok_or_else(|| format!("unknown unit symbol {}", seed.unit))?;
        let (instate, interstate) = slabs
            .get(seed.slab)
            .cloned()
            .ok_or_else(|| format!("unknown slab {}", seed.slab))?;

        let category = db
            .categories()
            .insert(&Category::new(seed.name, seed.sku_prefix, seed.hsn, Some(unit_id.clone()))?)
            .await?;

        for (name, sku, price, override_hsn) in seed.products {
            let product = Product::new(NewProduct {
                name: name.to_string(),
                category_id: category.id.clone(),
                price: Price::new(Decimal::from_str(price)?)?,
                is_inclusive: seed.inclusive,
                sku: sku.to_string(),
                override_hsn: override_hsn.map(str::to_string),
                unit_id: unit_id.clone(),
                interstate_tax_ids: interstate.clone(),
                instate_tax_ids: instate.clone(),
            })?;

            match db.products().insert(&product).await {
                Ok(product) => seeded.push(product.id),
                Err(e) => eprintln!("Failed to insert {}: {}", product.sku, e),
            }
        }
    }
    println!("✓ {} categories, {} products", CATEGORIES.len(), seeded.len());

    // Derived totals go through the same path the API uses
    println!();
    for id in &seeded {
        let view = db.products().view(id).await?;
        if print_json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            println!(
                "  {:<12} {:<20} {:>9}  instate {:>6}  interstate {:>6}",
                view.full_sku, view.name, view.price, view.total_instate_tax, view.total_interstate_tax
            );
        }
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
