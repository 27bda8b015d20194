//! Development database seeder.
//!
//! Populates a database with a plausible corner-store catalog, a couple
//! of operators and customers, and the store identity. With `--demo` it
//! also runs one sale, one intake, and a period summary against the
//! seeded data, printing the results.
//!
//! Usage:
//!     cargo run --bin seed -- [--count N] [--db PATH] [--demo]

use caja_db::{build_receipt, Database, DbConfig};
use caja_core::{
    pricing, ClosingDraft, IntakeDraft, Money, NewCustomer, NewOperator, PaymentSplitInput,
    ProductInput, Quantity, Rate, SaleDraft, SaleLineInput, StoreInfo,
};
use chrono::{Duration, Utc};
use tracing::warn;

/// Category name, base price in cents, and product names.
const CATEGORIES: &[(&str, i64, &[&str])] = &[
    (
        "Almacén",
        800,
        &["Yerba Mate", "Azúcar", "Harina 000", "Arroz Largo Fino", "Fideos Guiseros",
          "Puré de Tomate", "Aceite de Girasol", "Sal Fina", "Lentejas", "Polenta"],
    ),
    (
        "Bebidas",
        1200,
        &["Gaseosa Cola", "Agua Mineral", "Soda", "Jugo de Naranja", "Cerveza Rubia",
          "Vino Tinto", "Agua Saborizada", "Amargo Serrano"],
    ),
    (
        "Lácteos",
        900,
        &["Leche Entera", "Yogur Bebible", "Queso Cremoso", "Manteca", "Dulce de Leche",
          "Crema de Leche", "Ricota"],
    ),
    (
        "Limpieza",
        1000,
        &["Detergente", "Lavandina", "Jabón en Polvo", "Esponja", "Papel de Cocina",
          "Desodorante de Ambiente"],
    ),
    (
        "Kiosco",
        350,
        &["Alfajor", "Chicle", "Caramelos Surtidos", "Chocolate con Maní", "Galletitas Dulces",
          "Papas Fritas", "Maní Salado"],
    ),
];

const VARIANTS: &[&str] = &["500g", "1kg", "1.5L", "750ml", "x6", "x12", "250g", "2L"];

fn print_help() {
    println!("Seed the Caja POS database with development data");
    println!();
    println!("Options:");
    println!("  -c, --count N   Number of products to create (default 200)");
    println!("  -d, --db PATH   Database file (default caja.db)");
    println!("      --demo      Run a demo sale, intake, and period summary");
    println!("  -h, --help      Show this help");
}

/// Deterministic pseudo-random product from a seed index.
fn generate_product(seed: usize) -> ProductInput {
    let (category, base_cents, names) = CATEGORIES[seed % CATEGORIES.len()];
    let name = names[(seed / CATEGORIES.len()) % names.len()];
    let variant = VARIANTS[(seed * 7) % VARIANTS.len()];

    // spread prices around the category base without real randomness
    let price_cents = base_cents + ((seed as i64 * 37) % base_cents) * 3;

    // every seventh product is untracked (made to order, services)
    let stock = if seed % 7 == 6 { None } else { Some(Quantity::from_units(5 + (seed as i64 * 13) % 40)) };

    ProductInput {
        name: format!("{} {} ({})", name, variant, category),
        price: Money::from_cents(price_cents),
        stock,
        barcode: Some(format!("779{:010}", seed)),
    }
}

async fn seed_registry(db: &Database) -> Result<i64, Box<dyn std::error::Error>> {
    db.store_info()
        .save(&StoreInfo {
            name: "Almacén Don Luis".to_string(),
            tax_id: Some("20-12345678-9".to_string()),
            address: Some("Av. Rivadavia 1234, CABA".to_string()),
            phone: Some("11-4000-1234".to_string()),
            footer_note: Some("¡Gracias por su compra!".to_string()),
        })
        .await?;

    let operators = db.operators();
    let admin_id = match operators.find_by_username("admin").await? {
        Some(operator) => operator.id,
        None => {
            operators
                .create(&NewOperator {
                    username: "admin".to_string(),
                    display_name: "Administrador".to_string(),
                    role: "admin".to_string(),
                })
                .await?
        }
    };
    if operators.find_by_username("cajero1").await?.is_none() {
        operators
            .create(&NewOperator {
                username: "cajero1".to_string(),
                display_name: "Cajero Turno Mañana".to_string(),
                ..Default::default()
            })
            .await?;
    }

    if db.customers().list(1).await?.is_empty() {
        for name in ["Ana Suarez", "Bruno Paz", "Carla Domínguez"] {
            db.customers()
                .create(&NewCustomer { name: name.to_string(), ..Default::default() })
                .await?;
        }
    }

    Ok(admin_id)
}

async fn run_demo(db: &Database, operator_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let products = db.products().list_active(2).await?;
    let [first, second] = &products[..] else {
        println!("⚠ Not enough products for the demo");
        return Ok(());
    };

    // one cart, two lines, 10% discount, paid cash in a single split so
    // the payments ledger carries it into the period summary below
    let lines = vec![
        SaleLineInput {
            product_id: first.id,
            quantity: Quantity::from_units(2),
            unit_price: first.price(),
        },
        SaleLineInput {
            product_id: second.id,
            quantity: Quantity::from_units(1),
            unit_price: second.price(),
        },
    ];
    let discount = Rate::from_percentage(10.0);
    let total = pricing::final_total(&lines, discount, Rate::zero());
    let draft = SaleDraft {
        lines,
        discount,
        payment_method: Some("Efectivo".to_string()),
        tendered: Some(Money::from_cents(first.price_cents * 2 + second.price_cents)),
        splits: vec![PaymentSplitInput {
            amount: total,
            method: "Efectivo".to_string(),
            reference: None,
        }],
        ..Default::default()
    };
    let completed = db.sales().process_sale(&draft).await?;
    println!("✓ Demo sale #{} for {}", completed.sale_id, completed.total);

    // receipts are fire-and-forget: a failure is warned, never fatal
    match build_receipt(db, completed.sale_id).await {
        Ok(receipt) => {
            println!("  Receipt: {} line(s), change {}",
                receipt.lines.len(),
                receipt.change().unwrap_or(Money::zero()));
        }
        Err(error) => warn!(%error, sale_id = completed.sale_id, "Receipt assembly failed"),
    }

    let outcome = db
        .intakes()
        .process_intake(&IntakeDraft {
            operator_id,
            product_id: first.id,
            quantity: Quantity::from_units(12),
            unit_cost: Money::from_cents(first.price_cents / 2),
            sale_price: first.price(),
        })
        .await?;
    println!(
        "✓ Demo intake #{}: stock {} → {}",
        outcome.intake_id,
        outcome.previous_stock.map(|q| q.to_string()).unwrap_or_else(|| "∅".to_string()),
        outcome.new_stock
    );

    let end = Utc::now() + Duration::minutes(1);
    let start = end - Duration::hours(24);
    let summary = db.closings().summarize_period(start, end).await?;
    println!(
        "✓ Last 24h: cash {} · card {} · transfer {} · unclassified {}",
        summary.cash, summary.card, summary.transfer, summary.unclassified
    );

    let closing_id = db
        .closings()
        .save_closing(&ClosingDraft {
            period_start: start,
            period_end: end,
            opening_float: Money::from_cents(5_000),
            cash_total: summary.cash,
            card_total: summary.card,
            transfer_total: summary.transfer,
            external_income: Money::zero(),
            expenses: Money::zero(),
            counted: Money::from_cents(5_000) + summary.cash,
            operator: Some("admin".to_string()),
            notes: Some("demo".to_string()),
        })
        .await?;
    println!("✓ Demo closing #{} saved", closing_id);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut count: usize = 200;
    let mut db_path = "caja.db".to_string();
    let mut demo = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                i += 1;
                count = args.get(i).ok_or("missing value for --count")?.parse()?;
            }
            "--db" | "-d" => {
                i += 1;
                db_path = args.get(i).ok_or("missing value for --db")?.clone();
            }
            "--demo" => demo = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    println!("🌱 Seeding {} with {} products...", db_path, count);
    let db = Database::new(DbConfig::new(&db_path).optional_tables(true)).await?;

    let admin_id = seed_registry(&db).await?;

    let existing = db.products().count().await?;
    if existing >= count as i64 {
        println!("✓ Database already has {} products, skipping catalog", existing);
    } else {
        let products = db.products();
        for seed in existing as usize..count {
            products.create(&generate_product(seed)).await?;
            if (seed + 1) % 50 == 0 {
                println!("  ... {} products", seed + 1);
            }
        }
        println!("✓ Catalog at {} products", db.products().count().await?);
    }

    if demo {
        run_demo(&db, admin_id).await?;
    }

    db.close().await;
    println!("✓ Done");
    Ok(())
}
