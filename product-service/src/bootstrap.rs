//! Schema creation and first-run seed data.
//!
//! Both steps are idempotent and run before the HTTP listener is bound. Any
//! failure here aborts startup.

use anyhow::Result;
use bigdecimal::BigDecimal;
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use shared::NewProductData;
use tracing::info;

use crate::repository::{ProductRepository, RepositoryResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// (name, category, quantity, price in cents, description)
const SEED_PRODUCTS: [(&str, &str, i32, i64, &str); 5] = [
    ("Laptop Pro", "Electronics", 15, 129_999, "High-performance laptop"),
    ("Wireless Mouse", "Electronics", 45, 2_999, "Ergonomic wireless mouse"),
    ("Office Chair", "Furniture", 8, 19_999, "Comfortable office chair"),
    ("Coffee Beans", "Food", 120, 1_299, "Premium coffee beans"),
    ("Notebook Set", "Office Supplies", 200, 899, "Pack of 3 notebooks"),
];

/// Creates the products table if needed. Blocking; run it off the async runtime.
pub fn run_migrations(connection_string: &str) -> Result<()> {
    let mut conn = PgConnection::establish(connection_string)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Migration error: {}", e))?;
    info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

pub fn seed_products() -> Vec<NewProductData> {
    SEED_PRODUCTS
        .iter()
        .map(|&(name, category, quantity, cents, description)| NewProductData {
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            price: BigDecimal::new(cents.into(), 2),
            description: Some(description.to_string()),
        })
        .collect()
}

/// Inserts the seed products when the table is empty. Returns the number of
/// rows written.
pub async fn seed_if_empty(repo: &dyn ProductRepository) -> RepositoryResult<usize> {
    let existing = repo.count().await?;
    if existing != 0 {
        info!("Products table already holds {} row(s), skipping seed", existing);
        return Ok(0);
    }

    let inserted = repo.insert_many(seed_products()).await?;
    info!("Seeded {} sample products", inserted);
    Ok(inserted)
}
