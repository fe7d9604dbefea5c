//! In-memory `ProductRepository` that follows the products table's rules:
//! serial ids, newest-first listing, NOT NULL columns and zeroed aggregates.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use shared::*;

use crate::repository::{ProductRepository, RepositoryError, RepositoryResult};

#[derive(Default)]
pub struct InMemoryProductRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    rows: Vec<Product>,
    last_id: i32,
    failure: Option<String>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `message`, as a broken database would.
    pub fn failing(message: &str) -> Self {
        Self {
            state: Mutex::new(State {
                failure: Some(message.to_string()),
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, State>> {
        let state = self
            .state
            .lock()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        if let Some(message) = state.failure.clone() {
            return Err(RepositoryError::Connection(message));
        }
        Ok(state)
    }
}

impl State {
    fn insert(&mut self, product: NewProductData) -> i32 {
        self.last_id += 1;
        let now = Utc::now().naive_utc();
        self.rows.push(Product {
            id: self.last_id,
            name: product.name,
            category: product.category,
            quantity: product.quantity,
            price: product.price,
            description: product.description,
            created_at: now,
            updated_at: now,
        });
        self.last_id
    }
}

fn not_null(column: &str) -> RepositoryError {
    RepositoryError::Query(format!(
        "null value in column \"{}\" of relation \"products\" violates not-null constraint",
        column
    ))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> RepositoryResult<Vec<Product>> {
        let state = self.lock()?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> RepositoryResult<Product> {
        let state = self.lock()?;
        state
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn create(&self, product: NewProductData) -> RepositoryResult<i32> {
        let mut state = self.lock()?;
        Ok(state.insert(product))
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> RepositoryResult<()> {
        let mut state = self.lock()?;
        let row = state
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepositoryError::NotFound)?;

        let name = changes.name.ok_or_else(|| not_null("name"))?;
        let category = changes.category.ok_or_else(|| not_null("category"))?;
        let quantity = changes.quantity.ok_or_else(|| not_null("quantity"))?;
        let price = changes.price.ok_or_else(|| not_null("price"))?;

        row.name = name;
        row.category = category;
        row.quantity = quantity;
        row.price = price;
        row.description = changes.description;
        row.updated_at = Utc::now().naive_utc();
        Ok(())
    }

    async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let mut state = self.lock()?;
        let before = state.rows.len();
        state.rows.retain(|row| row.id != id);
        if state.rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn stats(&self) -> RepositoryResult<ProductStats> {
        let state = self.lock()?;
        let categories: BTreeSet<&str> =
            state.rows.iter().map(|row| row.category.as_str()).collect();
        Ok(ProductStats {
            total_products: state.rows.len() as i64,
            total_items: state.rows.iter().map(|row| i64::from(row.quantity)).sum(),
            categories: categories.len() as i64,
            total_value: state
                .rows
                .iter()
                .map(|row| BigDecimal::from(row.quantity) * &row.price)
                .fold(BigDecimal::default(), |total, value| total + value),
        })
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let state = self.lock()?;
        Ok(state.rows.len() as i64)
    }

    async fn insert_many(&self, new_products: Vec<NewProductData>) -> RepositoryResult<usize> {
        let mut state = self.lock()?;
        let inserted = new_products.len();
        for product in new_products {
            state.insert(product);
        }
        Ok(inserted)
    }
}
