use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Numeric, Text};
use diesel_async::RunQueryDsl;
use shared::*;
use tracing::debug;

use crate::models::*;
use crate::pool::{DbPool, PoolError};
use crate::schema::products;

const UPDATE_PRODUCT_SQL: &str = "UPDATE products \
     SET name = $1, category = $2, quantity = $3, price = $4, description = $5, updated_at = NOW() \
     WHERE id = $6";

const PRODUCT_STATS_SQL: &str = "SELECT \
     COUNT(*) AS total_products, \
     COALESCE(SUM(quantity), 0)::bigint AS total_items, \
     COUNT(DISTINCT category) AS categories, \
     COALESCE(SUM(quantity * price), 0)::numeric AS total_value \
     FROM products";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Product not found")]
    NotFound,

    /// The pool could not hand out a working connection.
    #[error("{0}")]
    Connection(String),

    /// The statement failed; carries the database's own message.
    #[error("{0}")]
    Query(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Checkout { message } => Self::Connection(message),
            err @ PoolError::Build { .. } => Self::Connection(err.to_string()),
        }
    }
}

impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
                debug!(message = info.message(), "database connection closed");
                Self::Connection(info.message().to_string())
            }
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
                Self::Query(info.message().to_string())
            }
            other => {
                debug!(error = %other, "diesel operation failed");
                Self::Query(other.to_string())
            }
        }
    }
}

/// Storage operations behind the products API. Each call runs one statement.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products, most recently created first.
    async fn list(&self) -> RepositoryResult<Vec<Product>>;

    async fn get(&self, id: i32) -> RepositoryResult<Product>;

    /// Inserts a product and returns its generated id.
    async fn create(&self, product: NewProductData) -> RepositoryResult<i32>;

    /// Replaces every mutable field and refreshes `updated_at`.
    async fn update(&self, id: i32, changes: ProductChanges) -> RepositoryResult<()>;

    async fn delete(&self, id: i32) -> RepositoryResult<()>;

    async fn stats(&self) -> RepositoryResult<ProductStats>;

    async fn count(&self) -> RepositoryResult<i64>;

    /// Inserts all rows in one statement, returning how many were written.
    async fn insert_many(&self, new_products: Vec<NewProductData>) -> RepositoryResult<usize>;
}

#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list(&self) -> RepositoryResult<Vec<Product>> {
        let mut conn = self.pool.get().await?;

        let rows = products::table
            .order((products::created_at.desc(), products::id.desc()))
            .load::<ProductRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: i32) -> RepositoryResult<Product> {
        let mut conn = self.pool.get().await?;

        let row = products::table
            .find(id)
            .first::<ProductRow>(&mut conn)
            .await
            .optional()?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    async fn create(&self, product: NewProductData) -> RepositoryResult<i32> {
        let mut conn = self.pool.get().await?;

        let id = diesel::insert_into(products::table)
            .values(&NewProductRow::from(product))
            .returning(products::id)
            .get_result::<i32>(&mut conn)
            .await?;

        Ok(id)
    }

    async fn update(&self, id: i32, changes: ProductChanges) -> RepositoryResult<()> {
        let mut conn = self.pool.get().await?;

        // Absent fields are bound as NULL so the column constraints reject them.
        let affected = diesel::sql_query(UPDATE_PRODUCT_SQL)
            .bind::<Nullable<Text>, _>(changes.name)
            .bind::<Nullable<Text>, _>(changes.category)
            .bind::<Nullable<Integer>, _>(changes.quantity)
            .bind::<Nullable<Numeric>, _>(changes.price)
            .bind::<Nullable<Text>, _>(changes.description)
            .bind::<Integer, _>(id)
            .execute(&mut conn)
            .await?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> RepositoryResult<()> {
        let mut conn = self.pool.get().await?;

        let affected = diesel::delete(products::table.find(id))
            .execute(&mut conn)
            .await?;

        if affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn stats(&self) -> RepositoryResult<ProductStats> {
        let mut conn = self.pool.get().await?;

        let row = diesel::sql_query(PRODUCT_STATS_SQL)
            .get_result::<StatsRow>(&mut conn)
            .await?;

        Ok(ProductStats::from(row))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let mut conn = self.pool.get().await?;

        let count = products::table
            .count()
            .get_result::<i64>(&mut conn)
            .await?;

        Ok(count)
    }

    async fn insert_many(&self, new_products: Vec<NewProductData>) -> RepositoryResult<usize> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<NewProductRow> = new_products.into_iter().map(NewProductRow::from).collect();
        let inserted = diesel::insert_into(products::table)
            .values(&rows)
            .execute(&mut conn)
            .await?;

        Ok(inserted)
    }
}
