use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Numeric};
use shared::*;

#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = crate::schema::products)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductRow {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub description: Option<String>,
}

/// Result row of the aggregate statistics query.
#[derive(Debug, QueryableByName)]
pub struct StatsRow {
    #[diesel(sql_type = BigInt)]
    pub total_products: i64,
    #[diesel(sql_type = BigInt)]
    pub total_items: i64,
    #[diesel(sql_type = BigInt)]
    pub categories: i64,
    #[diesel(sql_type = Numeric)]
    pub total_value: BigDecimal,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            quantity: row.quantity,
            price: row.price,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<NewProductData> for NewProductRow {
    fn from(product: NewProductData) -> Self {
        Self {
            name: product.name,
            category: product.category,
            quantity: product.quantity,
            price: product.price,
            description: product.description,
        }
    }
}

impl From<StatsRow> for ProductStats {
    fn from(row: StatsRow) -> Self {
        Self {
            total_products: row.total_products,
            total_items: row.total_items,
            categories: row.categories,
            total_value: row.total_value,
        }
    }
}
