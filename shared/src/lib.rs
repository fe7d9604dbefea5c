use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Number of fractional digits stored for prices.
pub const PRICE_SCALE: i64 = 2;

// Decimals travel as JSON numbers that carry their exact decimal text.
// serde_json's `arbitrary_precision` keeps that text intact, so a price or a
// total never passes through `f64` on its way in or out.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    #[serde(with = "bigdecimal::serde::json_num")]
    pub price: BigDecimal,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Aggregates over the whole products table. An empty table yields zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total_products: i64,
    pub total_items: i64,
    pub categories: i64,
    #[serde(with = "bigdecimal::serde::json_num")]
    pub total_value: BigDecimal,
}

/// Validated input for inserting a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProductData {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub description: Option<String>,
}

/// Full replacement of a product's mutable fields.
///
/// Fields stay optional: an update is not validated up front and an absent
/// value is handed to the store as NULL, where the column constraints decide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<BigDecimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default, with = "bigdecimal::serde::json_num_option")]
    pub price: Option<BigDecimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default, with = "bigdecimal::serde::json_num_option")]
    pub price: Option<BigDecimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductResponse {
    pub id: i32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required fields")]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl CreateProductRequest {
    /// Checks that `name`, `category`, `quantity` and `price` are present.
    /// Text fields must also be non-empty; zero is a valid quantity or price.
    pub fn validate(self) -> Result<NewProductData, ValidationError> {
        let name = self.name.filter(|value| !value.is_empty());
        let category = self.category.filter(|value| !value.is_empty());

        match (name, category, self.quantity, self.price) {
            (Some(name), Some(category), Some(quantity), Some(price)) => Ok(NewProductData {
                name,
                category,
                quantity,
                price: round_price(&price),
                description: self.description,
            }),
            (name, category, quantity, price) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push("name");
                }
                if category.is_none() {
                    missing.push("category");
                }
                if quantity.is_none() {
                    missing.push("quantity");
                }
                if price.is_none() {
                    missing.push("price");
                }
                Err(ValidationError { missing })
            }
        }
    }
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name,
            category: request.category,
            quantity: request.quantity,
            price: request.price.as_ref().map(round_price),
            description: request.description,
        }
    }
}

/// Rounds to cents, halves away from zero, the way a `NUMERIC(12,2)` column
/// stores them.
pub fn round_price(price: &BigDecimal) -> BigDecimal {
    price.with_scale_round(PRICE_SCALE, RoundingMode::HalfUp)
}
