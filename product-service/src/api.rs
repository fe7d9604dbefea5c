use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Json,
    routing::get,
    Router,
};
use serde::de::DeserializeOwned;
use shared::*;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::repository::{ProductRepository, RepositoryError};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ProductRepository>,
}

pub fn create_router(state: AppState, public_dir: impl AsRef<FsPath>) -> Router {
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/stats", get(get_stats));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_check))
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid product id: {}", raw)))
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decodes a request body that may be left out. A blank body, or one not sent
/// as JSON, reads as an empty object.
fn optional_json<T>(headers: &HeaderMap, body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) || !has_json_content_type(headers) {
        return Ok(T::default());
    }

    let Json(value) = Json::<T>::from_bytes(body)?;
    Ok(value)
}

fn not_found_logged(id: i32) -> impl FnOnce(RepositoryError) -> ApiError {
    move |err| {
        if err == RepositoryError::NotFound {
            warn!("Product {} not found", id);
        }
        ApiError::from(err)
    }
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.repo.list().await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.repo.get(id).await.map_err(not_found_logged(id))?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CreateProductResponse>, ApiError> {
    let request: CreateProductRequest = optional_json(&headers, &body)?;
    let product = request.validate()?;

    let id = state.repo.create(product).await?;
    info!("Created product {}", id);

    Ok(Json(CreateProductResponse {
        id,
        message: "Product created successfully".to_string(),
    }))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let request: UpdateProductRequest = optional_json(&headers, &body)?;

    state
        .repo
        .update(id, ProductChanges::from(request))
        .await
        .map_err(not_found_logged(id))?;
    info!("Updated product {}", id);

    Ok(Json(MessageResponse {
        message: "Product updated successfully".to_string(),
    }))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;

    state.repo.delete(id).await.map_err(not_found_logged(id))?;
    info!("Deleted product {}", id);

    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ProductStats>, ApiError> {
    let stats = state.repo.stats().await?;
    Ok(Json(stats))
}

pub async fn health_check() -> &'static str {
    "OK"
}
