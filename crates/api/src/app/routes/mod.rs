use axum::{
    extract::rejection::JsonRejection,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;

use crate::app::{dto, errors};

pub mod orders;
pub mod products;
pub mod system;

/// Router for every endpoint. Collection routes answer with and without a
/// trailing slash.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/",
            post(products::create_product).get(products::list_products),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/user-orders", post(orders::user_order))
        .route("/user-orders/", post(orders::user_order))
        .route("/supplier-orders", post(orders::supplier_order))
        .route("/supplier-orders/", post(orders::supplier_order))
}

/// Read a JSON body into `T`. Malformed JSON is a 400; well-formed JSON of
/// the wrong shape is a 422 naming the field.
pub(crate) fn read_body<T: DeserializeOwned>(
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<T, axum::response::Response> {
    let Json(value) = body.map_err(errors::json_rejection_to_response)?;
    dto::from_json(value).map_err(|e| errors::validation_error(&e))
}
