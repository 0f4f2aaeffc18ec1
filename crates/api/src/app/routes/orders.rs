use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    Json,
};

use stockroom_inventory::StockOrder;

use crate::app::routes::read_body;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn user_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    let order = match read_order(body) {
        Ok(order) => order,
        Err(res) => return res,
    };

    match services.stock.process_user_order(order).await {
        Ok(new_stock) => Json(dto::OrderResponse {
            message: "User order processed",
            new_stock,
        })
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn supplier_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    let order = match read_order(body) {
        Ok(order) => order,
        Err(res) => return res,
    };

    match services.stock.process_supplier_order(order).await {
        Ok(new_stock) => Json(dto::OrderResponse {
            message: "Supplier order processed",
            new_stock,
        })
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn read_order(
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<StockOrder, axum::response::Response> {
    let body: dto::OrderRequest = read_body(body)?;
    body.into_order().map_err(|missing| errors::validation_error(&missing))
}
