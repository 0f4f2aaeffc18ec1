use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockroom_core::ProductId;

use crate::app::{dto, errors};
use crate::app::routes::read_body;
use crate::app::services::AppServices;

fn parse_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse::<ProductId>()
        .map_err(errors::domain_error_to_response)
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    let body: dto::CreateProductRequest = match read_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };
    let input = match body.into_new_product() {
        Ok(input) => input,
        Err(missing) => return errors::validation_error(&missing),
    };

    match services.catalog.create(input).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(dto::ProductResponse::from(product)),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<dto::ListParams>, QueryRejection>,
) -> axum::response::Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let (skip, limit) = match params.resolve() {
        Ok(paging) => paging,
        Err(e) => return errors::validation_error(&e),
    };

    match services.catalog.list(skip, limit).await {
        Ok(products) => Json(
            products
                .into_iter()
                .map(dto::ProductResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.catalog.get(id).await {
        Ok(product) => Json(dto::ProductResponse::from(product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let body: dto::UpdateProductRequest = match read_body(body) {
        Ok(b) => b,
        Err(res) => return res,
    };

    match services.catalog.update(id, body.into()).await {
        Ok(product) => Json(dto::ProductResponse::from(product)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.catalog.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
