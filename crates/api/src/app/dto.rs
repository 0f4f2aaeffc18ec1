use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use stockroom_core::{ProductId, ValidationErrors};
use stockroom_inventory::StockOrder;
use stockroom_products::{Category, NewProduct, Product, ProductPatch};

pub const DEFAULT_LIST_LIMIT: i64 = 100;

// -------------------------
// Request DTOs
// -------------------------

/// Create body. Required fields are optional here so every missing one can be
/// reported by name in a single response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub current_stock: Option<i64>,
    pub unit_cost: Option<f64>,
    pub sale_price: Option<f64>,
    pub category: Option<Category>,
    pub suppliers: Option<String>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> Result<NewProduct, ValidationErrors> {
        let mut missing = ValidationErrors::new();
        let name = required(&mut missing, "name", self.name);
        let current_stock = required(&mut missing, "currentStock", self.current_stock);
        let unit_cost = required(&mut missing, "unitCost", self.unit_cost);
        let sale_price = required(&mut missing, "salePrice", self.sale_price);
        let category = required(&mut missing, "category", self.category);
        let suppliers = required(&mut missing, "suppliers", self.suppliers);

        match (name, current_stock, unit_cost, sale_price, category, suppliers) {
            (
                Some(name),
                Some(current_stock),
                Some(unit_cost),
                Some(sale_price),
                Some(category),
                Some(suppliers),
            ) => Ok(NewProduct {
                name,
                description: self.description,
                current_stock,
                unit_cost,
                sale_price,
                category,
                suppliers,
            }),
            _ => Err(missing),
        }
    }
}

fn required<T>(missing: &mut ValidationErrors, field: &'static str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        missing.push(field, "field required");
    }
    value
}

/// Sparse update body. Absent fields are left unchanged; `"description": null`
/// clears the description.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub current_stock: Option<i64>,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    #[serde(default)]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub suppliers: Option<String>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(req: UpdateProductRequest) -> Self {
        ProductPatch {
            name: req.name,
            description: req.description,
            current_stock: req.current_stock,
            unit_cost: req.unit_cost,
            sale_price: req.sale_price,
            category: req.category,
            suppliers: req.suppliers,
        }
    }
}

/// Only called when the key is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(alias = "product_id")]
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

impl OrderRequest {
    pub fn into_order(self) -> Result<StockOrder, ValidationErrors> {
        let mut missing = ValidationErrors::new();
        let product_id = required(&mut missing, "productId", self.product_id);
        let quantity = required(&mut missing, "quantity", self.quantity);

        match (product_id, quantity) {
            (Some(id), Some(quantity)) => Ok(StockOrder::new(ProductId::new(id), quantity)),
            _ => Err(missing),
        }
    }
}

/// Paging query. Values are kept raw so a non-integer is reported against
/// its parameter name.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// `(skip, limit)`, defaulting to `(0, 100)`.
    pub fn resolve(&self) -> Result<(i64, i64), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let skip = parse_param(&mut errors, "skip", self.skip.as_deref(), 0);
        let limit = parse_param(&mut errors, "limit", self.limit.as_deref(), DEFAULT_LIST_LIMIT);
        if errors.is_empty() {
            Ok((skip, limit))
        } else {
            Err(errors)
        }
    }
}

fn parse_param(
    errors: &mut ValidationErrors,
    name: &'static str,
    raw: Option<&str>,
    default: i64,
) -> i64 {
    match raw.map(str::trim) {
        None | Some("") => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            errors.push(name, "must be an integer");
            default
        }),
    }
}

/// Deserialize a JSON body, naming the offending field on failure.
pub fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ValidationErrors> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let path = e.path().to_string();
        let field = if path == "." { "body".to_string() } else { path };
        ValidationErrors::single(field, e.into_inner().to_string())
    })
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub current_stock: i64,
    pub unit_cost: f64,
    pub sale_price: f64,
    pub category: Category,
    pub suppliers: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            current_stock: p.current_stock,
            unit_cost: p.unit_cost,
            sale_price: p.sale_price,
            category: p.category,
            suppliers: p.suppliers,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub message: &'static str,
    pub new_stock: i64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}
