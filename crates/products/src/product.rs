use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId, ValidationErrors};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_SUPPLIERS_LEN: usize = 200;

/// Product category (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Clothing,
    Accessories,
    Collectibles,
    GraphicNovels,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Clothing,
        Category::Accessories,
        Category::Collectibles,
        Category::GraphicNovels,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Clothing => "clothing",
            Category::Accessories => "accessories",
            Category::Collectibles => "collectibles",
            Category::GraphicNovels => "graphic_novels",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(
                    "category",
                    "must be one of: clothing, accessories, collectibles, graphic_novels",
                )
            })
    }
}

/// A stored product record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub current_stock: i64,
    pub unit_cost: f64,
    pub sale_price: f64,
    pub category: Category,
    pub suppliers: String,
    pub created_at: DateTime<Utc>,
    /// `None` until the first mutation after creation.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    /// Materialize a freshly created record. `fields` must already be validated.
    pub fn create(id: ProductId, fields: NewProduct, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            current_stock: fields.current_stock,
            unit_cost: fields.unit_cost,
            sale_price: fields.sale_price,
            category: fields.category,
            suppliers: fields.suppliers,
            created_at,
            updated_at: None,
        }
    }

    /// Apply the supplied fields of a validated patch; everything else is left alone.
    pub fn apply_patch(&mut self, patch: &ProductPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(stock) = patch.current_stock {
            self.current_stock = stock;
        }
        if let Some(cost) = patch.unit_cost {
            self.unit_cost = cost;
        }
        if let Some(price) = patch.sale_price {
            self.sale_price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(suppliers) = &patch.suppliers {
            self.suppliers = suppliers.clone();
        }
        self.updated_at = Some(now);
    }

    /// Record a stock level produced by the stock adjustment rule.
    pub fn set_stock(&mut self, new_stock: i64, now: DateTime<Utc>) -> DomainResult<()> {
        if new_stock < 0 {
            return Err(DomainError::validation(
                "currentStock",
                "must be greater than or equal to 0",
            ));
        }
        self.current_stock = new_stock;
        self.updated_at = Some(now);
        Ok(())
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub current_stock: i64,
    pub unit_cost: f64,
    pub sale_price: f64,
    pub category: Category,
    pub suppliers: String,
}

impl NewProduct {
    /// Check every field; all violations are reported together.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, &self.name);
        if let Some(description) = &self.description {
            check_description(&mut errors, description);
        }
        check_stock(&mut errors, self.current_stock);
        check_positive(&mut errors, "unitCost", self.unit_cost);
        check_positive(&mut errors, "salePrice", self.sale_price);
        check_suppliers(&mut errors, &self.suppliers);
        errors.into_result()
    }
}

/// Sparse update: `None` means "leave unchanged".
///
/// `description` is doubly optional so that `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub current_stock: Option<i64>,
    pub unit_cost: Option<f64>,
    pub sale_price: Option<f64>,
    pub category: Option<Category>,
    pub suppliers: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.current_stock.is_none()
            && self.unit_cost.is_none()
            && self.sale_price.is_none()
            && self.category.is_none()
            && self.suppliers.is_none()
    }

    /// Validate only the supplied fields, with the same rules as creation.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, name);
        }
        if let Some(Some(description)) = &self.description {
            check_description(&mut errors, description);
        }
        if let Some(stock) = self.current_stock {
            check_stock(&mut errors, stock);
        }
        if let Some(cost) = self.unit_cost {
            check_positive(&mut errors, "unitCost", cost);
        }
        if let Some(price) = self.sale_price {
            check_positive(&mut errors, "salePrice", price);
        }
        if let Some(suppliers) = &self.suppliers {
            check_suppliers(&mut errors, suppliers);
        }
        errors.into_result()
    }
}

fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().is_empty() {
        errors.push("name", "cannot be empty");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push("name", format!("must be at most {MAX_NAME_LEN} characters"));
    }
}

fn check_description(errors: &mut ValidationErrors, description: &str) {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(
            "description",
            format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
        );
    }
}

fn check_stock(errors: &mut ValidationErrors, stock: i64) {
    if stock < 0 {
        errors.push("currentStock", "must be greater than or equal to 0");
    }
}

// NaN and infinities fail here too.
fn check_positive(errors: &mut ValidationErrors, field: &'static str, value: f64) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(field, "must be greater than 0");
    }
}

fn check_suppliers(errors: &mut ValidationErrors, suppliers: &str) {
    if suppliers.chars().count() > MAX_SUPPLIERS_LEN {
        errors.push(
            "suppliers",
            format!("must be at most {MAX_SUPPLIERS_LEN} characters"),
        );
    }
}
