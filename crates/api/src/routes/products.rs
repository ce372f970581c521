//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{CategoryId, ProductId, Role, UserId};

use crate::db::products::{NewProduct, ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireSeller;
use crate::models::product::{Product, ProductCharacteristic};
use crate::models::user::User;
use crate::state::AppState;

/// Product detail response: the row plus its characteristic values.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub characteristics: Vec<ProductCharacteristic>,
    /// Whether the discount window is open right now.
    pub discount_active: bool,
}

/// Create-product request body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<CategoryId>,
}

/// Discount request body.
#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub price: Decimal,
    pub launched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Characteristic upsert request body.
#[derive(Debug, Deserialize)]
pub struct CharacteristicRequest {
    pub type_name: String,
    pub value: String,
}

/// Stock adjustment request body.
#[derive(Debug, Deserialize)]
pub struct StockRequest {
    /// Signed change; negative values decrement.
    pub delta: i32,
}

/// Stock adjustment response.
#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub stock_quantity: i32,
}

/// `GET /api/products`
#[instrument(skip(state, filter))]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// `POST /api/products/search`
///
/// Same filter as [`list`], but taken as a JSON body. Query strings have no
/// encoding for the characteristics map, so map-based searches come in here.
#[instrument(skip(state, filter))]
pub async fn search(
    State(state): State<AppState>,
    Json(filter): Json<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let characteristics = repo.characteristics(id).await?;
    let discount_active = product.discount_active(Utc::now());

    Ok(Json(ProductDetail {
        product,
        characteristics,
        discount_active,
    }))
}

/// `POST /api/products`
#[instrument(skip(state, req, seller), fields(seller_id = %seller.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_listing(&req)?;

    let new = NewProduct {
        name: req.name,
        description: req.description,
        price: req.price,
        price_without_discount: req.price,
        stock_quantity: req.stock_quantity,
        category_id: req.category_id,
        subcategory_id: req.subcategory_id,
    };

    let product = ProductRepository::new(state.pool())
        .create(seller.id, &new)
        .await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
#[instrument(skip(state, req, seller), fields(seller_id = %seller.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Product>> {
    validate_listing(&req)?;

    let new = NewProduct {
        name: req.name,
        description: req.description,
        price: req.price,
        price_without_discount: req.price,
        stock_quantity: req.stock_quantity,
        category_id: req.category_id,
        subcategory_id: req.subcategory_id,
    };

    let repo = ProductRepository::new(state.pool());
    let owned = check_ownership(&repo, id, &seller).await?;
    let product = repo
        .update(id, owned.seller_id, &new)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("product {id}"))
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(product))
}

/// `PUT /api/products/{id}/discount`
#[instrument(skip(state, req, seller), fields(seller_id = %seller.id))]
pub async fn set_discount(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
    Json(req): Json<DiscountRequest>,
) -> Result<StatusCode> {
    if req.expires_at <= req.launched_at {
        return Err(AppError::validation("expires_at must be after launched_at"));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::validation("price must not be negative"));
    }

    let repo = ProductRepository::new(state.pool());
    let owned = check_ownership(&repo, id, &seller).await?;
    repo.set_discount(id, owned.seller_id, req.price, req.launched_at, req.expires_at)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("product {id}"))
            }
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/products/{id}/characteristics`
#[instrument(skip(state, req, seller), fields(seller_id = %seller.id))]
pub async fn set_characteristic(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
    Json(req): Json<CharacteristicRequest>,
) -> Result<StatusCode> {
    if req.type_name.trim().is_empty() {
        return Err(AppError::validation("type_name must not be empty"));
    }

    let repo = ProductRepository::new(state.pool());
    check_ownership(&repo, id, &seller).await?;
    repo.set_characteristic(id, &req.type_name, &req.value)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /api/products/{id}/stock`
#[instrument(skip(state, seller), fields(seller_id = %seller.id))]
pub async fn change_stock(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
    Json(req): Json<StockRequest>,
) -> Result<Json<StockResponse>> {
    let repo = ProductRepository::new(state.pool());
    check_ownership(&repo, id, &seller).await?;

    let stock_quantity = repo
        .change_quantity(id, req.delta)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound(format!("product {id}"))
            }
            other => AppError::Database(other),
        })?
        .ok_or(AppError::InsufficientStock)?;

    Ok(Json(StockResponse { stock_quantity }))
}

/// `DELETE /api/products/{id}`
#[instrument(skip(state, seller), fields(seller_id = %seller.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSeller(seller): RequireSeller,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let repo = ProductRepository::new(state.pool());
    let owned = check_ownership(&repo, id, &seller).await?;
    let deleted = repo.delete(id, owned.seller_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    tracing::info!(product_id = %id, "product deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Validate the shared create/update listing payload.
fn validate_listing(req: &CreateProductRequest) -> Result<()> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name must not be empty".to_owned());
    }
    if req.price < Decimal::ZERO {
        errors.push("price must not be negative".to_owned());
    }
    if req.stock_quantity < 0 {
        errors.push("stock_quantity must not be negative".to_owned());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Load the product and verify that `user` may manage it.
///
/// Missing products are a 404; someone else's product is a 403. Every
/// seller-scoped handler goes through here so the two cases stay distinct.
async fn check_ownership(
    repo: &ProductRepository<'_>,
    id: ProductId,
    user: &User,
) -> Result<Product> {
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    if !may_manage(product.seller_id, user.id, user.role) {
        return Err(AppError::Forbidden(
            "Product belongs to another seller".to_owned(),
        ));
    }

    Ok(product)
}

/// A listing may be managed by its owner or by an admin.
fn may_manage(owner: UserId, caller: UserId, role: Role) -> bool {
    owner == caller || role.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_manages_own_listing() {
        assert!(may_manage(UserId::new(1), UserId::new(1), Role::Seller));
    }

    #[test]
    fn test_other_seller_is_rejected() {
        assert!(!may_manage(UserId::new(1), UserId::new(2), Role::Seller));
        assert!(!may_manage(UserId::new(1), UserId::new(2), Role::Customer));
    }

    #[test]
    fn test_admin_manages_any_listing() {
        assert!(may_manage(UserId::new(1), UserId::new(2), Role::Admin));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_search_body_carries_characteristics_map() {
        let filter: ProductFilter = serde_json::from_str(
            r#"{
                "name": "lamp",
                "characteristics": {"Color": "Red", "Size": "M"}
            }"#,
        )
        .unwrap();

        assert_eq!(filter.name.as_deref(), Some("lamp"));
        assert_eq!(
            filter.characteristics.get("Color").map(String::as_str),
            Some("Red")
        );
        assert_eq!(
            filter.characteristics.get("Size").map(String::as_str),
            Some("M")
        );
    }
}
