//! Product repository and the dynamic filter predicate builder.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use bazaar_core::{CategoryId, ProductId, UserId};

use super::RepositoryError;
use crate::models::product::{Product, ProductCharacteristic};

const PRODUCT_COLUMNS: &str = "id, seller_id, name, description, price, price_without_discount, \
     discount_launched_at, discount_expires_at, stock_quantity, sold_quantity, \
     category_id, subcategory_id, created_at, updated_at";

/// Sparse product filter.
///
/// Every field is optional; absent fields contribute no predicate, so the
/// empty filter matches the whole catalog. Characteristic entries are all
/// required to match (AND, never OR).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Exact category match.
    pub category_id: Option<CategoryId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Characteristic-type name -> required value.
    #[serde(default)]
    pub characteristics: BTreeMap<String, String>,
}

impl ProductFilter {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category_id.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.characteristics.is_empty()
    }
}

/// Append the filter's predicates to `qb` as an AND-conjunction.
///
/// The base query must end in a `WHERE` clause that is already valid (the
/// repository uses `WHERE TRUE`). Absent fields append nothing, which keeps
/// composition associative and commutative: the order of independent filter
/// conditions never changes the result set.
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    if let Some(name) = &filter.name {
        qb.push(" AND name ILIKE ");
        qb.push_bind(format!("%{name}%"));
    }

    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ");
        qb.push_bind(category_id);
    }

    if let Some(min_price) = filter.min_price {
        qb.push(" AND price >= ");
        qb.push_bind(min_price);
    }

    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ");
        qb.push_bind(max_price);
    }

    for (type_name, value) in &filter.characteristics {
        qb.push(
            " AND EXISTS (SELECT 1 FROM product_characteristics pc \
             WHERE pc.product_id = products.id AND pc.type_name = ",
        );
        qb.push_bind(type_name.clone());
        qb.push(" AND pc.value = ");
        qb.push_bind(value.clone());
        qb.push(")");
    }
}

/// New product payload for [`ProductRepository::create`].
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub price_without_discount: Decimal,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<CategoryId>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC");

        let products = qb
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List the characteristic values attached to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn characteristics(
        &self,
        id: ProductId,
    ) -> Result<Vec<ProductCharacteristic>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductCharacteristic>(
            "SELECT type_name, value FROM product_characteristics \
             WHERE product_id = $1 ORDER BY type_name",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Create a product owned by `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        seller_id: UserId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (seller_id, name, description, price, \
             price_without_discount, stock_quantity, category_id, subcategory_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(seller_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.price_without_discount)
        .bind(new.stock_quantity)
        .bind(new.category_id)
        .bind(new.subcategory_id)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a product's listing fields if owned by `seller_id`.
    ///
    /// Changing `price` here also resets `price_without_discount`; discounts
    /// are managed through [`Self::set_discount`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist or
    /// is not owned by `seller_id`.
    pub async fn update(
        &self,
        id: ProductId,
        seller_id: UserId,
        new: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET name = $3, description = $4, price = $5, \
             price_without_discount = $5, stock_quantity = $6, category_id = $7, \
             subcategory_id = $8, updated_at = now() \
             WHERE id = $1 AND seller_id = $2 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(seller_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock_quantity)
        .bind(new.category_id)
        .bind(new.subcategory_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(product)
    }

    /// Replace a characteristic value on a product (insert or update).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_characteristic(
        &self,
        id: ProductId,
        type_name: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product_characteristics (product_id, type_name, value) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (product_id, type_name) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(id)
        .bind(type_name)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set the discount window and discounted price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist or
    /// is not owned by `seller_id`.
    pub async fn set_discount(
        &self,
        id: ProductId,
        seller_id: UserId,
        price: Decimal,
        launched_at: chrono::DateTime<chrono::Utc>,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET price = $3, discount_launched_at = $4, \
             discount_expires_at = $5, updated_at = now() \
             WHERE id = $1 AND seller_id = $2",
        )
        .bind(id)
        .bind(seller_id)
        .bind(price)
        .bind(launched_at)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product if owned by `seller_id`.
    ///
    /// # Returns
    ///
    /// `true` if the product was deleted, `false` if it didn't exist or
    /// belongs to another seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId, seller_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
            .bind(id)
            .bind(seller_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adjust stock by `delta`, refusing changes that would go negative.
    ///
    /// # Returns
    ///
    /// `Some(new_stock)` on success; `None` when the guard rejected the
    /// change (stock is left untouched).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn change_quantity(
        &self,
        id: ProductId,
        delta: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        let new_stock: Option<i32> = sqlx::query_scalar(
            "UPDATE products SET stock_quantity = stock_quantity + $2, updated_at = now() \
             WHERE id = $1 AND stock_quantity + $2 >= 0 \
             RETURNING stock_quantity",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;

        if new_stock.is_none() {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
            if exists.is_none() {
                return Err(RepositoryError::NotFound);
            }
        }

        Ok(new_stock)
    }

    /// Fetch the current unit price inside an open transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn price_of(
        conn: &mut PgConnection,
        id: ProductId,
    ) -> Result<Option<Decimal>, RepositoryError> {
        let price: Option<Decimal> =
            sqlx::query_scalar("SELECT price FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(conn)
                .await?;

        Ok(price)
    }

    /// Record a sale inside an open transaction: decrement stock (guarded)
    /// and increment the sold counter.
    ///
    /// # Returns
    ///
    /// `false` when there is not enough stock; the transaction should be
    /// rolled back by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_sale(
        conn: &mut PgConnection,
        id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET stock_quantity = stock_quantity - $2, \
             sold_quantity = sold_quantity + $2, updated_at = now() \
             WHERE id = $1 AND stock_quantity >= $2",
        )
        .bind(id)
        .bind(quantity)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn built_sql(filter: &ProductFilter) -> String {
        let mut qb = QueryBuilder::new("SELECT id FROM products WHERE TRUE");
        push_filters(&mut qb, filter);
        qb.sql().to_owned()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let sql = built_sql(&ProductFilter::default());
        assert_eq!(sql, "SELECT id FROM products WHERE TRUE");
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let filter = ProductFilter {
            name: Some("phone".to_string()),
            ..Default::default()
        };
        let sql = built_sql(&filter);
        assert!(sql.contains("name ILIKE $1"));
    }

    #[test]
    fn test_price_bounds_are_inclusive_and_independent() {
        let lower_only = ProductFilter {
            min_price: Some(Decimal::new(500, 2)),
            ..Default::default()
        };
        let sql = built_sql(&lower_only);
        assert!(sql.contains("price >= $1"));
        assert!(!sql.contains("price <="));

        let upper_only = ProductFilter {
            max_price: Some(Decimal::new(9900, 2)),
            ..Default::default()
        };
        let sql = built_sql(&upper_only);
        assert!(sql.contains("price <= $1"));
        assert!(!sql.contains("price >="));
    }

    #[test]
    fn test_characteristics_are_anded() {
        let mut characteristics = BTreeMap::new();
        characteristics.insert("Color".to_string(), "Red".to_string());
        characteristics.insert("Size".to_string(), "M".to_string());
        let filter = ProductFilter {
            characteristics,
            ..Default::default()
        };

        let sql = built_sql(&filter);
        assert_eq!(sql.matches(" AND EXISTS ").count(), 2);
        assert!(!sql.contains(" OR "));
    }

    #[test]
    fn test_all_fields_compose_as_conjunction() {
        let mut characteristics = BTreeMap::new();
        characteristics.insert("Color".to_string(), "Red".to_string());
        let filter = ProductFilter {
            name: Some("lamp".to_string()),
            category_id: Some(CategoryId::new(3)),
            min_price: Some(Decimal::new(100, 2)),
            max_price: Some(Decimal::new(5000, 2)),
            characteristics,
        };

        let sql = built_sql(&filter);
        assert!(sql.contains("name ILIKE"));
        assert!(sql.contains("category_id ="));
        assert!(sql.contains("price >="));
        assert!(sql.contains("price <="));
        assert!(sql.contains("EXISTS"));
        // one bind per simple predicate, two per characteristic
        assert!(sql.contains("$6"));
    }

    #[test]
    fn test_is_empty() {
        assert!(ProductFilter::default().is_empty());
        let filter = ProductFilter {
            category_id: Some(CategoryId::new(1)),
            ..Default::default()
        };
        assert!(!filter.is_empty());
    }
}
