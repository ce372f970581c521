//! Product model and discount logic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{CategoryId, ProductId, UserId};

/// A seller-owned catalog item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub name: String,
    pub description: String,
    /// Current (possibly discounted) price.
    pub price: Decimal,
    /// Base price before any discount.
    pub price_without_discount: Decimal,
    pub discount_launched_at: Option<DateTime<Utc>>,
    pub discount_expires_at: Option<DateTime<Utc>>,
    /// Units available; never negative.
    pub stock_quantity: i32,
    pub sold_quantity: i32,
    pub category_id: CategoryId,
    pub subcategory_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the discount is active at `now`.
    ///
    /// Active means `now` lies strictly between the launch and expiration
    /// timestamps and the discounted price is below the base price.
    #[must_use]
    pub fn discount_active(&self, now: DateTime<Utc>) -> bool {
        match (self.discount_launched_at, self.discount_expires_at) {
            (Some(launch), Some(expiration)) => {
                launch < now && now < expiration && self.price < self.price_without_discount
            }
            _ => false,
        }
    }
}

/// A characteristic value attached to a product (e.g., "Color" -> "Red").
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductCharacteristic {
    pub type_name: String,
    pub value: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(
        price: Decimal,
        base: Decimal,
        launch: Option<DateTime<Utc>>,
        expiration: Option<DateTime<Utc>>,
    ) -> Product {
        Product {
            id: ProductId::new(1),
            seller_id: UserId::new(1),
            name: "Widget".to_string(),
            description: String::new(),
            price,
            price_without_discount: base,
            discount_launched_at: launch,
            discount_expires_at: expiration,
            stock_quantity: 5,
            sold_quantity: 0,
            category_id: CategoryId::new(1),
            subcategory_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_discount_active_within_window() {
        let now = Utc::now();
        let p = product(
            Decimal::new(800, 2),
            Decimal::new(1000, 2),
            Some(now - Duration::hours(1)),
            Some(now + Duration::hours(1)),
        );
        assert!(p.discount_active(now));
    }

    #[test]
    fn test_discount_inactive_outside_window() {
        let now = Utc::now();
        let p = product(
            Decimal::new(800, 2),
            Decimal::new(1000, 2),
            Some(now + Duration::hours(1)),
            Some(now + Duration::hours(2)),
        );
        assert!(!p.discount_active(now));
    }

    #[test]
    fn test_discount_bounds_are_strict() {
        let now = Utc::now();
        let p = product(
            Decimal::new(800, 2),
            Decimal::new(1000, 2),
            Some(now),
            Some(now + Duration::hours(1)),
        );
        // now == launch is not "strictly between"
        assert!(!p.discount_active(now));
    }

    #[test]
    fn test_discount_requires_lower_price() {
        let now = Utc::now();
        let p = product(
            Decimal::new(1000, 2),
            Decimal::new(1000, 2),
            Some(now - Duration::hours(1)),
            Some(now + Duration::hours(1)),
        );
        assert!(!p.discount_active(now));
    }

    #[test]
    fn test_discount_inactive_without_window() {
        let now = Utc::now();
        let p = product(Decimal::new(800, 2), Decimal::new(1000, 2), None, None);
        assert!(!p.discount_active(now));
    }
}
