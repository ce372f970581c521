//! User roles and capability checks.

use serde::{Deserialize, Serialize};

/// User role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to all administrative features including user management.
    Admin,
    /// May manage their own catalog and fulfil orders.
    Seller,
    /// May browse, order, review, and chat.
    Customer,
}

/// A discrete action a role may or may not perform.
///
/// Keeping this as a closed enum (rather than ad hoc string comparison)
/// lets authorization rules be tested independently of HTTP plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Block/unblock users, force order statuses.
    ManageUsers,
    /// Create, update, and delete own catalog products.
    ManageCatalog,
    /// Place orders and manage a cart.
    PlaceOrders,
    /// Write reviews and review replies.
    WriteReviews,
    /// Send chat messages.
    SendMessages,
}

impl Role {
    /// Whether this role is permitted to perform `capability`.
    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::ManageUsers => matches!(self, Self::Admin),
            Capability::ManageCatalog => matches!(self, Self::Admin | Self::Seller),
            Capability::PlaceOrders | Capability::WriteReviews | Capability::SendMessages => true,
        }
    }

    /// Whether this is the administrator role.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Seller => write!(f, "SELLER"),
            Self::Customer => write!(f, "CUSTOMER"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "SELLER" => Ok(Self::Seller),
            "CUSTOMER" => Ok(Self::Customer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

// SQLx support: roles are stored as TEXT (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(Into::into)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for role in [Role::Admin, Role::Seller, Role::Customer] {
            let back: Role = role.to_string().parse().unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("MANAGER".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_admin_manages_users() {
        assert!(Role::Admin.can(Capability::ManageUsers));
        assert!(!Role::Seller.can(Capability::ManageUsers));
        assert!(!Role::Customer.can(Capability::ManageUsers));
    }

    #[test]
    fn test_sellers_manage_catalog() {
        assert!(Role::Seller.can(Capability::ManageCatalog));
        assert!(!Role::Customer.can(Capability::ManageCatalog));
    }

    #[test]
    fn test_everyone_orders_and_reviews() {
        for role in [Role::Admin, Role::Seller, Role::Customer] {
            assert!(role.can(Capability::PlaceOrders));
            assert!(role.can(Capability::WriteReviews));
            assert!(role.can(Capability::SendMessages));
        }
    }

    #[test]
    fn test_serde_screaming_case() {
        let json = serde_json::to_string(&Role::Seller).unwrap();
        assert_eq!(json, "\"SELLER\"");
    }
}
