//! Domain types shared across the workspace.

pub mod email;
pub mod id;
pub mod role;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{
    CartItemId, CategoryId, FavoriteId, MessageId, OrderId, OrderItemId, ProductId, ReviewId,
    SubscriptionId, UserId,
};
pub use role::{Capability, Role};
pub use slug::{Slug, SlugError};
pub use status::{OrderStatus, UnknownStatus};
