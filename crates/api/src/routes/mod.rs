//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/register          - Create an account
//! POST   /api/auth/login             - Exchange credentials for a token
//! GET    /api/auth/me                - Current profile
//! PUT    /api/auth/password          - Change password
//! POST   /api/auth/verify-email      - Mark own email verified
//! PUT    /api/auth/slug              - Set seller profile slug (seller)
//! GET    /api/sellers/{slug}         - Public seller profile
//!
//! # Products
//! GET    /api/products               - List (filterable)
//! POST   /api/products/search        - List, filter as JSON body
//! GET    /api/products/{id}          - Detail with characteristics
//! POST   /api/products               - Create (seller)
//! PUT    /api/products/{id}          - Update listing fields (seller, owner)
//! PUT    /api/products/{id}/discount - Set discount window (seller, owner)
//! PUT    /api/products/{id}/characteristics - Upsert a characteristic (seller, owner)
//! PATCH  /api/products/{id}/stock    - Adjust stock by delta (seller, owner)
//! DELETE /api/products/{id}          - Delete (seller, owner)
//!
//! # Orders
//! POST   /api/orders                 - Place an order from the cart
//! GET    /api/orders                 - List own orders
//! GET    /api/orders/{id}            - Detail with items (owner)
//! POST   /api/orders/{id}/confirm    - NEW -> PROCESSING (owner)
//! POST   /api/orders/{id}/cancel     - Cancel (owner)
//!
//! # Cart
//! GET    /api/cart                   - List items
//! PUT    /api/cart                   - Set quantity (<= 0 removes)
//! DELETE /api/cart/{product_id}      - Remove a product
//!
//! # Reviews
//! GET    /api/products/{id}/reviews  - List a product's reviews
//! POST   /api/reviews                - Create a review or a reply
//! DELETE /api/reviews/{id}           - Delete own review
//!
//! # Chat
//! GET    /api/chat/{user_id}         - Conversation with a user
//! POST   /api/chat/{user_id}         - Send a message
//! PUT    /api/chat/messages/{id}     - Edit own message
//! DELETE /api/chat/messages/{id}     - Delete own message
//!
//! # Social
//! GET    /api/favorites              - List favorites
//! POST   /api/favorites              - Add a favorite
//! DELETE /api/favorites/{product_id} - Remove a favorite
//! GET    /api/subscriptions          - List seller subscriptions
//! POST   /api/subscriptions          - Subscribe to a seller
//! DELETE /api/subscriptions/{seller_id} - Unsubscribe
//!
//! # Admin (ADMIN role only)
//! GET    /admin/authorize            - Is the caller an admin?
//! GET    /admin/users                - List all users
//! POST   /admin/users/{id}/block     - Block a user
//! POST   /admin/users/{id}/unblock   - Unblock a user
//! PUT    /admin/orders/{id}/status   - Force an order status transition
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod chat;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod social;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/password", put(auth::change_password))
        .route("/api/auth/verify-email", post(auth::verify_email))
        .route("/api/auth/slug", put(auth::set_slug))
        .route("/api/sellers/{slug}", get(auth::seller_profile))
        // Products
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/search", post(products::search))
        .route(
            "/api/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/products/{id}/discount", put(products::set_discount))
        .route(
            "/api/products/{id}/characteristics",
            put(products::set_characteristic),
        )
        .route("/api/products/{id}/stock", patch(products::change_stock))
        .route("/api/products/{id}/reviews", get(reviews::list_for_product))
        // Orders
        .route("/api/orders", post(orders::place).get(orders::list))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/confirm", post(orders::confirm))
        .route("/api/orders/{id}/cancel", post(orders::cancel))
        // Cart
        .route("/api/cart", get(cart::list).put(cart::set_quantity))
        .route("/api/cart/{product_id}", delete(cart::remove))
        // Reviews
        .route("/api/reviews", post(reviews::create))
        .route("/api/reviews/{id}", delete(reviews::remove))
        // Chat
        .route(
            "/api/chat/{user_id}",
            get(chat::conversation).post(chat::send),
        )
        .route(
            "/api/chat/messages/{id}",
            put(chat::edit).delete(chat::remove),
        )
        // Social
        .route(
            "/api/favorites",
            get(social::list_favorites).post(social::add_favorite),
        )
        .route("/api/favorites/{product_id}", delete(social::remove_favorite))
        .route(
            "/api/subscriptions",
            get(social::list_subscriptions).post(social::subscribe),
        )
        .route("/api/subscriptions/{seller_id}", delete(social::unsubscribe))
        // Admin
        .route("/admin/authorize", get(admin::authorize))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}/block", post(admin::block_user))
        .route("/admin/users/{id}/unblock", post(admin::unblock_user))
        .route("/admin/orders/{id}/status", put(admin::force_order_status))
}
