//! Basket domain types.

use ivylane_core::{BasketId, UserId};

use super::product::ProductCard;

/// A basket row.
///
/// `user_id` is `None` for anonymous baskets, which are keyed through the
/// session until merge-on-login re-parents their items.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct Basket {
    pub id: BasketId,
    pub user_id: Option<UserId>,
}

impl Basket {
    /// Whether this basket belongs to a signed-in user.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        self.user_id.is_some()
    }
}

/// A basket line: a product card plus the quantity in the basket.
#[derive(Debug, Clone)]
pub struct BasketLine {
    pub product: ProductCard,
    pub count: i32,
}
