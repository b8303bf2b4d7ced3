//! Session key constants.

/// Keys used to store values in the tower-sessions session.
pub mod session_keys {
    /// The signed-in user (`CurrentUser`).
    pub const CURRENT_USER: &str = "current_user";

    /// Anonymous basket ID (`BasketId`), cleared once merged on login.
    pub const BASKET_ID: &str = "basket_id";
}
