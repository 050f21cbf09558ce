//! Identity types shared between the client and the store server.

use serde::{Deserialize, Serialize};

use crate::task::UserKey;

/// A resolved identity, returned by a successful credential exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable key identifying the user's collection in the store.
    pub user_key: UserKey,
    /// Human-readable display name.
    pub display_name: String,
    /// URL of the user's avatar image.
    pub avatar_url: String,
}
