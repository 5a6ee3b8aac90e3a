//! Session-related types.

use serde::{Deserialize, Serialize};

use corner_shop_core::UserId;

/// The signed-in user's public identity.
///
/// Persisted under [`keys::SESSION`](crate::storage::keys::SESSION) so a
/// restart picks it back up. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}
