//! User directory types.
//!
//! The directory is a dummy account store: credentials are kept and compared
//! in cleartext. Any real deployment must replace [`Credential`] with a
//! salted password hash before storing anything a user cares about.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use corner_shop_core::UserId;

use super::Session;

/// A directory entry created at signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique and compared case-sensitively.
    pub email: String,
    /// Login secret.
    #[serde(rename = "password")]
    pub credential: Credential,
    /// When the account was created. Older records without it read as the epoch.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a record with a freshly generated ID.
    #[must_use]
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            id: UserId::generate(),
            name: name.to_owned(),
            email: email.to_owned(),
            credential: Credential::from(password),
            created_at: Utc::now(),
        }
    }

    /// Whether `email` and `password` both match exactly.
    #[must_use]
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.credential.matches(password)
    }

    /// The public fields of this user, without the credential.
    #[must_use]
    pub fn to_session(&self) -> Session {
        Session {
            user_id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// An opaque login secret.
///
/// Redacted from `Debug` output; serialized as the plain string so existing
/// `users` entries keep working. Needs salted hashing before real use.
#[derive(Debug, Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Exact string equality against a submitted password.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.expose_secret() == candidate
    }
}

impl From<&str> for Credential {
    fn from(secret: &str) -> Self {
        Self(SecretString::from(secret))
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Self(SecretString::from(secret))
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_is_exact_and_case_sensitive() {
        let user = UserRecord::new("A", "a@x.com", "secret1");
        assert!(user.matches("a@x.com", "secret1"));
        assert!(!user.matches("A@x.com", "secret1"));
        assert!(!user.matches("a@x.com", "Secret1"));
        assert!(!user.matches("a@x.com", "secret1 "));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let user = UserRecord::new("A", "a@x.com", "hunter22");
        let debug = format!("{user:?}");
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_persisted_layout() {
        let user = UserRecord::new("A", "a@x.com", "secret1");
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["name"], "A");
        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["password"], "secret1");
        assert!(value["id"].as_str().unwrap().starts_with("user_"));
    }

    #[test]
    fn test_reads_records_without_created_at() {
        let json = r#"{"id":"user_1700000000000","name":"B","email":"b@x.com","password":"pw1234"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_str(), "user_1700000000000");
        assert!(user.matches("b@x.com", "pw1234"));
        assert_eq!(user.created_at, DateTime::<Utc>::default());
    }

    #[test]
    fn test_to_session_drops_credential() {
        let user = UserRecord::new("A", "a@x.com", "secret1");
        let session = user.to_session();
        assert_eq!(session.user_id, user.id);
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret1"));
    }
}
