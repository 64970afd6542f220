//! Common transport-layer types.
//! These structs are what callers (CLI, admin tools, a future API layer)
//! serialize when they hand account data to the outside world.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Public representation of an account.
///
/// The password hash and the bio are deliberately not part of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRepresentation {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Creation time as unix seconds.
    pub created_at: i64,
}

impl fmt::Display for AccountRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'id': {}, 'first_name': '{}', 'last_name': '{}', 'email': '{}', 'created_at': {}",
            self.id, self.first_name, self.last_name, self.email, self.created_at
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AccountRepresentation {
        AccountRepresentation {
            id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            created_at: 1_732_140_000,
        }
    }

    #[test]
    fn test_serializes_only_public_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 5);
        assert_eq!(object["id"], 7);
        assert_eq!(object["email"], "ada@example.com");
        assert_eq!(object["created_at"], 1_732_140_000i64);
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("bio"));
    }

    #[test]
    fn test_display_matches_record_format() {
        assert_eq!(
            sample().to_string(),
            "'id': 7, 'first_name': 'Ada', 'last_name': 'Lovelace', 'email': 'ada@example.com', 'created_at': 1732140000"
        );
    }
}
