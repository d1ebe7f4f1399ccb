//! Identity claims carried inside a signed token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access role.
///
/// On the wire and in storage a role is its string projection
/// (`"User"` / `"Admin"`). Any other string decodes to [`Role::User`]:
/// an unreadable role demotes the caller instead of rejecting the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }

    /// Decode a role string. Unknown values fall back to `User`.
    pub fn from_role_str(s: &str) -> Self {
        match s {
            "Admin" => Role::Admin,
            "User" => Role::User,
            other => {
                tracing::debug!("Unknown role string '{}', defaulting to User", other);
                Role::User
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::from_role_str(&s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Who a token was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

/// Token payload: registered `sub`/`exp`/`iat` plus the custom
/// `Username`, `ID` and `Role` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (username)
    pub sub: String,
    /// Expiration time (UTC timestamp, seconds)
    pub exp: i64,
    /// Issued at (UTC timestamp, seconds)
    #[serde(default)]
    pub iat: i64,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "ID")]
    pub id: i32,
    #[serde(rename = "Role", default)]
    pub role: Role,
}

impl IdentityClaims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_projection() {
        assert_eq!(Role::User.as_str(), "User");
        assert_eq!(Role::Admin.as_str(), "Admin");
        assert_eq!(Role::from_role_str("Admin"), Role::Admin);
        assert_eq!(Role::from_role_str("User"), Role::User);
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        assert_eq!(Role::from_role_str(""), Role::User);
        assert_eq!(Role::from_role_str("admin"), Role::User);
        assert_eq!(Role::from_role_str("Adm"), Role::User);
        assert_eq!(Role::from_role_str("Root"), Role::User);
    }

    #[test]
    fn test_claims_json_field_names() {
        let claims = IdentityClaims {
            sub: "alice".to_string(),
            exp: 1_700_000_300,
            iat: 1_700_000_000,
            username: "alice".to_string(),
            id: 5,
            role: Role::Admin,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], "alice");
        assert_eq!(json["Username"], "alice");
        assert_eq!(json["ID"], 5);
        assert_eq!(json["Role"], "Admin");

        let back: IdentityClaims = serde_json::from_value(json).unwrap();
        assert_eq!(back, claims);
    }

    #[test]
    fn test_claims_unknown_role_deserializes_as_user() {
        let json = serde_json::json!({
            "sub": "bob", "exp": 1, "iat": 0, "Username": "bob", "ID": 7, "Role": "Superuser"
        });
        let claims: IdentityClaims = serde_json::from_value(json).unwrap();
        assert_eq!(claims.role, Role::User);
    }
}
