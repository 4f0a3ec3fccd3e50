use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account role. Stored in the `user_role` Postgres enum and carried inside
/// the bearer token, so role checks never hit the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    CareerCounselor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::CareerCounselor => "career_counselor",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload. Validity is determined purely by signature and `exp`; there
/// is no server-side session state behind these tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // user ID
    pub email: String,
    pub role: Role,
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::CareerCounselor).unwrap(),
            "\"career_counselor\""
        );
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
    }

    #[test]
    fn roles_deserialize_snake_case() {
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
        assert!(serde_json::from_str::<Role>("\"professor\"").is_err());
    }

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(Role::CareerCounselor.to_string(), "career_counselor");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
