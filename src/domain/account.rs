use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account as reported by the identity provider
///
/// The provider owns this record. The relay only holds a request-scoped
/// copy long enough to echo it back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provider-issued token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of a successful signup or login
///
/// `session` is absent when the provider holds the account back for
/// e-mail confirmation.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub account: Account,
    pub session: Option<Session>,
}

/// Signup input forwarded to the provider
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Login input forwarded to the provider
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn account() -> Account {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Account {
            id: "user-123".to_string(),
            email: "a@b.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(account()).unwrap();

        assert_eq!(value["id"], "user-123");
        assert_eq!(value["firstName"], "Ada");
        assert_eq!(value["createdAt"], "2024-05-01T12:00:00Z");
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn omits_missing_names() {
        let value = serde_json::to_value(account()).unwrap();

        assert!(value.get("lastName").is_none());
        assert_eq!(
            value,
            json!({
                "id": "user-123",
                "email": "a@b.com",
                "firstName": "Ada",
                "createdAt": "2024-05-01T12:00:00Z",
                "updatedAt": "2024-05-01T12:00:00Z",
            })
        );
    }
}
