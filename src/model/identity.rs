use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{string_enum, Entity};

string_enum!(
    /// Account role
    Role {
        Passenger => "PASSENGER",
        Admin => "ADMIN",
        Validator => "VALIDATOR",
    }
);

/// Per-channel notification opt-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,
}

/// Platform account. Keyed by `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    /// Stored credential hash; never interpreted here
    pub password: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationPreferences>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const KEY_FIELD: &'static str = "_id";

    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_wire_shape() {
        let user = User {
            id: "U1".into(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "hash".into(),
            role: Role::Passenger,
            full_name: "Alice".into(),
            phone_number: None,
            account_balance: Some(Decimal::new(1050, 2)),
            notifications: None,
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            updated_at: None,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["_id"], json!("U1"));
        assert_eq!(value["fullName"], json!("Alice"));
        assert_eq!(value["accountBalance"], json!("10.50"));
        assert!(value.get("phoneNumber").is_none());
    }
}
