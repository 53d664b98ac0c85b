use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{string_enum, Entity, User};
use crate::reference::SoftRef;

string_enum!(
    TransportType {
        Bus => "BUS",
        Train => "TRAIN",
    }
);

string_enum!(
    /// Trip lifecycle state
    TripStatus {
        Scheduled => "SCHEDULED",
        Delayed => "DELAYED",
        Cancelled => "CANCELLED",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
    }
);

string_enum!(
    Weekday {
        Mon => "MON",
        Tue => "TUE",
        Wed => "WED",
        Thu => "THU",
        Fri => "FRI",
        Sat => "SAT",
        Sun => "SUN",
    }
);

string_enum!(
    TicketType {
        Single => "SINGLE",
        Return => "RETURN",
        DayPass => "DAY_PASS",
        WeekPass => "WEEK_PASS",
        MonthPass => "MONTH_PASS",
    }
);

string_enum!(
    /// Ticket lifecycle state
    TicketStatus {
        Created => "CREATED",
        PendingPayment => "PENDING_PAYMENT",
        Paid => "PAID",
        Validated => "VALIDATED",
        Expired => "EXPIRED",
        Cancelled => "CANCELLED",
    }
);

string_enum!(
    PaymentMethod {
        CreditCard => "CREDIT_CARD",
        DebitCard => "DEBIT_CARD",
        MobileMoney => "MOBILE_MONEY",
        AccountBalance => "ACCOUNT_BALANCE",
    }
);

string_enum!(
    /// Payment lifecycle state
    PaymentStatus {
        Pending => "PENDING",
        Success => "SUCCESS",
        Failed => "FAILED",
        Refunded => "REFUNDED",
    }
);

/// Stop along a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(rename = "_id")]
    pub id: String,
    pub route_id: String,
    pub route_name: String,
    pub transport_type: TransportType,
    pub start_point: String,
    pub end_point: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediate_stops: Vec<Stop>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Route {
    const COLLECTION: &'static str = "routes";
    const KEY_FIELD: &'static str = "routeId";

    fn key(&self) -> &str {
        &self.route_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayInfo {
    pub delay_minutes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<DateTime<Utc>>,
}

/// Scheduled service on a route. Departure and arrival are local
/// time-of-day strings such as `06:45`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(rename = "_id")]
    pub id: String,
    pub trip_id: String,
    pub route_id: SoftRef<Route>,
    pub departure_time: String,
    pub arrival_time: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<Weekday>,
    pub status: TripStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_seats: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_occupancy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<CurrentLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_info: Option<DelayInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Trip {
    const COLLECTION: &'static str = "trips";
    const KEY_FIELD: &'static str = "tripId";

    fn key(&self) -> &str {
        &self.trip_id
    }
}

/// Denormalized trip context carried on a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<SoftRef<Trip>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<SoftRef<Route>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boarding_stop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_stop: Option<String>,
}

/// Entry of a ticket's append-only validation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRecord {
    pub validation_id: String,
    pub validated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_id: Option<SoftRef<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: String,
    pub ticket_id: String,
    pub user_id: SoftRef<User>,
    pub ticket_type: TicketType,
    pub status: TicketStatus,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<SoftRef<Route>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<SoftRef<Trip>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_details: Option<TripDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rides_remaining: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_history: Vec<ValidationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Ticket {
    const COLLECTION: &'static str = "tickets";
    const KEY_FIELD: &'static str = "ticketId";

    fn key(&self) -> &str {
        &self.ticket_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub payment_id: String,
    pub user_id: SoftRef<User>,
    pub ticket_id: SoftRef<Ticket>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Payment {
    const COLLECTION: &'static str = "payments";
    const KEY_FIELD: &'static str = "paymentId";

    fn key(&self) -> &str {
        &self.payment_id
    }
}

/// Record of one ticket check. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(rename = "_id")]
    pub id: String,
    pub validation_id: String,
    pub ticket_id: SoftRef<Ticket>,
    pub validator_id: SoftRef<User>,
    pub success: bool,
    pub validated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<SoftRef<Trip>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rides_remaining_after: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Entity for Validation {
    const COLLECTION: &'static str = "validations";
    const KEY_FIELD: &'static str = "validationId";

    fn key(&self) -> &str {
        &self.validation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticket_reads_stored_document() {
        let ticket: Ticket = serde_json::from_value(json!({
            "_id": "a1",
            "ticketId": "T1",
            "userId": "U1",
            "ticketType": "SINGLE",
            "status": "CREATED",
            "price": "2.50",
            "tripDetails": {"tripId": "TRIP_SAMPLE_001"}
        }))
        .unwrap();

        assert_eq!(ticket.user_id.key(), "U1");
        assert_eq!(ticket.status, TicketStatus::Created);
        assert_eq!(ticket.price, Decimal::new(250, 2));
        assert!(ticket.validation_history.is_empty());
        assert_eq!(
            ticket.trip_details.and_then(|d| d.trip_id).map(|t| t.key().to_string()),
            Some("TRIP_SAMPLE_001".to_string())
        );
    }

    #[test]
    fn test_trip_omits_absent_fields() {
        let trip = Trip {
            id: "t1".into(),
            trip_id: "TRIP_1".into(),
            route_id: "R1".into(),
            departure_time: "06:00".into(),
            arrival_time: "06:45".into(),
            days: vec![Weekday::Mon, Weekday::Fri],
            status: TripStatus::Scheduled,
            capacity: Some(200),
            available_seats: None,
            current_occupancy: None,
            current_location: None,
            delay_info: None,
            created_at: None,
            updated_at: None,
        };

        let value = serde_json::to_value(&trip).unwrap();
        assert_eq!(value["days"], json!(["MON", "FRI"]));
        assert_eq!(value["routeId"], json!("R1"));
        assert!(value.get("delayInfo").is_none());
    }
}
