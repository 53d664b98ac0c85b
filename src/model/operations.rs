use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{string_enum, Entity, Route, Trip, User};
use crate::reference::SoftRef;

string_enum!(
    NotificationType {
        TicketPurchased => "TICKET_PURCHASED",
        PaymentConfirmed => "PAYMENT_CONFIRMED",
        PaymentFailed => "PAYMENT_FAILED",
        TripDelayed => "TRIP_DELAYED",
        TripCancelled => "TRIP_CANCELLED",
        ServiceDisruption => "SERVICE_DISRUPTION",
        TicketExpiring => "TICKET_EXPIRING",
    }
);

string_enum!(
    Channel {
        Email => "EMAIL",
        Sms => "SMS",
        Push => "PUSH",
    }
);

string_enum!(
    /// Delivery state of one channel
    DeliveryState {
        Pending => "PENDING",
        Sent => "SENT",
        Failed => "FAILED",
    }
);

string_enum!(
    DisruptionSeverity {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Critical => "CRITICAL",
    }
);

string_enum!(
    /// Disruption lifecycle state
    DisruptionStatus {
        Active => "ACTIVE",
        Monitoring => "MONITORING",
        Resolved => "RESOLVED",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<DeliveryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<DeliveryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<DeliveryState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    pub notification_id: String,
    pub user_id: SoftRef<User>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    pub channels: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Notification {
    const COLLECTION: &'static str = "notifications";
    const KEY_FIELD: &'static str = "notificationId";

    fn key(&self) -> &str {
        &self.notification_id
    }
}

/// Entry of a disruption's append-only update log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptionUpdate {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DisruptionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDisruption {
    #[serde(rename = "_id")]
    pub id: String,
    pub disruption_id: String,
    pub title: String,
    pub severity: DisruptionSeverity,
    pub status: DisruptionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<SoftRef<Route>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<SoftRef<Trip>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<DisruptionUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for ServiceDisruption {
    const COLLECTION: &'static str = "service_disruptions";
    const KEY_FIELD: &'static str = "disruptionId";

    fn key(&self) -> &str {
        &self.disruption_id
    }
}
