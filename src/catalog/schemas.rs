//! Canonical collection schemas
//!
//! Each schema is the superset of the shapes the platform's services write.

use std::collections::BTreeMap;

use crate::model::{
    Channel, DeliveryState, DisruptionSeverity, DisruptionStatus, LogLevel, LogService,
    NotificationType, PaymentMethod, PaymentStatus, ReportType, Role, TicketStatus, TicketType,
    TransportType, TripStatus, Weekday,
};
use crate::schema::{FieldDef, FieldType, Schema};

pub const SCHEMA_VERSION: &str = "v1";

/// Loose `local@domain.tld` shape
pub const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn fields(entries: Vec<(&str, FieldDef)>) -> BTreeMap<String, FieldDef> {
    entries
        .into_iter()
        .map(|(name, def)| (name.to_string(), def))
        .collect()
}

fn schema(entity_type: &str, description: &str, entries: Vec<(&str, FieldDef)>) -> Schema {
    Schema::new(entity_type, SCHEMA_VERSION, fields(entries)).with_description(description)
}

pub fn users() -> Schema {
    schema(
        "users",
        "Platform accounts",
        vec![
            ("_id", FieldDef::required_string()),
            ("username", FieldDef::required_string()),
            ("email", FieldDef::required_string().with_pattern(EMAIL_PATTERN)),
            ("password", FieldDef::required_string()),
            ("role", FieldDef::required_enum(Role::VALUES)),
            ("fullName", FieldDef::required_string()),
            ("phoneNumber", FieldDef::optional_string()),
            ("accountBalance", FieldDef::optional_decimal()),
            (
                "notifications",
                FieldDef::optional_object(fields(vec![
                    ("email", FieldDef::optional_bool()),
                    ("sms", FieldDef::optional_bool()),
                    ("push", FieldDef::optional_bool()),
                ])),
            ),
            ("createdAt", FieldDef::required_date()),
            ("updatedAt", FieldDef::optional_date()),
        ],
    )
}

pub fn routes() -> Schema {
    let stop = FieldDef::required_object(fields(vec![
        ("stopId", FieldDef::required_string()),
        ("stopName", FieldDef::required_string()),
        ("sequence", FieldDef::optional_int()),
        ("arrivalTime", FieldDef::optional_string()),
        ("departureTime", FieldDef::optional_string()),
    ]));

    schema(
        "routes",
        "Transit routes and their stops",
        vec![
            ("_id", FieldDef::required_string()),
            ("routeId", FieldDef::required_string()),
            ("routeName", FieldDef::required_string()),
            ("transportType", FieldDef::required_enum(TransportType::VALUES)),
            ("startPoint", FieldDef::required_string()),
            ("endPoint", FieldDef::required_string()),
            ("intermediateStops", FieldDef::optional_array(stop)),
            ("isActive", FieldDef::required_bool()),
            ("createdAt", FieldDef::optional_date()),
            ("updatedAt", FieldDef::optional_date()),
        ],
    )
}

pub fn trips() -> Schema {
    schema(
        "trips",
        "Scheduled services on a route",
        vec![
            ("_id", FieldDef::required_string()),
            ("tripId", FieldDef::required_string()),
            ("routeId", FieldDef::required_string()),
            ("departureTime", FieldDef::required_string()),
            ("arrivalTime", FieldDef::required_string()),
            ("days", FieldDef::optional_array(FieldDef::required_enum(Weekday::VALUES))),
            ("status", FieldDef::required_enum(TripStatus::VALUES)),
            ("capacity", FieldDef::optional_int()),
            ("availableSeats", FieldDef::optional_int()),
            ("currentOccupancy", FieldDef::optional_int()),
            (
                "currentLocation",
                FieldDef::optional_object(fields(vec![
                    ("latitude", FieldDef::required_number()),
                    ("longitude", FieldDef::required_number()),
                    ("updatedAt", FieldDef::optional_date()),
                ])),
            ),
            (
                "delayInfo",
                FieldDef::optional_object(fields(vec![
                    ("delayMinutes", FieldDef::required_int()),
                    ("reason", FieldDef::optional_string()),
                    ("reportedAt", FieldDef::optional_date()),
                ])),
            ),
            ("createdAt", FieldDef::optional_date()),
            ("updatedAt", FieldDef::optional_date()),
        ],
    )
}

pub fn tickets() -> Schema {
    let validation_entry = FieldDef::required_object(fields(vec![
        ("validationId", FieldDef::required_string()),
        ("validatedAt", FieldDef::required_date()),
        ("validatorId", FieldDef::optional_string()),
        ("location", FieldDef::optional_string()),
        ("success", FieldDef::optional_bool()),
    ]));

    schema(
        "tickets",
        "Purchased tickets and passes",
        vec![
            ("_id", FieldDef::required_string()),
            ("ticketId", FieldDef::required_string()),
            ("userId", FieldDef::required_string()),
            ("ticketType", FieldDef::required_enum(TicketType::VALUES)),
            ("status", FieldDef::required_enum(TicketStatus::VALUES)),
            ("price", FieldDef::required_decimal()),
            ("routeId", FieldDef::optional_string()),
            ("tripId", FieldDef::optional_string()),
            ("purchaseDate", FieldDef::optional_date()),
            ("validFrom", FieldDef::optional_date()),
            ("validUntil", FieldDef::optional_date()),
            (
                "tripDetails",
                FieldDef::optional_object(fields(vec![
                    ("tripId", FieldDef::optional_string()),
                    ("routeId", FieldDef::optional_string()),
                    ("boardingStop", FieldDef::optional_string()),
                    ("destinationStop", FieldDef::optional_string()),
                ])),
            ),
            ("qrCode", FieldDef::optional_string()),
            ("ridesRemaining", FieldDef::optional_int()),
            ("validationHistory", FieldDef::optional_array(validation_entry)),
            ("createdAt", FieldDef::optional_date()),
            ("updatedAt", FieldDef::optional_date()),
        ],
    )
}

pub fn payments() -> Schema {
    schema(
        "payments",
        "Ticket payments",
        vec![
            ("_id", FieldDef::required_string()),
            ("paymentId", FieldDef::required_string()),
            ("userId", FieldDef::required_string()),
            ("ticketId", FieldDef::required_string()),
            ("amount", FieldDef::required_decimal()),
            ("method", FieldDef::required_enum(PaymentMethod::VALUES)),
            ("status", FieldDef::required_enum(PaymentStatus::VALUES)),
            ("currency", FieldDef::optional_string()),
            ("timestamp", FieldDef::optional_date()),
            ("transactionReference", FieldDef::optional_string()),
            ("failureReason", FieldDef::optional_string()),
            ("updatedAt", FieldDef::optional_date()),
        ],
    )
}

pub fn notifications() -> Schema {
    schema(
        "notifications",
        "Messages sent to users",
        vec![
            ("_id", FieldDef::required_string()),
            ("notificationId", FieldDef::required_string()),
            ("userId", FieldDef::required_string()),
            ("type", FieldDef::required_enum(NotificationType::VALUES)),
            ("title", FieldDef::optional_string()),
            ("message", FieldDef::required_string()),
            ("channels", FieldDef::required_array(FieldDef::required_enum(Channel::VALUES))),
            (
                "deliveryStatus",
                FieldDef::optional_object(fields(vec![
                    ("email", FieldDef::optional_enum(DeliveryState::VALUES)),
                    ("sms", FieldDef::optional_enum(DeliveryState::VALUES)),
                    ("push", FieldDef::optional_enum(DeliveryState::VALUES)),
                ])),
            ),
            ("read", FieldDef::optional_bool()),
            ("createdAt", FieldDef::optional_date()),
        ],
    )
}

pub fn service_disruptions() -> Schema {
    let update = FieldDef::required_object(fields(vec![
        ("timestamp", FieldDef::required_date()),
        ("message", FieldDef::required_string()),
        ("status", FieldDef::optional_enum(DisruptionStatus::VALUES)),
    ]));

    schema(
        "service_disruptions",
        "Service disruptions affecting routes or trips",
        vec![
            ("_id", FieldDef::required_string()),
            ("disruptionId", FieldDef::required_string()),
            ("title", FieldDef::required_string()),
            ("severity", FieldDef::required_enum(DisruptionSeverity::VALUES)),
            ("status", FieldDef::required_enum(DisruptionStatus::VALUES)),
            ("startTime", FieldDef::required_date()),
            ("routeId", FieldDef::optional_string()),
            ("tripId", FieldDef::optional_string()),
            ("description", FieldDef::optional_string()),
            ("endTime", FieldDef::optional_date()),
            ("updates", FieldDef::optional_array(update)),
            ("createdAt", FieldDef::optional_date()),
        ],
    )
}

pub fn validations() -> Schema {
    schema(
        "validations",
        "Ticket checks performed by validators",
        vec![
            ("_id", FieldDef::required_string()),
            ("validationId", FieldDef::required_string()),
            ("ticketId", FieldDef::required_string()),
            ("validatorId", FieldDef::required_string()),
            ("success", FieldDef::required_bool()),
            ("validatedAt", FieldDef::required_date()),
            ("location", FieldDef::optional_string()),
            ("tripId", FieldDef::optional_string()),
            ("ridesRemainingAfter", FieldDef::optional_int()),
            ("failureReason", FieldDef::optional_string()),
        ],
    )
}

pub fn analytics_reports() -> Schema {
    schema(
        "analytics_reports",
        "Generated analytics reports",
        vec![
            ("_id", FieldDef::required_string()),
            ("reportId", FieldDef::required_string()),
            ("reportType", FieldDef::required_enum(ReportType::VALUES)),
            (
                "period",
                FieldDef::required_object(fields(vec![
                    ("from", FieldDef::required_date()),
                    ("to", FieldDef::required_date()),
                ])),
            ),
            (
                "metrics",
                FieldDef::required(FieldType::map_of(FieldDef::required_number())),
            ),
            ("generatedAt", FieldDef::required_date()),
        ],
    )
}

pub fn system_logs() -> Schema {
    schema(
        "system_logs",
        "Service log lines",
        vec![
            ("_id", FieldDef::required_string()),
            ("logId", FieldDef::required_string()),
            ("service", FieldDef::required_enum(LogService::VALUES)),
            ("level", FieldDef::required_enum(LogLevel::VALUES)),
            ("message", FieldDef::required_string()),
            ("timestamp", FieldDef::required_date()),
            (
                "context",
                FieldDef::optional(FieldType::map_of(FieldDef::required_string())),
            ),
        ],
    )
}

/// Every catalog schema, in collection order
pub fn all() -> Vec<Schema> {
    vec![
        users(),
        routes(),
        trips(),
        tickets(),
        payments(),
        notifications(),
        service_disruptions(),
        validations(),
        analytics_reports(),
        system_logs(),
    ]
}
