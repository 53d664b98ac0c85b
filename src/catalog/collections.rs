//! Write rules of the catalog collections

use super::lifecycles;
use crate::store::CollectionDef;

pub fn users() -> CollectionDef {
    CollectionDef::new("users", "_id")
        .unique(&["username"])
        .unique(&["email"])
        .lookup(&["role"])
}

pub fn routes() -> CollectionDef {
    CollectionDef::new("routes", "routeId")
        .unique(&["routeId"])
        .lookup(&["transportType"])
        .lookup(&["isActive"])
        .lookup(&["isActive", "transportType"])
}

pub fn trips() -> CollectionDef {
    CollectionDef::new("trips", "tripId")
        .unique(&["tripId"])
        .lookup(&["routeId"])
        .lookup(&["routeId", "days"])
        .lookup(&["status"])
        .lifecycle(lifecycles::trip())
        .reference("routeId", "routes")
}

pub fn tickets(direct_payment: bool) -> CollectionDef {
    CollectionDef::new("tickets", "ticketId")
        .unique(&["ticketId"])
        .lookup(&["userId"])
        .lookup(&["status"])
        .lookup(&["status", "validUntil"])
        .lookup(&["validFrom", "validUntil"])
        .lookup(&["tripId"])
        .lifecycle(lifecycles::ticket(direct_payment))
        .reference("userId", "users")
        .reference("routeId", "routes")
        .reference("tripId", "trips")
        .reference("tripDetails.tripId", "trips")
        .reference("tripDetails.routeId", "routes")
        .append_only("validationHistory")
        .identity(&["userId"])
}

pub fn payments() -> CollectionDef {
    CollectionDef::new("payments", "paymentId")
        .unique(&["paymentId"])
        .lookup(&["ticketId"])
        .lookup(&["userId"])
        .lookup(&["status", "timestamp"])
        .lifecycle(lifecycles::payment())
        .reference("userId", "users")
        .reference("ticketId", "tickets")
        .identity(&["userId", "ticketId"])
}

pub fn notifications() -> CollectionDef {
    CollectionDef::new("notifications", "notificationId")
        .unique(&["notificationId"])
        .lookup(&["userId"])
        .lookup(&["userId", "createdAt"])
        .reference("userId", "users")
        .identity(&["userId"])
}

pub fn service_disruptions() -> CollectionDef {
    CollectionDef::new("service_disruptions", "disruptionId")
        .unique(&["disruptionId"])
        .lookup(&["status"])
        .lookup(&["routeId", "status"])
        .lifecycle(lifecycles::service_disruption())
        .reference("routeId", "routes")
        .reference("tripId", "trips")
        .append_only("updates")
}

pub fn validations() -> CollectionDef {
    CollectionDef::new("validations", "validationId")
        .unique(&["validationId"])
        .lookup(&["ticketId"])
        .lookup(&["validatorId"])
        .reference("ticketId", "tickets")
        .reference("validatorId", "users")
        .reference("tripId", "trips")
        .immutable()
}

pub fn analytics_reports() -> CollectionDef {
    CollectionDef::new("analytics_reports", "reportId")
        .unique(&["reportId"])
        .lookup(&["reportType"])
        .immutable()
}

pub fn system_logs() -> CollectionDef {
    CollectionDef::new("system_logs", "logId")
        .unique(&["logId"])
        .lookup(&["service", "level"])
        .lookup(&["timestamp"])
        .immutable()
}

/// Every catalog collection, in the order of the catalog schemas
pub fn all(direct_payment: bool) -> Vec<CollectionDef> {
    vec![
        users(),
        routes(),
        trips(),
        tickets(direct_payment),
        payments(),
        notifications(),
        service_disruptions(),
        validations(),
        analytics_reports(),
        system_logs(),
    ]
}
