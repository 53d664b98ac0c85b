//! Fixtures shared by the integration tests

use serde_json::{json, Value};

/// One minimal valid document per catalog collection
pub fn valid_documents() -> Vec<(&'static str, Value)> {
    vec![
        (
            "users",
            json!({
                "_id": "U1",
                "username": "alice",
                "email": "a@x.com",
                "password": "hash",
                "role": "PASSENGER",
                "fullName": "Alice A",
                "createdAt": "2024-01-01T00:00:00Z"
            }),
        ),
        (
            "routes",
            json!({
                "_id": "r1",
                "routeId": "R1",
                "routeName": "Line 1",
                "transportType": "BUS",
                "startPoint": "A",
                "endPoint": "B",
                "isActive": true
            }),
        ),
        (
            "trips",
            json!({
                "_id": "t1",
                "tripId": "TR1",
                "routeId": "R1",
                "departureTime": "06:00",
                "arrivalTime": "07:00",
                "status": "SCHEDULED"
            }),
        ),
        (
            "tickets",
            json!({
                "_id": "k1",
                "ticketId": "T1",
                "userId": "U1",
                "ticketType": "SINGLE",
                "status": "CREATED",
                "price": "2.50"
            }),
        ),
        (
            "payments",
            json!({
                "_id": "p1",
                "paymentId": "P1",
                "userId": "U1",
                "ticketId": "T1",
                "amount": 2.5,
                "method": "CREDIT_CARD",
                "status": "PENDING"
            }),
        ),
        (
            "notifications",
            json!({
                "_id": "n1",
                "notificationId": "N1",
                "userId": "U1",
                "type": "TICKET_PURCHASED",
                "message": "Thanks",
                "channels": ["EMAIL", "PUSH"]
            }),
        ),
        (
            "service_disruptions",
            json!({
                "_id": "d1",
                "disruptionId": "D1",
                "title": "Signal failure",
                "severity": "HIGH",
                "status": "ACTIVE",
                "startTime": "2024-01-01T08:00:00Z"
            }),
        ),
        (
            "validations",
            json!({
                "_id": "v1",
                "validationId": "V1",
                "ticketId": "T1",
                "validatorId": "U9",
                "success": true,
                "validatedAt": "2024-01-01T08:05:00Z"
            }),
        ),
        (
            "analytics_reports",
            json!({
                "_id": "a1",
                "reportId": "A1",
                "reportType": "REVENUE",
                "period": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-02T00:00:00Z"},
                "metrics": {"total": 120.5},
                "generatedAt": "2024-01-02T00:10:00Z"
            }),
        ),
        (
            "system_logs",
            json!({
                "_id": "l1",
                "logId": "L1",
                "service": "TICKET_SERVICE",
                "level": "INFO",
                "message": "started",
                "timestamp": "2024-01-01T00:00:00Z"
            }),
        ),
    ]
}
