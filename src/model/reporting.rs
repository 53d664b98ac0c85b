use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{string_enum, Entity};

string_enum!(
    ReportType {
        DailySales => "DAILY_SALES",
        RouteUsage => "ROUTE_USAGE",
        Revenue => "REVENUE",
        PassengerTraffic => "PASSENGER_TRAFFIC",
        DisruptionSummary => "DISRUPTION_SUMMARY",
    }
);

string_enum!(
    /// Emitting service of a system log line
    LogService {
        UserService => "USER_SERVICE",
        RouteService => "ROUTE_SERVICE",
        TripService => "TRIP_SERVICE",
        TicketService => "TICKET_SERVICE",
        PaymentService => "PAYMENT_SERVICE",
        NotificationService => "NOTIFICATION_SERVICE",
        ValidationService => "VALIDATION_SERVICE",
        AdminService => "ADMIN_SERVICE",
        ApiGateway => "API_GATEWAY",
    }
);

string_enum!(
    LogLevel {
        Debug => "DEBUG",
        Info => "INFO",
        Warn => "WARN",
        Error => "ERROR",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[serde(rename = "_id")]
    pub id: String,
    pub report_id: String,
    pub report_type: ReportType,
    pub period: ReportPeriod,
    pub metrics: BTreeMap<String, f64>,
    pub generated_at: DateTime<Utc>,
}

impl Entity for AnalyticsReport {
    const COLLECTION: &'static str = "analytics_reports";
    const KEY_FIELD: &'static str = "reportId";

    fn key(&self) -> &str {
        &self.report_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    #[serde(rename = "_id")]
    pub id: String,
    pub log_id: String,
    pub service: LogService,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl Entity for SystemLog {
    const COLLECTION: &'static str = "system_logs";
    const KEY_FIELD: &'static str = "logId";

    fn key(&self) -> &str {
        &self.log_id
    }
}
