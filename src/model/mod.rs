//! Typed ticketing records
//!
//! Serde mirrors of the catalog collections. Field names serialize in
//! camelCase exactly as stored; absent optional fields are omitted rather
//! than written as null, since the schemas reject nulls.

mod identity;
mod operations;
mod reporting;
mod transit;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use identity::{NotificationPreferences, Role, User};
pub use operations::{
    Channel, DeliveryState, DeliveryStatus, DisruptionSeverity, DisruptionStatus,
    DisruptionUpdate, Notification, NotificationType, ServiceDisruption,
};
pub use reporting::{AnalyticsReport, LogLevel, LogService, ReportPeriod, ReportType, SystemLog};
pub use transit::{
    CurrentLocation, DelayInfo, Payment, PaymentMethod, PaymentStatus, Route, Stop, Ticket,
    TicketStatus, TicketType, TransportType, Trip, TripDetails, TripStatus, Validation,
    ValidationRecord, Weekday,
};

/// A record stored in one catalog collection
pub trait Entity: Serialize + DeserializeOwned {
    /// Collection name
    const COLLECTION: &'static str;
    /// Business key field other documents reference
    const KEY_FIELD: &'static str;

    /// Value of the business key
    fn key(&self) -> &str;
}

/// Declares a string enumeration stored in SCREAMING_SNAKE_CASE.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every stored value, in declaration order
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} '{}'", stringify!($name), other)),
                }
            }
        }
    };
}

pub(crate) use string_enum;
