//! Sample data: the Airport Express train and its daily trip

use chrono::{TimeZone, Utc};

use crate::model::{Route, Stop, TransportType, Trip, TripStatus, Weekday};

pub const SAMPLE_ROUTE_ID: &str = "ROUTE_SAMPLE_001";
pub const SAMPLE_TRIP_ID: &str = "TRIP_SAMPLE_001";

pub fn sample_route() -> Route {
    let stops = [
        ("STOP_001", "Central Station"),
        ("STOP_002", "Airport Terminal 1"),
        ("STOP_003", "Airport Terminal 2"),
    ];

    Route {
        id: SAMPLE_ROUTE_ID.to_string(),
        route_id: SAMPLE_ROUTE_ID.to_string(),
        route_name: "Airport Express".to_string(),
        transport_type: TransportType::Train,
        start_point: "Central Station".to_string(),
        end_point: "Airport Terminal 2".to_string(),
        intermediate_stops: stops
            .iter()
            .zip(1..)
            .map(|((stop_id, name), sequence)| Stop {
                stop_id: stop_id.to_string(),
                stop_name: name.to_string(),
                sequence: Some(sequence),
                arrival_time: None,
                departure_time: None,
            })
            .collect(),
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
        updated_at: None,
    }
}

pub fn sample_trip() -> Trip {
    Trip {
        id: SAMPLE_TRIP_ID.to_string(),
        trip_id: SAMPLE_TRIP_ID.to_string(),
        route_id: SAMPLE_ROUTE_ID.into(),
        departure_time: "06:00".to_string(),
        arrival_time: "06:45".to_string(),
        days: vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
        status: TripStatus::Scheduled,
        capacity: Some(200),
        available_seats: Some(200),
        current_occupancy: Some(0),
        current_location: None,
        delay_info: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
        updated_at: None,
    }
}
