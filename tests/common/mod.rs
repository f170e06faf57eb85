//! Shared helpers for integration and property tests
#![allow(dead_code)]

use std::sync::Arc;

use device_registry::repo::MemoryDeviceRepository;
use device_registry::{build_router, AppState, FixedIdGenerator};
use axum::http::HeaderValue;

pub const DEVICE_ID_1: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const DEVICE_ID_2: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
pub const DEVICE_ID_3: &str = "16fd2706-8baf-433b-82eb-8c7fada847da";

/// Spin up the HTTP server on an OS-assigned port, returning the base URL
///
/// Devices are kept in memory and receive ids from `DEVICE_ID_1..3` in order.
pub async fn spawn_test_server() -> String {
    let ids = Arc::new(FixedIdGenerator::from_strings(&[
        DEVICE_ID_1,
        DEVICE_ID_2,
        DEVICE_ID_3,
    ]));
    let state = AppState::new(
        Arc::new(MemoryDeviceRepository::new(ids)),
        HeaderValue::from_static("*"),
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

pub mod generators {
    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    /// Generate a valid MAC address in any accepted separator and case
    pub fn mac_address() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(any::<u8>(), 6),
            prop_oneof![Just(':'), Just('-')],
            any::<bool>(),
        )
            .prop_map(|(bytes, separator, upper)| {
                bytes
                    .iter()
                    .map(|b| {
                        if upper {
                            format!("{:02X}", b)
                        } else {
                            format!("{:02x}", b)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(&separator.to_string())
            })
    }

    /// Generate an invalid MAC address (wrong format)
    pub fn invalid_mac_address() -> impl Strategy<Value = String> {
        prop_oneof![
            // Too short
            Just("AA:BB:CC:DD:EE".to_string()),
            // Too long
            Just("AA:BB:CC:DD:EE:FF:00".to_string()),
            // Wrong separator
            Just("AA.BB.CC.DD.EE.FF".to_string()),
            // Invalid characters
            Just("GG:HH:II:JJ:KK:LL".to_string()),
            // Missing separators
            Just("AABBCCDDEEFF".to_string()),
            // Single hex digit groups
            Just("A:B:C:D:E:F".to_string()),
            // Trailing garbage
            Just("AA:BB:CC:DD:EE:FF ".to_string()),
            // Empty
            Just("".to_string()),
        ]
    }

    pub fn device_status() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just("active"),
            Just("inactive"),
            Just("maintenance"),
            Just("error"),
            Just("offline"),
        ]
    }

    pub fn device_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 _-]{0,31}"
    }

    /// Optional `location` object; never empty when present
    pub fn location() -> impl Strategy<Value = Option<Value>> {
        (
            proptest::option::of("[A-Za-z0-9 ]{1,16}"),
            proptest::option::of("[A-Za-z0-9 ]{1,16}"),
        )
            .prop_map(|(room, building)| {
                let mut location = Map::new();
                if let Some(room) = room {
                    location.insert("room".to_string(), json!(room));
                }
                if let Some(building) = building {
                    location.insert("building".to_string(), json!(building));
                }
                if location.is_empty() {
                    None
                } else {
                    Some(Value::Object(location))
                }
            })
    }

    fn common_fields() -> impl Strategy<Value = Map<String, Value>> {
        (
            device_name(),
            mac_address(),
            device_status(),
            proptest::option::of(0.0f64..=100.0),
            proptest::option::of(-120.0f64..=0.0),
            location(),
        )
            .prop_map(
                |(name, mac, status, battery, signal, location)| {
                    let mut fields = Map::new();
                    fields.insert("deviceName".to_string(), json!(name));
                    fields.insert("macAddress".to_string(), json!(mac));
                    fields.insert("deviceStatus".to_string(), json!(status));
                    if let Some(battery) = battery {
                        fields.insert("batteryLevel".to_string(), json!(battery));
                    }
                    if let Some(signal) = signal {
                        fields.insert("signalStrength".to_string(), json!(signal));
                    }
                    if let Some(location) = location {
                        fields.insert("location".to_string(), location);
                    }
                    fields
                },
            )
    }

    /// Generate a valid AirSensor creation payload
    pub fn air_sensor_payload() -> impl Strategy<Value = Value> {
        (common_fields(), 0.0f64..=100.0).prop_map(|(mut fields, moisture)| {
            fields.insert("deviceType".to_string(), json!("AirSensor"));
            fields.insert("moistureLevel".to_string(), json!(moisture));
            Value::Object(fields)
        })
    }

    /// Generate a valid TemperatureSensor creation payload
    pub fn temperature_sensor_payload() -> impl Strategy<Value = Value> {
        (common_fields(), -40.0f64..=85.0).prop_map(|(mut fields, temp)| {
            fields.insert("deviceType".to_string(), json!("TemperatureSensor"));
            fields.insert("tempC".to_string(), json!(temp));
            Value::Object(fields)
        })
    }

    pub fn device_payload() -> impl Strategy<Value = Value> {
        prop_oneof![air_sensor_payload(), temperature_sensor_payload()]
    }

    /// Battery levels outside the accepted 0..=100 range
    pub fn out_of_range_battery() -> impl Strategy<Value = f64> {
        prop_oneof![-1.0e6f64..-0.001, 100.001f64..1.0e6]
    }
}

/// The AirSensor example payload used across the API tests
pub fn air_sensor_example() -> serde_json::Value {
    serde_json::json!({
        "deviceName": "S1",
        "macAddress": "AA:BB:CC:DD:EE:01",
        "deviceStatus": "active",
        "deviceType": "AirSensor",
        "moistureLevel": 42.5,
        "location": { "room": "Lab" }
    })
}

pub fn temperature_sensor_example() -> serde_json::Value {
    serde_json::json!({
        "deviceName": "T1",
        "macAddress": "AA:BB:CC:DD:EE:02",
        "deviceStatus": "inactive",
        "deviceType": "TemperatureSensor",
        "tempC": 19.5,
        "batteryLevel": 80
    })
}
