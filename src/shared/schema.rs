//! Payload validation for device requests
//!
//! Each entry point takes an untyped JSON value and returns either a typed
//! value or every violated constraint as a [`FieldError`]. Validation never
//! stops at the first failure so callers can report the full list.

use serde_json::{Map, Value};

use super::domain::{DevicePatch, DeviceStatus, DeviceType, DeviceVariant, Location, NewDevice};
use super::validators::{
    validate_battery_level, validate_device_name, validate_mac_address, FieldError,
};

/// All field violations found in one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// Whether any violation is reported against `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_object(input: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    input.as_object().ok_or_else(|| {
        ValidationErrors::single(
            "",
            format!("Expected object, received {}", type_name(input)),
        )
    })
}

fn status_choices() -> String {
    DeviceStatus::ALL
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Clone, Copy, PartialEq)]
enum Presence {
    Required,
    Optional,
}

#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Fetch `key`, recording "Required" when a required key is absent
    fn lookup<'v>(
        &mut self,
        obj: &'v Map<String, Value>,
        key: &str,
        path: &str,
        presence: Presence,
    ) -> Option<&'v Value> {
        let value = obj.get(key);
        if value.is_none() && presence == Presence::Required {
            self.push(FieldError::new(path, "Required"));
        }
        value
    }

    fn string(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
        presence: Presence,
    ) -> Option<String> {
        match self.lookup(obj, key, path, presence)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.push(FieldError::new(
                    path,
                    format!("Expected string, received {}", type_name(other)),
                ));
                None
            }
        }
    }

    fn number(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
        presence: Presence,
    ) -> Option<f64> {
        let value = self.lookup(obj, key, path, presence)?;
        match value.as_f64() {
            Some(n) => Some(n),
            _ => {
                self.push(FieldError::new(
                    path,
                    format!("Expected number, received {}", type_name(value)),
                ));
                None
            }
        }
    }

    fn device_name(&mut self, obj: &Map<String, Value>, presence: Presence) -> Option<String> {
        let name = self.string(obj, "deviceName", "deviceName", presence)?;
        match validate_device_name(&name) {
            Ok(()) => Some(name),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    fn mac_address(&mut self, obj: &Map<String, Value>, presence: Presence) -> Option<String> {
        let mac = self.string(obj, "macAddress", "macAddress", presence)?;
        match validate_mac_address(&mac) {
            Ok(()) => Some(mac),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    fn device_status(
        &mut self,
        obj: &Map<String, Value>,
        presence: Presence,
    ) -> Option<DeviceStatus> {
        let raw = self.string(obj, "deviceStatus", "deviceStatus", presence)?;
        match raw.parse() {
            Ok(status) => Some(status),
            Err(_) => {
                self.push(FieldError::new(
                    "deviceStatus",
                    format!(
                        "Invalid enum value. Expected {}, received '{}'",
                        status_choices(),
                        raw
                    ),
                ));
                None
            }
        }
    }

    fn device_type(&mut self, obj: &Map<String, Value>, presence: Presence) -> Option<DeviceType> {
        let raw = self.string(obj, "deviceType", "deviceType", presence)?;
        match raw.parse() {
            Ok(device_type) => Some(device_type),
            Err(_) => {
                self.push(FieldError::new(
                    "deviceType",
                    format!(
                        "Invalid discriminator value. Expected 'AirSensor' | 'TemperatureSensor', received '{}'",
                        raw
                    ),
                ));
                None
            }
        }
    }

    fn battery_level(&mut self, obj: &Map<String, Value>) -> Option<f64> {
        let level = self.number(obj, "batteryLevel", "batteryLevel", Presence::Optional)?;
        match validate_battery_level(level) {
            Ok(()) => Some(level),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    fn location(&mut self, obj: &Map<String, Value>) -> Option<Location> {
        let value = self.lookup(obj, "location", "location", Presence::Optional)?;
        let Some(inner) = value.as_object() else {
            self.push(FieldError::new(
                "location",
                format!("Expected object, received {}", type_name(value)),
            ));
            return None;
        };
        // An empty location object is stored the same as an absent one
        Location::from_parts(
            self.string(inner, "room", "location.room", Presence::Optional),
            self.string(inner, "building", "location.building", Presence::Optional),
        )
    }

    fn into_result<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            _ => Err(ValidationErrors(self.errors)),
        }
    }
}

/// Validate a full device payload for creation
///
/// `deviceType` selects which measurement field is required. Common fields
/// are still checked when the discriminant itself is invalid. Unknown keys
/// are ignored.
pub fn validate_new_device(input: &Value) -> Result<NewDevice, ValidationErrors> {
    let obj = expect_object(input)?;
    let mut c = Collector::default();

    let device_type = c.device_type(obj, Presence::Required);
    let device_name = c.device_name(obj, Presence::Required);
    let mac_address = c.mac_address(obj, Presence::Required);
    let device_status = c.device_status(obj, Presence::Required);
    let battery_level = c.battery_level(obj);
    let signal_strength = c.number(obj, "signalStrength", "signalStrength", Presence::Optional);
    let location = c.location(obj);

    let variant = match device_type {
        Some(DeviceType::AirSensor) => c
            .number(obj, "moistureLevel", "moistureLevel", Presence::Required)
            .map(|moisture_level| DeviceVariant::AirSensor { moisture_level }),
        Some(DeviceType::TemperatureSensor) => c
            .number(obj, "tempC", "tempC", Presence::Required)
            .map(|temp_c| DeviceVariant::TemperatureSensor { temp_c }),
        None => None,
    };

    let device = match (device_name, mac_address, device_status, variant) {
        (Some(device_name), Some(mac_address), Some(device_status), Some(variant)) => {
            Some(NewDevice {
                device_name,
                mac_address,
                device_status,
                battery_level,
                signal_strength,
                location,
                variant,
            })
        }
        _ => None,
    };

    c.into_result(device)
}

/// Validate a partial update; every field is optional
pub fn validate_device_patch(input: &Value) -> Result<DevicePatch, ValidationErrors> {
    let obj = expect_object(input)?;
    let mut c = Collector::default();

    let device_type = c.device_type(obj, Presence::Optional);
    let location = c.location(obj).unwrap_or_default();
    let moisture_level = c.number(obj, "moistureLevel", "moistureLevel", Presence::Optional);
    let temp_c = c.number(obj, "tempC", "tempC", Presence::Optional);

    if moisture_level.is_some() && temp_c.is_some() {
        c.push(FieldError::new(
            "tempC",
            "moistureLevel and tempC cannot both be set",
        ));
    } else if let Some(device_type) = device_type {
        let foreign = match device_type {
            DeviceType::AirSensor if temp_c.is_some() => Some("tempC"),
            DeviceType::TemperatureSensor if moisture_level.is_some() => Some("moistureLevel"),
            _ => None,
        };
        if let Some(field) = foreign {
            c.push(FieldError::new(
                field,
                format!("{} is not applicable to {}", field, device_type),
            ));
        }
    }

    let patch = DevicePatch {
        device_type,
        device_name: c.device_name(obj, Presence::Optional),
        mac_address: c.mac_address(obj, Presence::Optional),
        device_status: c.device_status(obj, Presence::Optional),
        battery_level: c.battery_level(obj),
        signal_strength: c.number(obj, "signalStrength", "signalStrength", Presence::Optional),
        room: location.room,
        building: location.building,
        moisture_level,
        temp_c,
    };

    c.into_result(Some(patch))
}

/// Validate a status-only update: exactly `{ "deviceStatus": <status> }`
pub fn validate_status_update(input: &Value) -> Result<DeviceStatus, ValidationErrors> {
    let obj = expect_object(input)?;
    let mut c = Collector::default();

    for key in obj.keys().filter(|k| k.as_str() != "deviceStatus") {
        c.push(FieldError::new(
            key.as_str(),
            format!("Unrecognized key: '{}'", key),
        ));
    }

    let status = c.device_status(obj, Presence::Required);
    c.into_result(status)
}
