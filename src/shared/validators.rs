use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// A single violated constraint, addressed by field path (e.g. `location.room`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation error for field '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for FieldError {}

pub const MIN_BATTERY_LEVEL: f64 = 0.0;
pub const MAX_BATTERY_LEVEL: f64 = 100.0;

fn mac_regex() -> &'static Regex {
    static MAC_REGEX: OnceLock<Regex> = OnceLock::new();
    MAC_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("MAC pattern is valid")
    })
}

/// Validate MAC address format (six hex pairs separated by `:` or `-`, either case)
pub fn validate_mac_address(mac: &str) -> Result<(), FieldError> {
    if mac_regex().is_match(mac) {
        Ok(())
    } else {
        Err(FieldError::new(
            "macAddress",
            "MAC address must be in format XX:XX:XX:XX:XX:XX or XX-XX-XX-XX-XX-XX",
        ))
    }
}

/// Validate that a device name is non-empty
pub fn validate_device_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        Err(FieldError::new(
            "deviceName",
            "Device name must contain at least 1 character",
        ))
    } else {
        Ok(())
    }
}

/// Validate battery level is within 0..=100
pub fn validate_battery_level(level: f64) -> Result<(), FieldError> {
    if level < MIN_BATTERY_LEVEL {
        return Err(FieldError::new(
            "batteryLevel",
            format!("Battery level {} is below minimum of 0", level),
        ));
    }

    if level > MAX_BATTERY_LEVEL {
        return Err(FieldError::new(
            "batteryLevel",
            format!("Battery level {} exceeds maximum of 100", level),
        ));
    }

    Ok(())
}

/// Parse a device identifier taken from a request path
pub fn validate_device_id(id: &str) -> Result<Uuid, FieldError> {
    Uuid::parse_str(id).map_err(|_| FieldError::new("id", "Device id must be a valid UUID"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_mac_address() {
        // Valid MAC addresses
        assert!(validate_mac_address("AA:BB:CC:DD:EE:FF").is_ok());
        assert!(validate_mac_address("aa-bb-cc-dd-ee-ff").is_ok());
        assert!(validate_mac_address("00:11:22:33:44:55").is_ok());
        assert!(validate_mac_address("Aa:bB:0c:D1:e2:F3").is_ok());

        // Invalid MAC addresses
        assert!(validate_mac_address("AA:BB:CC:DD:EE").is_err()); // too short
        assert!(validate_mac_address("AA:BB:CC:DD:EE:FF:00").is_err()); // too long
        assert!(validate_mac_address("AA.BB.CC.DD.EE.FF").is_err()); // wrong separator
        assert!(validate_mac_address("AABBCCDDEEFF").is_err()); // no separator
        assert!(validate_mac_address("GG:BB:CC:DD:EE:FF").is_err()); // invalid hex
        assert!(validate_mac_address(" AA:BB:CC:DD:EE:FF").is_err()); // leading space
        assert!(validate_mac_address("").is_err());
    }

    #[test]
    fn test_validate_mac_address_error_field() {
        let err = validate_mac_address("nope").unwrap_err();
        assert_eq!(err.field, "macAddress");
    }

    #[test]
    fn test_validate_device_name() {
        assert!(validate_device_name("S1").is_ok());
        assert!(validate_device_name(" ").is_ok());
        assert!(validate_device_name("").is_err());
    }

    #[test]
    fn test_validate_battery_level() {
        assert!(validate_battery_level(0.0).is_ok()); // minimum
        assert!(validate_battery_level(100.0).is_ok()); // maximum
        assert!(validate_battery_level(55.5).is_ok());

        assert!(validate_battery_level(-1.0).is_err());
        assert!(validate_battery_level(-0.01).is_err());
        assert!(validate_battery_level(100.01).is_err());
        assert!(validate_battery_level(150.0).is_err());
    }

    #[test]
    fn test_validate_device_id() {
        let id = validate_device_id("7c9e6679-7425-40de-944b-e07fc1f90ae7").unwrap();
        assert_eq!(id.to_string(), "7c9e6679-7425-40de-944b-e07fc1f90ae7");

        assert!(validate_device_id("not-a-uuid").is_err());
        assert!(validate_device_id("").is_err());
        assert!(validate_device_id("123").is_err());
    }
}
