//! Property Test: MAC Address Format Validation
//!
//! This property test verifies that:
//! - MAC addresses in colon or dash form, upper or lower case, are accepted
//! - Malformed MAC addresses (wrong length, separators or characters) are rejected
//! - A rejected MAC address keeps the whole device payload from validating

mod common;

use common::generators;
use device_registry::validators::validate_mac_address;
use device_registry::validate_new_device;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: All generated valid MAC addresses should pass validation
    #[test]
    fn prop_valid_mac_addresses_accepted(mac in generators::mac_address()) {
        let result = validate_mac_address(&mac);
        prop_assert!(
            result.is_ok(),
            "Valid MAC address {} should be accepted, but got error: {:?}",
            mac,
            result.err()
        );
    }

    /// Property: All generated invalid MAC addresses should fail validation
    #[test]
    fn prop_invalid_mac_addresses_rejected(mac in generators::invalid_mac_address()) {
        let result = validate_mac_address(&mac);
        prop_assert!(
            result.is_err(),
            "Invalid MAC address {} should be rejected, but was accepted",
            mac
        );
    }

    /// Property: A payload carrying an invalid MAC reports a macAddress field error
    #[test]
    fn prop_invalid_mac_rejects_payload(
        mut payload in generators::device_payload(),
        mac in generators::invalid_mac_address()
    ) {
        payload["macAddress"] = json!(mac);

        let errors = validate_new_device(&payload).unwrap_err();
        prop_assert!(errors.has_field("macAddress"));
    }
}

#[cfg(test)]
mod additional_tests {
    use super::*;

    #[test]
    fn test_specific_valid_macs() {
        assert!(validate_mac_address("AA:BB:CC:DD:EE:FF").is_ok());
        assert!(validate_mac_address("aa-bb-cc-dd-ee-ff").is_ok());
        assert!(validate_mac_address("00:00:00:00:00:00").is_ok());
        assert!(validate_mac_address("aA:Bb:cC:Dd:eE:Ff").is_ok());
    }

    #[test]
    fn test_specific_invalid_macs() {
        assert!(validate_mac_address("AA:BB:CC:DD:EE").is_err()); // too short
        assert!(validate_mac_address("AA BB CC DD EE FF").is_err()); // wrong separator
        assert!(validate_mac_address("ZZ:BB:CC:DD:EE:FF").is_err()); // not hex
        assert!(validate_mac_address("").is_err()); // empty
    }
}
