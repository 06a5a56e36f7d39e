//! Utility functions for ledgate-core.

use btleplug::platform::PeripheralId;

/// Format a peripheral ID as a string.
///
/// On macOS, peripheral IDs are UUIDs. On other platforms, they are usually
/// MAC addresses. This strips the `PeripheralId(...)` debug wrapper.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    strip_id_wrapper(&format!("{:?}", id))
}

fn strip_id_wrapper(debug: &str) -> String {
    debug
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Normalize a device address for comparison.
///
/// Lowercases and removes `:` and `-` separators, so `AA:BB:CC:DD:EE:FF`,
/// `aa-bb-cc-dd-ee-ff` and `aabbccddeeff` all compare equal.
pub fn normalize_address(address: &str) -> String {
    address
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether an address reported by the adapter refers to the configured device.
///
/// macOS reports an all-zero address and identifies peripherals by UUID, so a
/// zero address never matches.
pub fn address_matches(reported: &str, configured: &str) -> bool {
    let reported = normalize_address(reported);
    !reported.is_empty()
        && reported.chars().any(|c| c != '0')
        && reported == normalize_address(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_id_wrapper() {
        assert_eq!(
            strip_id_wrapper("PeripheralId(AA:BB:CC:DD:EE:FF)"),
            "AA:BB:CC:DD:EE:FF"
        );
        assert_eq!(strip_id_wrapper("plain"), "plain");
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("AA:BB:CC:DD:EE:FF"), "aabbccddeeff");
        assert_eq!(normalize_address("aa-bb-cc-dd-ee-ff"), "aabbccddeeff");
    }

    #[test]
    fn test_address_matches() {
        assert!(address_matches("AA:BB:CC:DD:EE:FF", "aa:bb:cc:dd:ee:ff"));
        assert!(address_matches("AA:BB:CC:DD:EE:FF", "AABBCCDDEEFF"));
        assert!(!address_matches("AA:BB:CC:DD:EE:00", "AA:BB:CC:DD:EE:FF"));
        assert!(!address_matches("00:00:00:00:00:00", "00:00:00:00:00:00"));
        assert!(!address_matches("", ""));
    }
}
