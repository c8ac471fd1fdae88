//! # Device Record Builder
//!
//! Turns a raw advertisement into a normalized label/key pair, or drops it
//! when neither the name nor the identifier is worth showing.
//!
//! ## Rules
//! - Label: first non-blank of peripheral name, then advertised local name
//! - Key: stable identifier when present, otherwise the label
//! - Ignored when both label and identifier look random, or when no key remains

use crate::adapter::AdvertisementEvent;
use crate::identity::looks_like_random_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Best human-readable name, if any
    pub label: Option<String>,
    /// Dedup key, never empty
    pub key: String,
}

/// Trims `raw`, mapping blank or absent values to `None`.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Picks the display label, preferring the peripheral's own name.
pub fn extract_label(peripheral_name: Option<&str>, local_name: Option<&str>) -> Option<String> {
    normalize(peripheral_name).or_else(|| normalize(local_name))
}

/// Builds a record from the three identity fields of an advertisement.
///
/// Returns `None` when the advertisement should be ignored.
pub fn build_record(
    peripheral_name: Option<&str>,
    local_name: Option<&str>,
    stable_identifier: Option<&str>,
) -> Option<DeviceRecord> {
    let label = extract_label(peripheral_name, local_name);
    let identifier = normalize(stable_identifier);

    if looks_like_random_id(label.as_deref()) && looks_like_random_id(identifier.as_deref()) {
        return None;
    }

    let key = identifier.or_else(|| label.clone())?;
    if key.is_empty() {
        return None;
    }

    Some(DeviceRecord { label, key })
}

impl DeviceRecord {
    pub fn from_advertisement(event: &AdvertisementEvent) -> Option<Self> {
        build_record(
            event.peripheral_name.as_deref(),
            event.payload.local_name(),
            event.stable_identifier.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdvertisementPayload;

    const UUID_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("   ")), None);
        assert_eq!(normalize(Some("  Watch \t")), Some("Watch".to_string()));
    }

    #[test]
    fn test_peripheral_name_wins_over_local_name() {
        assert_eq!(extract_label(Some("Headset"), Some("HS-01")), Some("Headset".to_string()));
        assert_eq!(extract_label(Some("  "), Some(" HS-01 ")), Some("HS-01".to_string()));
        assert_eq!(extract_label(None, None), None);
    }

    #[test]
    fn test_random_label_and_random_identifier_is_ignored() {
        assert_eq!(build_record(Some("A1B2C3D4E5F6A1B2"), None, Some(UUID_ID)), None);
    }

    #[test]
    fn test_no_label_and_no_identifier_is_ignored() {
        assert_eq!(build_record(None, Some(" "), None), None);
    }

    #[test]
    fn test_real_name_with_random_identifier_is_kept() {
        let record = build_record(Some("Pixel Buds"), None, Some(UUID_ID)).unwrap();
        assert_eq!(record.label.as_deref(), Some("Pixel Buds"));
        assert_eq!(record.key, UUID_ID);
    }

    #[test]
    fn test_meaningful_identifier_without_name_is_kept() {
        let record = build_record(None, None, Some("  AA:BB:CC:DD:EE:FF ")).unwrap();
        assert_eq!(record.label, None);
        assert_eq!(record.key, "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_label_becomes_key_without_identifier() {
        let record = build_record(None, Some("Thermometer"), None).unwrap();
        assert_eq!(record.key, "Thermometer");
    }

    #[test]
    fn test_from_advertisement_uses_typed_local_name() {
        let event = AdvertisementEvent {
            peripheral_name: None,
            payload: AdvertisementPayload {
                local_name: Some("Kitchen Scale".to_string()),
                ..Default::default()
            },
            stable_identifier: Some(UUID_ID.to_string()),
            signal_strength: Some(-60),
        };

        let record = DeviceRecord::from_advertisement(&event).unwrap();
        assert_eq!(record.label.as_deref(), Some("Kitchen Scale"));
        assert_eq!(record.key, UUID_ID);
    }
}
