//! # Label Formatter
//!
//! Produces the final display string for an admitted device.
//!
//! - Random-looking or blank names become `Device N` placeholders
//! - Names up to 20 characters are shown as-is
//! - Longer names keep their first 8 and last 4 characters around an ellipsis
//!
//! The placeholder counter is owned here. Whether it restarts with each scan
//! session is decided by [`CounterPolicy`].

use crate::identity::{is_hex_blob, is_uuid};

pub const MAX_DISPLAY_LEN: usize = 20;
const HEAD_LEN: usize = 8;
const TAIL_LEN: usize = 4;
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterPolicy {
    /// Numbering continues across scan sessions
    #[default]
    PerProcess,
    /// Numbering restarts at 1 whenever a new session begins
    PerSession,
}

#[derive(Debug, Default)]
pub struct LabelFormatter {
    unknown_count: u32,
    policy: CounterPolicy,
}

impl LabelFormatter {
    pub fn new(policy: CounterPolicy) -> Self {
        Self {
            unknown_count: 0,
            policy,
        }
    }

    pub fn unknown_count(&self) -> u32 {
        self.unknown_count
    }

    /// Called by the controller whenever a scan session starts.
    pub fn begin_session(&mut self) {
        if self.policy == CounterPolicy::PerSession {
            self.reset_counter();
        }
    }

    pub fn reset_counter(&mut self) {
        self.unknown_count = 0;
    }

    pub fn format_entry(&mut self, label: Option<&str>, key: &str) -> String {
        let display = label.unwrap_or(key);

        if display.trim().is_empty() || is_uuid(display) || is_hex_blob(display) {
            self.unknown_count += 1;
            return format!("Device {}", self.unknown_count);
        }

        let len = display.chars().count();
        if len <= MAX_DISPLAY_LEN {
            return display.to_string();
        }

        let head: String = display.chars().take(HEAD_LEN).collect();
        let tail: String = display.chars().skip(len - TAIL_LEN).collect();
        format!("{}{}{}", head, ELLIPSIS, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_twenty_chars_unchanged() {
        let mut formatter = LabelFormatter::default();
        let name = "ABCDEFGHIJKLMNOPQRST";
        assert_eq!(formatter.format_entry(Some(name), "key"), name);
    }

    #[test]
    fn test_twenty_one_chars_truncated() {
        let mut formatter = LabelFormatter::default();
        let entry = formatter.format_entry(Some("ABCDEFGHIJKLMNOPQRSTU"), "key");
        assert_eq!(entry, "ABCDEFGH…RSTU");
        assert_eq!(entry.chars().count(), 13);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let mut formatter = LabelFormatter::default();
        let entry = formatter.format_entry(Some("Écouteurs sans fil de Zoé"), "key");
        assert_eq!(entry, "Écouteur… Zoé");
        assert_eq!(entry.chars().count(), 13);
    }

    #[test]
    fn test_key_used_when_label_absent() {
        let mut formatter = LabelFormatter::default();
        assert_eq!(formatter.format_entry(None, "AA:BB:CC:DD:EE:FF"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn test_random_display_gets_numbered_placeholder() {
        let mut formatter = LabelFormatter::default();
        assert_eq!(
            formatter.format_entry(None, "550e8400-e29b-41d4-a716-446655440000"),
            "Device 1"
        );
        assert_eq!(formatter.format_entry(Some("A1B2C3D4E5F6"), "x"), "Device 2");
        assert_eq!(formatter.format_entry(Some("   "), "x"), "Device 3");
        assert_eq!(formatter.unknown_count(), 3);
    }

    #[test]
    fn test_real_label_with_uuid_key() {
        let mut formatter = LabelFormatter::default();
        let entry = formatter.format_entry(Some("Pixel Buds"), "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(entry, "Pixel Buds");
        assert_eq!(formatter.unknown_count(), 0);
    }

    #[test]
    fn test_per_process_counter_survives_sessions() {
        let mut formatter = LabelFormatter::new(CounterPolicy::PerProcess);
        formatter.format_entry(None, "");
        formatter.begin_session();
        assert_eq!(formatter.format_entry(None, ""), "Device 2");
    }

    #[test]
    fn test_per_session_counter_restarts() {
        let mut formatter = LabelFormatter::new(CounterPolicy::PerSession);
        formatter.format_entry(None, "");
        formatter.begin_session();
        assert_eq!(formatter.format_entry(None, ""), "Device 1");
    }
}
