//! External address tracking and change detection.
//!
//! Holds the last successfully observed external IP address and decides
//! when a freshly fetched value warrants a user-visible notification.

/// Placeholder stored until the first successful fetch completes.
/// Reset on every launch; the address is never persisted across restarts.
pub const UNKNOWN_ADDRESS: &str = "Unknown";

/// A detected address change, carrying both sides for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressChange {
    /// Value that was stored before this observation
    pub previous: String,

    /// Newly observed value, now stored
    pub current: String,
}

/// Tracks the last known external address.
///
/// The monitor only ever sees successful fetch results; a failed fetch is
/// reported by the caller and leaves the stored value untouched.
#[derive(Debug)]
pub struct AddressMonitor {
    current: String,
    reported_once: bool,
}

impl AddressMonitor {
    /// Create a monitor holding the startup placeholder.
    pub fn new() -> Self {
        Self {
            current: UNKNOWN_ADDRESS.to_string(),
            reported_once: false,
        }
    }

    /// Last successfully observed address, or the placeholder.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Record a successfully fetched address.
    ///
    /// Returns the change to announce, or `None` when nothing observable
    /// happened. Comparison is an exact byte comparison of the trimmed
    /// text. The first observation after startup is always announced,
    /// even if the fetched value equals the stored placeholder.
    pub fn observe(&mut self, fetched: &str) -> Option<AddressChange> {
        if self.reported_once && self.current == fetched {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, fetched.to_string());
        self.reported_once = true;

        Some(AddressChange {
            previous,
            current: self.current.clone(),
        })
    }
}

impl Default for AddressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_placeholder() {
        let monitor = AddressMonitor::new();
        assert_eq!(monitor.current(), UNKNOWN_ADDRESS);
    }

    #[test]
    fn first_observation_always_notifies() {
        let mut monitor = AddressMonitor::new();
        let change = monitor.observe("1.2.3.4").expect("first cycle must notify");
        assert_eq!(change.previous, UNKNOWN_ADDRESS);
        assert_eq!(change.current, "1.2.3.4");
        assert_eq!(monitor.current(), "1.2.3.4");
    }

    #[test]
    fn first_observation_notifies_even_for_placeholder_value() {
        let mut monitor = AddressMonitor::new();
        let change = monitor
            .observe(UNKNOWN_ADDRESS)
            .expect("first cycle must notify");
        assert_eq!(change.previous, UNKNOWN_ADDRESS);
        assert_eq!(change.current, UNKNOWN_ADDRESS);
    }

    #[test]
    fn repeated_value_stays_silent() {
        let mut monitor = AddressMonitor::new();
        monitor.observe("1.2.3.4").unwrap();
        assert!(monitor.observe("1.2.3.4").is_none());
        assert!(monitor.observe("1.2.3.4").is_none());
        assert_eq!(monitor.current(), "1.2.3.4");
    }

    #[test]
    fn changed_value_notifies_with_previous() {
        let mut monitor = AddressMonitor::new();
        monitor.observe("1.2.3.4").unwrap();
        let change = monitor.observe("5.6.7.8").expect("change must notify");
        assert_eq!(change.previous, "1.2.3.4");
        assert_eq!(change.current, "5.6.7.8");
    }

    #[test]
    fn comparison_is_case_sensitive() {
        // Addresses are opaque text; hex case in a v6 address matters.
        let mut monitor = AddressMonitor::new();
        monitor.observe("2001:db8::AB").unwrap();
        assert!(monitor.observe("2001:db8::ab").is_some());
    }

    #[test]
    fn three_cycle_sequence_notifies_on_first_and_third() {
        let mut monitor = AddressMonitor::new();
        let fetches = ["1.2.3.4", "1.2.3.4", "5.6.7.8"];
        let notified: Vec<bool> = fetches
            .iter()
            .map(|ip| monitor.observe(ip).is_some())
            .collect();
        assert_eq!(notified, vec![true, false, true]);
    }

    #[test]
    fn failed_cycle_leaves_value_untouched() {
        // A failed fetch never reaches the monitor; the next successful
        // tick compares against the value from before the failure.
        let mut monitor = AddressMonitor::new();
        monitor.observe("1.2.3.4").unwrap();
        assert_eq!(monitor.current(), "1.2.3.4");
        assert!(monitor.observe("1.2.3.4").is_none());
    }
}
