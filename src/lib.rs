//! IP Notifier - Library
//!
//! A system tray utility that watches the machine's external IP address
//! and notifies on change.
//!
//! ## Features
//!
//! - Polls a public echo endpoint every ten seconds
//! - Balloon notification when the external address changes
//! - Left click shows the current address, click the balloon for a dialog
//! - Auto start toggle backed by the per-user Run registry key
//!
//! The address tracking and HTTP layers are portable and unit-tested on
//! any platform; everything talking to Win32 is Windows-only.

pub mod monitor;
pub mod net;

#[cfg(windows)]
pub mod app;
#[cfg(windows)]
pub mod platform;
#[cfg(windows)]
pub mod ui;

pub use monitor::{AddressChange, AddressMonitor, UNKNOWN_ADDRESS};
pub use net::{FetchError, IpFetcher, PollGate, Poller};
#[cfg(windows)]
pub use platform::{AutostartEntry, AutostartState, RegistryError};
