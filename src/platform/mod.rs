//! Platform-specific module for Windows utilities.
//!
//! This module contains Windows-specific functionality including
//! registry access and modal dialogs.

pub mod dialogs;
pub mod registry;

pub use registry::{AutostartEntry, AutostartState, RegistryError};
