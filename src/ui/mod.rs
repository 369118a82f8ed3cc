//! UI module for the system tray surface.
//!
//! This module provides the user interface components: the tray icon
//! with its balloon notifications and the right-click context menu.

pub mod menu;
pub mod tray;

pub use tray::TrayIcon;
