//! Modal message boxes.
//!
//! Thin wrappers over MessageBoxW. These block the calling thread until
//! dismissed, but the modal loop keeps pumping, so timer ticks and
//! posted completion messages are still delivered while one is open.

use windows::core::PCWSTR;
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, MB_ICONERROR, MB_ICONINFORMATION, MB_OK, MESSAGEBOX_STYLE,
};

fn show(title: &str, message: &str, style: MESSAGEBOX_STYLE) {
    let message_wide: Vec<u16> = message.encode_utf16().chain(std::iter::once(0)).collect();
    let title_wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        MessageBoxW(
            None,
            PCWSTR(message_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            style,
        );
    }
}

/// Informational dialog with an OK button.
pub fn show_info(title: &str, message: &str) {
    show(title, message, MB_OK | MB_ICONINFORMATION);
}

/// Error dialog with an OK button.
pub fn show_error(title: &str, message: &str) {
    show(title, message, MB_OK | MB_ICONERROR);
}
