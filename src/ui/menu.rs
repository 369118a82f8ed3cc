use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

// Menu command IDs
pub const CMD_EXIT: u32 = 1;
pub const CMD_TOGGLE_AUTOSTART: u32 = 2;

/// Show the context menu at the specified position
pub fn show_context_menu(hwnd: HWND, x: i32, y: i32) {
    unsafe {
        let Ok(menu) = CreatePopupMenu() else {
            return;
        };

        // Exit option
        let exit_label = w!("Exit");
        let _ = AppendMenuW(menu, MF_STRING, CMD_EXIT as usize, exit_label);

        // Autostart toggle
        let autostart_label = w!("Auto Start");
        let _ = AppendMenuW(menu, MF_STRING, CMD_TOGGLE_AUTOSTART as usize, autostart_label);

        // Show the menu
        let _ = TrackPopupMenu(menu, TPM_RIGHTBUTTON, x, y, 0, hwnd, None);

        // Clean up
        let _ = DestroyMenu(menu);
    }
}
