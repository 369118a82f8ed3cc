//! System tray icon with balloon notifications.
//!
//! Wraps Shell_NotifyIconW directly. One icon id owns the notification
//! area entry; tooltip updates and balloon notifications are NIM_MODIFY
//! calls against that same id.

use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::UI::Shell::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::app::WM_TRAY_ICON;

const TRAY_ICON_ID: u32 = 1;

/// How long a balloon stays up before the shell fades it out.
const BALLOON_TIMEOUT_MS: u32 = 5000;

/// Manages the system tray icon
pub struct TrayIcon {
    hwnd: HWND,
    icon: HICON,
    owns_icon: bool,
}

impl TrayIcon {
    pub fn new(hwnd: HWND, tooltip: &str) -> Result<Self> {
        // Try to draw our own icon, fall back to the stock one
        let (icon, owns_icon) = match create_globe_icon() {
            Ok(icon) => (icon, true),
            Err(_) => unsafe { (LoadIconW(None, IDI_INFORMATION)?, false) },
        };

        let tray = Self {
            hwnd,
            icon,
            owns_icon,
        };

        tray.add(tooltip)?;

        Ok(tray)
    }

    fn add(&self, tooltip: &str) -> Result<()> {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.hwnd,
            uID: TRAY_ICON_ID,
            uFlags: NIF_ICON | NIF_MESSAGE | NIF_TIP | NIF_SHOWTIP,
            uCallbackMessage: WM_TRAY_ICON,
            hIcon: self.icon,
            ..Default::default()
        };
        copy_wide(tooltip, &mut nid.szTip);

        unsafe {
            if !Shell_NotifyIconW(NIM_ADD, &nid).as_bool() {
                let err = GetLastError();
                return Err(Error::new(
                    HRESULT::from_win32(err.0),
                    "Shell_NotifyIconW failed",
                ));
            }

            // Set version for modern behavior
            nid.Anonymous.uVersion = NOTIFYICON_VERSION_4;
            let _ = Shell_NotifyIconW(NIM_SETVERSION, &nid);
        }

        Ok(())
    }

    /// Replace the hover tooltip.
    pub fn set_tooltip(&self, tooltip: &str) {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.hwnd,
            uID: TRAY_ICON_ID,
            uFlags: NIF_TIP | NIF_SHOWTIP,
            ..Default::default()
        };
        copy_wide(tooltip, &mut nid.szTip);

        unsafe {
            let _ = Shell_NotifyIconW(NIM_MODIFY, &nid);
        }
    }

    /// Pop a balloon notification over the icon.
    ///
    /// A click inside the balloon comes back on the callback message as
    /// a NIN_BALLOONUSERCLICK event.
    pub fn show_balloon(&self, title: &str, text: &str) {
        let mut nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.hwnd,
            uID: TRAY_ICON_ID,
            uFlags: NIF_INFO,
            dwInfoFlags: NIIF_INFO,
            ..Default::default()
        };
        copy_wide(title, &mut nid.szInfoTitle);
        copy_wide(text, &mut nid.szInfo);
        nid.Anonymous.uTimeout = BALLOON_TIMEOUT_MS;

        unsafe {
            let _ = Shell_NotifyIconW(NIM_MODIFY, &nid);
        }
    }

    pub fn remove(&self) {
        let nid = NOTIFYICONDATAW {
            cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
            hWnd: self.hwnd,
            uID: TRAY_ICON_ID,
            ..Default::default()
        };

        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
        }
    }
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        // Stock icons must not be destroyed, only our own drawing
        if self.owns_icon {
            unsafe {
                let _ = DestroyIcon(self.icon);
            }
        }
    }
}

/// Copy text into a fixed NOTIFYICONDATAW buffer, always NUL-terminated.
fn copy_wide(text: &str, buf: &mut [u16]) {
    let wide: Vec<u16> = text.encode_utf16().collect();
    let len = std::cmp::min(wide.len(), buf.len() - 1);
    buf[..len].copy_from_slice(&wide[..len]);
    buf[len] = 0;
}

/// Draw a simple globe icon programmatically
fn create_globe_icon() -> Result<HICON> {
    unsafe {
        let size = 16i32;

        // Create a device context and bitmap for the icon
        let screen_dc = GetDC(None);
        if screen_dc.is_invalid() {
            return Err(Error::from_win32());
        }

        let mem_dc = CreateCompatibleDC(screen_dc);
        if mem_dc.is_invalid() {
            ReleaseDC(None, screen_dc);
            return Err(Error::from_win32());
        }

        let bitmap = CreateCompatibleBitmap(screen_dc, size, size);
        if bitmap.is_invalid() {
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);
            return Err(Error::from_win32());
        }

        let old_bitmap = SelectObject(mem_dc, bitmap);

        // Fill background with black (transparent)
        let black_brush = GetStockObject(BLACK_BRUSH);
        let rect = RECT {
            left: 0,
            top: 0,
            right: size,
            bottom: size,
        };
        FillRect(mem_dc, &rect, HBRUSH(black_brush.0));

        // White outlines on a hollow fill
        let pen = CreatePen(PS_SOLID, 1, COLORREF(0x00FFFFFF));
        let old_pen = SelectObject(mem_dc, pen);
        let old_brush = SelectObject(mem_dc, GetStockObject(HOLLOW_BRUSH));

        // Globe outline
        let _ = Ellipse(mem_dc, 2, 2, 14, 14);

        // Central meridian
        let _ = Ellipse(mem_dc, 6, 2, 10, 14);

        // Equator
        let _ = MoveToEx(mem_dc, 2, 8, None);
        let _ = LineTo(mem_dc, 14, 8);

        SelectObject(mem_dc, old_pen);
        SelectObject(mem_dc, old_brush);
        let _ = DeleteObject(pen);

        SelectObject(mem_dc, old_bitmap);

        // Create mask bitmap (all white = all opaque for color icon)
        let mask = CreateBitmap(size, size, 1, 1, None);
        if mask.is_invalid() {
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);
            return Err(Error::from_win32());
        }

        // Fill mask with zeros (all opaque)
        let mask_dc = CreateCompatibleDC(screen_dc);
        let old_mask = SelectObject(mask_dc, mask);
        let black_brush2 = GetStockObject(BLACK_BRUSH);
        FillRect(mask_dc, &rect, HBRUSH(black_brush2.0));
        SelectObject(mask_dc, old_mask);
        let _ = DeleteDC(mask_dc);

        let _ = DeleteDC(mem_dc);
        ReleaseDC(None, screen_dc);

        // Create icon from bitmaps
        let icon_info = ICONINFO {
            fIcon: TRUE,
            xHotspot: 0,
            yHotspot: 0,
            hbmMask: mask,
            hbmColor: bitmap,
        };

        let icon = CreateIconIndirect(&icon_info)?;

        let _ = DeleteObject(bitmap);
        let _ = DeleteObject(mask);

        Ok(icon)
    }
}
