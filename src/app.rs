//! Application state and the Win32 message loop.
//!
//! Everything except the fetch itself runs on the GUI thread. Timer
//! ticks hand work to the fetch worker; the worker posts WM_FETCH_DONE
//! back, and the completion handler routes the outcome through the
//! address monitor out to the tray icon and dialogs.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, info};
use windows::core::*;
use windows::Win32::Foundation::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::NIN_BALLOONUSERCLICK;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::monitor::AddressMonitor;
use crate::net::{IpFetcher, PollGate, Poller};
use crate::platform::{dialogs, AutostartEntry, AutostartState, RegistryError};
use crate::ui::{menu, TrayIcon};

pub const WM_TRAY_ICON: u32 = WM_USER + 1;
pub const WM_FETCH_DONE: u32 = WM_USER + 2;

const POLL_TIMER_ID: usize = 1;
const POLL_INTERVAL_MS: u32 = 10_000;

/// Dialog title for autostart and registry messages.
const APP_NAME: &str = "IPNotifier";

/// Tray icon tooltip base text.
const TRAY_TEXT: &str = "IP Notifier";

/// Create the hidden window, start polling, and run the message loop
/// until the user exits from the tray menu.
pub fn run() -> anyhow::Result<()> {
    unsafe {
        let instance = GetModuleHandleW(None)?;

        let window_class = w!("IpNotifierWindow");
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(window_proc),
            hInstance: instance.into(),
            lpszClassName: window_class,
            ..Default::default()
        };

        RegisterClassExW(&wc);

        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            window_class,
            w!("IP Notifier"),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            None,
            None,
            instance,
            None,
        )?;

        let app_state = match AppState::new(hwnd) {
            Ok(state) => Rc::new(RefCell::new(state)),
            Err(e) => {
                dialogs::show_error(APP_NAME, &format!("Initialization failed: {e}"));
                return Err(e);
            }
        };
        APP_STATE.with(|state| *state.borrow_mut() = Some(app_state));

        // Poll every ten seconds, plus one check right away instead of
        // waiting out the first interval
        SetTimer(hwnd, POLL_TIMER_ID, POLL_INTERVAL_MS, None);
        with_app_state(|app| app.begin_fetch());

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).into() {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    Ok(())
}

struct AppState {
    tray_icon: TrayIcon,
    monitor: AddressMonitor,
    poller: Poller,
    gate: PollGate,
    autostart: AutostartEntry,
}

impl AppState {
    fn new(hwnd: HWND) -> anyhow::Result<Self> {
        let fetcher = IpFetcher::new()?;

        // The worker wakes the GUI thread with a posted message. HWND is
        // not Send, so the raw handle value crosses the thread boundary.
        let hwnd_value = hwnd.0 as isize;
        let poller = Poller::spawn(fetcher, move || {
            let hwnd = HWND(hwnd_value as *mut std::ffi::c_void);
            unsafe {
                let _ = PostMessageW(hwnd, WM_FETCH_DONE, WPARAM(0), LPARAM(0));
            }
        });

        let tray_icon = TrayIcon::new(hwnd, TRAY_TEXT)?;

        Ok(Self {
            tray_icon,
            monitor: AddressMonitor::new(),
            poller,
            gate: PollGate::default(),
            autostart: AutostartEntry::new(),
        })
    }

    /// Ask the worker for a fetch unless one is already running.
    fn begin_fetch(&mut self) {
        if !self.gate.try_begin() {
            debug!("Skipping poll, previous fetch still in flight");
            return;
        }
        self.poller.request_fetch();
    }

    /// Consume the completed fetch. Returns the error text to show when
    /// the fetch failed; the caller raises the dialog once the state
    /// borrow has been released.
    fn handle_fetch_done(&mut self) -> Option<String> {
        let outcome = self.poller.take_outcome()?;
        self.gate.finish();

        match outcome {
            Ok(address) => {
                info!("External IP: {address}");
                if let Some(change) = self.monitor.observe(&address) {
                    self.tray_icon.show_balloon(
                        "IP Change Detected",
                        &format!("Your new IP is: {}", change.current),
                    );
                }
                self.tray_icon
                    .set_tooltip(&format!("{TRAY_TEXT}: {}", self.monitor.current()));
                None
            }
            Err(e) => {
                error!("Error fetching IP: {e}");
                Some(format!("Error fetching IP: {e}"))
            }
        }
    }

    fn current_text(&self) -> String {
        format!("Current IP: {}", self.monitor.current())
    }

    fn show_current_balloon(&self) {
        self.tray_icon.show_balloon("Current IP", &self.current_text());
    }

    /// Flip the autostart entry. Returns the dialog text and whether it
    /// is an error, shown by the caller outside the state borrow.
    fn toggle_autostart(&self) -> (String, bool) {
        match self.autostart.toggle() {
            Ok(AutostartState::Enabled) => {
                info!("Auto start enabled.");
                ("Auto start enabled.".to_string(), false)
            }
            Ok(AutostartState::Disabled) => {
                info!("Auto start disabled.");
                ("Auto start disabled.".to_string(), false)
            }
            Err(RegistryError::AccessDenied) => {
                error!("Failed to open registry key. Access denied.");
                (
                    "Access denied. Please run the application as administrator.".to_string(),
                    true,
                )
            }
            Err(e) => {
                error!("Error accessing registry: {e}");
                (format!("Error accessing registry: {e}"), true)
            }
        }
    }
}

thread_local! {
    static APP_STATE: RefCell<Option<Rc<RefCell<AppState>>>> = const { RefCell::new(None) };
}

// Message boxes and TrackPopupMenu pump messages, so window_proc can
// re-enter while one is open. The state borrow is never held across
// them; handlers return the text to display instead.
fn with_app_state<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut AppState) -> R,
{
    APP_STATE.with(|state| state.borrow().as_ref().map(|app| f(&mut app.borrow_mut())))
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == POLL_TIMER_ID => {
            with_app_state(|app| app.begin_fetch());
            LRESULT(0)
        }
        WM_FETCH_DONE => {
            if let Some(failure) = with_app_state(|app| app.handle_fetch_done()).flatten() {
                dialogs::show_error("Error", &failure);
            }
            LRESULT(0)
        }
        WM_TRAY_ICON => {
            let event = (lparam.0 & 0xFFFF) as u32;
            match event {
                WM_LBUTTONUP => {
                    // Left click - balloon with the current address
                    with_app_state(|app| app.show_current_balloon());
                }
                NIN_BALLOONUSERCLICK => {
                    if let Some(text) = with_app_state(|app| app.current_text()) {
                        dialogs::show_info("IP Address", &text);
                    }
                }
                WM_RBUTTONUP => {
                    // Right click - show context menu
                    let mut pt = POINT::default();
                    let _ = GetCursorPos(&mut pt);
                    let _ = SetForegroundWindow(hwnd);
                    menu::show_context_menu(hwnd, pt.x, pt.y);
                }
                _ => {}
            }
            LRESULT(0)
        }
        WM_COMMAND => {
            let cmd_id = (wparam.0 & 0xFFFF) as u32;
            handle_menu_command(hwnd, cmd_id);
            LRESULT(0)
        }
        WM_DESTROY => {
            let _ = KillTimer(hwnd, POLL_TIMER_ID);
            with_app_state(|app| app.tray_icon.remove());
            APP_STATE.with(|state| state.borrow_mut().take());
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn handle_menu_command(hwnd: HWND, cmd_id: u32) {
    match cmd_id {
        menu::CMD_EXIT => unsafe {
            let _ = DestroyWindow(hwnd);
        },
        menu::CMD_TOGGLE_AUTOSTART => {
            if let Some((message, is_error)) = with_app_state(|app| app.toggle_autostart()) {
                if is_error {
                    dialogs::show_error(APP_NAME, &message);
                } else {
                    dialogs::show_info(APP_NAME, &message);
                }
            }
        }
        _ => {}
    }
}
