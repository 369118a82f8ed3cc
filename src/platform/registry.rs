//! Windows Registry autostart management.
//!
//! The launch-at-login entry lives under the per-user Run key, so no
//! elevation is needed for the normal path. The value name is a fixed
//! GUID rather than the product name to avoid colliding with anything
//! else a user may have registered.

use thiserror::Error;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND};
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SZ,
};

/// Autostart service error types.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The Run key refused the requested access. Shown to the user as an
    /// instruction to relaunch elevated.
    #[error("Access denied")]
    AccessDenied,

    #[error("Failed to open Run key (code {0})")]
    OpenKey(u32),

    #[error("Failed to read autostart value (code {0})")]
    ReadValue(u32),

    #[error("Failed to write autostart value (code {0})")]
    WriteValue(u32),

    #[error("Failed to delete autostart value (code {0})")]
    DeleteValue(u32),

    #[error("Failed to resolve executable path: {0}")]
    ExePath(#[source] std::io::Error),
}

/// State the entry was left in after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutostartState {
    Enabled,
    Disabled,
}

/// Launch-at-login registry entry.
pub struct AutostartEntry {
    run_key_path: Vec<u16>,
    value_name: Vec<u16>,
}

impl AutostartEntry {
    const RUN_KEY: &'static str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Run";
    const VALUE_NAME: &'static str = "{C7F9A9A7-9D2F-4F3E-A60A-A7D0077CA9D7}";

    /// Entry under the real per-user Run key.
    pub fn new() -> Self {
        Self::with_location(Self::RUN_KEY, Self::VALUE_NAME)
    }

    /// Entry under an arbitrary key and value name. Tests point this at a
    /// scratch key so they never touch the real Run key.
    pub fn with_location(key_path: &str, value_name: &str) -> Self {
        Self {
            run_key_path: to_wide(key_path),
            value_name: to_wide(value_name),
        }
    }

    /// Whether the autostart value currently exists.
    ///
    /// A missing key or value reads as disabled; any other failure is
    /// reported as an error rather than guessed at.
    pub fn is_enabled(&self) -> Result<bool, RegistryError> {
        unsafe {
            let mut hkey = HKEY::default();
            let result = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                KEY_READ,
                &mut hkey,
            );

            if result == ERROR_FILE_NOT_FOUND {
                return Ok(false);
            }
            if result == ERROR_ACCESS_DENIED {
                return Err(RegistryError::AccessDenied);
            }
            if result.is_err() {
                return Err(RegistryError::OpenKey(result.0));
            }

            let probe = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                None,
                None,
                None,
                None,
            );

            let _ = RegCloseKey(hkey);

            if probe.is_ok() {
                Ok(true)
            } else if probe == ERROR_FILE_NOT_FOUND {
                Ok(false)
            } else {
                Err(RegistryError::ReadValue(probe.0))
            }
        }
    }

    /// Flip the entry: write the running executable's path when the value
    /// is absent, delete the value when it is present. Returns the state
    /// the entry was left in.
    pub fn toggle(&self) -> Result<AutostartState, RegistryError> {
        unsafe {
            let mut hkey = HKEY::default();
            let result = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                KEY_READ | KEY_WRITE,
                &mut hkey,
            );

            if result == ERROR_ACCESS_DENIED {
                return Err(RegistryError::AccessDenied);
            }
            if result.is_err() {
                return Err(RegistryError::OpenKey(result.0));
            }

            let probe = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                None,
                None,
                None,
                None,
            );

            let outcome = if probe == ERROR_FILE_NOT_FOUND {
                self.write_exe_path(hkey).map(|()| AutostartState::Enabled)
            } else if probe.is_ok() {
                let deleted = RegDeleteValueW(hkey, PCWSTR::from_raw(self.value_name.as_ptr()));
                if deleted.is_ok() || deleted == ERROR_FILE_NOT_FOUND {
                    Ok(AutostartState::Disabled)
                } else if deleted == ERROR_ACCESS_DENIED {
                    Err(RegistryError::AccessDenied)
                } else {
                    Err(RegistryError::DeleteValue(deleted.0))
                }
            } else {
                Err(RegistryError::ReadValue(probe.0))
            };

            let _ = RegCloseKey(hkey);

            outcome
        }
    }

    unsafe fn write_exe_path(&self, hkey: HKEY) -> Result<(), RegistryError> {
        let exe_path = std::env::current_exe().map_err(RegistryError::ExePath)?;
        let exe_path_wide = to_wide(&exe_path.to_string_lossy());

        let result = RegSetValueExW(
            hkey,
            PCWSTR::from_raw(self.value_name.as_ptr()),
            0,
            REG_SZ,
            Some(std::slice::from_raw_parts(
                exe_path_wide.as_ptr() as *const u8,
                exe_path_wide.len() * 2,
            )),
        );

        if result == ERROR_ACCESS_DENIED {
            Err(RegistryError::AccessDenied)
        } else if result.is_err() {
            Err(RegistryError::WriteValue(result.0))
        } else {
            Ok(())
        }
    }
}

impl Default for AutostartEntry {
    fn default() -> Self {
        Self::new()
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::System::Registry::{
        RegCreateKeyExW, RegDeleteKeyW, REG_CREATE_KEY_DISPOSITION, REG_OPTION_NON_VOLATILE,
    };

    /// Read a REG_SZ value back as a String, or None when absent.
    fn read_string_value(key_path: &str, value_name: &str) -> Option<String> {
        unsafe {
            let key_wide = to_wide(key_path);
            let value_wide = to_wide(value_name);

            let mut hkey = HKEY::default();
            let opened = RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(key_wide.as_ptr()),
                0,
                KEY_READ,
                &mut hkey,
            );
            if opened.is_err() {
                return None;
            }

            let mut data = vec![0u8; 4096];
            let mut data_size = data.len() as u32;
            let result = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(value_wide.as_ptr()),
                None,
                None,
                Some(data.as_mut_ptr()),
                Some(&mut data_size),
            );
            let _ = RegCloseKey(hkey);

            if result.is_err() {
                return None;
            }

            let wide: Vec<u16> = data[..data_size as usize]
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .take_while(|&c| c != 0)
                .collect();
            Some(String::from_utf16_lossy(&wide))
        }
    }

    /// Disposable registry key under HKCU for one test, deleted on drop.
    struct ScratchKey {
        path: String,
        path_wide: Vec<u16>,
    }

    impl ScratchKey {
        fn create(tag: &str) -> Self {
            let path = format!(r"Software\IpNotifierScratch\{}-{}", tag, std::process::id());
            let path_wide = to_wide(&path);

            unsafe {
                let mut hkey = HKEY::default();
                let mut disposition = REG_CREATE_KEY_DISPOSITION::default();
                let result = RegCreateKeyExW(
                    HKEY_CURRENT_USER,
                    PCWSTR::from_raw(path_wide.as_ptr()),
                    0,
                    PCWSTR::null(),
                    REG_OPTION_NON_VOLATILE,
                    KEY_READ | KEY_WRITE,
                    None,
                    &mut hkey,
                    Some(&mut disposition),
                );
                assert!(result.is_ok(), "failed to create scratch key: {}", result.0);
                let _ = RegCloseKey(hkey);
            }

            Self { path, path_wide }
        }

        fn entry(&self) -> AutostartEntry {
            AutostartEntry::with_location(&self.path, "TestAutostart")
        }
    }

    impl Drop for ScratchKey {
        fn drop(&mut self) {
            unsafe {
                let _ = RegDeleteKeyW(HKEY_CURRENT_USER, PCWSTR::from_raw(self.path_wide.as_ptr()));
            }
        }
    }

    #[test]
    fn missing_key_reads_as_disabled() {
        let entry =
            AutostartEntry::with_location(r"Software\IpNotifierScratch\NoSuchKey", "TestAutostart");
        assert!(!entry.is_enabled().unwrap());
    }

    #[test]
    fn missing_value_reads_as_disabled() {
        let scratch = ScratchKey::create("probe");
        assert!(!scratch.entry().is_enabled().unwrap());
    }

    #[test]
    fn toggle_round_trips_between_states() {
        let scratch = ScratchKey::create("toggle");
        let entry = scratch.entry();

        assert_eq!(entry.toggle().unwrap(), AutostartState::Enabled);
        assert!(entry.is_enabled().unwrap());

        assert_eq!(entry.toggle().unwrap(), AutostartState::Disabled);
        assert!(!entry.is_enabled().unwrap());
    }

    #[test]
    fn enabling_writes_the_executable_path() {
        let scratch = ScratchKey::create("exepath");
        let entry = scratch.entry();

        assert_eq!(entry.toggle().unwrap(), AutostartState::Enabled);

        let stored = read_string_value(&scratch.path, "TestAutostart").expect("value present");
        let exe = std::env::current_exe().unwrap();
        assert_eq!(stored, exe.to_string_lossy());
    }

    #[test]
    fn toggle_into_missing_key_reports_open_failure() {
        let entry =
            AutostartEntry::with_location(r"Software\IpNotifierScratch\NoSuchKey", "TestAutostart");
        match entry.toggle() {
            Err(RegistryError::OpenKey(_)) => {}
            other => panic!("expected OpenKey error, got {other:?}"),
        }
    }
}
