//! Windows registry backend for the adapter device class key.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;

use windows::Win32::Foundation::{
    ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_NO_MORE_ITEMS, ERROR_SUCCESS, WIN32_ERROR,
};
use windows::Win32::System::Registry::{
    HKEY, HKEY_LOCAL_MACHINE, KEY_READ, KEY_SET_VALUE, KEY_WOW64_64KEY, REG_EXPAND_SZ, REG_SAM_FLAGS,
    REG_SZ, REG_VALUE_TYPE, RegCloseKey, RegDeleteValueW, RegEnumKeyExW, RegOpenKeyExW,
    RegQueryValueExW, RegSetValueExW,
};
use windows::core::{PCWSTR, PWSTR};

use super::{RegistryBackend, StoreError};

/// Parent of all device class keys under `HKEY_LOCAL_MACHINE`.
const CLASS_ROOT: &str = r"SYSTEM\CurrentControlSet\Control\Class";

/// Longest registry key name, in UTF-16 units, plus terminator.
const MAX_KEY_NAME: usize = 256;

/// [`RegistryBackend`] over `HKLM\SYSTEM\CurrentControlSet\Control\Class\{guid}`.
///
/// Always uses the 64-bit registry view. Writing requires an elevated process.
#[derive(Debug, Clone)]
pub struct WindowsRegistry {
    class_key: String,
}

impl WindowsRegistry {
    /// Creates a backend for the device class identified by `class_guid`
    /// (braced form, e.g. `{4d36e972-e325-11ce-bfc1-08002be10318}`).
    #[must_use]
    pub fn new(class_guid: &str) -> Self {
        Self {
            class_key: format!(r"{CLASS_ROOT}\{class_guid}"),
        }
    }

    /// Returns the full class key path below `HKEY_LOCAL_MACHINE`.
    #[must_use]
    pub fn class_key(&self) -> &str {
        &self.class_key
    }

    fn subkey_path(&self, subkey: &str) -> String {
        format!(r"{}\{subkey}", self.class_key)
    }

    fn open(&self, path: &str, access: REG_SAM_FLAGS) -> Result<OwnedKey, StoreError> {
        let wide = wide_null(path);
        let mut handle = HKEY::default();

        // SAFETY: `wide` is NUL-terminated and outlives the call; `handle` is a
        // valid out-pointer.
        let rc = unsafe {
            RegOpenKeyExW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide.as_ptr()),
                None,
                access | KEY_WOW64_64KEY,
                &raw mut handle,
            )
        };

        check(rc, "open", path)?;
        Ok(OwnedKey(handle))
    }
}

impl RegistryBackend for WindowsRegistry {
    fn subkeys(&self) -> Result<Vec<String>, StoreError> {
        let key = self.open(&self.class_key, KEY_READ)?;
        let mut names = Vec::new();

        for index in 0u32.. {
            let mut name_buf = [0u16; MAX_KEY_NAME];
            let mut name_len = MAX_KEY_NAME as u32;

            // SAFETY: `name_buf` has room for `name_len` UTF-16 units.
            let rc = unsafe {
                RegEnumKeyExW(
                    key.0,
                    index,
                    Some(PWSTR(name_buf.as_mut_ptr())),
                    &raw mut name_len,
                    None,
                    None,
                    None,
                    None,
                )
            };

            if rc == ERROR_NO_MORE_ITEMS {
                break;
            }
            if rc != ERROR_SUCCESS {
                tracing::debug!("Skipping subkey #{index} of {}: {}", self.class_key, describe(rc));
                continue;
            }

            names.push(utf16_trimmed(&name_buf, name_len as usize));
        }

        Ok(names)
    }

    fn read_string(&self, subkey: &str, name: &str) -> Result<Option<String>, StoreError> {
        let path = self.subkey_path(subkey);
        let key = self.open(&path, KEY_READ)?;
        let value_name = wide_null(name);
        let value_path = format!(r"{path}\{name}");

        let mut value_type = REG_VALUE_TYPE(0);
        let mut byte_len = 0u32;

        // SAFETY: size query only; no data buffer is passed.
        let rc = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(value_name.as_ptr()),
                None,
                Some(&raw mut value_type),
                None,
                Some(&raw mut byte_len),
            )
        };

        if rc == ERROR_FILE_NOT_FOUND {
            return Ok(None);
        }
        check(rc, "read", &value_path)?;

        if value_type != REG_SZ && value_type != REG_EXPAND_SZ {
            return Err(StoreError::UnexpectedType { path: value_path });
        }

        // Round up to whole UTF-16 units.
        let mut buf = vec![0u16; (byte_len as usize).div_ceil(2).max(1)];
        let mut byte_len = u32::try_from(buf.len() * 2).unwrap_or(u32::MAX);

        // SAFETY: `buf` holds `byte_len` bytes and is suitably aligned for u8 writes.
        let rc = unsafe {
            RegQueryValueExW(
                key.0,
                PCWSTR(value_name.as_ptr()),
                None,
                Some(&raw mut value_type),
                Some(buf.as_mut_ptr().cast::<u8>()),
                Some(&raw mut byte_len),
            )
        };

        if rc == ERROR_MORE_DATA {
            // The value grew between calls; report it rather than retrying.
            return Err(StoreError::Access {
                operation: "read",
                path: value_path,
                reason: "value changed while reading".to_string(),
            });
        }
        check(rc, "read", &value_path)?;

        Ok(Some(utf16_trimmed(&buf, byte_len as usize / 2)))
    }

    fn write_string(&self, subkey: &str, name: &str, data: &str) -> Result<(), StoreError> {
        let path = self.subkey_path(subkey);
        let key = self.open(&path, KEY_SET_VALUE)?;
        let value_name = wide_null(name);
        let wide = wide_null(data);

        // SAFETY: reinterpreting a u16 slice as bytes; length is exact.
        let bytes = unsafe { std::slice::from_raw_parts(wide.as_ptr().cast::<u8>(), wide.len() * 2) };

        // SAFETY: `value_name` is NUL-terminated; `bytes` includes the terminator.
        let rc = unsafe { RegSetValueExW(key.0, PCWSTR(value_name.as_ptr()), None, REG_SZ, Some(bytes)) };

        check(rc, "write", &format!(r"{path}\{name}"))
    }

    fn delete_value(&self, subkey: &str, name: &str) -> Result<bool, StoreError> {
        let path = self.subkey_path(subkey);
        let key = self.open(&path, KEY_SET_VALUE)?;
        let value_name = wide_null(name);

        // SAFETY: `value_name` is NUL-terminated and outlives the call.
        let rc = unsafe { RegDeleteValueW(key.0, PCWSTR(value_name.as_ptr())) };

        if rc == ERROR_FILE_NOT_FOUND {
            return Ok(false);
        }
        check(rc, "delete", &format!(r"{path}\{name}"))?;
        Ok(true)
    }
}

/// Registry handle closed on drop.
struct OwnedKey(HKEY);

impl Drop for OwnedKey {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful RegOpenKeyExW.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

fn check(rc: WIN32_ERROR, operation: &'static str, path: &str) -> Result<(), StoreError> {
    if rc == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(StoreError::Access {
            operation,
            path: path.to_string(),
            reason: describe(rc),
        })
    }
}

fn describe(rc: WIN32_ERROR) -> String {
    windows::core::Error::from(rc).message()
}

fn wide_null(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

fn utf16_trimmed(buf: &[u16], len: usize) -> String {
    let slice = &buf[..len.min(buf.len())];
    let end = slice.iter().position(|&c| c == 0).unwrap_or(slice.len());
    String::from_utf16_lossy(&slice[..end])
}
