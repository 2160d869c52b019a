//! Registry lookup of the VS Code "open with" command

use std::ffi::c_void;
use tracing::debug;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::System::Registry::{
    RegGetValueW, HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, RRF_RT_REG_SZ,
};

const OPEN_COMMAND_KEY: PCWSTR =
    w!("Software\\Classes\\Applications\\Code.exe\\shell\\open\\command");

fn read_default_string(root: HKEY) -> Option<String> {
    unsafe {
        let mut size: u32 = 0;
        let status = RegGetValueW(
            root,
            OPEN_COMMAND_KEY,
            PCWSTR::null(),
            RRF_RT_REG_SZ,
            None,
            None,
            Some(&mut size as *mut u32),
        );
        if status != ERROR_SUCCESS || size == 0 {
            return None;
        }

        let mut buf = vec![0u16; (size as usize).div_ceil(2)];
        let status = RegGetValueW(
            root,
            OPEN_COMMAND_KEY,
            PCWSTR::null(),
            RRF_RT_REG_SZ,
            None,
            Some(buf.as_mut_ptr() as *mut c_void),
            Some(&mut size as *mut u32),
        );
        if status != ERROR_SUCCESS {
            return None;
        }

        let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
        Some(String::from_utf16_lossy(&buf[..len]))
    }
}

/// Default values of the open-command key, HKCU first then HKLM.
pub fn read_open_command_values() -> Vec<String> {
    let values: Vec<String> = [HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE]
        .into_iter()
        .filter_map(read_default_string)
        .collect();
    debug!("[registry] Found {} open-command value(s)", values.len());
    values
}
