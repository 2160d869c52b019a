//! Top-level window enumeration and placement

use crate::errors::DriverError;
use crate::window::TopLevelWindow;
use std::ffi::c_void;
use windows::core::BOOL;
use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, IsWindowVisible, SetForegroundWindow,
    ShowWindow, SW_MAXIMIZE,
};

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let found = &mut *(lparam.0 as *mut Vec<TopLevelWindow>);
    if IsWindowVisible(hwnd).as_bool() {
        let len = GetWindowTextLengthW(hwnd);
        if len > 0 {
            let mut buf = vec![0u16; len as usize + 1];
            let copied = GetWindowTextW(hwnd, &mut buf);
            if copied > 0 {
                found.push(TopLevelWindow {
                    id: hwnd.0 as isize,
                    title: String::from_utf16_lossy(&buf[..copied as usize]),
                });
            }
        }
    }
    BOOL(1)
}

fn hwnd(window: &TopLevelWindow) -> HWND {
    HWND(window.id as *mut c_void)
}

/// Visible, titled top-level windows in z-order (front-most first)
pub fn list_top_level_windows() -> Result<Vec<TopLevelWindow>, DriverError> {
    let mut found: Vec<TopLevelWindow> = Vec::new();
    unsafe {
        EnumWindows(
            Some(collect_window),
            LPARAM(&mut found as *mut Vec<TopLevelWindow> as isize),
        )
    }
    .map_err(|e| DriverError::Window(format!("EnumWindows failed: {e}")))?;
    Ok(found)
}

pub fn activate_window(window: &TopLevelWindow) -> Result<(), DriverError> {
    let ok = unsafe { SetForegroundWindow(hwnd(window)) };
    if !ok.as_bool() {
        return Err(DriverError::Window(format!(
            "SetForegroundWindow refused '{}'",
            window.title
        )));
    }
    Ok(())
}

pub fn maximize_window(window: &TopLevelWindow) -> Result<(), DriverError> {
    // Return value is the previous visibility state, not an error.
    let _ = unsafe { ShowWindow(hwnd(window), SW_MAXIMIZE) };
    Ok(())
}
