//! Input operations (mouse, keyboard) for Windows
//!
//! Everything goes through `SendInput`. Mouse coordinates are converted to
//! the normalized 0-65535 range so clicks land on the right pixel of the
//! primary screen.

use crate::errors::DriverError;
use crate::input::InputDriver;
use crate::keys::{Key, KeyCombo};
use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, VkKeyScanW, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_UNICODE,
    MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE,
    MOUSE_EVENT_FLAGS, MOUSEINPUT, VIRTUAL_KEY, VK_BACK, VK_CONTROL, VK_DELETE, VK_DOWN, VK_END,
    VK_ESCAPE, VK_F1, VK_HOME, VK_LEFT, VK_LWIN, VK_MENU, VK_NEXT, VK_PRIOR, VK_RETURN, VK_RIGHT,
    VK_SHIFT, VK_SPACE, VK_TAB, VK_UP,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SetCursorPos, SM_CXSCREEN, SM_CYSCREEN,
};

/// Input driver backed by Win32 `SendInput`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInput;

fn send(inputs: &[INPUT]) -> Result<(), DriverError> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(DriverError::Input(format!(
            "SendInput accepted {} of {} events (blocked by UIPI or another desktop?)",
            sent,
            inputs.len()
        )));
    }
    Ok(())
}

fn keyboard(vk: VIRTUAL_KEY, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: vk,
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn mouse(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Virtual key for `key`, and whether it needs the extended-key flag.
fn virtual_key(key: Key) -> Result<(VIRTUAL_KEY, bool), DriverError> {
    let mapped = match key {
        Key::Ctrl => (VK_CONTROL, false),
        Key::Alt => (VK_MENU, false),
        Key::Shift => (VK_SHIFT, false),
        Key::Win => (VK_LWIN, true),
        Key::Enter => (VK_RETURN, false),
        Key::Tab => (VK_TAB, false),
        Key::Escape => (VK_ESCAPE, false),
        Key::Backspace => (VK_BACK, false),
        Key::Delete => (VK_DELETE, true),
        Key::Space => (VK_SPACE, false),
        Key::Home => (VK_HOME, true),
        Key::End => (VK_END, true),
        Key::PageUp => (VK_PRIOR, true),
        Key::PageDown => (VK_NEXT, true),
        Key::Up => (VK_UP, true),
        Key::Down => (VK_DOWN, true),
        Key::Left => (VK_LEFT, true),
        Key::Right => (VK_RIGHT, true),
        Key::F(n) => (VIRTUAL_KEY(VK_F1.0 + (n.max(1) as u16 - 1)), false),
        Key::Char(c) if c.is_ascii_alphanumeric() => {
            (VIRTUAL_KEY(c.to_ascii_uppercase() as u16), false)
        }
        Key::Char(c) => {
            let mut units = [0u16; 2];
            let encoded = c.encode_utf16(&mut units);
            if encoded.len() != 1 {
                return Err(DriverError::InvalidKey(format!(
                    "'{c}' cannot be part of a key combination"
                )));
            }
            // Low byte is the virtual key for the active layout, -1 when unmapped.
            let scan = unsafe { VkKeyScanW(encoded[0]) };
            if scan == -1 {
                return Err(DriverError::InvalidKey(format!(
                    "'{c}' has no key on the current keyboard layout"
                )));
            }
            (VIRTUAL_KEY((scan as u16) & 0xff), false)
        }
    };
    Ok(mapped)
}

impl InputDriver for SystemInput {
    fn screen_size(&self) -> Result<(u32, u32), DriverError> {
        let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if w <= 0 || h <= 0 {
            return Err(DriverError::Input(format!(
                "GetSystemMetrics returned an empty screen ({w}x{h})"
            )));
        }
        Ok((w as u32, h as u32))
    }

    fn click(&self, x: i32, y: i32) -> Result<(), DriverError> {
        let (screen_width, screen_height) = self.screen_size()?;

        // Convert to normalized coordinates (0-65535 range)
        let abs_x = ((x as f64 * 65535.0) / screen_width as f64) as i32;
        let abs_y = ((y as f64 * 65535.0) / screen_height as f64) as i32;

        debug!("[input] click at ({}, {})", x, y);
        send(&[
            mouse(abs_x, abs_y, MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_MOVE),
            mouse(abs_x, abs_y, MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_LEFTDOWN),
            mouse(abs_x, abs_y, MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_LEFTUP),
        ])
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), DriverError> {
        unsafe { SetCursorPos(x, y) }
            .map_err(|e| DriverError::Input(format!("SetCursorPos({x}, {y}) failed: {e}")))
    }

    fn press_combo(&self, combo: &KeyCombo) -> Result<(), DriverError> {
        let mut downs = Vec::with_capacity(combo.keys().len());
        let mut ups = Vec::with_capacity(combo.keys().len());
        for key in combo.keys() {
            let (vk, extended) = virtual_key(*key)?;
            let flags = if extended {
                KEYEVENTF_EXTENDEDKEY
            } else {
                KEYBD_EVENT_FLAGS(0)
            };
            downs.push(keyboard(vk, 0, flags));
            ups.push(keyboard(vk, 0, flags | KEYEVENTF_KEYUP));
        }
        ups.reverse();
        downs.extend(ups);

        debug!("[input] key combo {}", combo);
        send(&downs)
    }

    fn type_char(&self, c: char) -> Result<(), DriverError> {
        if c == '\n' {
            return self.press_combo(&KeyCombo::single(Key::Enter));
        }

        let mut units = [0u16; 2];
        let mut events = Vec::with_capacity(4);
        for unit in c.encode_utf16(&mut units).iter() {
            events.push(keyboard(VIRTUAL_KEY(0), *unit, KEYEVENTF_UNICODE));
            events.push(keyboard(
                VIRTUAL_KEY(0),
                *unit,
                KEYEVENTF_UNICODE | KEYEVENTF_KEYUP,
            ));
        }
        send(&events)
    }
}
