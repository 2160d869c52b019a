//! Synthetic keyboard and mouse input
//!
//! [`InputDriver`] is the seam between the session flow and the OS. The
//! system implementation lives in [`crate::platforms`].

use crate::errors::DriverError;
use crate::keys::KeyCombo;
use std::time::Duration;
use tracing::debug;

pub use crate::platforms::SystemInput;

/// Low-level input operations used by the session
pub trait InputDriver {
    /// Primary screen size in pixels
    fn screen_size(&self) -> Result<(u32, u32), DriverError>;

    /// Left click at absolute screen coordinates
    fn click(&self, x: i32, y: i32) -> Result<(), DriverError>;

    fn move_to(&self, x: i32, y: i32) -> Result<(), DriverError>;

    /// Press all keys in order, then release them in reverse
    fn press_combo(&self, combo: &KeyCombo) -> Result<(), DriverError>;

    /// Type one character regardless of keyboard layout
    fn type_char(&self, c: char) -> Result<(), DriverError>;
}

/// Point at a fraction of the screen, truncated toward zero.
///
/// `fraction_point((1920, 1080), 0.85, 0.7)` is `(1632, 756)`.
pub fn fraction_point(screen: (u32, u32), fx: f64, fy: f64) -> (i32, i32) {
    let (w, h) = screen;
    ((w as f64 * fx) as i32, (h as f64 * fy) as i32)
}

/// Type `text` one character at a time with `interval` between characters.
pub async fn type_text<D: InputDriver + ?Sized>(
    driver: &D,
    text: &str,
    interval: Duration,
) -> Result<(), DriverError> {
    debug!("[input] Typing {} characters", text.chars().count());
    for c in text.chars() {
        driver.type_char(c)?;
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    Ok(())
}
