//! OS-specific input, window and registry access
//!
//! Windows is the only implemented platform. Elsewhere every call reports
//! [`crate::DriverError::UnsupportedPlatform`] and the registry reads nothing.

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(not(target_os = "windows"))]
mod unsupported;

#[cfg(target_os = "windows")]
pub use self::windows::{
    activate_window, list_top_level_windows, maximize_window, read_open_command_values,
    SystemInput,
};

#[cfg(not(target_os = "windows"))]
pub use self::unsupported::{
    activate_window, list_top_level_windows, maximize_window, read_open_command_values,
    SystemInput,
};
