//! Windows implementation using Win32 `SendInput`, window and registry APIs.

pub mod input;
pub mod registry;
pub mod window;

pub use input::SystemInput;
pub use registry::read_open_command_values;
pub use window::{activate_window, list_top_level_windows, maximize_window};
