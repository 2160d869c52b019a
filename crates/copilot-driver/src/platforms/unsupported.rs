use crate::errors::DriverError;
use crate::input::InputDriver;
use crate::keys::KeyCombo;
use crate::window::TopLevelWindow;

fn unsupported(what: &str) -> DriverError {
    DriverError::UnsupportedPlatform(format!("{what} is only implemented on Windows"))
}

/// Input driver for targets without an implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInput;

impl InputDriver for SystemInput {
    fn screen_size(&self) -> Result<(u32, u32), DriverError> {
        Err(unsupported("screen size"))
    }

    fn click(&self, _x: i32, _y: i32) -> Result<(), DriverError> {
        Err(unsupported("mouse click"))
    }

    fn move_to(&self, _x: i32, _y: i32) -> Result<(), DriverError> {
        Err(unsupported("mouse move"))
    }

    fn press_combo(&self, combo: &KeyCombo) -> Result<(), DriverError> {
        Err(unsupported(&format!("key combo '{combo}'")))
    }

    fn type_char(&self, _c: char) -> Result<(), DriverError> {
        Err(unsupported("typing"))
    }
}

pub fn list_top_level_windows() -> Result<Vec<TopLevelWindow>, DriverError> {
    Err(unsupported("window enumeration"))
}

pub fn activate_window(_window: &TopLevelWindow) -> Result<(), DriverError> {
    Err(unsupported("window activation"))
}

pub fn maximize_window(_window: &TopLevelWindow) -> Result<(), DriverError> {
    Err(unsupported("window maximize"))
}

pub fn read_open_command_values() -> Vec<String> {
    Vec::new()
}
