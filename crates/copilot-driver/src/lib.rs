//! Drive VS Code and GitHub Copilot Chat from the outside
//!
//! This crate holds the pieces of the session: finding and launching the
//! editor, sending synthetic keyboard and mouse input, capturing the screen,
//! and the poll loop that asks a vision model whether the UI has reached a
//! target state.
//!
//! OS glue (input, windows, registry) is implemented for Windows. On other
//! targets those calls return [`DriverError::UnsupportedPlatform`]; the rest
//! of the crate is portable.

pub mod errors;
pub mod frame_dump;
pub mod input;
pub mod keys;
pub mod launcher;
pub mod locator;
pub mod platforms;
pub mod poll;
pub mod requirements;
pub mod screenshot;
pub mod window;

pub use errors::DriverError;
pub use frame_dump::FrameDump;
pub use input::{fraction_point, type_text, InputDriver, SystemInput};
pub use keys::{Key, KeyCombo};
pub use launcher::{build_launch_command, is_batch_file, launch_editor};
pub use locator::{
    command_line_executable, CandidateSource, ExecutableLocator, LocatedExecutable, RegistryLookup,
    SystemRegistry, EDITOR_ALIAS,
};
pub use poll::{
    poll_until_target, PollError, PollOutcome, PollReport, PollSpec, PollState, ProgressTicker,
    WaitReason,
};
pub use requirements::{count_packages, inspect_requirements, RequirementsStatus};
pub use screenshot::{
    Frame, PrimaryMonitorCapturer, ScreenCapturer, ScreenshotResult, DEFAULT_MAX_DIMENSION,
};
pub use window::{maximize_editor_window, pick_editor_window, MaximizeOutcome, TopLevelWindow};

// Re-export the classifier side so callers need only one crate
pub use copilot_driver_vision::{
    Classifier, ClassifyError, Verdict, VisionClient, VisionConfig, INSTALLATION_PROMPT,
    KEEP_BUTTON_PROMPT,
};
