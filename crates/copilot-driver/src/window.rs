//! Bringing the editor window to the front, maximized

use crate::input::InputDriver;
use crate::keys::{Key, KeyCombo};
use crate::platforms;
use std::time::Duration;
use tracing::{info, warn};

/// A visible top-level window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelWindow {
    /// Native handle value
    pub id: isize,
    pub title: String,
}

/// How the editor window ended up maximized (or not)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaximizeOutcome {
    /// Found by title and maximized directly
    Window(String),
    /// `alt+tab` then `win+up`
    KeyboardShortcut,
    Failed(String),
}

fn is_editor_title(title: &str) -> bool {
    title.contains("Visual Studio Code") || title.contains("Code")
}

/// Choose the editor window to maximize.
///
/// Candidates are windows whose title mentions "Visual Studio Code" or
/// "Code". One whose title contains any of `hints` (case-insensitive) wins;
/// otherwise the front-most candidate is used.
pub fn pick_editor_window<'a>(
    windows: &'a [TopLevelWindow],
    hints: &[String],
) -> Option<&'a TopLevelWindow> {
    let hints: Vec<String> = hints
        .iter()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
        .collect();
    let candidates: Vec<&TopLevelWindow> =
        windows.iter().filter(|w| is_editor_title(&w.title)).collect();

    candidates
        .iter()
        .find(|w| {
            let title = w.title.to_lowercase();
            hints.iter().any(|h| title.contains(h.as_str()))
        })
        .or_else(|| candidates.first())
        .copied()
}

async fn maximize_by_title(hints: &[String]) -> Result<String, String> {
    let windows = platforms::list_top_level_windows().map_err(|e| e.to_string())?;
    let target = pick_editor_window(&windows, hints)
        .ok_or_else(|| "no VS Code window found".to_string())?;

    info!("[window] Found VS Code window: {}", target.title);
    platforms::activate_window(target).map_err(|e| e.to_string())?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    platforms::maximize_window(target).map_err(|e| e.to_string())?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    Ok(target.title.clone())
}

/// Maximize the editor, falling back to keyboard shortcuts.
///
/// Never fails the session: a window that stays small is only logged.
pub async fn maximize_editor_window<D: InputDriver + ?Sized>(
    input: &D,
    hints: &[String],
) -> MaximizeOutcome {
    match maximize_by_title(hints).await {
        Ok(title) => {
            info!("[window] VS Code window maximized");
            return MaximizeOutcome::Window(title);
        }
        Err(e) => warn!("[window] Direct maximize failed ({}), trying keyboard shortcut", e),
    }

    let fallback = async {
        input.press_combo(&KeyCombo::new(vec![Key::Alt, Key::Tab]))?;
        tokio::time::sleep(Duration::from_millis(500)).await;
        input.press_combo(&KeyCombo::new(vec![Key::Win, Key::Up]))?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok::<(), crate::DriverError>(())
    };

    match fallback.await {
        Ok(()) => {
            info!("[window] VS Code window maximized using keyboard shortcut");
            MaximizeOutcome::KeyboardShortcut
        }
        Err(e) => {
            warn!("[window] Could not maximize window: {}. Continuing with current size", e);
            MaximizeOutcome::Failed(e.to_string())
        }
    }
}
