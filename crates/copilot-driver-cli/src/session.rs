//! One end-to-end run: launch VS Code, prompt Copilot, accept its code

use crate::cli::Args;
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use copilot_driver::{
    fraction_point, inspect_requirements, is_batch_file, launch_editor, maximize_editor_window,
    poll_until_target, type_text, Classifier, DriverError, ExecutableLocator, FrameDump,
    InputDriver, Key, KeyCombo, LocatedExecutable, PollReport, PollSpec, PrimaryMonitorCapturer,
    RegistryLookup, RequirementsStatus, ScreenCapturer, SystemInput, VisionClient, VisionConfig,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub const PIP_COMMAND: &str = "pip install -r requirements.txt";

/// Delay between typed characters
const TYPING_INTERVAL: Duration = Duration::from_millis(50);
const EDITOR_STARTUP: Duration = Duration::from_secs(5);
const TERMINAL_OPEN: Duration = Duration::from_secs(2);
const PANEL_OPEN: Duration = Duration::from_secs(2);
const CLICK_SETTLE: Duration = Duration::from_secs(1);
const INSTALL_SETTLE: Duration = Duration::from_secs(3);
/// Where the mouse is parked at the end
const PARK_POSITION: (i32, i32) = (100, 100);

/// Everything the flow needs after argument parsing
#[derive(Debug)]
pub struct SessionSettings {
    pub project_folder: PathBuf,
    pub prompt: String,
    /// `None` when the requirements step is skipped
    pub install: Option<PollSpec>,
    pub keep: PollSpec,
    pub frames: Option<FrameDump>,
}

impl SessionSettings {
    pub fn from_args(args: &Args) -> Result<Self> {
        let project_folder = args
            .resolve_project_folder()
            .ok_or_else(|| anyhow!("No --project-folder given and no home directory found"))?;

        let install = (!args.skip_install).then(|| {
            PollSpec::installation()
                .with_interval(Duration::from_secs(args.install_interval))
                .with_max_wait(Duration::from_secs(args.install_max_wait))
        });
        let keep = PollSpec::keep_button()
            .with_interval(Duration::from_secs(args.keep_interval))
            .with_max_wait(Duration::from_secs(args.keep_max_wait))
            .with_initial_delay(Duration::from_secs(args.keep_interval));

        Ok(Self {
            project_folder,
            prompt: args.prompt.clone(),
            install,
            keep,
            frames: args
                .save_frames
                .as_ref()
                .and_then(|dir| FrameDump::create(dir.clone())),
        })
    }
}

#[derive(Debug)]
pub struct SessionReport {
    pub install: Option<PollReport>,
    pub keep: PollReport,
}

/// Title fragments that identify the editor window for this project
pub fn window_hints(folder: &Path) -> Vec<String> {
    [folder.file_name(), folder.parent().and_then(Path::file_name)]
        .into_iter()
        .flatten()
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

fn combo(keys: &[Key]) -> KeyCombo {
    KeyCombo::new(keys.to_vec())
}

const NOT_FOUND_HEADER: &str = "VS Code executable not found.";

/// Header shown when a located executable could not be started
fn launch_failure_header(executable: &Path, error: &io::Error) -> String {
    format!(
        "VS Code was found at {} but could not be started: {}",
        executable.display(),
        error
    )
}

/// Ask the operator for the executable, after printing `header`.
fn prompt_for_executable<R: RegistryLookup>(
    locator: &ExecutableLocator<R>,
    header: &str,
) -> Result<LocatedExecutable> {
    println!("{}", header.red().bold());
    println!("Please ensure VS Code is installed and either:");
    println!("  1. Added to PATH (Shell Command: Install 'code' command in PATH)");
    println!("  2. Installed in a standard location");
    println!("\nChecked locations:");
    for (path, exists) in locator.diagnostic_paths() {
        let status = if exists {
            "EXISTS".green()
        } else {
            "NOT FOUND".red()
        };
        println!("  {} - {}", path.display(), status);
    }

    print!("\nEnter the full path to Code.exe (or press Enter to exit): ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read executable path from stdin")?;

    if line.trim().is_empty() {
        return Err(DriverError::ExecutableNotFound("no path entered".to_string()).into());
    }
    locator.accept_manual(&line).ok_or_else(|| {
        DriverError::ExecutableNotFound(format!("'{}' does not exist", line.trim())).into()
    })
}

/// Find the editor executable, asking the operator as a last resort.
pub fn resolve_executable(code_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = code_path {
        info!("[locator] Using --code-path {}", path.display());
        return Ok(path.to_path_buf());
    }
    let locator = ExecutableLocator::from_env();
    let found = match locator.locate() {
        Some(found) => found,
        None => prompt_for_executable(&locator, NOT_FOUND_HEADER)?,
    };
    Ok(found.path)
}

/// Launch the editor. A plain executable that vanished gets one manual retry.
pub fn launch(executable: &Path, folder: &Path) -> Result<()> {
    match launch_editor(executable, folder) {
        Ok(_child) => Ok(()),
        Err(DriverError::LaunchFailed { source, .. })
            if source.kind() == io::ErrorKind::NotFound && !is_batch_file(executable) =>
        {
            warn!(
                "[launcher] {} could not be started: {}",
                executable.display(),
                source
            );
            let header = launch_failure_header(executable, &source);
            let manual = prompt_for_executable(&ExecutableLocator::from_env(), &header)?;
            launch_editor(&manual.path, folder)
                .map(|_| ())
                .context("Failed to launch VS Code")
        }
        Err(e) => Err(e).context("Failed to launch VS Code"),
    }
}

/// Click at a fraction of the screen. Failures are logged, not fatal.
async fn click_fraction<D: InputDriver + ?Sized>(input: &D, fx: f64, fy: f64, what: &str) {
    let clicked = input.screen_size().and_then(|size| {
        let (x, y) = fraction_point(size, fx, fy);
        info!("[session] Clicking {} at ({}, {})", what, x, y);
        input.click(x, y)
    });
    match clicked {
        Ok(()) => sleep(CLICK_SETTLE).await,
        Err(e) => warn!("[session] Error clicking {}: {}", what, e),
    }
}

/// Install `requirements.txt` in the integrated terminal and wait for pip.
async fn install_requirements<D, C, K>(
    input: &D,
    capturer: &C,
    classifier: &K,
    settings: &SessionSettings,
) -> Result<Option<PollReport>>
where
    D: InputDriver + ?Sized,
    C: ScreenCapturer + ?Sized,
    K: Classifier + ?Sized,
{
    let Some(spec) = &settings.install else {
        info!("[session] Skipping package installation");
        return Ok(None);
    };

    let package_count = match inspect_requirements(&settings.project_folder) {
        Ok(RequirementsStatus::Present { package_count, .. }) => package_count,
        Ok(RequirementsStatus::Empty(_)) => {
            info!("[session] requirements.txt is empty, skipping package installation");
            return Ok(None);
        }
        Ok(RequirementsStatus::Missing(path)) => {
            info!(
                "[session] requirements.txt not found at {}, skipping package installation",
                path.display()
            );
            return Ok(None);
        }
        Err(e) => {
            warn!("[session] Error reading requirements.txt: {}", e);
            return Ok(None);
        }
    };

    info!(
        "[session] Found requirements.txt with {} packages, installing",
        package_count
    );
    type_text(input, PIP_COMMAND, TYPING_INTERVAL).await?;
    input.press_combo(&KeyCombo::single(Key::Enter))?;

    let report =
        poll_until_target(spec, capturer, classifier, settings.frames.as_ref(), || Ok(())).await?;
    if !report.reached() {
        warn!("[session] Installation monitoring timed out, assuming installation is complete");
    }
    sleep(INSTALL_SETTLE).await;
    Ok(Some(report))
}

/// Everything after the editor window is up: terminal, requirements,
/// Copilot prompt, and the wait for the Keep button.
pub async fn drive_copilot<D, C, K>(
    input: &D,
    capturer: &C,
    classifier: &K,
    settings: &SessionSettings,
) -> Result<SessionReport>
where
    D: InputDriver + ?Sized,
    C: ScreenCapturer + ?Sized,
    K: Classifier + ?Sized,
{
    input.press_combo(&combo(&[Key::Ctrl, Key::Shift, Key::Char('`')]))?;
    info!("[session] Opened integrated terminal");
    sleep(TERMINAL_OPEN).await;

    let install = install_requirements(input, capturer, classifier, settings).await?;

    click_fraction(input, 0.85, 0.70, "chat panel").await;
    input.press_combo(&combo(&[Key::Ctrl, Key::Shift, Key::Char('i')]))?;
    info!("[session] Opened Copilot Chat panel in Agent mode");
    sleep(PANEL_OPEN).await;
    click_fraction(input, 0.85, 0.75, "chat input").await;

    type_text(input, &settings.prompt, TYPING_INTERVAL).await?;
    input.press_combo(&KeyCombo::single(Key::Enter))?;
    info!("[session] Prompt sent to Copilot");

    let accept = combo(&[Key::Ctrl, Key::Enter]);
    let keep = poll_until_target(
        &settings.keep,
        capturer,
        classifier,
        settings.frames.as_ref(),
        || {
            info!("[session] Pressing {} to accept the generated code", accept);
            input.press_combo(&accept)
        },
    )
    .await?;

    Ok(SessionReport { install, keep })
}

pub fn print_report(report: &SessionReport) {
    let keep = &report.keep;
    let elapsed = keep.outcome.elapsed().as_secs();

    if keep.reached() {
        println!(
            "\n{} GitHub Copilot has finished generating code!",
            "SUCCESS:".bold().green()
        );
        match &keep.action_error {
            None => println!(
                "{} The 'Keep' button was detected as enabled and accepted with Ctrl+Enter",
                "✓".green()
            ),
            Some(e) => println!(
                "{} The 'Keep' button was enabled but Ctrl+Enter failed: {}",
                "⚠".yellow(),
                e
            ),
        }
    } else {
        println!(
            "\n{} Monitoring completed after {}s",
            "TIMEOUT:".bold().yellow(),
            elapsed
        );
        println!("Keep button status was not definitively detected as enabled");
        println!("You may need to check the GitHub Copilot Chat panel manually");
    }

    println!("Total monitoring time: {elapsed}s");
    println!("Screenshots captured: {}", keep.outcome.attempts());
    let errors = keep.state.error_count();
    if errors > 0 {
        println!("Recoverable errors while monitoring: {}", errors.to_string().yellow());
    }
    if let Some(install) = &report.install {
        let status = if install.reached() {
            "complete".green()
        } else {
            "assumed complete".yellow()
        };
        println!(
            "Package installation: {} ({} screenshots)",
            status,
            install.outcome.attempts()
        );
    }
}

/// Run the whole session against the real desktop.
pub async fn run(args: Args) -> Result<SessionReport> {
    let settings = SessionSettings::from_args(&args)?;
    info!(
        "[session] Project folder: {}",
        settings.project_folder.display()
    );
    if !settings.project_folder.is_dir() {
        warn!(
            "[session] {} is not a directory; VS Code will open it anyway",
            settings.project_folder.display()
        );
    }

    let config = VisionConfig::from_env().context("Vision model is not configured")?;
    info!(
        "[vision] Using model {} at {}",
        config.model,
        config.responses_url()
    );
    let classifier = VisionClient::new(config).context("Failed to build vision client")?;

    let executable = resolve_executable(args.code_path.as_deref())?;
    launch(&executable, &settings.project_folder)?;
    sleep(EDITOR_STARTUP).await;

    let input = SystemInput;
    let hints = window_hints(&settings.project_folder);
    maximize_editor_window(&input, &hints).await;

    let report = drive_copilot(&input, &PrimaryMonitorCapturer, &classifier, &settings).await?;
    print_report(&report);

    if let Err(e) = input.move_to(PARK_POSITION.0, PARK_POSITION.1) {
        warn!("[session] Could not move the mouse aside: {}", e);
    }
    Ok(report)
}
