//! Poll the screen with a vision classifier until the UI reaches a target state
//!
//! One primitive, [`poll_until_target`], serves every call-site. A call-site
//! is described by a [`PollSpec`]: which question to ask, which JSON field to
//! read, which value ends the loop, and the timing.
//!
//! The loop has two states, waiting and done. Capture, transport and parse
//! failures are recoverable and count as waiting. The deadline is a soft stop
//! reported as [`PollOutcome::TimedOut`], never as an error. Only a
//! configuration failure of the classifier ends the loop with `Err`.

use crate::errors::DriverError;
use crate::frame_dump::FrameDump;
use crate::screenshot::{Frame, ScreenCapturer, DEFAULT_MAX_DIMENSION};
use copilot_driver_vision::{
    truncate_for_log, Classifier, ClassifyError, Verdict, INSTALLATION_PROMPT, KEEP_BUTTON_PROMPT,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// How often a "still monitoring" line is logged
pub const PROGRESS_EVERY: Duration = Duration::from_secs(15);

/// Decides when the next "still monitoring" line is due
#[derive(Debug, Clone, Copy)]
pub struct ProgressTicker {
    every: Duration,
    next: Duration,
}

impl ProgressTicker {
    pub fn new(every: Duration) -> Self {
        Self { every, next: every }
    }

    /// True when `elapsed` has crossed the next mark. Marks skipped by a
    /// long iteration are folded into one line.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if self.every.is_zero() || elapsed < self.next {
            return false;
        }
        while self.next <= elapsed {
            self.next += self.every;
        }
        true
    }
}

/// Parameters of one call-site
#[derive(Debug, Clone)]
pub struct PollSpec {
    /// Short name used in log prefixes and frame file names
    pub name: String,
    pub prompt: String,
    /// JSON field the verdict is read from
    pub field: String,
    /// Value that ends the loop
    pub target: String,
    /// Known non-target values; anything else is logged as unexpected
    pub waiting: Vec<String>,
    pub interval: Duration,
    pub max_wait: Duration,
    /// Wait before the first capture; the deadline starts after it
    pub initial_delay: Duration,
    /// Longest image side sent to the classifier
    pub max_dimension: Option<u32>,
}

impl PollSpec {
    /// Copilot's "Keep" button becoming enabled
    pub fn keep_button() -> Self {
        Self {
            name: "keep_button".to_string(),
            prompt: KEEP_BUTTON_PROMPT.to_string(),
            field: "button".to_string(),
            target: "enabled".to_string(),
            waiting: vec!["disabled".to_string()],
            interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(120),
            // Copilot needs a moment to start and grey the button out
            initial_delay: Duration::from_secs(3),
            max_dimension: Some(DEFAULT_MAX_DIMENSION),
        }
    }

    /// `pip install` finishing in the integrated terminal
    pub fn installation() -> Self {
        Self {
            name: "install".to_string(),
            prompt: INSTALLATION_PROMPT.to_string(),
            field: "installation_status".to_string(),
            target: "complete".to_string(),
            waiting: vec!["in_progress".to_string()],
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(300),
            initial_delay: Duration::from_secs(5),
            max_dimension: Some(DEFAULT_MAX_DIMENSION),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }
}

/// Failures inside one iteration
#[derive(Debug, Error)]
pub enum PollError {
    #[error("capture failed: {0}")]
    Capture(#[from] DriverError),

    #[error("classifier request failed: {0}")]
    Transport(String),

    #[error("classifier output unusable: {0}")]
    Parse(String),

    /// Not recoverable; ends the loop
    #[error("classifier unusable: {0}")]
    Fatal(ClassifyError),
}

impl PollError {
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PollError::Fatal(_))
    }
}

impl From<ClassifyError> for PollError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Transport(_) | ClassifyError::Status { .. } => {
                PollError::Transport(err.to_string())
            }
            ClassifyError::Unparseable { .. } => PollError::Parse(err.to_string()),
            ClassifyError::Config(_) => PollError::Fatal(err),
        }
    }
}

/// Why an iteration did not end the loop
#[derive(Debug)]
pub enum WaitReason {
    /// A known waiting value such as `disabled`
    Pending(String),
    Unexpected(String),
    MissingField,
    Error(PollError),
}

impl fmt::Display for WaitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitReason::Pending(v) => write!(f, "still {v}"),
            WaitReason::Unexpected(v) => write!(f, "unexpected value '{v}'"),
            WaitReason::MissingField => f.write_str("recognized field missing"),
            WaitReason::Error(e) => write!(f, "{e}"),
        }
    }
}

/// Loop state threaded through every iteration
#[derive(Debug, Clone)]
pub struct PollState {
    /// Captures taken so far
    pub attempts: u32,
    pub started: Instant,
    pub deadline: Instant,
    pub target_reached: bool,
    pub last_value: Option<String>,
    pub capture_errors: u32,
    pub transport_errors: u32,
    pub parse_errors: u32,
    pub missing_field: u32,
    pub unexpected_values: u32,
}

impl PollState {
    fn start(max_wait: Duration) -> Self {
        let started = Instant::now();
        Self {
            attempts: 0,
            started,
            deadline: started + max_wait,
            target_reached: false,
            last_value: None,
            capture_errors: 0,
            transport_errors: 0,
            parse_errors: 0,
            missing_field: 0,
            unexpected_values: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Total recoverable errors of every kind
    pub fn error_count(&self) -> u32 {
        self.capture_errors + self.transport_errors + self.parse_errors
    }

    fn record(&mut self, reason: &WaitReason) {
        match reason {
            WaitReason::Pending(v) => self.last_value = Some(v.clone()),
            WaitReason::Unexpected(v) => {
                self.unexpected_values += 1;
                self.last_value = Some(v.clone());
            }
            WaitReason::MissingField => self.missing_field += 1,
            WaitReason::Error(PollError::Capture(_)) => self.capture_errors += 1,
            WaitReason::Error(PollError::Transport(_)) => self.transport_errors += 1,
            WaitReason::Error(PollError::Parse(_)) => self.parse_errors += 1,
            WaitReason::Error(PollError::Fatal(_)) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Reached { attempts: u32, elapsed: Duration },
    TimedOut { attempts: u32, elapsed: Duration },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Reached { attempts, .. } | PollOutcome::TimedOut { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            PollOutcome::Reached { elapsed, .. } | PollOutcome::TimedOut { elapsed, .. } => {
                *elapsed
            }
        }
    }
}

#[derive(Debug)]
pub struct PollReport {
    pub outcome: PollOutcome,
    pub state: PollState,
    /// Set when the target was reached but the action itself failed
    pub action_error: Option<DriverError>,
}

impl PollReport {
    pub fn reached(&self) -> bool {
        matches!(self.outcome, PollOutcome::Reached { .. })
    }
}

/// Capture, encode and classify one frame.
async fn check_frame<C, K>(
    spec: &PollSpec,
    capturer: &C,
    classifier: &K,
    frames: Option<&FrameDump>,
    index: u32,
    budget: Duration,
) -> Result<Verdict, PollError>
where
    C: ScreenCapturer + ?Sized,
    K: Classifier + ?Sized,
{
    let shot = capturer.capture()?;
    let (frame, png) = Frame::encode(index, &shot, spec.max_dimension)?;
    debug!(
        "[poll:{}] Frame {} captured ({}x{}, {} bytes)",
        spec.name,
        frame.index,
        frame.width,
        frame.height,
        png.len()
    );
    if let Some(dump) = frames {
        dump.save(&spec.name, index, &png);
    }

    let object = timeout(budget, classifier.classify(&frame.base64_png, &spec.prompt))
        .await
        .map_err(|_| {
            PollError::Transport(format!(
                "classification timed out after {:.1}s",
                budget.as_secs_f32()
            ))
        })??;

    debug!(
        "[poll:{}] Classifier returned: {}",
        spec.name,
        truncate_for_log(&serde_json::Value::Object(object.clone()).to_string(), 200)
    );
    Ok(Verdict::read(&object, &spec.field))
}

/// Poll until the classifier reports `spec.target` or `spec.max_wait` passes.
///
/// `action` runs once, right after the first frame showing the target. The
/// whole call returns within `initial_delay + max_wait + interval`.
pub async fn poll_until_target<C, K, F>(
    spec: &PollSpec,
    capturer: &C,
    classifier: &K,
    frames: Option<&FrameDump>,
    action: F,
) -> Result<PollReport, PollError>
where
    C: ScreenCapturer + ?Sized,
    K: Classifier + ?Sized,
    F: FnOnce() -> Result<(), DriverError>,
{
    if !spec.initial_delay.is_zero() {
        info!(
            "[poll:{}] Waiting {}s before the first capture",
            spec.name,
            spec.initial_delay.as_secs()
        );
        sleep(spec.initial_delay).await;
    }

    let mut state = PollState::start(spec.max_wait);
    let mut progress = ProgressTicker::new(PROGRESS_EVERY);
    info!(
        "[poll:{}] Monitoring '{}' until '{}' (every {}s, up to {}s)",
        spec.name,
        spec.field,
        spec.target,
        spec.interval.as_secs_f32(),
        spec.max_wait.as_secs()
    );

    let outcome = loop {
        if state.attempts > 0 && state.remaining().is_zero() {
            break PollOutcome::TimedOut {
                attempts: state.attempts,
                elapsed: state.elapsed(),
            };
        }

        state.attempts += 1;
        let budget = state.remaining() + spec.interval;
        let reason = match check_frame(spec, capturer, classifier, frames, state.attempts, budget)
            .await
        {
            Ok(verdict) if verdict.is(&spec.target) => {
                state.target_reached = true;
                state.last_value = verdict.value;
                break PollOutcome::Reached {
                    attempts: state.attempts,
                    elapsed: state.elapsed(),
                };
            }
            Ok(verdict) => match verdict.value {
                None => WaitReason::MissingField,
                Some(v) if spec.waiting.contains(&v) => WaitReason::Pending(v),
                Some(v) => WaitReason::Unexpected(v),
            },
            Err(e) if !e.is_recoverable() => {
                warn!("[poll:{}] Stopping: {}", spec.name, e);
                return Err(e);
            }
            Err(e) => WaitReason::Error(e),
        };

        match &reason {
            WaitReason::Pending(_) => {
                info!("[poll:{}] Attempt {}: {}", spec.name, state.attempts, reason)
            }
            _ => warn!("[poll:{}] Attempt {}: {}", spec.name, state.attempts, reason),
        }
        state.record(&reason);

        let elapsed = state.elapsed();
        if progress.tick(elapsed) {
            info!(
                "[poll:{}] Still monitoring, {}s elapsed, {} captures",
                spec.name,
                elapsed.as_secs(),
                state.attempts
            );
        }

        let remaining = state.remaining();
        if !remaining.is_zero() {
            sleep(spec.interval.min(remaining)).await;
        }
    };

    let mut action_error = None;
    match outcome {
        PollOutcome::Reached { attempts, elapsed } => {
            info!(
                "[poll:{}] '{}' is {} after {} captures ({:.1}s)",
                spec.name,
                spec.field,
                spec.target,
                attempts,
                elapsed.as_secs_f32()
            );
            if let Err(e) = action() {
                warn!("[poll:{}] Action failed: {}", spec.name, e);
                action_error = Some(e);
            }
        }
        PollOutcome::TimedOut { attempts, elapsed } => {
            warn!(
                "[poll:{}] Gave up after {} captures ({:.1}s); {} recoverable errors",
                spec.name,
                attempts,
                elapsed.as_secs_f32(),
                state.error_count()
            );
        }
    }

    Ok(PollReport {
        outcome,
        state,
        action_error,
    })
}
