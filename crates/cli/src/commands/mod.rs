//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod schedule;

use std::io::{self, BufRead, Write};

use leipomo_ordering::api::{ApiError, HttpOrderBackend};
use leipomo_ordering::clock::SystemClock;
use leipomo_ordering::persistence::FileStore;
use leipomo_ordering::{ConfigError, FlowError, OrderFlow, OrderingConfig};
use thiserror::Error;

/// The flow as wired for the terminal.
pub type Flow = OrderFlow<HttpOrderBackend, FileStore, SystemClock>;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ApiError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),

    /// Input that does not name anything the command can act on.
    #[error("{0}")]
    Input(String),
}

impl CliError {
    /// Message for the terminal. Internal detail stays in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Client(_) => "The ordering service cannot be reached.".to_string(),
            Self::Flow(e) => e.user_message(),
            Self::Io(_) => "Could not read from or write to the terminal.".to_string(),
            Self::Input(msg) => msg.clone(),
        }
    }

    /// Whether the error should be reported to error tracking.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Client(_) | Self::Io(_) => true,
            Self::Flow(e) => e.is_internal(),
            Self::Config(_) | Self::Input(_) => false,
        }
    }
}

/// Build the flow from configuration, restoring the saved session.
///
/// # Errors
///
/// Returns `CliError::Client` if the HTTP client cannot be built.
pub fn open_flow(config: &OrderingConfig) -> Result<Flow, CliError> {
    let backend = HttpOrderBackend::new(config.api_base_url.clone())?;
    let store = FileStore::new(config.session_dir.clone());
    tracing::debug!(api = %config.api_base_url, session_dir = %config.session_dir.display(), "Opening order flow");

    Ok(OrderFlow::open(
        backend,
        store,
        SystemClock,
        config.flow_settings(),
    ))
}

/// Ask a question and read one trimmed line. `None` on end of input.
pub(crate) fn ask(question: &str) -> Result<Option<String>, CliError> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{question} ")?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Yes/no confirmation, defaulting to no.
pub(crate) fn confirm(question: &str) -> Result<bool, CliError> {
    let answer = ask(&format!("{question} [y/N]"))?;
    Ok(matches!(
        answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
        Some("y" | "yes" | "k" | "kyllä")
    ))
}

/// Print the customer-facing message and report internal faults.
pub fn report(error: &CliError) {
    if error.is_internal() {
        let event_id = sentry::capture_error(error);
        tracing::error!(error = %error, sentry_event_id = %event_id, "Command failed");
    }

    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", error.user_message());
}
