use crate::components::ews::{Credentials, Session};
use crate::components::inbox::probe_inbox;
use crate::config::Config;
use crate::error::{AppResult, Error};
use crate::input::SyncRequest;
use crate::utils::time::DateRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use tracing::{error, info};

/// Result object written to stdout once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    pub email: String,
    /// Calendar retrieval is disabled; always empty
    pub events: Vec<Value>,
    pub error: Option<String>,
    pub email_subjects_test: Option<Vec<String>>,
}

impl SyncResult {
    /// Merge the session-level and inbox-level outcomes.
    ///
    /// `probe` is `None` when the probe never ran.
    pub fn assemble(
        email: &str,
        session_error: Option<&Error>,
        probe: Option<&AppResult<Vec<String>>>,
    ) -> Self {
        let probe_error = probe.and_then(|p| p.as_ref().err());
        let subjects = probe.and_then(|p| p.as_ref().ok()).cloned();

        SyncResult {
            success: session_error.is_none() && probe_error.is_none(),
            email: email.to_string(),
            events: Vec::new(),
            error: session_error.or(probe_error).map(ToString::to_string),
            email_subjects_test: subjects,
        }
    }
}

/// Minimal object written when stdin cannot be used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFailure {
    pub success: bool,
    pub error: String,
}

impl From<&Error> for InputFailure {
    fn from(err: &Error) -> Self {
        InputFailure {
            success: false,
            error: err.to_string(),
        }
    }
}

/// Run one sync: validate dates, open the session, probe the inbox
pub async fn run(request: &SyncRequest, config: &Config) -> SyncResult {
    info!("Starting QQ EWS sync for {}", request.email);

    match establish(request, config).await {
        Ok(session) => {
            let probe = probe_inbox(&session, config.inbox_limit).await;
            if let Err(e) = &probe {
                error!("{e}");
            }
            SyncResult::assemble(&request.email, None, Some(&probe))
        }
        Err(e) => SyncResult::assemble(&request.email, Some(&e), None),
    }
}

async fn establish(request: &SyncRequest, config: &Config) -> AppResult<Session> {
    let range = DateRange::parse(&request.start_date, &request.end_date).inspect_err(|e| {
        error!("{e}");
    })?;
    // The range is validated and reported but does not filter the probe
    info!(
        "Syncing events from {} to {}",
        range.start.to_rfc3339(),
        range.end.to_rfc3339()
    );

    let credentials = Credentials::new(&request.email, &request.password);
    match Session::connect(credentials, config).await {
        Ok(session) => {
            info!(
                "Session established (version {}). Accessing inbox...",
                session.server_version()
            );
            Ok(session)
        }
        Err(err) => {
            let detail = format!("{err:?}");
            let categorized = Error::from_session(err, &request.email);
            if matches!(categorized, Error::Unknown(_)) {
                error!(detail = %detail, "{categorized}");
            } else {
                error!("{categorized}");
            }
            Err(categorized)
        }
    }
}

/// Write the result as pretty-printed JSON followed by a newline
pub fn write_result<W: Write>(mut out: W, result: &SyncResult) -> AppResult<()> {
    let json = serde_json::to_string_pretty(result)?;
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}

/// Write the minimal failure object for an input error
pub fn write_failure<W: Write>(mut out: W, err: &Error) -> AppResult<()> {
    let json = serde_json::to_string(&InputFailure::from(err))?;
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}
