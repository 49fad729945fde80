use super::error::{describe, EwsError};
use super::models::{DistinguishedFolder, Folder, MessageSummary};
use super::retry::{Failure, RetryPolicy, Transient};
use super::soap;
use crate::config::Config;
use reqwest::{header, Client, Response, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Mailbox credentials; the email doubles as the login
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticated EWS session against a single fixed endpoint.
///
/// Access is delegate access: folders are addressed inside the
/// authenticated user's own mailbox and no impersonation header is sent.
#[derive(Debug)]
pub struct Session {
    client: Client,
    endpoint: Url,
    server_version: String,
    credentials: Credentials,
    policy: RetryPolicy,
    root: Folder,
}

impl Session {
    /// Open a session and verify it by fetching the mailbox root folder
    pub async fn connect(credentials: Credentials, config: &Config) -> Result<Self, EwsError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EwsError::Transport(describe(&e)))?;

        let mut session = Self {
            client,
            endpoint: config.endpoint.clone(),
            server_version: config.server_version.clone(),
            credentials,
            policy: config.retry_policy(),
            root: Folder::default(),
        };

        info!(
            "Opening EWS session for {} at {} (version {})",
            session.mailbox(),
            session.endpoint,
            session.server_version
        );
        session.root = session.get_folder(DistinguishedFolder::MsgFolderRoot).await?;
        debug!("Mailbox root folder id {}", session.root.id);

        Ok(session)
    }

    /// Primary SMTP address of the mailbox
    pub fn mailbox(&self) -> &str {
        &self.credentials.email
    }

    pub fn root(&self) -> &Folder {
        &self.root
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// GetFolder on a well-known folder
    pub async fn get_folder(&self, folder: DistinguishedFolder) -> Result<Folder, EwsError> {
        let text = self.send(&soap::get_folder(folder, self.mailbox())).await?;
        soap::parse_get_folder(&text)
    }

    /// Newest items of `folder` by receipt time, at most `limit`
    pub async fn find_items(
        &self,
        folder: &Folder,
        limit: usize,
    ) -> Result<Vec<MessageSummary>, EwsError> {
        let text = self.send(&soap::find_items(folder, limit)).await?;
        let mut items = soap::parse_find_item(&text)?;
        items.truncate(limit);
        Ok(items)
    }

    /// Post one operation, retrying transient failures within the policy
    async fn send(&self, body: &str) -> Result<String, EwsError> {
        let envelope = soap::envelope(&self.server_version, body);
        let mut backoff = self.policy.backoff();

        loop {
            match self.attempt(&envelope).await {
                Ok(text) => return Ok(text),
                Err(Failure::Fatal(err)) => return Err(err),
                Err(Failure::Transient(transient)) => match backoff.next_delay(transient.hint()) {
                    Some(delay) => {
                        warn!("Transient EWS failure ({transient:?}), retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(
                            "Giving up after {} retries and {:?} of back-off",
                            backoff.retries(),
                            backoff.waited()
                        );
                        return Err(transient.exhausted(backoff.waited()));
                    }
                },
            }
        }
    }

    async fn attempt(&self, envelope: &str) -> Result<String, Failure> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.credentials.email, Some(&self.credentials.password))
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(envelope.to_string())
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(EwsError::Unauthorized.into()),
            StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                return Err(Failure::Transient(Transient::Throttled {
                    back_off: retry_after(&response),
                }));
            }
            StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
                return Err(Failure::Transient(Transient::Transport {
                    message: format!("HTTP {status}"),
                }));
            }
            _ => {}
        }

        let text = response
            .text()
            .await
            .map_err(|e| EwsError::Transport(describe(&e)))?;

        if let Some(busy) = soap::server_busy(&text) {
            return Err(Failure::Transient(Transient::Throttled {
                back_off: busy.back_off,
            }));
        }
        if let Some(fault) = soap::parse_fault(&text) {
            return Err(fault.into_error().into());
        }
        if !status.is_success() {
            return Err(EwsError::Transport(format!("HTTP {status}")).into());
        }

        Ok(text)
    }
}

/// Connection failures and timeouts are retried, anything else is final
fn classify_request_error(err: reqwest::Error) -> Failure {
    let message = describe(&err);
    if err.is_connect() || err.is_timeout() {
        Failure::Transient(Transient::Transport { message })
    } else {
        Failure::Fatal(EwsError::Transport(message))
    }
}

/// Retry-After in its delta-seconds form
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
