use log::{debug, warn};
use reqwest::StatusCode;
use tokio::time::sleep;
use url::Url;

use crate::config::ProbeOptions;
use crate::error::TransportError;
use crate::target::Target;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The target answered, whatever the status.
    HttpResult {
        status: StatusCode,
        final_url: Url,
        attempts: u32,
    },
    /// Every attempt failed before a response arrived.
    TransportFailure {
        attempts: u32,
        error: TransportError,
    },
}

impl ProbeOutcome {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            ProbeOutcome::HttpResult { attempts, .. }
            | ProbeOutcome::TransportFailure { attempts, .. } => *attempts,
        }
    }
}

/// Fetches the target, retrying transport failures up to `max_attempts` times.
///
/// Attempts run strictly one after the other. A received response ends the
/// probe immediately, error statuses included.
pub async fn probe<T>(transport: &T, target: &Target, options: &ProbeOptions) -> ProbeOutcome
where
    T: Transport + ?Sized,
{
    let max_attempts = options.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!("GET {target} (attempt {attempt}/{max_attempts})");

        match transport.get(target.url()).await {
            Ok(resp) => {
                return ProbeOutcome::HttpResult {
                    status: resp.status,
                    final_url: resp.final_url,
                    attempts: attempt,
                };
            }
            Err(error) if attempt >= max_attempts => {
                warn!("Attempt {attempt} failed: {error}");
                return ProbeOutcome::TransportFailure {
                    attempts: attempt,
                    error,
                };
            }
            Err(error) => {
                warn!("Attempt {attempt} failed, retrying... ({error})");
                if !options.retry_delay().is_zero() {
                    sleep(options.retry_delay()).await;
                }
            }
        }
    }
}
