use log::{debug, error, info, warn};

use crate::classify::{Category, Report, classify};
use crate::config::Config;
use crate::error::Error;
use crate::notify::notify_all;
use crate::probe::probe;
use crate::target::{NotificationTarget, Target};
use crate::transport::Transport;

/// Checks one website and reports the result to the notification gateway.
///
/// # Behavior
///
/// - Validates the target and resolves the notification endpoint before any
///   network activity
/// - Fetches the target, retrying only on transport failures
/// - Logs the classified result
/// - Posts every resulting notification; delivery failures are logged only
///
/// # Errors
///
/// Returns an error only when the target, the notification destination or
/// the notification configuration is invalid. Once the probe has started the
/// run always completes with a [`Report`].
pub async fn check_website<T>(
    url: &str,
    topic: &str,
    config: &Config,
    transport: &T,
) -> Result<Report, Error>
where
    T: Transport + ?Sized,
{
    let target = Target::parse(url)?;
    let endpoint = NotificationTarget::parse(topic).resolve(&config.notify)?;

    info!("Checking {target}, notifying topic '{}' at {endpoint}", endpoint.topic);

    let outcome = probe(transport, &target, &config.probe).await;
    let report = classify(&target, &outcome);
    debug!(
        "{target} classified as {} after {} attempt(s)",
        report.category,
        outcome.attempts()
    );

    match report.category {
        Category::Up | Category::Redirected => info!("{}", report.console),
        Category::ClientError | Category::ServerError | Category::Unexpected => {
            warn!("{}", report.console);
        }
        Category::Down => error!("{}", report.console),
    }

    let delivered = notify_all(transport, &endpoint, &report.notifications).await;
    if delivered < report.notifications.len() {
        warn!(
            "{} of {} notifications could not be delivered",
            report.notifications.len() - delivered,
            report.notifications.len()
        );
    }

    Ok(report)
}
