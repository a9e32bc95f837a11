//! Checks whether a website is reachable and reports the result to an
//! ntfy-style notification gateway.

use clap::Parser;
use log::info;
use std::path::PathBuf;

pub mod classify;
pub mod config;
pub mod error;
pub mod notify;
pub mod probe;
pub mod target;
pub mod transport;
pub mod worker;

pub use classify::{Category, Notification, Report};
pub use config::Config;
pub use error::{Error, TransportError};
pub use probe::ProbeOutcome;
pub use target::{Endpoint, NotificationTarget, Target};
pub use transport::{HttpTransport, Transport};
pub use worker::check_website;

/// Check website HTTP status and send the result to an ntfy topic
#[derive(Parser, Debug)]
#[command(name = "sitecheck", author, version, about, long_about = None)]
pub struct Args {
    /// URL of the website to check
    #[arg(short, long)]
    pub url: String,

    /// Topic name, or the full ntfy URL to send notifications to (e.g. https://ntfy.sh/topic)
    #[arg(short, long)]
    pub topic: String,

    /// Configuration file, defaults to <config dir>/sitecheck/config.toml when present
    #[arg(short, long, env = "SITECHECK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Loads the configuration and runs one check against the live network.
///
/// # Errors
///
/// Returns an error when the configuration or the arguments are invalid.
pub async fn run(args: &Args) -> Result<Report, Error> {
    let config = Config::load(args.config.as_deref())?;

    info!("Timeout: {} seconds", config.probe.timeout_secs);
    info!(
        "Attempts: {}, redirect limit: {}",
        config.probe.max_attempts, config.probe.max_redirects
    );

    let transport = HttpTransport::new(&config)?;
    check_website(&args.url, &args.topic, &config, &transport).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_config_path_falls_back_to_env() {
        let command = Args::command();
        let config = command
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();
        assert_eq!(
            config.get_env(),
            Some(std::ffi::OsStr::new("SITECHECK_CONFIG"))
        );
    }

    #[test]
    fn test_url_and_topic_are_required() {
        assert!(Args::try_parse_from(["sitecheck", "--url", "https://example.com"]).is_err());
        assert!(Args::try_parse_from(["sitecheck", "--topic", "deploys"]).is_err());

        let args =
            Args::try_parse_from(["sitecheck", "-u", "https://example.com", "-t", "deploys"])
                .unwrap();
        assert_eq!(args.url, "https://example.com");
        assert_eq!(args.topic, "deploys");
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_probing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notify]\nbase_url = \"https://ntfy.example.com\"\n").unwrap();

        let args = Args {
            url: "example.com".into(),
            topic: "deploys".into(),
            config: Some(path),
        };

        assert!(matches!(run(&args).await, Err(Error::InvalidTargetUrl(_))));
    }
}
