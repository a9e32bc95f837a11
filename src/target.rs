use std::fmt;
use url::Url;

use crate::config::NotifyOptions;
use crate::error::Error;

/// The website being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    url: Url,
}

impl Target {
    /// Validates `input` as an absolute `http`/`https` URL with a host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTargetUrl`] for anything else.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidTargetUrl(input.to_string());
        let url = Url::parse(input.trim()).map_err(|_| invalid())?;
        if !is_http(&url) || url.host_str().is_none_or(str::is_empty) {
            return Err(invalid());
        }
        Ok(Self {
            raw: input.trim().to_string(),
            url,
        })
    }

    /// The URL as the user wrote it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Where notifications should go, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    FullUrl(Url),
    Topic(String),
}

impl NotificationTarget {
    /// An absolute `http`/`https` URL is taken as a full URL, everything
    /// else as a topic name.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match Url::parse(input) {
            Ok(url) if is_http(&url) => NotificationTarget::FullUrl(url),
            _ => NotificationTarget::Topic(input.to_string()),
        }
    }

    /// Resolves the destination into the one URL notifications are posted to.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingNotificationConfig`] when the trusted host (full-URL
    ///   mode) or the base URL (topic mode) is absent or unusable.
    /// - [`Error::InvalidNotificationUrl`] when a full URL is not on the
    ///   trusted host or names no valid topic.
    /// - [`Error::InvalidTopic`] when a topic has characters outside
    ///   `[A-Za-z0-9_-]`.
    pub fn resolve(&self, options: &NotifyOptions) -> Result<Endpoint, Error> {
        match self {
            NotificationTarget::FullUrl(url) => resolve_full_url(url, options),
            NotificationTarget::Topic(topic) => resolve_topic(topic, options),
        }
    }
}

/// A concrete notification URL and the topic it publishes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    pub topic: String,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Returns true when `topic` is non-empty and only holds `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn resolve_full_url(url: &Url, options: &NotifyOptions) -> Result<Endpoint, Error> {
    let invalid = |reason: &str| Error::InvalidNotificationUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if !is_http(url) {
        return Err(invalid("scheme must be http or https"));
    }

    let trusted_host = options.trusted_host.as_deref().ok_or_else(|| {
        Error::MissingNotificationConfig(
            "no trusted notification host configured (set NTFY)".into(),
        )
    })?;
    if !url
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(trusted_host))
    {
        return Err(invalid(&format!("host is not {trusted_host}")));
    }

    let topic = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default();
    if !is_valid_topic(topic) {
        return Err(invalid("path does not name a valid topic"));
    }

    Ok(Endpoint {
        url: url.clone(),
        topic: topic.to_string(),
    })
}

fn resolve_topic(topic: &str, options: &NotifyOptions) -> Result<Endpoint, Error> {
    if !is_valid_topic(topic) {
        return Err(Error::InvalidTopic(topic.to_string()));
    }

    let base = options.base_url.as_deref().ok_or_else(|| {
        Error::MissingNotificationConfig(
            "no notification base URL configured (set NTFY_BASE_URL)".into(),
        )
    })?;
    let unusable = || {
        Error::MissingNotificationConfig(format!(
            "notification base URL '{base}' is not an absolute http(s) URL"
        ))
    };

    let mut url = Url::parse(base).map_err(|_| unusable())?;
    if !is_http(&url) {
        return Err(unusable());
    }
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| unusable())?
        .pop_if_empty()
        .push(topic);

    Ok(Endpoint {
        url,
        topic: topic.to_string(),
    })
}
