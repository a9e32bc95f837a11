//! Turns a probe outcome into console text and notifications.

use reqwest::StatusCode;
use std::fmt;

use crate::probe::ProbeOutcome;
use crate::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Up,
    Redirected,
    ClientError,
    ServerError,
    Unexpected,
    Down,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Up => "up",
            Category::Redirected => "redirected",
            Category::ClientError => "client error",
            Category::ServerError => "server error",
            Category::Unexpected => "unexpected status",
            Category::Down => "down",
        })
    }
}

/// Delivery priority understood by the notification gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Default,
    High,
    Urgent,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Default => "default",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub tags: Vec<&'static str>,
}

impl Notification {
    fn new(title: String, message: String, priority: Priority, tag: &'static str) -> Self {
        Self {
            title,
            message,
            priority,
            tags: vec![tag],
        }
    }
}

/// Everything a run reports about one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub category: Category,
    pub console: String,
    pub notifications: Vec<Notification>,
}

#[must_use]
pub fn classify(target: &Target, outcome: &ProbeOutcome) -> Report {
    let host = target.host();

    match outcome {
        ProbeOutcome::TransportFailure { attempts, error } => Report {
            category: Category::Down,
            console: format!(
                "❌ Failed to access the website after {attempts} attempts: {target} ({error})"
            ),
            notifications: vec![Notification::new(
                format!("Website is DOWN: {host}"),
                format!("Failed to access {target} after {attempts} attempts."),
                Priority::Urgent,
                "rotating_light",
            )],
        },
        ProbeOutcome::HttpResult {
            status, final_url, ..
        } => classify_status(target, *status, final_url.as_str()),
    }
}

fn classify_status(target: &Target, status: StatusCode, final_url: &str) -> Report {
    let host = target.host();
    let code = status.as_u16();
    let details = format!("{target} (Final URL: {final_url}, Status: {code})");

    if status.is_success() {
        return Report {
            category: Category::Up,
            console: format!("✅ Website is UP: {details}"),
            notifications: vec![Notification::new(
                format!("Website is UP: {host}"),
                format!("{target} is accessible with status code {code}"),
                Priority::Default,
                "white_check_mark",
            )],
        };
    }

    if status.is_redirection() {
        let mut notifications = vec![Notification::new(
            format!("Website REDIRECTED: {host}"),
            format!("{target} redirected to {final_url} with status code {code}"),
            Priority::Default,
            "arrow_right",
        )];
        if final_url.to_ascii_lowercase().contains("login") {
            notifications.push(Notification::new(
                format!("Login Page Detected: {host}"),
                format!("{target} redirected to a login page: {final_url}"),
                Priority::High,
                "lock",
            ));
        }
        return Report {
            category: Category::Redirected,
            console: format!("↪️ Website redirected: {details}"),
            notifications,
        };
    }

    let (category, label) = match status {
        StatusCode::UNAUTHORIZED => (Category::ClientError, "Unauthorized access"),
        StatusCode::NOT_FOUND => (Category::ClientError, "Page not found"),
        StatusCode::SERVICE_UNAVAILABLE => (Category::ServerError, "Service unavailable"),
        s if s.is_client_error() => (Category::ClientError, "Client error"),
        s if s.is_server_error() => (Category::ServerError, "Server error"),
        _ => {
            return Report {
                category: Category::Unexpected,
                console: format!("❓ Website returned an unexpected status: {details}"),
                notifications: vec![Notification::new(
                    format!("Website status UNKNOWN: {host}"),
                    format!("{target} returned unexpected status code {code}"),
                    Priority::Default,
                    "grey_question",
                )],
            };
        }
    };

    Report {
        category,
        console: format!("⚠️ Website is DOWN or not fully operational ({label}): {details}"),
        notifications: vec![Notification::new(
            format!("Website is DOWN: {host}"),
            format!("{label}: {target} returned status code {code}"),
            Priority::High,
            "warning",
        )],
    }
}
