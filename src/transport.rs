use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode, header::LOCATION, redirect::Policy};
use std::time::Duration;
use url::Url;

use crate::classify::Notification;
use crate::config::Config;
use crate::error::{Error, TransportError};

/// What came back from a GET against the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub final_url: Url,
}

/// The two HTTP calls a check needs.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<ProbeResponse, TransportError>;

    async fn post(
        &self,
        url: &Url,
        notification: &Notification,
    ) -> Result<StatusCode, TransportError>;
}

/// [`Transport`] backed by a single `reqwest` client.
pub struct HttpTransport {
    client: Client,
    probe_timeout: Duration,
    notify_timeout: Duration,
    token: Option<String>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the TLS backend cannot be initialised.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let redirect = match config.probe.max_redirects {
            0 => Policy::none(),
            max => Policy::limited(max),
        };
        let client = Client::builder()
            .redirect(redirect)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            probe_timeout: config.probe.timeout(),
            notify_timeout: config.notify.timeout(),
            token: config.notify.token.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<ProbeResponse, TransportError> {
        let resp = self
            .client
            .get(url.clone())
            .timeout(self.probe_timeout)
            .send()
            .await?;

        let status = resp.status();
        let mut final_url = resp.url().clone();

        // A redirect we did not follow still tells us where the site points.
        if status.is_redirection() {
            if let Some(location) = resp
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|location| final_url.join(location).ok())
            {
                final_url = location;
            }
        }

        debug!("GET {url} -> {status} at {final_url}");
        Ok(ProbeResponse { status, final_url })
    }

    async fn post(
        &self,
        url: &Url,
        notification: &Notification,
    ) -> Result<StatusCode, TransportError> {
        let mut request = self
            .client
            .post(url.clone())
            .timeout(self.notify_timeout)
            .header("Content-Type", "text/plain; charset=utf-8")
            .header("Title", notification.title.as_str())
            .header("Priority", notification.priority.as_str())
            .body(notification.message.clone());

        if !notification.tags.is_empty() {
            request = request.header("Tags", notification.tags.join(","));
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        Ok(resp.status())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted transport: GETs pop replies in order, POSTs are recorded.
    pub(crate) struct FakeTransport {
        replies: Mutex<VecDeque<Result<ProbeResponse, TransportError>>>,
        post_reply: Result<StatusCode, TransportError>,
        gets: Mutex<Vec<Url>>,
        posts: Mutex<Vec<(Url, Notification)>>,
    }

    impl FakeTransport {
        pub(crate) fn new(replies: Vec<Result<ProbeResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                post_reply: Ok(StatusCode::OK),
                gets: Mutex::new(Vec::new()),
                posts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn with_post_reply(mut self, reply: Result<StatusCode, TransportError>) -> Self {
            self.post_reply = reply;
            self
        }

        pub(crate) fn get_count(&self) -> usize {
            self.gets.lock().unwrap().len()
        }

        pub(crate) fn posts(&self) -> Vec<(Url, Notification)> {
            self.posts.lock().unwrap().clone()
        }
    }

    pub(crate) fn reply(status: u16, final_url: &str) -> Result<ProbeResponse, TransportError> {
        Ok(ProbeResponse {
            status: StatusCode::from_u16(status).unwrap(),
            final_url: Url::parse(final_url).unwrap(),
        })
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &Url) -> Result<ProbeResponse, TransportError> {
            self.gets.lock().unwrap().push(url.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::Connect("no scripted reply".into())))
        }

        async fn post(
            &self,
            url: &Url,
            notification: &Notification,
        ) -> Result<StatusCode, TransportError> {
            self.posts
                .lock()
                .unwrap()
                .push((url.clone(), notification.clone()));
            self.post_reply.clone()
        }
    }
}
