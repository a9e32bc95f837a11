use log::{error, info};

use crate::classify::Notification;
use crate::error::Error;
use crate::target::Endpoint;
use crate::transport::Transport;

/// Posts one notification to the gateway.
///
/// # Errors
///
/// Returns [`Error::Transport`] when the request does not complete and
/// [`Error::NotificationDelivery`] when the gateway answers with a non-2xx
/// status. Callers treat both as non-fatal.
pub async fn notify<T>(
    transport: &T,
    endpoint: &Endpoint,
    notification: &Notification,
) -> Result<(), Error>
where
    T: Transport + ?Sized,
{
    let status = transport.post(&endpoint.url, notification).await?;
    if !status.is_success() {
        return Err(Error::NotificationDelivery(status));
    }
    info!("🔔 Notification sent successfully!");
    Ok(())
}

/// Sends every notification in order, logging and swallowing failures.
///
/// Returns how many were delivered.
pub async fn notify_all<T>(
    transport: &T,
    endpoint: &Endpoint,
    notifications: &[Notification],
) -> usize
where
    T: Transport + ?Sized,
{
    let mut delivered = 0;
    for notification in notifications {
        match notify(transport, endpoint, notification).await {
            Ok(()) => delivered += 1,
            Err(e) => error!("Failed to send notification '{}': {e}", notification.title),
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Priority;
    use crate::error::TransportError;
    use crate::transport::fake::FakeTransport;
    use reqwest::StatusCode;
    use url::Url;

    fn endpoint() -> Endpoint {
        Endpoint {
            url: Url::parse("https://ntfy.example.com/deploys").unwrap(),
            topic: "deploys".into(),
        }
    }

    fn notification(title: &str) -> Notification {
        Notification {
            title: title.into(),
            message: "https://example.com is accessible with status code 200".into(),
            priority: Priority::Default,
            tags: vec!["white_check_mark"],
        }
    }

    #[tokio::test]
    async fn test_notify_posts_to_endpoint() {
        let transport = FakeTransport::new(vec![]);

        notify(&transport, &endpoint(), &notification("Website is UP: example.com"))
            .await
            .unwrap();

        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0.as_str(), "https://ntfy.example.com/deploys");
        assert_eq!(posts[0].1.title, "Website is UP: example.com");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let transport =
            FakeTransport::new(vec![]).with_post_reply(Ok(StatusCode::INTERNAL_SERVER_ERROR));

        let result = notify(&transport, &endpoint(), &notification("t")).await;

        assert!(matches!(
            result,
            Err(Error::NotificationDelivery(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_is_an_error() {
        let transport =
            FakeTransport::new(vec![]).with_post_reply(Err(TransportError::Timeout));

        let result = notify(&transport, &endpoint(), &notification("t")).await;

        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::Timeout))
        ));
    }

    #[tokio::test]
    async fn test_notify_all_keeps_going_after_failure() {
        let transport =
            FakeTransport::new(vec![]).with_post_reply(Ok(StatusCode::BAD_GATEWAY));

        let delivered = notify_all(
            &transport,
            &endpoint(),
            &[notification("first"), notification("second")],
        )
        .await;

        assert_eq!(delivered, 0);
        assert_eq!(transport.posts().len(), 2);
    }
}
