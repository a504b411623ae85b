//! Outbound delivery to the Discord webhook

use std::time::Duration;
use tracing::{debug, info};

use crate::discord::DiscordWebhook;
use crate::error::{RelayError, Result};

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts messages to one fixed webhook URL. Built once at startup and shared
/// by every request; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: reqwest::Client,
    url: String,
}

impl DiscordNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Single best-effort attempt. Any status outside 2xx is an error.
    pub async fn send(&self, payload: &DiscordWebhook) -> Result<()> {
        debug!("Sending {} embed(s) to Discord", payload.embeds.len());

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::DeliveryStatus(status));
        }

        info!("Successfully sent webhook to Discord");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::{Embed, EmbedField};
    use mockito::Matcher;
    use serde_json::json;

    fn message() -> DiscordWebhook {
        DiscordWebhook {
            content: String::new(),
            embeds: vec![Embed {
                title: "api - Build #1".to_string(),
                color: 0x00FF00,
                fields: vec![EmbedField::inline("Build Number", "#1")],
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_send_posts_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "embeds": [{
                    "title": "api - Build #1",
                    "color": 65280,
                    "fields": [{"name": "Build Number", "value": "#1", "inline": true}]
                }]
            })))
            .with_status(204)
            .create_async()
            .await;

        let notifier =
            DiscordNotifier::new(format!("{}/hook", server.url()), DEFAULT_DELIVERY_TIMEOUT)
                .unwrap();
        let result = notifier.send(&message()).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_rejects_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(429)
            .create_async()
            .await;

        let notifier =
            DiscordNotifier::new(format!("{}/hook", server.url()), DEFAULT_DELIVERY_TIMEOUT)
                .unwrap();
        let result = notifier.send(&message()).await;

        mock.assert_async().await;
        match result {
            Err(RelayError::DeliveryStatus(status)) => assert_eq!(status.as_u16(), 429),
            other => panic!("expected delivery status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_reports_connection_errors() {
        // Nothing listens on port 9 (discard) in the test environment
        let notifier =
            DiscordNotifier::new("http://127.0.0.1:9/hook", Duration::from_secs(2)).unwrap();
        let result = notifier.send(&message()).await;

        assert!(matches!(result, Err(RelayError::Http(_))));
    }
}
