// 🔔 Notifier
// Best-effort alerts; failures are reported, never fatal

use crate::config::WatchConfig;
use crate::error::WatchError;
use log::info;
use reqwest::blocking::Client;
use serde::Serialize;

/// Notifier - Single-method capability the orchestrator calls on change
pub trait Notifier {
    fn notify(&self, message: &str) -> Result<(), WatchError>;
}

/// Body expected by Pushcut-style webhooks
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    text: &'a str,
}

/// POSTs `{"title", "text"}` JSON to a webhook URL
pub struct WebhookNotifier {
    client: Client,
    url: String,
    title: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Result<Self, WatchError> {
        let client = Client::builder().build()?;
        Ok(WebhookNotifier {
            client,
            url: url.into(),
            title: title.into(),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, message: &str) -> Result<(), WatchError> {
        let payload = WebhookPayload {
            title: &self.title,
            text: message,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| WatchError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::Notification(format!(
                "webhook answered HTTP {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

/// Used when no webhook is configured
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) -> Result<(), WatchError> {
        info!("🔔 {}", message);
        Ok(())
    }
}

/// Webhook when configured, log-only otherwise
pub fn notifier_from_config(config: &WatchConfig) -> Result<Box<dyn Notifier>, WatchError> {
    match &config.webhook_url {
        Some(url) => Ok(Box::new(WebhookNotifier::new(
            url.clone(),
            config.notification_title.clone(),
        )?)),
        None => Ok(Box::new(LogNotifier)),
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, message: &str) -> Result<(), WatchError> {
        (**self).notify(message)
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str) -> Result<(), WatchError> {
        (**self).notify(message)
    }
}
