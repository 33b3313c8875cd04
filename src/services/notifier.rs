use anyhow::Context;
use async_trait::async_trait;

use crate::config::RelayConfig;
use crate::database::models::Booking;

/// Forwards new bookings to the salon staff.
///
/// Delivery is best-effort: callers log a failed notification and move on,
/// the booking itself is already stored.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, booking: &Booking) -> anyhow::Result<()>;
}

/// Sends the booking summary to WhatsApp through a CallMeBot-style relay:
/// a single GET carrying the destination phone, the text and the API key.
pub struct WhatsAppRelay {
    endpoint: String,
    phone: String,
    api_key: String,
    client: reqwest::Client,
}

impl WhatsAppRelay {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build relay HTTP client")?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            phone: config.phone.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Builds the relay request; the text is URL-encoded by `reqwest`.
    pub fn build_request(&self, text: &str) -> reqwest::Result<reqwest::Request> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("phone", self.phone.as_str()),
                ("text", text),
                ("apikey", self.api_key.as_str()),
            ])
            .build()
    }
}

#[async_trait]
impl Notifier for WhatsAppRelay {
    async fn notify(&self, booking: &Booking) -> anyhow::Result<()> {
        let request = self
            .build_request(&format_notification(booking))
            .context("failed to build relay request")?;

        self.client
            .execute(request)
            .await
            .context("failed to reach WhatsApp relay")?
            .error_for_status()
            .context("WhatsApp relay returned error")?;

        tracing::info!("Booking {} forwarded to WhatsApp relay", booking.id);
        Ok(())
    }
}

/// Used when relay credentials are not configured.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, booking: &Booking) -> anyhow::Result<()> {
        tracing::debug!("WhatsApp relay not configured, skipping booking {}", booking.id);
        Ok(())
    }
}

pub fn format_notification(booking: &Booking) -> String {
    format!(
        "🗓 New booking:\nID: {}\nName: {}\nService: {}\nDate: {}\nTime: {}\nPhone: {}",
        booking.id, booking.name, booking.service, booking.date, booking.time, booking.phone
    )
}
