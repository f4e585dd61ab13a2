pub mod discord;

pub use discord::DiscordNotifier;

use chrono::{DateTime, Local};

use crate::Result;

/// Delivers a finished message to an opaque destination channel.
///
/// Transport failures surface as `Error::Notify`; there is no automatic
/// retry.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: &str, message: &str) -> Result<()>;
}

/// Format a delivery message from a summary, its source link, and the
/// extraction time.
pub fn format_delivery(summary: &str, link: &str, extracted_at: DateTime<Local>) -> String {
    format!(
        "**Summary:**\n{}\n**Link:**\n{}\n**Extracted on:**\n{}",
        summary,
        link,
        extracted_at.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn delivery_message_carries_summary_link_and_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let message = format_delivery("X rose 5%.", "https://x", at);

        assert!(message.contains("**Summary:**\nX rose 5%."));
        assert!(message.contains("**Link:**\nhttps://x"));
        assert!(message.contains("**Extracted on:**\n2024-03-01 09:30:00"));
    }
}
