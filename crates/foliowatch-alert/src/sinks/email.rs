// SPDX-FileCopyrightText: 2026 Foliowatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP delivery of alert emails.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{error, info};

use foliowatch_config::model::SmtpConfig;
use foliowatch_core::{AlertEvent, AlertLevel, FolioError, NotificationSink};

/// Port on which SMTP servers expect TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Sends one HTML email per alert to every configured recipient.
pub struct EmailSink {
    config: SmtpConfig,
}

/// SMTP settings with every required field present.
struct Complete<'a> {
    host: &'a str,
    username: &'a str,
    password: &'a str,
    sender_email: &'a str,
    recipients: Vec<&'a str>,
}

impl EmailSink {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn complete(&self) -> Option<Complete<'_>> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        if self.config.port == 0 {
            return None;
        }
        let recipients: Vec<&str> = self
            .config
            .recipients
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            return None;
        }
        Some(Complete {
            host: present(&self.config.host)?,
            username: present(&self.config.username)?,
            password: present(&self.config.password)?,
            sender_email: present(&self.config.sender_email)?,
            recipients,
        })
    }

    fn build_message(
        &self,
        smtp: &Complete<'_>,
        event: &AlertEvent,
        sent_at: DateTime<Utc>,
    ) -> Result<Message, FolioError> {
        let sender: Address = smtp
            .sender_email
            .parse()
            .map_err(|e| notification_error("invalid sender address", e))?;
        let sender_name = match self.config.sender_name.trim() {
            "" => None,
            name => Some(name.to_string()),
        };

        let mut builder = Message::builder()
            .from(Mailbox::new(sender_name, sender))
            .subject(subject(event))
            .header(ContentType::TEXT_HTML);
        for recipient in &smtp.recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| notification_error("invalid recipient address", e))?;
            builder = builder.to(mailbox);
        }
        builder
            .body(html_body(event, sent_at))
            .map_err(|e| notification_error("failed to build alert email", e))
    }

    fn transport(
        &self,
        smtp: &Complete<'_>,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, FolioError> {
        let builder = if self.config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp.host)
                .map_err(|e| notification_error("invalid SMTP relay", e))?
        } else if self.config.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp.host)
                .map_err(|e| notification_error("invalid SMTP relay", e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp.host)
        };
        Ok(builder
            .port(self.config.port)
            .credentials(Credentials::new(
                smtp.username.to_string(),
                smtp.password.to_string(),
            ))
            .build())
    }
}

#[async_trait]
impl NotificationSink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, event: &AlertEvent) -> Result<(), FolioError> {
        let Some(smtp) = self.complete() else {
            error!("SMTP settings are incomplete, alert email not sent");
            return Ok(());
        };

        let message = self.build_message(&smtp, event, Utc::now())?;
        let transport = self.transport(&smtp)?;

        info!(
            host = smtp.host,
            port = self.config.port,
            recipients = smtp.recipients.len(),
            series = %event.series,
            "sending alert email"
        );
        transport
            .send(message)
            .await
            .map_err(|e| notification_error("SMTP send failed", e))?;
        info!(series = %event.series, "alert email sent");
        Ok(())
    }
}

fn notification_error(
    message: &str,
    e: impl std::error::Error + Send + Sync + 'static,
) -> FolioError {
    FolioError::Notification {
        message: message.to_string(),
        source: Some(Box::new(e)),
    }
}

/// `Folio Alert: <Level> - <module>`.
pub fn subject(event: &AlertEvent) -> String {
    format!("Folio Alert: {} - {}", event.level, event.series.module_code)
}

/// HTML body for an alert email.
pub fn html_body(event: &AlertEvent, sent_at: DateTime<Utc>) -> String {
    let color = match event.level {
        AlertLevel::Critical => "red",
        AlertLevel::Warning => "orange",
    };
    let series = &event.series;
    format!(
        "<html><body>\
         <h1>Folio Monitoring Alert</h1>\
         <p><strong>Level:</strong> {level}</p>\
         <p><strong>Module:</strong> {module}</p>\
         <p><strong>Store:</strong> {store}</p>\
         <p><strong>Series:</strong> {start} - {end}</p>\
         <p style=\"color: {color};\"><strong>Available Folios:</strong> {available} (Threshold: {threshold})</p>\
         <p>Alert Message: {message}</p>\
         <p>Timestamp: {sent} UTC</p>\
         </body></html>",
        level = event.level,
        module = escape_html(&series.module_code),
        store = escape_html(&series.store_code),
        start = series.range_start,
        end = series.range_end,
        available = event.available_count,
        threshold = event.threshold,
        message = escape_html(&event.message),
        sent = sent_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use foliowatch_core::SeriesKey;
    use tracing_test::traced_test;

    fn event(level: AlertLevel) -> AlertEvent {
        AlertEvent {
            level,
            series: SeriesKey::new("S01", "MOD28", 1, 100),
            available_count: 12,
            threshold: 20,
            message: "running low".into(),
        }
    }

    fn full_config() -> SmtpConfig {
        SmtpConfig {
            enabled: true,
            host: Some("127.0.0.1".into()),
            port: 1,
            use_ssl: false,
            username: Some("alerts".into()),
            password: Some("secret".into()),
            sender_email: Some("alerts@example.com".into()),
            sender_name: "Folio Monitor".into(),
            recipients: vec!["ops@example.com".into(), " ".into()],
        }
    }

    #[test]
    fn subject_names_level_and_module() {
        assert_eq!(
            subject(&event(AlertLevel::Warning)),
            "Folio Alert: Warning - MOD28"
        );
    }

    #[test]
    fn body_color_follows_level() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let critical = html_body(&event(AlertLevel::Critical), at);
        assert!(critical.contains("color: red;"));
        assert!(critical.contains("2026-01-02 03:04:05 UTC"));
        assert!(critical.contains("<strong>Series:</strong> 1 - 100"));
        let warning = html_body(&event(AlertLevel::Warning), at);
        assert!(warning.contains("color: orange;"));
    }

    #[test]
    fn body_escapes_source_values() {
        let mut event = event(AlertLevel::Warning);
        event.series = SeriesKey::new("<b>S&1</b>", "MOD\"28", 1, 100);
        event.message = "low <script>".to_string();
        let body = html_body(&event, Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap());

        assert!(body.contains("&lt;b&gt;S&amp;1&lt;/b&gt;"));
        assert!(body.contains("MOD&quot;28"));
        assert!(body.contains("low &lt;script&gt;"));
        assert!(!body.contains("<script>"));
        assert!(!body.contains("<b>S"));
    }

    #[test]
    fn blank_recipients_are_ignored() {
        let sink = EmailSink::new(full_config());
        let smtp = sink.complete().unwrap();
        assert_eq!(smtp.recipients, vec!["ops@example.com"]);
    }

    #[test]
    fn missing_password_is_incomplete() {
        let mut config = full_config();
        config.password = None;
        assert!(EmailSink::new(config).complete().is_none());
    }

    #[test]
    fn bad_recipient_is_notification_error() {
        let mut config = full_config();
        config.recipients = vec!["not an address".into()];
        let sink = EmailSink::new(config);
        let smtp = sink.complete().unwrap();
        let err = sink
            .build_message(&smtp, &event(AlertLevel::Critical), Utc::now())
            .unwrap_err();
        assert!(matches!(err, FolioError::Notification { .. }));
    }

    #[tokio::test]
    #[traced_test]
    async fn incomplete_settings_skip_sending() {
        let sink = EmailSink::new(SmtpConfig {
            enabled: true,
            ..SmtpConfig::default()
        });
        sink.deliver(&event(AlertLevel::Critical)).await.unwrap();
        assert!(logs_contain("SMTP settings are incomplete"));
    }

    #[tokio::test]
    async fn unreachable_server_is_notification_error() {
        let sink = EmailSink::new(full_config());
        let err = sink.deliver(&event(AlertLevel::Critical)).await.unwrap_err();
        assert!(matches!(err, FolioError::Notification { .. }));
    }
}
