//! Outbound email. SMTP when configured, a log-only transport otherwise, so
//! environments without mail credentials keep working.

use crate::error::AppError;
use crate::service::tickets::HallTicket;
use crate::settings::Settings;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;

pub const TICKET_EMAIL_SUBJECT: &str = "Your Hall Ticket Information";

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one HTML email. Issuance dispatches this from a detached task so a
    /// slow or failing transport never delays the response.
    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    server: String,
    port: u16,
    credentials: Credentials,
    from: String,
}

impl SmtpMailer {
    pub fn new(server: String, port: u16, username: String, password: String, from: String) -> Self {
        SmtpMailer {
            server,
            port,
            credentials: Credentials::new(username, password),
            from,
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport, AppError> {
        Ok(SmtpTransport::relay(&self.server)
            .map_err(|e| AppError::Mail(format!("smtp relay {}: {e}", self.server)))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), AppError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::Mail(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Mail(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::Mail(format!("build message: {e}")))?;
        let transport = self.build_transport()?;
        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map(drop)
                .map_err(|e| AppError::Mail(format!("smtp send: {e}")))
        })
        .await
        .map_err(|e| AppError::Mail(format!("mail task: {e}")))?
    }
}

/// Stand-in transport that records the send instead of performing it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: String) -> Result<(), AppError> {
        tracing::info!(to, subject, "smtp not configured; logging mail instead of sending");
        Ok(())
    }
}

pub fn from_settings(settings: &Settings) -> Arc<dyn Mailer> {
    match &settings.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(
            smtp.server.clone(),
            smtp.port,
            smtp.username.clone(),
            smtp.password.clone(),
            settings.mail_from.clone(),
        )),
        None => Arc::new(LogMailer),
    }
}

/// Minimal HTML escaping for user-supplied fields rendered into mail and
/// document templates.
pub(crate) fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML body for the issuance notification.
pub fn ticket_email_html(ticket: &HallTicket) -> String {
    let row = |label: &str, value: &str| {
        format!(
            "<tr><td style=\"padding:6px 12px;border:1px solid #ddd;font-weight:bold\">{}</td>\
             <td style=\"padding:6px 12px;border:1px solid #ddd\">{}</td></tr>",
            label,
            html_escape(value)
        )
    };
    let rows = [
        row("Hall Ticket Number", &ticket.hall_ticket_number),
        row("Name", &ticket.name),
        row("Father's Name", &ticket.father_name),
        row("Date of Birth", &ticket.dob),
        row("SSC Hall Ticket No", &ticket.ssc_hall_ticket_no),
        row("Mobile", &ticket.mobile),
        row("Email", &ticket.email),
        row("Mother's Name", &ticket.mother_name),
        row("Community", &ticket.community),
        row("Aadhar No", &ticket.aadhar_no),
        row("Parent's Mobile", &ticket.parent_no),
        row("Gender", &ticket.gender),
        row("District", &ticket.district),
        row("Issued On", &ticket.issued_at.date_naive().to_string()),
        row("Valid Till", &ticket.expires_at.date_naive().to_string()),
    ]
    .join("\n");
    format!(
        "<html><body style=\"font-family:Arial,sans-serif;color:#333\">\
         <h2 style=\"background:#004080;color:#fff;padding:12px\">Hall Ticket Generated</h2>\
         <p>Dear {name},</p>\
         <p>Your hall ticket has been generated. Keep the number below safe; you will \
         need it to download the ticket and to check its validity.</p>\
         <table style=\"border-collapse:collapse\">{rows}</table>\
         <p>Please carry a printed copy of the hall ticket to the examination centre.</p>\
         </body></html>",
        name = html_escape(&ticket.name),
        rows = rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn ticket() -> HallTicket {
        HallTicket {
            id: Uuid::new_v4(),
            name: "A <Student>".into(),
            father_name: "F".into(),
            dob: "2001-04-12".into(),
            ssc_hall_ticket_no: "SSC99".into(),
            mobile: "9876543210".into(),
            email: "student@example.com".into(),
            mother_name: "M".into(),
            community: "OC".into(),
            aadhar_no: "1234".into(),
            parent_no: "9876543211".into(),
            gender: "F".into(),
            district: "Hyderabad".into(),
            hall_ticket_number: "20240115HD0007".into(),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2024, 7, 15, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn email_body_carries_the_ticket_details() {
        let html = ticket_email_html(&ticket());
        assert!(html.contains("20240115HD0007"));
        assert!(html.contains("A &lt;Student&gt;"));
        assert!(html.contains("2024-01-15"));
        assert!(html.contains("2024-07-15"));
        assert!(!html.contains("<Student>"));
    }
}
