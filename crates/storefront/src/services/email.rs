//! Contact form delivery.
//!
//! Uses SMTP via lettre with Askama plain-text and HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::ContactConfig;

/// A validated contact form submission.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// HTML body of the contact email.
#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmailHtml<'a> {
    msg: &'a ContactMessage,
}

/// Plain text body of the contact email.
#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactEmailText<'a> {
    msg: &'a ContactMessage,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Sends contact form messages to the shop mailbox.
#[derive(Clone)]
pub struct ContactMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    recipient: String,
}

impl ContactMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &ContactConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            recipient: config.recipient.clone(),
        })
    }

    /// Forward a contact message. Replies go to the visitor's address.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be rendered, built or sent.
    pub async fn send(&self, msg: &ContactMessage) -> Result<(), EmailError> {
        let html = ContactEmailHtml { msg }.render()?;
        let text = ContactEmailText { msg }.render()?;

        let email = Message::builder()
            .from(parse_mailbox(&self.from_address)?)
            .reply_to(parse_mailbox(&msg.email)?)
            .to(parse_mailbox(&self.recipient)?)
            .subject(subject_line(&msg.subject))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(reply_to = %msg.email, "Contact message sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

/// Subject of the forwarded email.
fn subject_line(subject: &str) -> String {
    format!("Contact depuis le site : {}", subject.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Léa Martin".to_string(),
            email: "lea@example.fr".to_string(),
            subject: "Livraison".to_string(),
            message: "Bonjour,\nquand arrive ma commande ?".to_string(),
        }
    }

    #[test]
    fn test_subject_line_prefix() {
        assert_eq!(
            subject_line("  Livraison "),
            "Contact depuis le site : Livraison"
        );
    }

    #[test]
    fn test_parse_mailbox_rejects_garbage() {
        assert!(parse_mailbox("lea@example.fr").is_ok());
        assert!(matches!(
            parse_mailbox("not an address"),
            Err(EmailError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_templates_render_message() {
        let msg = message();
        let text = ContactEmailText { msg: &msg }.render().unwrap_or_default();
        assert!(text.contains("Léa Martin"));
        assert!(text.contains("quand arrive ma commande"));

        let html = ContactEmailHtml { msg: &msg }.render().unwrap_or_default();
        assert!(html.contains("lea@example.fr"));
    }
}
