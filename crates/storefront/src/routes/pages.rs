//! Static page and contact form route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use auxilia_core::Email;

use crate::filters;
use crate::middleware::{PageContext, flash};
use crate::services::ContactMessage;
use crate::state::AppState;

const MAX_NAME: usize = 100;
const MAX_SUBJECT: usize = 200;
const MIN_MESSAGE: usize = 10;
const MAX_MESSAGE: usize = 5000;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub ctx: PageContext,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub form: ContactForm,
}

/// Contact form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Check the submission, returning the message to show on failure.
    fn validate(&self) -> Result<ContactMessage, &'static str> {
        let name = self.name.trim();
        let subject = self.subject.trim();
        let message = self.message.trim();

        if name.is_empty() || subject.is_empty() || message.is_empty() {
            return Err("Tous les champs sont obligatoires.");
        }
        let email = Email::parse(&self.email).map_err(|_| "Adresse email invalide.")?;
        if name.chars().count() > MAX_NAME {
            return Err("Le nom est trop long.");
        }
        if subject.chars().count() > MAX_SUBJECT {
            return Err("Le sujet est trop long.");
        }
        let length = message.chars().count();
        if length < MIN_MESSAGE {
            return Err("Le message doit contenir au moins 10 caractères.");
        }
        if length > MAX_MESSAGE {
            return Err("Le message est trop long.");
        }

        Ok(ContactMessage {
            name: name.to_owned(),
            email: email.as_str().to_owned(),
            subject: subject.to_owned(),
            message: message.to_owned(),
        })
    }
}

/// Display the about page.
pub async fn about(ctx: PageContext) -> impl IntoResponse {
    AboutTemplate { ctx }
}

/// Display the contact form.
pub async fn contact_page(ctx: PageContext) -> impl IntoResponse {
    ContactTemplate {
        ctx,
        error: None,
        form: ContactForm::default(),
    }
}

/// Handle a contact form submission.
///
/// Delivery failures are logged but the visitor always sees a success
/// notice; only invalid input is reported back.
#[instrument(skip(state, session, form))]
pub async fn contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactForm>,
) -> Response {
    let msg = match form.validate() {
        Ok(msg) => msg,
        Err(error) => {
            return ContactTemplate {
                ctx: PageContext::from_session(&session).await,
                error: Some(error.to_owned()),
                form,
            }
            .into_response();
        }
    };

    let notice = match state.mailer() {
        Some(mailer) => match mailer.send(&msg).await {
            Ok(()) => {
                tracing::info!("Contact message sent");
                "Votre message a été envoyé avec succès ! Nous vous répondrons dans les plus brefs délais."
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send contact message");
                "Votre message a été enregistré. Nous vous répondrons dans les plus brefs délais."
            }
        },
        None => {
            tracing::warn!("SMTP not configured, contact message dropped");
            "Votre message a été enregistré. Nous vous répondrons dans les plus brefs délais."
        }
    };

    flash::success(&session, notice).await;
    Redirect::to("/contact").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> ContactForm {
        ContactForm {
            name: " Ada ".to_owned(),
            email: "ada@example.com".to_owned(),
            subject: "Commande".to_owned(),
            message: "Bonjour, où en est ma commande ?".to_owned(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let msg = valid().validate().unwrap();
        assert_eq!(msg.name, "Ada");
        assert_eq!(msg.email, "ada@example.com");
    }

    #[test]
    fn test_blank_fields_rejected() {
        let form = ContactForm {
            subject: "   ".to_owned(),
            ..valid()
        };
        assert_eq!(form.validate().unwrap_err(), "Tous les champs sont obligatoires.");
    }

    #[test]
    fn test_bad_email_rejected() {
        let form = ContactForm {
            email: "not-an-email".to_owned(),
            ..valid()
        };
        assert_eq!(form.validate().unwrap_err(), "Adresse email invalide.");
    }

    #[test]
    fn test_message_length_bounds() {
        let short = ContactForm {
            message: "Salut".to_owned(),
            ..valid()
        };
        assert!(short.validate().is_err());

        let long = ContactForm {
            message: "a".repeat(MAX_MESSAGE + 1),
            ..valid()
        };
        assert_eq!(long.validate().unwrap_err(), "Le message est trop long.");
    }
}
