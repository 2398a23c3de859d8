//! Contact form submissions: validation, email composition and the
//! WhatsApp hand-off link.

use lettre::Address;
use reqwest::Url;
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ApiError;
use crate::mail::OutgoingEmail;
use crate::web::models::ContactSubmission;

const OWNER_TEMPLATE: &str = "email/owner_notice.html";
const ACK_TEMPLATE: &str = "email/contact_ack.html";

/// A submission that passed validation, with blanks normalised away.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl Contact {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl TryFrom<ContactSubmission> for Contact {
    type Error = ApiError;

    fn try_from(submission: ContactSubmission) -> Result<Self, Self::Error> {
        let first_name = submission.first_name.trim().to_string();
        let last_name = submission.last_name.trim().to_string();
        let email = submission.email.trim().to_string();
        let message = submission.message.trim().to_string();

        let missing: Vec<&str> = [
            ("firstName", &first_name),
            ("lastName", &last_name),
            ("email", &email),
            ("message", &message),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| *field)
        .collect();
        if !missing.is_empty() {
            return Err(ApiError::InvalidRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if email.parse::<Address>().is_err() {
            return Err(ApiError::InvalidRequest(format!(
                "Invalid email address: {}",
                email
            )));
        }

        let subject = match submission.subject.trim() {
            "" => "Contact Form".to_string(),
            s => s.to_string(),
        };

        Ok(Self {
            first_name,
            last_name,
            email,
            phone: submission
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            subject,
            message,
        })
    }
}

/// Site identity used by the email templates.
#[derive(Debug, Clone, Serialize)]
pub struct Branding<'a> {
    pub site_name: &'a str,
    pub site_url: &'a str,
}

/// Notice for the site owner, reply-to set to the submitter.
pub fn owner_notice(
    tera: &Tera,
    contact: &Contact,
    owner: &str,
    branding: &Branding<'_>,
) -> Result<OutgoingEmail, tera::Error> {
    let html = tera.render(OWNER_TEMPLATE, &template_context(contact, branding))?;
    Ok(OutgoingEmail {
        from_name: "Contact Form".to_string(),
        to: owner.to_string(),
        reply_to: Some(contact.email.clone()),
        subject: format!("[Contact] {}", contact.subject),
        html,
    })
}

/// Acknowledgment sent back to the submitter.
pub fn acknowledgment(
    tera: &Tera,
    contact: &Contact,
    branding: &Branding<'_>,
) -> Result<OutgoingEmail, tera::Error> {
    let html = tera.render(ACK_TEMPLATE, &template_context(contact, branding))?;
    Ok(OutgoingEmail {
        from_name: branding.site_name.to_string(),
        to: contact.email.clone(),
        reply_to: None,
        subject: format!("We received your message - {}", branding.site_name),
        html,
    })
}

fn template_context(contact: &Contact, branding: &Branding<'_>) -> Context {
    let mut context = Context::new();
    context.insert("contact", contact);
    context.insert("site", branding);
    context
}

/// `wa.me` deep link with the submission prefilled as the chat text.
pub fn whatsapp_link(contact: &Contact, number: &str) -> Result<Url, ApiError> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(ApiError::NotConfigured(
            "WHATSAPP_NUMBER does not contain a phone number".into(),
        ));
    }

    let mut text = format!(
        "Hello, I'm {}.\nEmail: {}",
        contact.full_name(),
        contact.email
    );
    if let Some(phone) = &contact.phone {
        text.push_str(&format!("\nPhone: {}", phone));
    }
    text.push_str(&format!("\nSubject: {}\n\n{}", contact.subject, contact.message));

    Url::parse_with_params(&format!("https://wa.me/{}", digits), &[("text", text)])
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: Some("  ".into()),
            subject: "Project inquiry".into(),
            message: "Need a <b>website</b>".into(),
        }
    }

    fn tera() -> Tera {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (
                OWNER_TEMPLATE,
                "{{ contact.first_name }} {{ contact.last_name }}: {{ contact.message }}",
            ),
            (ACK_TEMPLATE, "Hello {{ contact.first_name }}, thanks from {{ site.site_name }}"),
        ])
        .unwrap();
        tera.autoescape_on(vec![".html"]);
        tera
    }

    const BRANDING: Branding<'static> = Branding {
        site_name: "Rizwani Solutions",
        site_url: "https://example.com",
    };

    #[test]
    fn lists_every_missing_field() {
        let err = Contact::try_from(ContactSubmission {
            first_name: " ".into(),
            message: String::new(),
            ..submission()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required fields: firstName, message");
    }

    #[test]
    fn rejects_malformed_email() {
        let err = Contact::try_from(ContactSubmission {
            email: "not-an-address".into(),
            ..submission()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn blank_phone_and_subject_are_normalised() {
        let contact = Contact::try_from(ContactSubmission {
            subject: "   ".into(),
            ..submission()
        })
        .unwrap();
        assert_eq!(contact.phone, None);
        assert_eq!(contact.subject, "Contact Form");
    }

    #[test]
    fn owner_notice_escapes_submitted_html() {
        let contact = Contact::try_from(submission()).unwrap();
        let email = owner_notice(&tera(), &contact, "owner@example.com", &BRANDING).unwrap();

        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.reply_to.as_deref(), Some("ada@example.com"));
        assert_eq!(email.subject, "[Contact] Project inquiry");
        assert!(email.html.contains("&lt;b&gt;website&lt;&#x2F;b&gt;"), "{}", email.html);
    }

    #[test]
    fn acknowledgment_goes_to_submitter() {
        let contact = Contact::try_from(submission()).unwrap();
        let email = acknowledgment(&tera(), &contact, &BRANDING).unwrap();

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.reply_to, None);
        assert_eq!(email.html, "Hello Ada, thanks from Rizwani Solutions");
    }

    #[test]
    fn whatsapp_link_encodes_the_message() {
        let contact = Contact::try_from(ContactSubmission {
            phone: Some("+1 555 0100".into()),
            ..submission()
        })
        .unwrap();
        let url = whatsapp_link(&contact, "+94 76 896 5529").unwrap();

        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/94768965529");
        let text = url
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(
            text,
            "Hello, I'm Ada Lovelace.\nEmail: ada@example.com\nPhone: +1 555 0100\nSubject: Project inquiry\n\nNeed a <b>website</b>"
        );
    }

    #[test]
    fn whatsapp_number_must_have_digits() {
        let contact = Contact::try_from(submission()).unwrap();
        assert!(matches!(
            whatsapp_link(&contact, "n/a"),
            Err(ApiError::NotConfigured(_))
        ));
    }
}
