//! Outbound email.
//!
//! Handlers talk to a [`Mailer`]; production wires in [`SmtpMailer`].

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{debug, info};
use thiserror::Error;

use crate::config::SmtpConfig;

/// Port that speaks TLS from the first byte; every other port upgrades via STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A rendered HTML email. The sender address belongs to the mailer; callers
/// only pick the display name.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Address,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        info!("SMTP relay configured: {}:{}", config.host, config.port);
        Ok(Self {
            transport,
            sender: config.from.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(Mailbox::new(Some(email.from_name), self.sender.clone()))
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = email.reply_to {
            builder = builder.reply_to(reply_to.parse::<Mailbox>()?);
        }
        let message = builder.body(email.html)?;

        let response = self.transport.send(message).await?;
        debug!("SMTP accepted message: {:?}", response.code());
        Ok(())
    }
}
