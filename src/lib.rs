pub mod config;
pub mod contact;
pub mod content;
pub mod context;
pub mod error;
pub mod mail;
pub mod model;
pub mod web;

use log::warn;
use std::sync::Arc;
use tera::Tera;

use config::SiteConfig;
use contact::Branding;
use content::ContentClient;
use mail::{Mailer, SmtpMailer};
use model::CompletionClient;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub tera: Tera,
    pub config: SiteConfig,
    /// Absent when `OPENAI_API_KEY` is not set.
    pub model: Option<CompletionClient>,
    pub content: ContentClient,
    /// Absent when the SMTP variables are incomplete or the sender is not a mailbox.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    pub fn from_config(config: SiteConfig) -> anyhow::Result<Self> {
        let tera = load_templates(&config.templates)?;
        let mailer = match config.smtp.as_ref().map(SmtpMailer::new) {
            Some(Ok(mailer)) => Some(Arc::new(mailer) as Arc<dyn Mailer>),
            Some(Err(e)) => {
                warn!("Email disabled, SMTP settings rejected: {} (set SMTP_FROM to a mailbox)", e);
                None
            }
            None => None,
        };

        Ok(Self {
            tera,
            model: CompletionClient::from_config(&config.completion),
            content: ContentClient::new(&config.content_api_url),
            mailer,
            config,
        })
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn branding(&self) -> Branding<'_> {
        Branding {
            site_name: &self.config.site_name,
            site_url: &self.config.site_url,
        }
    }
}

/// Loads every template under `glob` with HTML autoescaping.
pub fn load_templates(glob: &str) -> Result<Tera, tera::Error> {
    let mut tera = Tera::new(glob)?;
    tera.autoescape_on(vec![".html", ".sql"]);
    Ok(tera)
}
