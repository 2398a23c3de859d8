use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Settings for the hosted chat-completion provider.
#[derive(Clone, Debug)]
pub struct CompletionConfig {
    /// Bearer token; the chat endpoint refuses to run without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// SMTP relay credentials. Only present when all four variables are set.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Envelope sender, `SMTP_FROM` or the SMTP user.
    pub from: String,
}

/// Everything the site reads from the environment at startup.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub host: String,
    pub port: u16,
    pub site_name: String,
    pub site_url: String,
    pub templates: String,
    pub static_dir: String,
    pub content_api_url: String,
    pub completion: CompletionConfig,
    pub smtp: Option<SmtpConfig>,
    /// Inbox for owner notices. Falls back to the SMTP sender.
    pub contact_to: Option<String>,
    pub whatsapp_number: Option<String>,
}

impl SiteConfig {
    /// Reads configuration from the process environment.
    ///
    /// | Variable             | Default                           |
    /// |----------------------|-----------------------------------|
    /// | `HOST`               | `127.0.0.1`                       |
    /// | `PORT`               | `8080`                            |
    /// | `OPENAI_BASE_URL`    | `https://api.openai.com/v1`       |
    /// | `OPENAI_MODEL`       | `gpt-4o-mini`                     |
    /// | `OPENAI_TEMPERATURE` | `0.2`                             |
    /// | `OPENAI_MAX_TOKENS`  | `300`                             |
    /// | `CONTENT_API_URL`    | `https://rizwani-admin.vercel.app`|
    /// | `SITE_NAME`          | `Rizwani Solutions`               |
    /// | `SITE_URL`           | `https://rizwanisolution.com`     |
    /// | `TEMPLATES`          | `templates/**/*`                  |
    /// | `STATIC_DIR`         | `./static`                        |
    /// | `SMTP_FROM`          | value of `SMTP_USER`              |
    /// | `CONTACT_TO`         | sender address                    |
    ///
    /// `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER` and `SMTP_PASS` have no
    /// defaults; mail is disabled unless all four are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let completion = CompletionConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: or("OPENAI_MODEL", "gpt-4o-mini"),
            temperature: parse_or(get("OPENAI_TEMPERATURE"), "OPENAI_TEMPERATURE", 0.2)?,
            max_tokens: parse_or(get("OPENAI_MAX_TOKENS"), "OPENAI_MAX_TOKENS", 300)?,
        };

        let smtp = match (get("SMTP_HOST"), get("SMTP_PORT"), get("SMTP_USER"), get("SMTP_PASS")) {
            (Some(host), Some(port), Some(user), Some(pass)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .with_context(|| format!("SMTP_PORT is not a valid port: {}", port))?,
                from: get("SMTP_FROM").unwrap_or_else(|| user.clone()),
                user,
                pass,
            }),
            _ => None,
        };

        let contact_to = get("CONTACT_TO").or_else(|| smtp.as_ref().map(|s| s.from.clone()));

        Ok(Self {
            host: or("HOST", "127.0.0.1"),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            site_name: or("SITE_NAME", "Rizwani Solutions"),
            site_url: or("SITE_URL", "https://rizwanisolution.com")
                .trim_end_matches('/')
                .to_string(),
            templates: or("TEMPLATES", "templates/**/*"),
            static_dir: or("STATIC_DIR", "./static"),
            content_api_url: or("CONTENT_API_URL", "https://rizwani-admin.vercel.app"),
            completion,
            smtp,
            contact_to,
            whatsapp_number: get("WHATSAPP_NUMBER"),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, value)),
        None => Ok(default),
    }
}
