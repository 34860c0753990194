//! Environment-driven settings, read once at startup.

use crate::error::AppError;
use std::env;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub aws_region: String,
    pub aws_bucket: String,
    pub mail_from: String,
    pub smtp: Option<SmtpSettings>,
}

#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl Settings {
    /// `DATABASE_URL` and the AWS variables drive the stores; SMTP is optional
    /// and mail falls back to a log-only transport when it is absent.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/institute".to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });
        let aws_region = require_env("AWS_REGION")?;
        let aws_bucket = require_env("AWS_BUCKET_NAME")?;
        let mail_from = env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Institute <no-reply@institute.example>".to_string());
        let smtp = match env::var("SMTP_SERVER") {
            Ok(server) => Some(SmtpSettings {
                server,
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: require_env("SMTP_USERNAME")?,
                password: require_env("SMTP_PASSWORD")?,
            }),
            Err(_) => None,
        };
        Ok(Settings {
            database_url,
            bind_addr,
            aws_region,
            aws_bucket,
            mail_from,
            smtp,
        })
    }
}

fn require_env(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config(format!("{key} must be set")))
}
