//! Outgoing email.
//!
//! Delivery sits behind the [`Mailer`] trait so the auth flows never care
//! about transport. Local dev logs the message; production posts it to an
//! HTTP mail API. Callers fire-and-forget: a failed send is logged and never
//! fails the request that triggered it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::Config;
use crate::error::ApiError;

/// A rendered email ready for delivery.
#[derive(Clone, Debug)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Email delivery abstraction.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message or return an error so the caller can log it.
    async fn send(&self, message: &OutgoingEmail) -> Result<(), ApiError>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), ApiError> {
        tracing::info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.html,
            "email send stub"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailBody {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
}

/// Sender that posts messages to an HTTP mail API (Brevo-compatible).
pub struct ApiMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl ApiMailer {
    pub fn new(api_url: String, api_key: String, from_email: String, from_name: String) -> Self {
        ApiMailer {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from_email,
            from_name,
        }
    }
}

#[async_trait]
impl Mailer for ApiMailer {
    async fn send(&self, message: &OutgoingEmail) -> Result<(), ApiError> {
        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.from_email.clone(),
                name: Some(self.from_name.clone()),
            },
            to: vec![EmailAddress {
                email: message.to_email.clone(),
                name: message.to_name.clone(),
            }],
            subject: message.subject.clone(),
            html_content: message.html.clone(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("mail API request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(ApiError::Internal(format!(
            "mail API send failed (status={}): {}",
            status, detail
        )))
    }
}

/// Pick the mailer for this deployment: the HTTP API when configured,
/// otherwise the logging stub.
pub fn from_config(config: &Config) -> Arc<dyn Mailer> {
    match (&config.mail_api_url, &config.mail_api_key) {
        (Some(url), Some(key)) => Arc::new(ApiMailer::new(
            url.clone(),
            key.clone(),
            config.mail_from_email.clone(),
            config.mail_from_name.clone(),
        )),
        _ => {
            tracing::info!("MAIL_API_URL not set, outgoing email will be logged only");
            Arc::new(LogMailer)
        }
    }
}

/// Render the account-verification email.
pub fn verification_email(
    fullname: &str,
    to_email: &str,
    code: &str,
    expires_at: NaiveDateTime,
) -> OutgoingEmail {
    let html = format!(
        "<div style=\"font-family:sans-serif\">\
         <h2>Hi {fullname},</h2>\
         <p>Use this code to verify your Bijou account:</p>\
         <h1 style=\"letter-spacing:6px\">{code}</h1>\
         <p>The code expires at {expires} UTC. If you did not register, you can ignore this email.</p>\
         </div>",
        fullname = fullname,
        code = code,
        expires = expires_at.format("%Y-%m-%d %H:%M"),
    );

    OutgoingEmail {
        to_email: to_email.to_string(),
        to_name: Some(fullname.to_string()),
        subject: "Verify Account".to_string(),
        html,
    }
}

/// Send in a detached task; failures are logged and swallowed.
pub fn send_detached(mailer: Arc<dyn Mailer>, message: OutgoingEmail) {
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&message).await {
            tracing::warn!(to_email = %message.to_email, error = %err, "verification email failed");
        }
    });
}
