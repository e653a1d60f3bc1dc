//! SMTP email notification transport.

use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use super::render_message;
use crate::config::SmtpConfig;
use crate::core::models::ModelSetDiff;
use crate::error::{ChanwatchError, Result};

const SUBJECT: &str = "Channel model change";

fn transport_err(message: String) -> ChanwatchError {
    ChanwatchError::Notification {
        transport: "email".to_string(),
        message,
    }
}

/// Deliver a diff by email. Single attempt; SMTP servers queue internally.
///
/// # Errors
///
/// Returns an error for bad addresses or SMTP delivery failure.
pub async fn send(config: &SmtpConfig, diff: &ModelSetDiff) -> Result<()> {
    let message = Message::builder()
        .from(
            config
                .from
                .parse()
                .map_err(|e| transport_err(format!("invalid from address: {e}")))?,
        )
        .to(config
            .to
            .parse()
            .map_err(|e| transport_err(format!("invalid to address: {e}")))?)
        .subject(SUBJECT)
        .body(render_message(diff))
        .map_err(|e| transport_err(format!("build message: {e}")))?;

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        .map_err(|e| transport_err(format!("smtp relay: {e}")))?
        .port(config.port)
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .build();

    mailer
        .send(message)
        .await
        .map_err(|e| transport_err(e.to_string()))?;

    Ok(())
}
