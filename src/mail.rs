use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::info;

use crate::config::MailConfig;

/// Outbound mail seam. The auth flows only ever talk to this trait, so tests
/// can swap in a no-op implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, name: &str, reset_url: &str)
        -> anyhow::Result<()>;
    async fn send_reset_confirmation(&self, to: &str, name: &str) -> anyhow::Result<()>;
}

/// Builds the link embedded in reset emails. The raw token lives only here
/// and in the client's request body, never in storage or logs.
pub fn reset_link(frontend_url: &str, raw_token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        raw_token
    )
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    send_timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }
        let from = config
            .from
            .parse::<Mailbox>()
            .context("parse EMAIL_FROM mailbox")?;
        Ok(Self {
            transport: builder.build(),
            from,
            send_timeout: Duration::from_secs(config.send_timeout_secs),
        })
    }

    async fn send(&self, message: Message) -> anyhow::Result<()> {
        tokio::time::timeout(self.send_timeout, self.transport.send(message))
            .await
            .context("mail dispatch timed out")?
            .context("mail dispatch failed")?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        reset_url: &str,
    ) -> anyhow::Result<()> {
        let body = format!(
            "<html><body>\
             <h2>Hello {name},</h2>\
             <p>We received a request to reset the password for your account.</p>\
             <p><a href=\"{reset_url}\">Reset Password</a></p>\
             <p>Or copy and paste this link into your browser:</p>\
             <p>{reset_url}</p>\
             <p>This link expires in 1 hour. If you didn't request a reset, ignore this email.</p>\
             </body></html>"
        );
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("parse recipient address")?)
            .subject("Password Reset Request")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .context("build reset email")?;
        self.send(message).await?;
        info!(to = %to, "password reset email sent");
        Ok(())
    }

    async fn send_reset_confirmation(&self, to: &str, name: &str) -> anyhow::Result<()> {
        let body = format!(
            "<html><body>\
             <h2>Hello {name},</h2>\
             <p>Your password has been successfully reset.</p>\
             <p>You can now log in with your new password. If you did not make \
             this change, contact support immediately.</p>\
             </body></html>"
        );
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("parse recipient address")?)
            .subject("Password Reset Successful")
            .header(ContentType::TEXT_HTML)
            .body(body)
            .context("build confirmation email")?;
        self.send(message).await?;
        info!(to = %to, "password reset confirmation sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_link_embeds_the_raw_token() {
        let link = reset_link("http://localhost:5173", "abc123");
        assert_eq!(link, "http://localhost:5173/reset-password?token=abc123");
    }

    #[test]
    fn reset_link_tolerates_trailing_slash() {
        let link = reset_link("https://campus.example.com/", "tok");
        assert_eq!(link, "https://campus.example.com/reset-password?token=tok");
    }
}
