// src/notify/email.rs

//! SMTP delivery.

use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{AsyncSmtpTransport, authentication::Credentials};
use lettre::{AsyncTransport, Tokio1Executor};

use crate::error::Result;
use crate::models::MailConfig;
use crate::notify::Notifier;
use crate::pipeline::Digest;

/// Sends digests as `multipart/alternative` e-mail (plain text + HTML).
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a STARTTLS transport authenticated as the sender.
    pub fn new(mail: &MailConfig) -> Result<Self> {
        let creds = Credentials::new(mail.sender_email.clone(), mail.sender_password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_server)?
            .port(mail.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self::with_transport(mailer, mail.sender_email.parse()?))
    }

    fn with_transport(mailer: AsyncSmtpTransport<Tokio1Executor>, from: Mailbox) -> Self {
        Self { mailer, from }
    }

    /// Assemble the e-mail for `digest`.
    pub fn build_message(&self, recipient: &str, digest: &Digest) -> Result<Message> {
        let to: Mailbox = recipient.parse()?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(digest.subject())
            .multipart(MultiPart::alternative_plain_html(
                digest.to_text(),
                digest.to_html(),
            ))?;
        Ok(message)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, recipient: &str, digest: &Digest) -> Result<()> {
        let message = self.build_message(recipient, digest)?;
        self.mailer.send(message).await?;
        log::info!("Email sent successfully to {}", recipient);
        Ok(())
    }
}
