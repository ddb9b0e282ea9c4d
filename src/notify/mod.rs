//! Digest delivery.
//!
//! - `SmtpNotifier`: e-mails the digest over SMTP with STARTTLS
//! - `StdoutNotifier`: prints the digest (dry runs)

mod email;
mod stdout;

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::Digest;

pub use email::SmtpNotifier;
pub use stdout::StdoutNotifier;

/// Delivers a rendered digest to a recipient.
///
/// Delivery happens after ingestion is durable, so a failure here is
/// reported but never undoes or fails the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, recipient: &str, digest: &Digest) -> Result<()>;
}
