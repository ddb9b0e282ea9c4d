// src/notify/stdout.rs

//! Dry-run delivery to standard output.

use async_trait::async_trait;

use crate::error::Result;
use crate::notify::Notifier;
use crate::pipeline::Digest;

/// Prints the plain-text digest instead of sending it.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn deliver(&self, recipient: &str, digest: &Digest) -> Result<()> {
        println!("To: {recipient}");
        println!("Subject: {}", digest.subject());
        println!();
        print!("{}", digest.to_text());
        Ok(())
    }
}
