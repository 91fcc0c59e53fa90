use crate::core::TransportError;

pub mod smtp;

pub use smtp::SmtpMailer;

/// Outbound mail collaborator. One call, one message; implementations
/// authenticate with the sender's credentials before sending.
pub trait MailTransport {
    fn send(&self, from: &str, to: &[String], subject: &str, body: &str)
        -> Result<(), TransportError>;
}
