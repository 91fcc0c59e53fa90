use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    Message,
    SmtpTransport,
    Transport,
};

use super::MailTransport;
use crate::core::TransportError;

/// SMTP over implicit TLS with username/password login, the way consumer
/// providers expose their relay (port 465 by default).
pub struct SmtpMailer {
    host: String,
    port: u16,
    address: String,
    secret: String,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, address: &str, secret: &str) -> Self {
        SmtpMailer {
            host: host.to_string(),
            port,
            address: address.to_string(),
            secret: secret.to_string(),
        }
    }
}

impl MailTransport for SmtpMailer {
    fn send(
        &self,
        from: &str,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        let mut builder = Message::builder().from(from.parse::<Mailbox>()?).subject(subject);
        for recipient in to {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }
        let message = builder.body(body.to_string())?;

        let mailer = SmtpTransport::relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(self.address.clone(), self.secret.clone()))
            .build();
        mailer.send(&message)?;
        Ok(())
    }
}
