//! Report submission over SMTPS.

use dialoguer::Password;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

use crate::config::Config;
use crate::error::MailError;

/// Ask for the mail password on the terminal.
///
/// Echo is switched off for the duration of the read and restored on every
/// exit path, including errors and Ctrl-C.
pub fn prompt_password(account: &str) -> Result<String, MailError> {
    let password = Password::new()
        .with_prompt(format!("pass for {account}"))
        .allow_empty_password(true)
        .interact()?;
    Ok(password.trim().to_string())
}

/// Sends the formatted report through the configured mail host.
pub struct MailSender {
    host: String,
    port: u16,
    accept_invalid_certs: bool,
    from: String,
}

impl MailSender {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.mail.port,
            accept_invalid_certs: config.mail.accept_invalid_certs,
            from: config.my_email.clone(),
        }
    }

    fn transport(&self, password: String) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let mut tls = TlsParameters::builder(self.host.clone());
        if self.accept_invalid_certs {
            tracing::warn!(host = %self.host, "Certificate validation disabled for mail host");
            tls = tls.dangerous_accept_invalid_certs(true);
        }

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
                .port(self.port)
                .tls(Tls::Wrapper(tls.build()?))
                .credentials(Credentials::new(self.from.clone(), password))
                .authentication(vec![Mechanism::Plain])
                .build(),
        )
    }

    /// SMTP envelope: the sender and the single recipient.
    pub fn envelope(&self, to: &str) -> Result<Envelope, MailError> {
        let parse = |value: &str| {
            value
                .parse::<Address>()
                .map_err(|source| MailError::Address {
                    value: value.to_string(),
                    source,
                })
        };
        Ok(Envelope::new(Some(parse(&self.from)?), vec![parse(to)?])?)
    }

    /// Submit the report as the complete message, headers included.
    pub async fn send(&self, report: &str, to: &str, password: String) -> Result<(), MailError> {
        let envelope = self.envelope(to)?;
        let mailer = self.transport(password)?;

        tracing::info!(host = %self.host, port = self.port, to, "Sending report");
        mailer
            .send_raw(&envelope, to_crlf(report).as_bytes())
            .await?;

        tracing::info!(to, "Report sent");
        Ok(())
    }
}

/// SMTP wants CRLF line endings; the report is built with bare `\n`.
fn to_crlf(message: &str) -> String {
    message.replace("\r\n", "\n").replace('\n', "\r\n")
}
