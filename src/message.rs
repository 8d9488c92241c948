use std::{fs::File, io::Read, path::Path};

use lettre::{
    address::AddressError,
    message::{header::ContentType, Mailbox},
    Address, Message,
};
use log::debug;
use thiserror::Error;

use crate::{config::Config, error::SendError};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("cannot parse address {0:?}")]
    ParseAddress(String, #[source] AddressError),
    #[error("cannot assemble message")]
    Build(#[source] lettre::error::Error),
}

/// Reads the whole file as the message body, unchanged
pub fn read_body(path: &Path) -> Result<String, SendError> {
    debug!("Reading message body from {path:?}");
    let to_err = |source| SendError::FileAccess {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(to_err)?;
    let mut body = String::new();
    file.read_to_string(&mut body).map_err(to_err)?;
    Ok(body)
}

/// A single plain text message, fixed once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    subject: String,
    from: Mailbox,
    to: Mailbox,
    body: String,
}

impl Email {
    pub fn compose(config: &Config, body: String) -> Result<Self, ComposeError> {
        let from = mailbox(Some(&config.from_name), &config.from_address)?;
        let to = mailbox(config.to_name.as_deref(), &config.to_address)?;
        Ok(Self {
            subject: config.subject.clone(),
            from,
            to,
            body,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    pub fn to(&self) -> &Mailbox {
        &self.to
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Builds the wire form, `text/plain; charset=utf-8`
    pub fn to_message(&self) -> Result<Message, ComposeError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(&self.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())
            .map_err(ComposeError::Build)
    }
}

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, ComposeError> {
    let parsed: Address = address
        .parse()
        .map_err(|e| ComposeError::ParseAddress(address.to_string(), e))?;
    Ok(Mailbox::new(name.map(str::to_string), parsed))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{credential::CredentialSource, Seconds};
    use std::{io::Write, path::PathBuf};

    pub(crate) fn test_config(body_path: PathBuf) -> Config {
        Config {
            subject: "Your email subject here".to_string(),
            from_name: "Sender Name".to_string(),
            from_address: "sender@example.com".to_string(),
            to_name: Some("Recipient's name".to_string()),
            to_address: "recipient@example.com".to_string(),
            body_path,
            relay_host: "smtp.example.com".to_string(),
            relay_port: 465,
            username: None,
            credential_source: CredentialSource::Env("UNUSED".to_string()),
            timeout: Seconds::default(),
        }
    }

    #[test]
    fn read_body_exact_contents() {
        // Arrange
        let contents = "Hello world\n\nsecond paragraph é\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();

        // Act
        let actual = read_body(file.path()).unwrap();

        // Assert
        assert_eq!(actual, contents);
    }

    #[test]
    fn read_body_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email");

        let actual = read_body(&path);

        assert!(matches!(actual, Err(SendError::FileAccess { path: p, .. }) if p == path));
    }

    #[test]
    fn compose_uses_configured_headers() {
        // Arrange
        let config = test_config("unused".into());

        // Act
        let actual = Email::compose(&config, "Hello world".to_string()).unwrap();

        // Assert
        assert_eq!(actual.subject(), "Your email subject here");
        assert_eq!(actual.from().name.as_deref(), Some("Sender Name"));
        assert_eq!(actual.from().email.to_string(), "sender@example.com");
        assert_eq!(actual.to().name.as_deref(), Some("Recipient's name"));
        assert_eq!(actual.to().email.to_string(), "recipient@example.com");
        assert_eq!(actual.body(), "Hello world");
    }

    #[test]
    fn compose_without_recipient_name() {
        let mut config = test_config("unused".into());
        config.to_name = None;

        let actual = Email::compose(&config, String::new()).unwrap();

        assert_eq!(actual.to().name, None);
    }

    #[test]
    fn compose_rejects_unparsable_address() {
        let mut config = test_config("unused".into());
        config.from_address = "not an address".to_string();

        let actual = Email::compose(&config, String::new());

        assert!(matches!(actual, Err(ComposeError::ParseAddress(addr, _)) if addr == "not an address"));
    }

    #[test]
    fn wire_message_carries_headers_and_body() {
        // Arrange
        let config = test_config("unused".into());
        let email = Email::compose(&config, "Hello world".to_string()).unwrap();

        // Act
        let message = email.to_message().unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        // Assert
        assert!(formatted.contains("Subject: Your email subject here\r\n"));
        assert!(formatted.contains("sender@example.com"));
        assert!(formatted.contains("recipient@example.com"));
        assert!(formatted.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(formatted.contains("\r\n\r\nHello world"));
        let envelope = message.envelope();
        assert_eq!(envelope.from().map(|a| a.to_string()).as_deref(), Some("sender@example.com"));
        assert_eq!(envelope.to().len(), 1);
    }
}
