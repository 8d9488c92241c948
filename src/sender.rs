use log::{debug, info};

use crate::{
    config::Config,
    credential::CredentialProvider,
    error::SendError,
    message::{self, Email},
    relay::{Relay, Session},
};

/// Sends the configured message through a relay, one attempt per call
pub struct MessageSender<R> {
    config: Config,
    credentials: Box<dyn CredentialProvider>,
    relay: R,
}

impl<R: Relay> MessageSender<R> {
    pub fn new(config: Config, credentials: Box<dyn CredentialProvider>, relay: R) -> Self {
        Self {
            config,
            credentials,
            relay,
        }
    }

    /// Reads the body, builds the message and hands it to the relay.
    ///
    /// Nothing touches the network until the body has been read, the message
    /// built and the secret loaded. No step is retried.
    pub fn send(&self) -> Result<Email, SendError> {
        let body = message::read_body(&self.config.body_path)?;
        let email = Email::compose(&self.config, body).map_err(SendError::Compose)?;
        let wire = email.to_message().map_err(SendError::Compose)?;
        let secret = self.credentials.fetch().map_err(SendError::Credential)?;

        let mut session = self.relay.open()?;
        session.authenticate(self.config.username(), &secret)?;
        debug!("Submitting message {:?} to {}", email.subject(), email.to());
        session.submit(&wire)?;
        info!("Sent {:?} to {}", email.subject(), email.to());
        Ok(email)
    }
}
