//! Sessions with the submission relay.
//!
//! A [`Session`] is released when dropped, whichever step it stopped at.

use lettre::{
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{SmtpConnection, TlsParameters},
        extension::ClientId,
    },
    Message,
};
use log::{debug, info, warn};

use crate::{credential::Secret, error::SendError, Seconds};

/// Something that can open sessions to a relay
pub trait Relay {
    type Session: Session;

    fn open(&self) -> Result<Self::Session, SendError>;
}

/// An open connection to the relay, released on drop
pub trait Session {
    fn authenticate(&mut self, username: &str, secret: &Secret) -> Result<(), SendError>;

    fn submit(&mut self, message: &Message) -> Result<(), SendError>;
}

/// SMTP relay reached over implicit TLS
#[derive(Debug, Clone)]
pub struct SmtpRelay {
    host: String,
    port: u16,
    timeout: Seconds,
    tls: bool,
}

impl SmtpRelay {
    pub fn new(host: impl Into<String>, port: u16, timeout: Seconds) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            tls: true,
        }
    }

    /// Plain TCP, for talking to a local scripted relay
    #[cfg(test)]
    pub(crate) fn plaintext(host: impl Into<String>, port: u16, timeout: Seconds) -> Self {
        Self {
            tls: false,
            ..Self::new(host, port, timeout)
        }
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Relay for SmtpRelay {
    type Session = SmtpSession;

    fn open(&self) -> Result<SmtpSession, SendError> {
        let endpoint = self.endpoint();
        debug!(
            "Opening {} session to {endpoint} (timeout {})",
            if self.tls { "TLS" } else { "plaintext" },
            self.timeout
        );
        let to_err = |e: lettre::transport::smtp::Error| SendError::Connection {
            endpoint: endpoint.clone(),
            source: e.into(),
        };
        let tls = if self.tls {
            Some(TlsParameters::new(self.host.clone()).map_err(to_err)?)
        } else {
            None
        };
        let conn = SmtpConnection::connect(
            (self.host.as_str(), self.port),
            Some(self.timeout.into()),
            &ClientId::default(),
            tls.as_ref(),
            None,
        )
        .map_err(to_err)?;
        info!("Connected to {endpoint}");
        Ok(SmtpSession { conn })
    }
}

pub struct SmtpSession {
    conn: SmtpConnection,
}

impl Session for SmtpSession {
    fn authenticate(&mut self, username: &str, secret: &Secret) -> Result<(), SendError> {
        debug!("Authenticating as {username:?}");
        let credentials = Credentials::new(username.to_string(), secret.expose().to_string());
        let response = self
            .conn
            .auth(&[Mechanism::Plain, Mechanism::Login], &credentials)
            .map_err(|e| SendError::Authentication {
                username: username.to_string(),
                source: e.into(),
            })?;
        debug!("Relay accepted credentials ({})", response.code());
        Ok(())
    }

    fn submit(&mut self, message: &Message) -> Result<(), SendError> {
        let response = self
            .conn
            .send(message.envelope(), &message.formatted())
            .map_err(|e| SendError::Delivery(e.into()))?;
        info!("Relay accepted message ({})", response.code());
        Ok(())
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        if self.conn.has_broken() {
            warn!("Session to relay broke before release");
        }
        // Sends QUIT if still possible and shuts the socket down either way
        self.conn.abort();
        debug!("Session to relay released");
    }
}
