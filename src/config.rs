use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::debug;
use serde::Deserialize;

use crate::{credential::CredentialSource, Seconds};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Subject line used for every message sent
    pub subject: String,

    /// Display name shown in the From header
    pub from_name: String,

    /// Sender address
    pub from_address: String,

    /// Display name shown in the To header, the bare address is used if absent
    pub to_name: Option<String>,

    /// Recipient address
    pub to_address: String,

    /// File whose contents become the message body
    #[serde(default = "default_body_path")]
    pub body_path: PathBuf,

    /// Host of the submission relay
    pub relay_host: String,

    /// Port of the submission relay, TLS is expected from the first byte
    #[serde(default = "default_relay_port")]
    pub relay_port: u16,

    /// Login for the relay, defaults to `from_address`
    pub username: Option<String>,

    /// Where to fetch the relay secret from
    pub credential_source: CredentialSource,

    /// Bound on connecting and on each network read or write
    #[serde(default)]
    pub timeout: Seconds,
}

fn default_body_path() -> PathBuf {
    PathBuf::from("./email")
}

fn default_relay_port() -> u16 {
    465
}

impl Config {
    pub fn load_from(config_path: &Path) -> anyhow::Result<Config> {
        debug!("Loading Config from: {config_path:?}");
        let file_contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read contents of {config_path:?}"))?;
        let result = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse contents of {config_path:?}"))?;
        Ok(result)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.from_address)
    }

    pub fn relay_endpoint(&self) -> String {
        format!("{}:{}", self.relay_host, self.relay_port)
    }
}
