//! Loading of the secret used to authenticate against the relay.
//!
//! The secret is never stored in the program or the config file itself, the
//! config only names where to get it from.

use std::{
    env, fmt, fs, io,
    path::PathBuf,
    process::{Command, Stdio},
    string,
};

use log::debug;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("environment variable {0:?} is not set or not unicode")]
    MissingEnvVar(String, #[source] env::VarError),
    #[error("cannot read credential file {0:?}")]
    ReadFile(PathBuf, #[source] io::Error),
    #[error("cannot run credential command {0:?}")]
    RunCommand(String, #[source] io::Error),
    #[error("credential command {0:?} exited with {1}")]
    CommandFailed(String, std::process::ExitStatus),
    #[error("cannot parse output of credential command {0:?}")]
    ParseCommandOutput(String, #[source] string::FromUtf8Error),
    #[error("credential command {0:?} produced no output")]
    EmptyCommandOutput(String),
}

/// Opaque secret value. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Capability to obtain the relay secret at run time
pub trait CredentialProvider {
    fn fetch(&self) -> Result<Secret, CredentialError>;
}

/// Where the relay secret comes from, as written in the config file.
///
/// Serialized externally tagged, e.g. `{"env": "SMTP_PASSWORD"}`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    Env(String),
    File(PathBuf),
    Command(String),
}

impl CredentialSource {
    pub fn provider(&self) -> Box<dyn CredentialProvider> {
        match self {
            Self::Env(var) => Box::new(EnvCredential(var.clone())),
            Self::File(path) => Box::new(FileCredential(path.clone())),
            Self::Command(cmd) => Box::new(CommandCredential(cmd.clone())),
        }
    }
}

pub struct EnvCredential(pub String);

impl CredentialProvider for EnvCredential {
    fn fetch(&self) -> Result<Secret, CredentialError> {
        debug!("Loading credential from environment variable {:?}", self.0);
        env::var(&self.0)
            .map(Secret)
            .map_err(|e| CredentialError::MissingEnvVar(self.0.clone(), e))
    }
}

pub struct FileCredential(pub PathBuf);

impl CredentialProvider for FileCredential {
    fn fetch(&self) -> Result<Secret, CredentialError> {
        debug!("Loading credential from file {:?}", self.0);
        let contents = fs::read_to_string(&self.0)
            .map_err(|e| CredentialError::ReadFile(self.0.clone(), e))?;
        // Editors leave a newline at the end, the secret itself never has one
        Ok(Secret::new(contents.trim_end_matches(['\r', '\n'])))
    }
}

pub struct CommandCredential(pub String);

impl CredentialProvider for CommandCredential {
    fn fetch(&self) -> Result<Secret, CredentialError> {
        debug!("Loading credential from command {:?}", self.0);
        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", &self.0]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.0);
            cmd
        };
        let output = cmd
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| CredentialError::RunCommand(self.0.clone(), e))?;
        if !output.status.success() {
            return Err(CredentialError::CommandFailed(
                self.0.clone(),
                output.status,
            ));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| CredentialError::ParseCommandOutput(self.0.clone(), e))?;
        let first_line = stdout
            .lines()
            .next()
            .filter(|line| !line.is_empty())
            .ok_or_else(|| CredentialError::EmptyCommandOutput(self.0.clone()))?;
        Ok(Secret::new(first_line))
    }
}
