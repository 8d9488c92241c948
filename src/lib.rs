mod cli;
mod config;
pub mod credential;
mod error;
mod logging;
pub mod message;
pub mod relay;
mod sender;
mod units;

use anyhow::Context;
use log::info;

pub use cli::{Cli, LogLevel};
pub use config::Config;
pub use error::SendError;
pub use logging::init_logging;
pub use sender::MessageSender;
pub use units::Seconds;

use crate::relay::SmtpRelay;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let credentials = config.credential_source.provider();
    let relay = SmtpRelay::new(config.relay_host.clone(), config.relay_port, config.timeout);
    let endpoint = config.relay_endpoint();
    let sender = MessageSender::new(config, credentials, relay);

    sender
        .send()
        .with_context(|| format!("Failed to send email via {endpoint}"))?;
    info!("Completed");
    Ok(())
}

/// Config file with command line overrides applied
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load_from(&cli.get_config_path())?;
    if let Some(body) = &cli.body {
        config.body_path = body.clone();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::{io::Write, net::TcpListener, path::Path};
    use tempfile::NamedTempFile;

    fn config_file(body_path: &Path, relay_port: u16) -> NamedTempFile {
        let contents = serde_json::json!({
            "subject": "Your email subject here",
            "from_name": "Sender Name",
            "from_address": "sender@example.com",
            "to_address": "recipient@example.com",
            "body_path": body_path,
            "relay_host": "127.0.0.1",
            "relay_port": relay_port,
            "credential_source": {"env": "MAILSHOT_TEST_RUN_SECRET"},
        });
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.to_string().as_bytes()).unwrap();
        file
    }

    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn body_flag_overrides_config() {
        // Arrange
        let config = config_file(Path::new("from-config"), 465);
        let cli = Cli::parse_from([
            "mailshot",
            "--config",
            config.path().to_str().unwrap(),
            "--body",
            "from-flag",
        ]);

        // Act
        let actual = load_config(&cli).unwrap();

        // Assert
        assert_eq!(actual.body_path, Path::new("from-flag"));
    }

    #[test]
    fn config_body_used_without_flag() {
        let config = config_file(Path::new("from-config"), 465);
        let cli = Cli::parse_from(["mailshot", "-c", config.path().to_str().unwrap()]);

        let actual = load_config(&cli).unwrap();

        assert_eq!(actual.body_path, Path::new("from-config"));
    }

    #[test]
    fn run_reports_missing_body() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("email");
        let config = config_file(&missing, closed_port());
        let cli = Cli {
            config_filename: Some(config.path().to_string_lossy().into_owned()),
            ..Default::default()
        };

        // Act
        let err = run(cli).unwrap_err();

        // Assert
        assert!(
            matches!(err.downcast_ref::<SendError>(), Some(SendError::FileAccess { path, .. }) if *path == missing),
            "{err:#}"
        );
    }

    #[test]
    fn run_reports_unreachable_relay() {
        // Arrange
        let mut body = NamedTempFile::new().unwrap();
        body.write_all(b"Hello world").unwrap();
        std::env::set_var("MAILSHOT_TEST_RUN_SECRET", "s3cret");
        let config = config_file(body.path(), closed_port());
        let cli = Cli {
            config_filename: Some(config.path().to_string_lossy().into_owned()),
            ..Default::default()
        };

        // Act
        let err = run(cli).unwrap_err();

        // Assert
        assert!(
            matches!(err.downcast_ref::<SendError>(), Some(SendError::Connection { .. })),
            "{err:#}"
        );
    }
}
