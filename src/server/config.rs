//! Server configuration
//!
//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `TFILE_*` environment variables, then the `--path` command-line flag.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::ServerError;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tfile";

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to listen on
    pub bind_address: String,

    pub port: u16,

    /// Directory to share
    pub root: String,

    /// Upload request body ceiling in MB
    pub max_upload_mb: u64,
}

impl ServerConfig {
    /// Load configuration with file, environment and CLI overrides
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut builder = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("root", ".")?
            .set_default("max_upload_mb", 10 * 1024)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("TFILE")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Some(path) = &cli.path {
            builder = builder.set_override("root", path.to_string_lossy().into_owned())?;
        }

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.root.trim().is_empty() {
            return Err(ConfigError::Message("root cannot be empty".into()));
        }

        if self.max_upload_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Listen address; IPv6 literals are bracketed.
    pub fn socket_address(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.port)
        } else {
            format!("{}:{}", self.bind_address, self.port)
        }
    }

    /// Canonical absolute root. Fails unless it is an existing directory.
    pub fn resolve_root(&self) -> Result<PathBuf, ServerError> {
        let configured = PathBuf::from(&self.root);
        let root = configured
            .canonicalize()
            .map_err(|e| ServerError::InvalidRoot {
                path: configured.clone(),
                reason: e.to_string(),
            })?;

        if !root.is_dir() {
            return Err(ServerError::InvalidRoot {
                path: configured,
                reason: "not a directory".into(),
            });
        }
        Ok(root)
    }

    /// Get maximum upload size in bytes
    pub fn upload_limit_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_path(path: &std::path::Path) -> Cli {
        Cli {
            path: Some(path.to_path_buf()),
            config: None,
        }
    }

    #[test]
    fn test_defaults_with_cli_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(&cli_with_path(dir.path())).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.socket_address(), "0.0.0.0:8080");
        assert_eq!(PathBuf::from(&config.root), dir.path());
    }

    #[test]
    fn test_config_file_values_and_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("server.toml");
        std::fs::write(
            &file,
            "bind_address = \"127.0.0.1\"\nport = 9090\nroot = \"/from/file\"\nmax_upload_mb = 5\n",
        )
        .unwrap();

        let cli = Cli {
            path: None,
            config: Some(file.clone()),
        };
        let config = ServerConfig::load(&cli).unwrap();
        assert_eq!(config.socket_address(), "127.0.0.1:9090");
        assert_eq!(config.root, "/from/file");
        assert_eq!(config.upload_limit_bytes(), 5 * 1024 * 1024);

        let cli = Cli {
            path: Some(dir.path().to_path_buf()),
            config: Some(file),
        };
        let config = ServerConfig::load(&cli).unwrap();
        assert_eq!(PathBuf::from(&config.root), dir.path());
    }

    #[test]
    fn test_missing_explicit_config_file_fails() {
        let cli = Cli {
            path: None,
            config: Some(PathBuf::from("/definitely/not/here.toml")),
        };
        assert!(ServerConfig::load(&cli).is_err());
    }

    #[test]
    fn test_zero_port_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.toml");
        std::fs::write(&file, "port = 0\n").unwrap();
        let cli = Cli {
            path: None,
            config: Some(file),
        };
        assert!(ServerConfig::load(&cli).is_err());
    }

    #[test]
    fn test_resolve_root_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"").unwrap();

        let mut config = ServerConfig::load(&cli_with_path(dir.path())).unwrap();
        assert_eq!(
            config.resolve_root().unwrap(),
            dir.path().canonicalize().unwrap()
        );

        config.root = file.to_string_lossy().into_owned();
        assert!(matches!(
            config.resolve_root(),
            Err(ServerError::InvalidRoot { .. })
        ));

        config.root = dir.path().join("missing").to_string_lossy().into_owned();
        assert!(config.resolve_root().is_err());
    }

    #[test]
    fn test_ipv6_socket_address() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::load(&cli_with_path(dir.path())).unwrap();
        config.bind_address = "::".into();
        assert_eq!(config.socket_address(), "[::]:8080");
    }
}
